//! Blocking JSON-RPC 2.0 client for the monitoring server's API.

use crate::collection::json_kind;
use crate::error::RemoteError;
use crate::traits::RpcTransport;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Path of the JSON-RPC endpoint below the server URL.
pub const API_ENDPOINT: &str = "api_jsonrpc.php";

/// How the client authenticates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Pre-issued API token.
    ApiToken(String),
    /// Username/password exchanged for a session via `user.login`.
    Login {
        /// Login name.
        user: String,
        /// Password.
        password: String,
    },
    /// No authentication (only `apiinfo.*` works).
    Anonymous,
}

/// Connection settings.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Base URL of the web frontend, e.g. `https://monitor.example.com`.
    pub server_url: String,
    /// Authentication method.
    pub credentials: Credentials,
    /// Per-request timeout; `None` leaves the HTTP client default.
    pub timeout: Option<Duration>,
    /// Verify TLS certificates.
    pub validate_certs: bool,
}

#[derive(Serialize)]
struct Request<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Value,
    id: u64,
}

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ErrorObject>,
}

#[derive(Deserialize)]
struct ErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

/// JSON-RPC transport over HTTP.
///
/// Requires server 6.4 or later: the token is sent as `Authorization: Bearer`
/// and `user.login` takes `username`.
#[derive(Debug)]
pub struct JsonRpcClient {
    http: Client,
    endpoint: String,
    auth: Option<String>,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    /// Builds the HTTP client and, for [`Credentials::Login`], opens a session.
    pub fn connect(options: ClientOptions) -> Result<Self, RemoteError> {
        let mut builder = Client::builder().danger_accept_invalid_certs(!options.validate_certs);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }

        let mut client = Self {
            http: builder.build()?,
            endpoint: endpoint_url(&options.server_url),
            auth: None,
            next_id: AtomicU64::new(1),
        };

        match options.credentials {
            Credentials::ApiToken(token) => client.auth = Some(token),
            Credentials::Login { user, password } => {
                let session = client.send(
                    "user.login",
                    login_params(&user, &password),
                    false,
                )?;
                match session {
                    Value::String(token) => client.auth = Some(token),
                    other => {
                        return Err(RemoteError::UnexpectedResponse {
                            method: "user.login".into(),
                            reason: format!("expected a session token, got {}", json_kind(&other)),
                        })
                    }
                }
                tracing::debug!(endpoint = %client.endpoint, "opened API session");
            }
            Credentials::Anonymous => {}
        }

        Ok(client)
    }

    /// Endpoint the client posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn send(&self, method: &str, params: Value, authenticated: bool) -> Result<Value, RemoteError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = Request {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };

        tracing::debug!(method, id, "json-rpc request");

        let mut request = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json-rpc")
            .json(&body);
        if authenticated {
            if let Some(token) = &self.auth {
                request = request.bearer_auth(token);
            }
        }

        let response = request.send()?;
        let status = response.status();
        let text = response.text()?;

        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        decode_response(method, &text)
    }
}

impl RpcTransport for JsonRpcClient {
    fn call(&self, method: &str, params: Value) -> Result<Value, RemoteError> {
        // Version probing is rejected by the server when a token is attached.
        let authenticated = !method.starts_with("apiinfo.");
        self.send(method, params, authenticated)
    }
}

fn login_params(user: &str, password: &str) -> Value {
    json!({"username": user, "password": password})
}

fn endpoint_url(server_url: &str) -> String {
    let base = server_url.trim_end_matches('/');
    if base.ends_with(API_ENDPOINT) {
        base.to_string()
    } else {
        format!("{}/{}", base, API_ENDPOINT)
    }
}

fn decode_response(method: &str, text: &str) -> Result<Value, RemoteError> {
    let response: Response = serde_json::from_str(text)?;

    if let Some(error) = response.error {
        let data = match error.data {
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => String::new(),
        };
        return Err(RemoteError::Api {
            code: error.code,
            message: error.message,
            data,
        });
    }

    response.result.ok_or_else(|| RemoteError::UnexpectedResponse {
        method: method.to_string(),
        reason: "neither result nor error present".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_uses_username_field() {
        assert_eq!(
            login_params("Admin", "zabbix"),
            json!({"username": "Admin", "password": "zabbix"})
        );
    }

    #[test]
    fn endpoint_appends_api_path() {
        assert_eq!(
            endpoint_url("http://monitor.example.com/"),
            "http://monitor.example.com/api_jsonrpc.php"
        );
        assert_eq!(
            endpoint_url("http://monitor.example.com/api_jsonrpc.php"),
            "http://monitor.example.com/api_jsonrpc.php"
        );
    }

    #[test]
    fn decodes_result() {
        let value = decode_response(
            "dashboard.get",
            r#"{"jsonrpc":"2.0","result":[{"dashboardid":"1"}],"id":1}"#,
        )
        .unwrap();
        assert_eq!(value, json!([{"dashboardid": "1"}]));
    }

    #[test]
    fn decodes_api_error() {
        let err = decode_response(
            "dashboard.update",
            r#"{"jsonrpc":"2.0","error":{"code":-32602,"message":"Invalid params.","data":"Dashboard \"x\" already exists."},"id":2}"#,
        )
        .unwrap_err();
        match err {
            RemoteError::Api { code, message, data } => {
                assert_eq!(code, -32602);
                assert_eq!(message, "Invalid params.");
                assert_eq!(data, "Dashboard \"x\" already exists.");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_empty_envelope() {
        let err = decode_response("dashboard.get", r#"{"jsonrpc":"2.0","id":3}"#).unwrap_err();
        assert!(matches!(err, RemoteError::UnexpectedResponse { .. }));
    }

    #[test]
    fn rejects_malformed_body() {
        let err = decode_response("dashboard.get", "<html>").unwrap_err();
        assert!(matches!(err, RemoteError::Decode(_)));
    }
}
