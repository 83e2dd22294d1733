//! Error types for remote calls.

use thiserror::Error;

/// Errors that can occur while talking to the remote API.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Network, TLS, or timeout failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The server answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as received.
        body: String,
    },
    /// The API rejected the call (validation, permissions, auth).
    #[error("API error {code}: {message} {data}")]
    Api {
        /// JSON-RPC error code.
        code: i64,
        /// Short error message.
        message: String,
        /// Detailed error description.
        data: String,
    },
    /// Response body was not valid JSON.
    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),
    /// Response was valid JSON but not of the expected shape.
    #[error("unexpected response to {method}: {reason}")]
    UnexpectedResponse {
        /// Method that was called.
        method: String,
        /// What was wrong with the response.
        reason: String,
    },
    /// Failure injected by the in-memory backend.
    #[error("injected failure on {method}")]
    Injected {
        /// Method that was called.
        method: String,
    },
}
