//! Typed access to one named object collection.

use crate::error::RemoteError;
use crate::traits::RpcTransport;
use dashsync_canonical::{Document, RemoteId};
use serde_json::{Map, Value};

/// Which fields a `get` call should return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// All fields (`"extend"`).
    Extend,
    /// Only the listed fields.
    Fields(Vec<String>),
}

impl Output {
    fn to_json(&self) -> Value {
        match self {
            Output::Extend => Value::String("extend".into()),
            Output::Fields(fields) => {
                Value::Array(fields.iter().cloned().map(Value::String).collect())
            }
        }
    }
}

/// Parameters of a `<collection>.get` call.
#[derive(Debug, Clone)]
pub struct GetRequest {
    output: Output,
    params: Map<String, Value>,
}

impl Default for GetRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl GetRequest {
    /// Request returning all fields with no filter.
    pub fn new() -> Self {
        Self {
            output: Output::Extend,
            params: Map::new(),
        }
    }

    /// Restricts results to objects whose `field` exactly matches `value`.
    pub fn filter(mut self, field: &str, value: impl Into<Value>) -> Self {
        let filter = self
            .params
            .entry("filter")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = filter {
            map.insert(field.to_string(), value.into());
        }
        self
    }

    /// Selects the returned fields.
    pub fn output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }

    /// Restricts results to the given ids, e.g. `dashboardids`.
    pub fn ids(self, key: &str, ids: &[RemoteId]) -> Self {
        let ids: Vec<Value> = ids
            .iter()
            .map(|id| Value::String(id.as_str().to_string()))
            .collect();
        self.param(key, Value::Array(ids))
    }

    /// Asks for a related collection in full, e.g. `selectPages`.
    pub fn select_related(self, key: &str) -> Self {
        self.param(key, "extend")
    }

    /// Sets an arbitrary request parameter.
    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// JSON-RPC `params` object.
    pub fn to_params(&self) -> Value {
        let mut params = Map::new();
        params.insert("output".into(), self.output.to_json());
        for (key, value) in &self.params {
            params.insert(key.clone(), value.clone());
        }
        Value::Object(params)
    }
}

/// Named object collection (e.g. `dashboard`) over a transport.
pub struct Collection<'a, T: RpcTransport + ?Sized> {
    transport: &'a T,
    name: String,
}

impl<'a, T: RpcTransport + ?Sized> Collection<'a, T> {
    /// Binds `name` to a transport.
    pub fn new(transport: &'a T, name: impl Into<String>) -> Self {
        Self {
            transport,
            name: name.into(),
        }
    }

    /// Collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully qualified method name for `verb`.
    pub fn method(&self, verb: &str) -> String {
        format!("{}.{}", self.name, verb)
    }

    /// Key under which the server returns ids, e.g. `dashboardids`.
    pub fn ids_key(&self) -> String {
        format!("{}ids", self.name)
    }

    /// Calls `<collection>.<verb>` with raw parameters.
    pub fn call(&self, verb: &str, params: Value) -> Result<Value, RemoteError> {
        self.transport.call(&self.method(verb), params)
    }

    /// Fetches matching objects.
    pub fn get(&self, request: &GetRequest) -> Result<Vec<Document>, RemoteError> {
        let method = self.method("get");
        match self.transport.call(&method, request.to_params())? {
            Value::Array(items) => Ok(items.into_iter().map(Document::from).collect()),
            other => Err(RemoteError::UnexpectedResponse {
                method,
                reason: format!("expected an array, got {}", json_kind(&other)),
            }),
        }
    }

    /// Creates one object and returns the ids the server assigned.
    pub fn create(&self, object: &Document) -> Result<Vec<RemoteId>, RemoteError> {
        let response = self.call("create", object.to_json())?;
        self.extract_ids("create", response)
    }

    /// Updates one object; `object` must carry its id field.
    pub fn update(&self, object: &Document) -> Result<Vec<RemoteId>, RemoteError> {
        let response = self.call("update", object.to_json())?;
        self.extract_ids("update", response)
    }

    fn extract_ids(&self, verb: &str, response: Value) -> Result<Vec<RemoteId>, RemoteError> {
        extract_ids(&self.method(verb), &self.ids_key(), response)
    }
}

/// Reads an `{"<key>": ["1", "2"]}` acknowledgement into ids.
pub fn extract_ids(method: &str, key: &str, response: Value) -> Result<Vec<RemoteId>, RemoteError> {
    let unexpected = |reason: String| RemoteError::UnexpectedResponse {
        method: method.to_string(),
        reason,
    };

    let ids = match response.get(key) {
        Some(Value::Array(ids)) => ids,
        _ => return Err(unexpected(format!("missing `{}` array", key))),
    };

    ids.iter()
        .map(|id| match id {
            Value::String(s) => Ok(RemoteId::new(s.clone())),
            Value::Number(n) => Ok(RemoteId::new(n.to_string())),
            other => Err(unexpected(format!("id of type {}", json_kind(other)))),
        })
        .collect()
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
