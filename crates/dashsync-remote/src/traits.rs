//! Transport trait.

use crate::error::RemoteError;
use serde_json::Value;

/// Blocking request/response access to the remote object API.
///
/// Every call is one round trip. Implementations do not retry; timeout and
/// retry policy belong to the transport itself.
pub trait RpcTransport {
    /// Invokes `method` (e.g. `dashboard.get`) with `params` and returns the
    /// `result` member of the response.
    fn call(&self, method: &str, params: Value) -> Result<Value, RemoteError>;
}

impl<T: RpcTransport + ?Sized> RpcTransport for &T {
    fn call(&self, method: &str, params: Value) -> Result<Value, RemoteError> {
        (**self).call(method, params)
    }
}

impl<T: RpcTransport + ?Sized> RpcTransport for Box<T> {
    fn call(&self, method: &str, params: Value) -> Result<Value, RemoteError> {
        (**self).call(method, params)
    }
}
