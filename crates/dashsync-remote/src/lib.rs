//! Remote object-mutation API used by the reconciliation engine.
//!
//! This crate provides:
//! - `RpcTransport`, a blocking one-round-trip `call(method, params)` seam
//! - `Collection`, typed `get` / `create` / `update` over a named collection
//! - `JsonRpcClient`, the HTTP JSON-RPC 2.0 implementation
//! - `InMemoryServer`, a recording backend for tests and fixtures
//!
//! Nothing here retries. A failed call is surfaced as a [`RemoteError`] and
//! the caller decides what to abort.

#![deny(missing_docs)]

/// Named collection wrapper and request builder.
pub mod collection;
/// Error types for remote calls.
pub mod error;
/// HTTP JSON-RPC client.
pub mod jsonrpc;
/// In-memory backend.
pub mod memory;
/// Transport trait.
pub mod traits;

pub use collection::{extract_ids, Collection, GetRequest, Output};
pub use error::RemoteError;
pub use jsonrpc::{ClientOptions, Credentials, JsonRpcClient};
pub use memory::{InMemoryServer, RecordedCall};
pub use traits::RpcTransport;
