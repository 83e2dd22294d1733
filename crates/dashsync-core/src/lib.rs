//! Reconciliation engine for named dashboards.
//!
//! This crate provides:
//! - `ResourceStore`: name lookup, existence check, and canonical fetch
//! - `Reconciler`: drives a named resource to a desired canonical document
//! - `Exporter`: reads a named resource back in canonical form
//! - Problem, item, and check-now helpers sharing the same transport
//!
//! Engine invariants:
//! - A resource already matching its desired content receives no mutating call
//! - A created resource costs one mutating call, a replaced one exactly two
//! - Dry runs never mutate and report the before/after documents instead
//! - Remote failures are returned as-is; nothing is retried or rolled back
//!
#![deny(missing_docs)]

/// Error types for engine operations.
pub mod errors;
/// Canonical export and text rendering.
pub mod export;
/// Item queries and check-now tasks.
pub mod items;
/// Problem queries and acknowledgement actions.
pub mod problems;
/// Create-or-replace reconciliation.
pub mod reconcile;
/// Lookup and canonical fetch.
pub mod store;

pub use errors::CoreError;
pub use export::{render, ExportFormat, Exporter};
pub use items::{check_now, items, CheckNow, ItemQuery, CHECK_NOW_TASK_TYPE};
pub use problems::{
    acknowledge, problems, Acknowledgement, ProblemAction, ProblemQuery, Severity,
};
pub use reconcile::{Observation, Outcome, Reconciler, ResourceState};
pub use store::{ResourceKind, ResourceStore};
