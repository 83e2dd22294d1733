//! Item listing and immediate ("check now") polling.

use crate::errors::CoreError;
use dashsync_canonical::{Document, RemoteId};
use dashsync_remote::{extract_ids, Collection, GetRequest, Output, RpcTransport};
use serde_json::{json, Value};

/// Task type the server uses for an immediate item check.
pub const CHECK_NOW_TASK_TYPE: u32 = 6;

/// Filter for [`items`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemQuery {
    /// Technical host name; all hosts when unset.
    pub host: Option<String>,
    /// Only items of monitored hosts.
    pub monitored: Option<bool>,
    /// Only items used in triggers.
    pub with_triggers: Option<bool>,
    /// Fields to return; every field when empty.
    pub keys: Vec<String>,
}

impl ItemQuery {
    /// `item.get` parameters. Unset flags are omitted.
    pub fn to_request(&self) -> GetRequest {
        let output = if self.keys.is_empty() {
            Output::Extend
        } else {
            Output::Fields(self.keys.clone())
        };
        let mut request = GetRequest::new().output(output);
        if let Some(host) = &self.host {
            request = request.param("host", host.as_str());
        }
        if let Some(monitored) = self.monitored {
            request = request.param("monitored", monitored);
        }
        if let Some(with_triggers) = self.with_triggers {
            request = request.param("with_triggers", with_triggers);
        }
        request
    }
}

/// Items matching `query`.
pub fn items<T: RpcTransport + ?Sized>(
    transport: &T,
    query: &ItemQuery,
) -> Result<Vec<Document>, CoreError> {
    let found = Collection::new(transport, "item").get(&query.to_request())?;
    tracing::debug!(count = found.len(), "listed items");
    Ok(found)
}

/// Result of [`check_now`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckNow {
    /// Ids of the queued tasks.
    pub task_ids: Vec<RemoteId>,
}

impl CheckNow {
    /// True iff at least one task was queued.
    pub fn changed(&self) -> bool {
        !self.task_ids.is_empty()
    }
}

/// Queues an immediate check for every item in `item_ids`.
///
/// An empty list makes no call.
pub fn check_now<T: RpcTransport + ?Sized>(
    transport: &T,
    item_ids: &[RemoteId],
) -> Result<CheckNow, CoreError> {
    if item_ids.is_empty() {
        return Ok(CheckNow { task_ids: Vec::new() });
    }

    let tasks: Vec<Value> = item_ids
        .iter()
        .map(|id| json!({"type": CHECK_NOW_TASK_TYPE, "request": {"itemid": id.as_str()}}))
        .collect();

    let collection = Collection::new(transport, "task");
    let response = collection.call("create", Value::Array(tasks))?;
    let task_ids = extract_ids(&collection.method("create"), "taskids", response)?;
    tracing::info!(items = item_ids.len(), tasks = task_ids.len(), "queued check-now tasks");
    Ok(CheckNow { task_ids })
}
