//! In-memory stand-in for the remote API.
//!
//! Implements enough of the `dashboard`, `host`, `problem`, `item`, `event`,
//! and `task` collections to drive the engine without a server. Every call
//! is recorded, and a mutating call can be made to fail on demand.

use crate::error::RemoteError;
use crate::traits::RpcTransport;
use serde_json::{json, Map, Value};
use std::cell::RefCell;

const INVALID_PARAMS: i64 = -32602;
const METHOD_NOT_FOUND: i64 = -32601;

/// Related collections a dashboard `get` can select.
const RELATED: &[(&str, &str)] = &[
    ("selectPages", "pages"),
    ("selectUsers", "users"),
    ("selectUserGroups", "userGroups"),
];

/// One call as received by the in-memory server.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Method name, e.g. `dashboard.update`.
    pub method: String,
    /// Parameters exactly as sent.
    pub params: Value,
}

impl RecordedCall {
    /// True for calls that change server state.
    pub fn is_mutating(&self) -> bool {
        is_mutating(&self.method)
    }
}

fn is_mutating(method: &str) -> bool {
    matches!(
        method.rsplit('.').next(),
        Some("create" | "update" | "delete" | "acknowledge")
    )
}

#[derive(Debug, Default)]
struct State {
    dashboards: Vec<Map<String, Value>>,
    hosts: Vec<Value>,
    problems: Vec<Value>,
    items: Vec<Value>,
    next_id: u64,
    calls: Vec<RecordedCall>,
    mutations: usize,
    fail_on_mutation: Option<usize>,
}

impl State {
    fn next_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }

    /// Assigns page and widget ids, keeping any the caller supplied.
    fn assign_page_ids(&mut self, pages: &mut Value) {
        let Some(pages) = pages.as_array_mut() else {
            return;
        };
        for page in pages {
            let Some(page) = page.as_object_mut() else {
                continue;
            };
            if !page.contains_key("dashboard_pageid") {
                let id = self.next_id();
                page.insert("dashboard_pageid".into(), Value::String(id));
            }
            if let Some(widgets) = page.get_mut("widgets").and_then(Value::as_array_mut) {
                for widget in widgets.iter_mut().filter_map(Value::as_object_mut) {
                    if !widget.contains_key("widgetid") {
                        let id = self.next_id();
                        widget.insert("widgetid".into(), Value::String(id));
                    }
                }
            }
        }
    }

    fn store_dashboard(&mut self, mut object: Map<String, Value>) -> String {
        let id = self.next_id();
        object.insert("dashboardid".into(), Value::String(id.clone()));
        object.insert("uuid".into(), Value::String(format!("{:032x}", self.next_id)));
        if let Some(pages) = object.get_mut("pages") {
            let mut pages = pages.take();
            self.assign_page_ids(&mut pages);
            object.insert("pages".into(), pages);
        }
        // Keep the id fields first, the way the server returns them.
        let mut ordered = Map::new();
        for key in ["dashboardid", "uuid"] {
            if let Some(value) = object.remove(key) {
                ordered.insert(key.into(), value);
            }
        }
        ordered.extend(object);
        self.dashboards.push(ordered);
        id
    }
}

/// In-memory remote API backend.
#[derive(Debug, Default)]
pub struct InMemoryServer {
    state: RefCell<State>,
}

impl InMemoryServer {
    /// Creates an empty server.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a dashboard without recording a call; returns its id.
    ///
    /// `object` must be a JSON object. Ids are assigned to the dashboard and
    /// to every page and widget that lacks one.
    pub fn seed_dashboard(&self, object: Value) -> String {
        let object = match object {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.state.borrow_mut().store_dashboard(object)
    }

    /// Adds a monitored host.
    pub fn seed_host(&self, hostid: &str, host: &str) {
        self.state
            .borrow_mut()
            .hosts
            .push(json!({"hostid": hostid, "host": host}));
    }

    /// Adds a problem; it should carry `hostid`, `eventid`, `severity`,
    /// `acknowledged`, and `suppressed`.
    pub fn seed_problem(&self, problem: Value) {
        self.state.borrow_mut().problems.push(problem);
    }

    /// Adds an item; it should carry `itemid` and `host`.
    pub fn seed_item(&self, item: Value) {
        self.state.borrow_mut().items.push(item);
    }

    /// Makes the `n`-th (1-based) mutating call from now fail.
    pub fn fail_on_mutation(&self, n: usize) {
        let mut state = self.state.borrow_mut();
        let target = state.mutations + n;
        state.fail_on_mutation = Some(target);
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.borrow().calls.clone()
    }

    /// Mutating calls received so far, in order.
    pub fn mutating_calls(&self) -> Vec<RecordedCall> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| call.is_mutating())
            .cloned()
            .collect()
    }

    /// Forgets recorded calls; stored objects are kept.
    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Stored dashboard, ids included.
    pub fn dashboard(&self, id: &str) -> Option<Value> {
        self.state
            .borrow()
            .dashboards
            .iter()
            .find(|d| d.get("dashboardid").and_then(Value::as_str) == Some(id))
            .map(|d| Value::Object(d.clone()))
    }

    /// Number of stored dashboards.
    pub fn dashboard_count(&self) -> usize {
        self.state.borrow().dashboards.len()
    }

    fn dispatch(&self, method: &str, params: &Value) -> Result<Value, RemoteError> {
        match method {
            "apiinfo.version" => Ok(json!("7.0.0")),
            "dashboard.get" => Ok(self.dashboard_get(params)),
            "dashboard.create" => self.dashboard_create(params),
            "dashboard.update" => self.dashboard_update(params),
            "host.get" => Ok(self.host_get(params)),
            "problem.get" => Ok(self.problem_get(params)),
            "item.get" => Ok(self.item_get(params)),
            "event.acknowledge" => Ok(event_acknowledge(params)),
            "task.create" => self.task_create(params),
            _ => Err(RemoteError::Api {
                code: METHOD_NOT_FOUND,
                message: "Method not found.".into(),
                data: format!("Incorrect API \"{}\".", method),
            }),
        }
    }

    fn dashboard_get(&self, params: &Value) -> Value {
        let state = self.state.borrow();
        let name_filter = string_list(params.pointer("/filter/name"));
        let id_filter = string_list(params.get("dashboardids"));

        let matches = state.dashboards.iter().filter(|dashboard| {
            let name = dashboard.get("name").and_then(Value::as_str).unwrap_or("");
            let id = dashboard.get("dashboardid").and_then(Value::as_str).unwrap_or("");
            name_filter.as_ref().map_or(true, |names| names.iter().any(|n| n == name))
                && id_filter.as_ref().map_or(true, |ids| ids.iter().any(|i| i == id))
        });

        let results = matches
            .map(|dashboard| {
                let mut out = Map::new();
                for (key, value) in dashboard {
                    let related = RELATED.iter().find(|(_, field)| *field == key.as_str());
                    let wanted = match related {
                        Some((select, _)) => params.get(*select).is_some(),
                        None => output_includes(params.get("output"), key),
                    };
                    if wanted {
                        out.insert(key.clone(), value.clone());
                    }
                }
                Value::Object(out)
            })
            .collect();
        Value::Array(results)
    }

    fn dashboard_create(&self, params: &Value) -> Result<Value, RemoteError> {
        let object = params.as_object().cloned().ok_or_else(|| invalid("expected an object"))?;
        if !object.get("name").map_or(false, Value::is_string) {
            return Err(invalid("Invalid parameter \"/1\": the parameter \"name\" is missing."));
        }
        if object.contains_key("dashboardid") {
            return Err(invalid("Invalid parameter \"/1\": unexpected parameter \"dashboardid\"."));
        }
        let id = self.state.borrow_mut().store_dashboard(object);
        Ok(json!({"dashboardids": [id]}))
    }

    fn dashboard_update(&self, params: &Value) -> Result<Value, RemoteError> {
        let object = params.as_object().ok_or_else(|| invalid("expected an object"))?;
        let id = object
            .get("dashboardid")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("Invalid parameter \"/1\": the parameter \"dashboardid\" is missing."))?
            .to_string();

        let mut state = self.state.borrow_mut();
        let position = state
            .dashboards
            .iter()
            .position(|d| d.get("dashboardid").and_then(Value::as_str) == Some(id.as_str()))
            .ok_or_else(|| invalid("No permissions to referred object or it does not exist!"))?;

        for (key, value) in object {
            if key == "dashboardid" {
                continue;
            }
            let mut value = value.clone();
            if key == "pages" {
                // Pages are replaced wholesale; unlisted pages are dropped.
                if value.as_array().map_or(true, Vec::is_empty) {
                    return Err(invalid("Invalid parameter \"/1/pages\": cannot be empty."));
                }
                state.assign_page_ids(&mut value);
            }
            state.dashboards[position].insert(key.clone(), value);
        }

        Ok(json!({"dashboardids": [id]}))
    }

    fn host_get(&self, params: &Value) -> Value {
        let state = self.state.borrow();
        let hosts = string_list(params.pointer("/filter/host"));
        let results = state
            .hosts
            .iter()
            .filter(|h| {
                let host = h.get("host").and_then(Value::as_str).unwrap_or("");
                hosts.as_ref().map_or(true, |names| names.iter().any(|n| n == host))
            })
            .map(|h| project(h, params.get("output")))
            .collect();
        Value::Array(results)
    }

    fn problem_get(&self, params: &Value) -> Value {
        let state = self.state.borrow();
        let hostids = string_list(params.get("hostids"));
        let severities = string_list(params.get("severities"));
        let acknowledged = params.get("acknowledged").and_then(Value::as_bool);
        let suppressed = params.get("suppressed").and_then(Value::as_bool);

        let results = state
            .problems
            .iter()
            .filter(|p| {
                field_in(p, "hostid", &hostids)
                    && field_in(p, "severity", &severities)
                    && flag_matches(p, "acknowledged", acknowledged)
                    && flag_matches(p, "suppressed", suppressed)
            })
            .cloned()
            .collect();
        Value::Array(results)
    }

    fn item_get(&self, params: &Value) -> Value {
        let state = self.state.borrow();
        let host = params.get("host").and_then(Value::as_str).filter(|h| !h.is_empty());
        let monitored = params.get("monitored").and_then(Value::as_bool);
        let with_triggers = params.get("with_triggers").and_then(Value::as_bool);

        let results = state
            .items
            .iter()
            .filter(|item| {
                host.map_or(true, |h| item.get("host").and_then(Value::as_str) == Some(h))
                    && (monitored != Some(true) || flag_matches(item, "monitored", Some(true)))
                    && (with_triggers != Some(true)
                        || flag_matches(item, "with_triggers", Some(true)))
            })
            .map(|item| project(item, params.get("output")))
            .collect();
        Value::Array(results)
    }

    fn task_create(&self, params: &Value) -> Result<Value, RemoteError> {
        let requests = params.as_array().ok_or_else(|| invalid("expected an array of tasks"))?;
        let mut state = self.state.borrow_mut();
        let ids: Vec<Value> = requests
            .iter()
            .map(|_| Value::String(state.next_id()))
            .collect();
        Ok(json!({"taskids": ids}))
    }
}

impl RpcTransport for InMemoryServer {
    fn call(&self, method: &str, params: Value) -> Result<Value, RemoteError> {
        {
            let mut state = self.state.borrow_mut();
            state.calls.push(RecordedCall {
                method: method.to_string(),
                params: params.clone(),
            });
            if is_mutating(method) {
                state.mutations += 1;
                if state.fail_on_mutation == Some(state.mutations) {
                    return Err(RemoteError::Injected {
                        method: method.to_string(),
                    });
                }
            }
        }
        self.dispatch(method, &params)
    }
}

fn event_acknowledge(params: &Value) -> Value {
    let ids = match params.get("eventids") {
        Some(Value::Array(ids)) => ids.clone(),
        Some(id) => vec![id.clone()],
        None => vec![],
    };
    json!({"eventids": ids})
}

fn invalid(data: &str) -> RemoteError {
    RemoteError::Api {
        code: INVALID_PARAMS,
        message: "Invalid params.".into(),
        data: data.into(),
    }
}

/// Reads a string or list of scalars as strings; `None` when absent.
fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    match value? {
        Value::Array(items) => Some(items.iter().map(scalar_string).collect()),
        Value::Null => None,
        other => Some(vec![scalar_string(other)]),
    }
}

fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn field_in(object: &Value, field: &str, allowed: &Option<Vec<String>>) -> bool {
    match allowed {
        None => true,
        Some(allowed) => object
            .get(field)
            .map(scalar_string)
            .map_or(false, |v| allowed.contains(&v)),
    }
}

/// Compares a `"0"`/`"1"`/bool field against an optional expected flag.
fn flag_matches(object: &Value, field: &str, expected: Option<bool>) -> bool {
    let Some(expected) = expected else {
        return true;
    };
    let actual = match object.get(field) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s == "1",
        Some(Value::Number(n)) => n.as_u64() == Some(1),
        _ => false,
    };
    actual == expected
}

fn output_includes(output: Option<&Value>, key: &str) -> bool {
    match output {
        Some(Value::Array(fields)) => fields.iter().any(|f| f.as_str() == Some(key)),
        _ => true,
    }
}

fn project(object: &Value, output: Option<&Value>) -> Value {
    match object {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| output_includes(output, key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_mutating_methods() {
        assert!(is_mutating("dashboard.create"));
        assert!(is_mutating("dashboard.update"));
        assert!(is_mutating("event.acknowledge"));
        assert!(!is_mutating("dashboard.get"));
        assert!(!is_mutating("host.get"));
    }

    #[test]
    fn seeded_dashboard_gets_ids() {
        let server = InMemoryServer::new();
        let id = server.seed_dashboard(json!({
            "name": "Ops",
            "pages": [{"widgets": [{"type": "clock"}]}]
        }));
        let stored = server.dashboard(&id).unwrap();
        assert_eq!(stored["dashboardid"], json!(id));
        assert!(stored["uuid"].is_string());
        assert!(stored["pages"][0]["dashboard_pageid"].is_string());
        assert!(stored["pages"][0]["widgets"][0]["widgetid"].is_string());
        assert!(server.calls().is_empty());
    }

    #[test]
    fn get_honours_output_fields() {
        let server = InMemoryServer::new();
        let id = server.seed_dashboard(json!({"name": "Ops", "pages": [{}]}));
        let result = server
            .call(
                "dashboard.get",
                json!({"filter": {"name": "Ops"}, "output": ["dashboardid"]}),
            )
            .unwrap();
        assert_eq!(result, json!([{"dashboardid": id}]));
    }

    #[test]
    fn pages_only_returned_when_selected() {
        let server = InMemoryServer::new();
        let id = server.seed_dashboard(json!({"name": "Ops", "pages": [{}]}));
        let plain = server
            .call("dashboard.get", json!({"dashboardids": [id], "output": "extend"}))
            .unwrap();
        assert!(plain[0].get("pages").is_none());

        let full = server
            .call(
                "dashboard.get",
                json!({"dashboardids": [id], "output": "extend", "selectPages": "extend"}),
            )
            .unwrap();
        assert!(full[0]["pages"].is_array());
    }

    #[test]
    fn injected_failure_is_recorded() {
        let server = InMemoryServer::new();
        server.fail_on_mutation(1);
        let err = server
            .call("dashboard.create", json!({"name": "Ops", "pages": [{}]}))
            .unwrap_err();
        assert!(matches!(err, RemoteError::Injected { .. }));
        assert_eq!(server.mutating_calls().len(), 1);
        assert_eq!(server.dashboard_count(), 0);
    }

    #[test]
    fn unknown_method_is_rejected() {
        let server = InMemoryServer::new();
        let err = server.call("screen.get", json!({})).unwrap_err();
        assert!(matches!(err, RemoteError::Api { code: METHOD_NOT_FOUND, .. }));
    }
}
