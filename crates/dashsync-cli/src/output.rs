//! Output formatting utilities.

use dashsync_canonical::{fingerprint, Document, RemoteId};
use dashsync_core::Outcome;
use serde_json::{Map, Value};

/// Formats a report as pretty JSON.
pub fn format_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// `{"changed": ..., "outcome": ..., "diff"?: ..., "fingerprints"?: ...}` for an import.
///
/// Dry runs also carry the content fingerprints of both sides.
pub fn outcome_report(outcome: &Outcome) -> Value {
    let mut report = Map::new();
    report.insert("changed".into(), Value::Bool(outcome.changed()));
    if let Ok(Value::Object(fields)) = serde_json::to_value(outcome) {
        report.extend(fields);
    }
    if let Some(diff) = outcome.diff() {
        let mut fingerprints = Map::new();
        fingerprints.insert("before".into(), digest_value(&diff.before));
        fingerprints.insert("after".into(), digest_value(&diff.after));
        report.insert("fingerprints".into(), Value::Object(fingerprints));
    }
    Value::Object(report)
}

fn digest_value(document: &Document) -> Value {
    fingerprint(document)
        .map(|digest| Value::String(digest.to_string()))
        .unwrap_or(Value::Null)
}

/// `{"changed": ..., "<key>": [ids]}` for a mutating auxiliary command.
pub fn ids_report(key: &str, ids: &[RemoteId]) -> Value {
    let mut report = Map::new();
    report.insert("changed".into(), Value::Bool(!ids.is_empty()));
    report.insert(
        key.into(),
        Value::Array(ids.iter().map(|id| Value::String(id.to_string())).collect()),
    );
    Value::Object(report)
}

/// JSON array of fetched documents.
pub fn documents(found: &[Document]) -> Value {
    Value::Array(found.iter().map(Document::to_json).collect())
}
