//! Problem queries and acknowledgement actions.

use crate::errors::CoreError;
use dashsync_canonical::{Document, RemoteId};
use dashsync_remote::{extract_ids, Collection, GetRequest, Output, RpcTransport};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Action applied to a problem event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProblemAction {
    /// Close the problem.
    Close,
    /// Acknowledge the problem.
    Acknowledge,
    /// Add a message.
    Message,
    /// Change the severity.
    ChangeSeverity,
    /// Withdraw an acknowledgement.
    Unacknowledge,
}

/// Operator name and protocol code of each action.
const ACTION_TABLE: &[(ProblemAction, &str, u32)] = &[
    (ProblemAction::Close, "close", 1),
    (ProblemAction::Acknowledge, "acknowledge", 2),
    (ProblemAction::Message, "message", 4),
    (ProblemAction::ChangeSeverity, "severity", 8),
    (ProblemAction::Unacknowledge, "unacknowledge", 16),
];

impl ProblemAction {
    /// Every action, in protocol order.
    pub fn all() -> impl Iterator<Item = ProblemAction> {
        ACTION_TABLE.iter().map(|(action, _, _)| *action)
    }

    /// Value sent as `action` to `event.acknowledge`.
    pub fn code(self) -> u32 {
        ACTION_TABLE
            .iter()
            .find(|(action, _, _)| *action == self)
            .map(|(_, _, code)| *code)
            .unwrap_or_default()
    }

    /// Operator-facing name.
    pub fn name(self) -> &'static str {
        ACTION_TABLE
            .iter()
            .find(|(action, _, _)| *action == self)
            .map(|(_, name, _)| *name)
            .unwrap_or_default()
    }

    /// Action for a protocol code.
    pub fn from_code(code: u32) -> Option<Self> {
        ACTION_TABLE
            .iter()
            .find(|(_, _, c)| *c == code)
            .map(|(action, _, _)| *action)
    }
}

impl fmt::Display for ProblemAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProblemAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ACTION_TABLE
            .iter()
            .find(|(_, name, _)| *name == s)
            .map(|(action, _, _)| *action)
            .ok_or_else(|| CoreError::InvalidArgument {
                name: "action",
                value: s.to_string(),
            })
    }
}

/// Problem severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// 0
    NotClassified,
    /// 1
    Information,
    /// 2
    Warning,
    /// 3
    Average,
    /// 4
    High,
    /// 5
    Disaster,
}

const SEVERITY_TABLE: &[(Severity, &str, u8)] = &[
    (Severity::NotClassified, "not_classified", 0),
    (Severity::Information, "information", 1),
    (Severity::Warning, "warning", 2),
    (Severity::Average, "average", 3),
    (Severity::High, "high", 4),
    (Severity::Disaster, "disaster", 5),
];

impl Severity {
    /// Protocol value.
    pub fn code(self) -> u8 {
        SEVERITY_TABLE
            .iter()
            .find(|(severity, _, _)| *severity == self)
            .map(|(_, _, code)| *code)
            .unwrap_or_default()
    }

    /// Lowercase name.
    pub fn name(self) -> &'static str {
        SEVERITY_TABLE
            .iter()
            .find(|(severity, _, _)| *severity == self)
            .map(|(_, name, _)| *name)
            .unwrap_or_default()
    }

    /// Severity for a protocol value.
    pub fn from_code(code: u8) -> Option<Self> {
        SEVERITY_TABLE
            .iter()
            .find(|(_, _, c)| *c == code)
            .map(|(severity, _, _)| *severity)
    }

    /// Severities 1 through 5, the default problem filter.
    pub fn classified() -> Vec<Severity> {
        SEVERITY_TABLE
            .iter()
            .map(|(severity, _, _)| *severity)
            .filter(|s| *s != Severity::NotClassified)
            .collect()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Severity {
    type Err = CoreError;

    /// Accepts the numeric code (`0`-`5`) or the lowercase name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let by_code = s.parse::<u8>().ok().and_then(Severity::from_code);
        let by_name = || {
            SEVERITY_TABLE
                .iter()
                .find(|(_, name, _)| *name == s)
                .map(|(severity, _, _)| *severity)
        };
        by_code.or_else(by_name).ok_or_else(|| CoreError::InvalidArgument {
            name: "severity",
            value: s.to_string(),
        })
    }
}

/// One `event.acknowledge` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgement {
    /// Action to apply.
    pub action: ProblemAction,
    /// Message; required for [`ProblemAction::Message`].
    pub message: Option<String>,
    /// New severity; required for [`ProblemAction::ChangeSeverity`].
    pub severity: Option<Severity>,
}

impl Acknowledgement {
    /// Request for `action` with no optional arguments.
    pub fn new(action: ProblemAction) -> Self {
        Self {
            action,
            message: None,
            severity: None,
        }
    }

    /// Adds a message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds a severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// `event.acknowledge` parameters for `event_id`.
    ///
    /// The message is only sent with the `message` action and the severity
    /// only with the `severity` action.
    pub fn to_params(&self, event_id: &RemoteId) -> Result<Value, CoreError> {
        let mut params = Map::new();
        params.insert("eventids".into(), Value::String(event_id.as_str().to_string()));
        params.insert("action".into(), Value::from(self.action.code()));

        match self.action {
            ProblemAction::Message => {
                let message = self.message.as_ref().ok_or(CoreError::MissingArgument {
                    action: "message",
                    argument: "message",
                })?;
                params.insert("message".into(), Value::String(message.clone()));
            }
            ProblemAction::ChangeSeverity => {
                let severity = self.severity.ok_or(CoreError::MissingArgument {
                    action: "severity",
                    argument: "severity",
                })?;
                params.insert("severity".into(), Value::from(severity.code()));
            }
            _ => {}
        }

        Ok(Value::Object(params))
    }
}

/// Applies `request` to one problem event; returns the acknowledged event ids.
pub fn acknowledge<T: RpcTransport + ?Sized>(
    transport: &T,
    event_id: &RemoteId,
    request: &Acknowledgement,
) -> Result<Vec<RemoteId>, CoreError> {
    let params = request.to_params(event_id)?;
    let events = Collection::new(transport, "event");
    let response = events.call("acknowledge", params)?;
    tracing::info!(event_id = %event_id, action = %request.action, "acknowledged problem");
    Ok(extract_ids(&events.method("acknowledge"), "eventids", response)?)
}

/// Filter for [`problems`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemQuery {
    /// Technical host name.
    pub host: String,
    /// Severities to include.
    pub severities: Vec<Severity>,
    /// Only acknowledged (`true`) or unacknowledged (`false`) problems.
    pub acknowledged: Option<bool>,
    /// Only suppressed (`true`) or unsuppressed (`false`) problems.
    pub suppressed: Option<bool>,
}

impl ProblemQuery {
    /// All classified problems of `host`.
    pub fn for_host(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            severities: Severity::classified(),
            acknowledged: None,
            suppressed: None,
        }
    }
}

/// Current problems of a host.
///
/// Resolves the host by exact technical name first. An unknown host yields
/// no problems and `problem.get` is not called.
pub fn problems<T: RpcTransport + ?Sized>(
    transport: &T,
    query: &ProblemQuery,
) -> Result<Vec<Document>, CoreError> {
    let hosts = Collection::new(transport, "host").get(
        &GetRequest::new()
            .filter("host", Value::Array(vec![Value::String(query.host.clone())]))
            .output(Output::Fields(vec!["hostid".into()])),
    )?;
    let hostids: Vec<Value> = hosts
        .iter()
        .filter_map(|h| h.get("hostid"))
        .map(Document::to_json)
        .collect();
    if hostids.is_empty() {
        tracing::debug!(host = %query.host, "host not found");
        return Ok(Vec::new());
    }

    let severities: Vec<Value> = query
        .severities
        .iter()
        .map(|s| Value::from(s.code()))
        .collect();

    let mut request = GetRequest::new()
        .param("hostids", Value::Array(hostids))
        .param("severities", Value::Array(severities));
    if let Some(acknowledged) = query.acknowledged {
        request = request.param("acknowledged", acknowledged);
    }
    if let Some(suppressed) = query.suppressed {
        request = request.param("suppressed", suppressed);
    }

    Ok(Collection::new(transport, "problem").get(&request)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_table_round_trips_codes() {
        for action in ProblemAction::all() {
            assert_eq!(ProblemAction::from_code(action.code()), Some(action));
            assert_eq!(action.name().parse::<ProblemAction>().unwrap(), action);
        }
    }

    #[test]
    fn action_codes_match_protocol() {
        assert_eq!(ProblemAction::Close.code(), 1);
        assert_eq!(ProblemAction::Acknowledge.code(), 2);
        assert_eq!(ProblemAction::Message.code(), 4);
        assert_eq!(ProblemAction::ChangeSeverity.code(), 8);
        assert_eq!(ProblemAction::Unacknowledge.code(), 16);
        assert_eq!(ProblemAction::from_code(3), None);
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(matches!(
            "delete".parse::<ProblemAction>(),
            Err(CoreError::InvalidArgument { name: "action", .. })
        ));
    }

    #[test]
    fn severity_parses_codes_and_names() {
        assert_eq!("4".parse::<Severity>().unwrap(), Severity::High);
        assert_eq!("disaster".parse::<Severity>().unwrap(), Severity::Disaster);
        assert!("6".parse::<Severity>().is_err());
    }

    #[test]
    fn default_query_covers_classified_severities() {
        let query = ProblemQuery::for_host("web01");
        let codes: Vec<u8> = query.severities.iter().map(|s| s.code()).collect();
        assert_eq!(codes, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn message_action_requires_message() {
        let err = Acknowledgement::new(ProblemAction::Message)
            .to_params(&RemoteId::new("10".into()))
            .unwrap_err();
        assert!(matches!(err, CoreError::MissingArgument { argument: "message", .. }));
    }

    #[test]
    fn severity_only_sent_with_severity_action() {
        let params = Acknowledgement::new(ProblemAction::Close)
            .with_severity(Severity::High)
            .to_params(&RemoteId::new("10".into()))
            .unwrap();
        assert!(params.get("severity").is_none());
        assert_eq!(params["action"], 1);
    }
}
