//! Ack command implementation.

use super::connect;
use crate::config::ConnectionArgs;
use crate::output;
use dashsync_canonical::RemoteId;
use dashsync_core::{acknowledge, Acknowledgement, ProblemAction, Severity};

pub fn run(
    connection: &ConnectionArgs,
    event_id: String,
    action: String,
    message: Option<String>,
    severity: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let event_id = RemoteId::parse(event_id).map_err(|e| format!("Invalid event ID: {}", e))?;
    let mut request = Acknowledgement::new(action.parse::<ProblemAction>()?);
    request.message = message;
    request.severity = severity.map(|s| s.parse::<Severity>()).transpose()?;

    // Argument checks run before any connection is made.
    request.to_params(&event_id)?;

    let client = connect(connection)?;
    let ids = acknowledge(&client, &event_id, &request)?;

    println!("{}", output::format_json(&output::ids_report("eventids", &ids)));
    Ok(())
}
