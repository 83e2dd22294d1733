//! Check-now command implementation.

use super::connect;
use crate::config::ConnectionArgs;
use crate::output;
use dashsync_canonical::RemoteId;

pub fn run(connection: &ConnectionArgs, items: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let item_ids = items
        .into_iter()
        .map(RemoteId::parse)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("Invalid item ID: {}", e))?;

    let client = connect(connection)?;
    let result = dashsync_core::check_now(&client, &item_ids)?;

    println!("{}", output::format_json(&output::ids_report("taskids", &result.task_ids)));
    Ok(())
}
