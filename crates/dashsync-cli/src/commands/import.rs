//! Import command implementation.

use super::connect;
use crate::config::ConnectionArgs;
use crate::output;
use dashsync_canonical::{Document, ResourceName};
use dashsync_core::Reconciler;
use std::io::{self, Read};

pub fn run(
    connection: &ConnectionArgs,
    name: String,
    content: String,
    check: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let name = ResourceName::parse(name).map_err(|e| format!("Invalid name: {}", e))?;

    let text = if content == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(&content)
            .map_err(|e| format!("Failed to read file {}: {}", content, e))?
    };
    let desired = parse_definition(&text)?;

    let client = connect(connection)?;
    let outcome = Reconciler::dashboards(&client).reconcile(&name, &desired, check)?;

    println!("{}", output::format_json(&output::outcome_report(&outcome)));
    Ok(())
}

/// Parses a JSON or YAML definition.
pub fn parse_definition(text: &str) -> Result<Document, String> {
    if let Ok(document) = serde_json::from_str::<Document>(text) {
        return Ok(document);
    }
    serde_yaml::from_str::<Document>(text).map_err(|e| format!("Invalid content: {}", e))
}
