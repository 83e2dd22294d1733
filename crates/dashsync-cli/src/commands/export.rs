//! Export command implementation.

use super::connect;
use crate::config::ConnectionArgs;
use dashsync_canonical::ResourceName;
use dashsync_core::{ExportFormat, Exporter};

pub fn run(
    connection: &ConnectionArgs,
    name: String,
    format: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let format: ExportFormat = format.parse()?;
    let name = ResourceName::parse(name).map_err(|e| format!("Invalid name: {}", e))?;

    let client = connect(connection)?;
    let text = Exporter::dashboards(&client).export_as(&name, format)?;

    println!("{}", text.trim_end());
    Ok(())
}
