//! Subcommand implementations.

pub mod ack;
pub mod check_now;
pub mod export;
pub mod import;
pub mod items;
pub mod problems;

use crate::config::ConnectionArgs;
use dashsync_remote::JsonRpcClient;

/// Opens the API client described by the global options.
pub fn connect(connection: &ConnectionArgs) -> Result<JsonRpcClient, Box<dyn std::error::Error>> {
    let options = connection.resolve()?;
    tracing::debug!(server_url = %options.server_url, "connecting");
    Ok(JsonRpcClient::connect(options)?)
}
