//! Items command implementation.

use super::connect;
use crate::config::ConnectionArgs;
use crate::output;
use dashsync_core::ItemQuery;

pub fn run(
    connection: &ConnectionArgs,
    host: Option<String>,
    monitored: Option<bool>,
    with_triggers: Option<bool>,
    keys: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let query = ItemQuery {
        host,
        monitored,
        with_triggers,
        keys,
    };

    let client = connect(connection)?;
    let found = dashsync_core::items(&client, &query)?;

    println!("{}", output::format_json(&output::documents(&found)));
    Ok(())
}
