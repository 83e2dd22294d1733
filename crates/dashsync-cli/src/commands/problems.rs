//! Problems command implementation.

use super::connect;
use crate::config::ConnectionArgs;
use crate::output;
use dashsync_core::{ProblemQuery, Severity};

pub fn run(
    connection: &ConnectionArgs,
    host: String,
    severities: Vec<String>,
    acknowledged: Option<bool>,
    suppressed: Option<bool>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut query = ProblemQuery::for_host(host);
    if !severities.is_empty() {
        query.severities = severities
            .iter()
            .map(|s| s.parse::<Severity>())
            .collect::<Result<_, _>>()?;
    }
    query.acknowledged = acknowledged;
    query.suppressed = suppressed;

    let client = connect(connection)?;
    let found = dashsync_core::problems(&client, &query)?;

    println!("{}", output::format_json(&output::documents(&found)));
    Ok(())
}
