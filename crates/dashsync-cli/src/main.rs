//! dashsync - declarative dashboard reconciliation CLI.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{ack, check_now, export, import, items, problems};
use config::ConnectionArgs;

#[derive(Parser)]
#[command(name = "dashsync")]
#[command(about = "Converge named dashboards onto declarative definitions")]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or replace a dashboard from a YAML or JSON definition
    Import {
        /// Dashboard name
        #[arg(long)]
        name: String,
        /// Definition file, or `-` for stdin
        #[arg(long)]
        content: String,
        /// Report the change without applying it
        #[arg(long)]
        check: bool,
    },
    /// Print a dashboard in canonical form
    Export {
        /// Dashboard name
        #[arg(long)]
        name: String,
        /// Output format (json or yaml)
        #[arg(long, default_value = "json")]
        format: String,
    },
    /// List current problems of a host
    Problems {
        /// Technical host name
        #[arg(long)]
        host: String,
        /// Severity to include, by number or name (repeatable; default 1-5)
        #[arg(long = "severity")]
        severities: Vec<String>,
        /// Only acknowledged (true) or unacknowledged (false) problems
        #[arg(long)]
        acknowledged: Option<bool>,
        /// Only suppressed (true) or unsuppressed (false) problems
        #[arg(long)]
        suppressed: Option<bool>,
    },
    /// Close, acknowledge, or annotate a problem event
    Ack {
        /// Problem event id
        #[arg(long)]
        event_id: String,
        /// close, acknowledge, message, severity, or unacknowledge
        #[arg(long)]
        action: String,
        /// Message for the `message` action
        #[arg(long)]
        message: Option<String>,
        /// New severity for the `severity` action
        #[arg(long)]
        severity: Option<String>,
    },
    /// List items
    Items {
        /// Technical host name
        #[arg(long)]
        host: Option<String>,
        /// Only items of monitored hosts
        #[arg(long)]
        monitored: Option<bool>,
        /// Only items used in triggers
        #[arg(long)]
        with_triggers: Option<bool>,
        /// Field to return (repeatable; default all)
        #[arg(long = "key")]
        keys: Vec<String>,
    },
    /// Queue an immediate check of items
    CheckNow {
        /// Item id (repeatable)
        #[arg(long = "item", required = true)]
        items: Vec<String>,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "dashsync=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let connection = &cli.connection;
    let result = match cli.command {
        Commands::Import {
            name,
            content,
            check,
        } => import::run(connection, name, content, check),
        Commands::Export { name, format } => export::run(connection, name, format),
        Commands::Problems {
            host,
            severities,
            acknowledged,
            suppressed,
        } => problems::run(connection, host, severities, acknowledged, suppressed),
        Commands::Ack {
            event_id,
            action,
            message,
            severity,
        } => ack::run(connection, event_id, action, message, severity),
        Commands::Items {
            host,
            monitored,
            with_triggers,
            keys,
        } => items::run(connection, host, monitored, with_triggers, keys),
        Commands::CheckNow { items } => check_now::run(connection, items),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
