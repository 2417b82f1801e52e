//! netbill CLI - Command-line administration for a netbill server.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use netbill_console::{AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// netbill - Billing administration console
#[derive(Parser, Debug)]
#[command(name = "netbill")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Server URL (overrides the config file)
    #[arg(short, long, global = true)]
    server: Option<String>,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in and store the session token
    Login {
        /// Operator login
        username: String,
        /// Password (read from stdin if omitted; typed input is echoed)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show session status
    Status,

    /// Resolve a path through the route guard
    Open {
        /// Path such as /users or /account
        path: String,
    },

    /// List records of a resource
    List {
        /// Resource name (users, tariffs, equipment, contracts, connections, clients)
        resource: String,
    },

    /// Create a record from a JSON object
    Create {
        /// Resource name
        resource: String,
        /// Record fields as JSON
        json: String,
    },

    /// Update a record from a JSON object
    Update {
        /// Resource name
        resource: String,
        /// Record ID
        id: String,
        /// Record fields as JSON
        json: String,
    },

    /// Delete a record
    Delete {
        /// Resource name
        resource: String,
        /// Record ID
        id: String,
    },

    /// Show or change the stored configuration
    Config {
        /// Persist a new server URL
        #[arg(long = "set-server")]
        set_server: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("netbill={log_level},netbill_console={log_level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.clone().or_else(Config::default_path);
    let mut config = match &config_path {
        Some(path) => Config::load_from(path),
        None => Config::default(),
    };

    let stored = config.clone();
    if let Some(server) = cli.server {
        config.server_url = server;
    }

    let state = AppState::new(config).context("failed to initialize client")?;

    let result = match cli.command {
        Commands::Login { username, password } => {
            commands::login(&state, &username, password).await
        }
        Commands::Logout => commands::logout(&state),
        Commands::Status => commands::status(&state).await,
        Commands::Open { path } => commands::open(&state, &path),
        Commands::List { resource } => commands::list(&state, &resource).await,
        Commands::Create { resource, json } => commands::create(&state, &resource, &json).await,
        Commands::Update { resource, id, json } => {
            commands::update(&state, &resource, &id, &json).await
        }
        Commands::Delete { resource, id } => commands::delete(&state, &resource, &id).await,
        Commands::Config { set_server } => {
            commands::config(stored, config_path.as_deref(), set_server.as_deref())
        }
    };

    commands::print_notifications(&state);
    result.map_err(Into::into)
}
