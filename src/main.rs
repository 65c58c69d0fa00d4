//! Ticket viewer binary entry point.
//!
//! Loads configuration, sets up logging to stderr, and runs the interactive
//! viewer on stdin/stdout. Ctrl+C exits immediately and silently.

use std::io::{self, BufReader};

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use ticket_viewer::{app, config, prompt::Prompter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore errors if not found)
    dotenvy::dotenv().ok();

    // stdout carries the menus and tables, so logs go to stderr
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ticket_viewer=warn")),
        )
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();

    tracing::debug!("Starting ticket viewer v{}", env!("CARGO_PKG_VERSION"));

    let config = config::Config::from_env().context("Failed to load configuration")?;

    tracing::debug!(?config, "Configuration loaded");

    let prompter = Prompter::new(BufReader::new(io::stdin()), io::stdout());

    let session = app::spawn_session(config, prompter);

    match app::supervise(session, tokio::signal::ctrl_c()).await {
        Some(result) => {
            result
                .context("Viewer task failed")?
                .context("Viewer stopped on a terminal error")?;
        }
        None => {
            tracing::debug!("Interrupted");
            std::process::exit(0);
        }
    }

    Ok(())
}
