use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use coursefs::cli::commands::{inspect::InspectCommand, list::ListCommand, CommandHandler};
use coursefs::cli::{Cli, Commands, LogLevel};
use coursefs::CatalogConfig;

/// Initialize tracing from the --log-level flag
///
/// RUST_LOG, when set, takes precedence. Logs always go to stderr because
/// stdout carries the encoded block.
fn initialize_tracing(log_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_tracing(cli.log_level);

    let config =
        CatalogConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let command: Box<dyn CommandHandler + Send + Sync> = match cli.command {
        Commands::List {
            selectors,
            detail,
            output,
            base_url,
            max_in_flight,
        } => Box::new(
            ListCommand::new(selectors, detail, output, base_url, max_in_flight, config)
                .context("Invalid list request")?,
        ),
        Commands::Inspect { file, json } => Box::new(InspectCommand::new(
            file,
            json,
            Duration::from_secs(config.stale_after_seconds),
        )),
    };

    command
        .execute()
        .await
        .with_context(|| format!("coursefs {} failed", command.name()))
}
