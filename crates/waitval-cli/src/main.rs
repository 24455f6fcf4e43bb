//! waitval - block until a database query returns an expected value
//!
//! Usage:
//!   # Wait for a migration flag
//!   waitval --source 'app:pw@tcp(db:3306)/app' \
//!     --query 'SELECT done FROM migrations WHERE id = 42' \
//!     --value 1
//!
//!   # Credentials from a client options file, any of several values
//!   waitval --credential ~/.my.cnf --source 'tcp(db:3306)/app' \
//!     --query 'SELECT state FROM replicas' --field state \
//!     --value ready --value synced
//!
//! Exits 0 once a value matches. Connection, query and configuration
//! errors exit non-zero immediately; they are never retried.

mod cli;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use waitval_core::poll::PollDriver;
use waitval_core::resolver::SystemIdentity;
use waitval_rdbc::mysql::MySqlConnectionFactory;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    if cli.values.is_empty() {
        Cli::command()
            .print_help()
            .context("Failed to print usage")?;
    }

    let config = cli
        .into_config(&SystemIdentity)
        .context("Invalid configuration")?;
    info!(source = %config.connection.redacted(), query = %config.query, "Starting wait");

    let driver = PollDriver::new(config, MySqlConnectionFactory::new());
    driver.run().await.context("Wait aborted")?;
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
