//! The entrypoint to `vaultctl`, parses the config, sets up the vault clients
//! and runs the requested command
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

mod commands;
mod setup;

use config::{Command, parse_command_line_args};
use eyre::{Result, eyre};
use tracing::info;
use util::telemetry::configure_telemetry;

use crate::setup::VaultServices;

/// The entrypoint to the CLI's execution
///
/// At a high level, this method:
///     1. Parses the config from the command line and config file
///     2. Configures logging and, if enabled, metrics
///     3. Builds the vault, Safe and analytics clients
///     4. Runs the requested command to completion
#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let (config, command) = parse_command_line_args().map_err(|e| eyre!(e))?;
    configure_telemetry(
        config.json_logs,
        config.metrics_enabled,
        &config.statsd_host,
        config.statsd_port,
    )?;
    info!(
        "vaultctl running on {} for vault {} (account {})",
        config.chain,
        config.vault_address,
        config.account_address()
    );

    let services = VaultServices::new(&config)?;
    match command {
        Command::Deposit { amount, max } => commands::deposit(&services, amount, max).await,
        Command::Withdraw { amount, max } => commands::withdraw(&services, amount, max).await,
        Command::Snapshot => commands::snapshot(&services).await,
        Command::History { range } => commands::history(&services, &range).await,
        Command::Position { range } => commands::position(&services, &range).await,
    }
}
