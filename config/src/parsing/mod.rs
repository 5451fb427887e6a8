//! Parsing logic for the config

mod config_file;

use std::{env, str::FromStr, time::Duration};

use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use clap::Parser;
use common::types::vault::VaultDeployment;
use constants::SAFE_MULTISEND_CALL_ONLY_ADDRESS;
use url::Url;
use util::raw_err_str;

pub use config_file::parse_config_from_file;

use crate::{
    Cli, Command, VaultConfig, parsing::config_file::config_file_args,
    validation::validate_config,
};

/// Parses command line args into the vault config and the command to run
///
/// We allow for configurations to come from both a config file and overrides
/// on the command line directly. To support this, we first read configuration
/// options from the config file, prepend them to the cli args string, and parse
/// with `args_override_self` so that cli args (which come after config file
/// args) take precedence.
pub fn parse_command_line_args() -> Result<(VaultConfig, Command), String> {
    // The first argument is the executable name, so it stays in front of the
    // config file args
    let mut command_line_args: Vec<String> = env::args().collect();
    let config_file_args = config_file_args(&command_line_args)?;

    let mut full_args = vec![command_line_args.remove(0)];
    full_args.extend(config_file_args);
    full_args.extend(command_line_args);

    let mut cli = Cli::parse_from(full_args);
    let command = cli.command.take().unwrap_or(Command::Snapshot);
    let config = parse_config_from_args(cli)?;
    Ok((config, command))
}

/// Parse the config from a set of command line arguments
///
/// Separating out this functionality allows us to easily inject custom args
/// apart from what is specified on the command line
pub(crate) fn parse_config_from_args(cli_args: Cli) -> Result<VaultConfig, String> {
    let deployment = cli_args.vault.deployment(cli_args.chain);
    let (vault_address, asset_address, asset_decimals) =
        resolve_vault_addresses(&cli_args, deployment)?;

    let private_key = PrivateKeySigner::from_str(&cli_args.private_key)
        .map_err(raw_err_str!("invalid `private-key`: {}"))?;
    let account = cli_args.account.as_deref().map(|a| parse_address("account", a)).transpose()?;
    let multisend_address = match cli_args.multisend_address.as_deref() {
        Some(addr) => parse_address("multisend-address", addr)?,
        None => SAFE_MULTISEND_CALL_ONLY_ADDRESS,
    };

    // --- Parse Service URLs --- //
    let safe_tx_service_url = cli_args
        .safe_tx_service_url
        .as_deref()
        .map(|url| parse_url("safe-tx-service-url", url))
        .transpose()?;
    let analytics_url = parse_url("analytics-url", &cli_args.analytics_url)?;

    let config = VaultConfig {
        chain: cli_args.chain,
        rpc_url: cli_args.rpc_url,
        vault_address,
        asset_address,
        asset_decimals,
        multisend_address,
        safe_tx_service_url,
        analytics_url,
        private_key,
        account,
        use_permit: cli_args.use_permit,
        block_polling_interval: Duration::from_millis(cli_args.block_polling_interval_ms),
        json_logs: cli_args.json_logs,
        metrics_enabled: cli_args.metrics_enabled,
        statsd_host: cli_args.statsd_host,
        statsd_port: cli_args.statsd_port,
    };

    validate_config(&config)?;
    Ok(config)
}

/// Resolve the vault, asset and asset decimals, falling back to the known
/// vault's deployment on the configured chain
///
/// Chains without a deployment, e.g. devnets, must set both addresses
fn resolve_vault_addresses(
    cli_args: &Cli,
    deployment: Option<VaultDeployment>,
) -> Result<(Address, Address, u8), String> {
    let missing = |arg: &str| {
        format!("`{arg}` must be set, no {} vault is known on {}", cli_args.vault, cli_args.chain)
    };

    let vault = match cli_args.vault_address.as_deref() {
        Some(addr) => parse_address("vault-address", addr)?,
        None => deployment.map(|d| d.vault).ok_or_else(|| missing("vault-address"))?,
    };
    let asset = match cli_args.asset_address.as_deref() {
        Some(addr) => parse_address("asset-address", addr)?,
        None => deployment.map(|d| d.asset).ok_or_else(|| missing("asset-address"))?,
    };

    let decimals = cli_args
        .asset_decimals
        .or(deployment.map(|d| d.asset_decimals))
        .unwrap_or(constants::DEFAULT_ASSET_DECIMALS);

    Ok((vault, asset, decimals))
}

/// Parse a hex encoded address passed as the given argument
fn parse_address(arg: &str, addr: &str) -> Result<Address, String> {
    Address::from_str(addr.trim()).map_err(raw_err_str!("invalid `{}` ({}): {}", arg, addr))
}

/// Parse a URL passed as the given argument
fn parse_url(arg: &str, url: &str) -> Result<Url, String> {
    Url::parse(url).map_err(raw_err_str!("invalid `{}` ({}): {}", arg, url))
}

#[cfg(test)]
mod test {
    use alloy::primitives::address;
    use common::types::chain::Chain;
    use constants::{
        ETHEREUM_USDC_ADDRESS, ETHEREUM_USDC_VAULT_ADDRESS, ETHEREUM_WETH_VAULT_ADDRESS,
    };

    use super::*;

    /// The RPC url used in tests
    const RPC_URL: &str = "http://localhost:8545";
    /// A signing key other than the default devnet key
    const PRIVATE_KEY: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

    /// Parse a config from the given args, prefixed with a program name and a
    /// signing key
    fn parse(args: &[&str]) -> Result<VaultConfig, String> {
        let mut full_args = vec!["vaultctl", "--rpc-url", RPC_URL, "--private-key", PRIVATE_KEY];
        full_args.extend_from_slice(args);
        let cli = Cli::try_parse_from(full_args).map_err(|e| e.to_string())?;
        parse_config_from_args(cli)
    }

    #[test]
    fn test_mainnet_defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.chain, Chain::Ethereum);
        assert_eq!(config.vault_address, ETHEREUM_USDC_VAULT_ADDRESS);
        assert_eq!(config.asset_address, ETHEREUM_USDC_ADDRESS);
        assert_eq!(config.asset_decimals, 6);
        assert_eq!(config.multisend_address, SAFE_MULTISEND_CALL_ONLY_ADDRESS);
        assert_eq!(config.block_polling_interval, Duration::from_secs(1));
        assert!(config.safe_tx_service_url.is_none());
        assert!(!config.use_permit);
        assert_eq!(config.account_address(), config.private_key.address());
    }

    #[test]
    fn test_known_vault_selects_deployment() {
        let config = parse(&["--vault", "weth"]).unwrap();
        assert_eq!(config.vault_address, ETHEREUM_WETH_VAULT_ADDRESS);
        assert_eq!(config.asset_decimals, 18);

        let err = parse(&["--vault", "weth", "--chain", "polygon"]).unwrap_err();
        assert!(err.contains("vault-address"));
    }

    #[test]
    fn test_devnet_requires_addresses() {
        let err = parse(&["--chain", "devnet"]).unwrap_err();
        assert!(err.contains("vault-address"));

        let vault = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
        let err = parse(&["--chain", "devnet", "--vault-address", vault]).unwrap_err();
        assert!(err.contains("asset-address"));

        let asset = "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512";
        let config = parse(&[
            "--chain",
            "devnet",
            "--vault-address",
            vault,
            "--asset-address",
            asset,
            "--asset-decimals",
            "18",
        ])
        .unwrap();
        assert_eq!(config.vault_address, address!("5FbDB2315678afecb367f032d93F642f64180aa3"));
        assert_eq!(config.asset_decimals, 18);
    }

    #[test]
    fn test_account_and_services() {
        let safe = "0x1111111111111111111111111111111111111111";
        let config = parse(&[
            "--account",
            safe,
            "--safe-tx-service-url",
            "https://safe-transaction-mainnet.safe.global",
            "--use-permit",
        ])
        .unwrap();

        assert_eq!(config.account_address(), address!("1111111111111111111111111111111111111111"));
        assert!(config.safe_tx_service_url.is_some());
        assert!(config.use_permit);
    }

    #[test]
    fn test_invalid_values() {
        let err = parse(&["--account", "0x1234"]).unwrap_err();
        assert!(err.contains("account"));

        let err = parse(&["--private-key", "not-a-key"]).unwrap_err();
        assert!(err.contains("private-key"));

        let err = parse(&["--analytics-url", "not a url"]).unwrap_err();
        assert!(err.contains("analytics-url"));
    }

    #[test]
    fn test_later_args_take_precedence() {
        let config = parse(&["--chain", "devnet", "--chain", "polygon"]).unwrap();
        assert_eq!(config.chain, Chain::Polygon);
    }

    #[test]
    fn test_subcommands() {
        let cli = Cli::try_parse_from([
            "vaultctl",
            "--rpc-url",
            RPC_URL,
            "deposit",
            "--amount",
            "250.5",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Deposit { amount: "250.5".to_string(), max: false })
        );

        let cli =
            Cli::try_parse_from(["vaultctl", "--rpc-url", RPC_URL, "withdraw", "--max"]).unwrap();
        assert_eq!(cli.command, Some(Command::Withdraw { amount: String::new(), max: true }));

        let cli = Cli::try_parse_from(["vaultctl", "--rpc-url", RPC_URL]).unwrap();
        assert_eq!(cli.command, None);
    }
}
