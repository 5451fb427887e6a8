//! The vault CLI and config definitions

use std::time::Duration;

use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use clap::{Parser, Subcommand};
use common::types::{chain::Chain, vault::KnownVault};
use constants::{ANALYTICS_GRAPHQL_URL, DEVNET_PRIVATE_KEY};
use serde::{Deserialize, Serialize};
use url::Url;

// -------
// | CLI |
// -------

/// Deposit into, withdraw from, and inspect an ERC-4626 vault
#[derive(Debug, Parser, Serialize, Deserialize)]
#[clap(author, about, long_about = None, args_override_self = true)]
#[rustfmt::skip]
pub struct Cli {
    // ---------------
    // | Config File |
    // ---------------
    /// A TOML config file to read options from
    ///
    /// Options given on the command line take precedence over the file
    #[clap(long, value_parser)]
    pub config_file: Option<String>,

    // -----------------------
    // | Environment Configs |
    // -----------------------

    /// The chain the vault is deployed on
    #[clap(long, value_parser, default_value = "ethereum", env = "CHAIN")]
    pub chain: Chain,
    /// The HTTP addressable JSON-RPC node of the chain
    #[clap(long, value_parser, env = "RPC_URL")]
    pub rpc_url: String,
    /// The known vault whose deployment provides default addresses
    #[clap(long, value_parser, default_value = "usdc")]
    pub vault: KnownVault,
    /// The address of the vault contract, defaults to the known vault's deployment
    #[clap(long, value_parser, env = "VAULT_ADDRESS")]
    pub vault_address: Option<String>,
    /// The address of the deposit asset, defaults to the known vault's deployment
    #[clap(long, value_parser, env = "ASSET_ADDRESS")]
    pub asset_address: Option<String>,
    /// The decimals of the deposit asset, defaults to the known vault's deployment
    #[clap(long, value_parser)]
    pub asset_decimals: Option<u8>,
    /// The `MultiSendCallOnly` contract used to batch Safe transactions,
    /// defaults to the canonical deployment
    #[clap(long, value_parser)]
    pub multisend_address: Option<String>,
    /// The Safe transaction service to propose signed bundles to
    ///
    /// If not set, signed bundles are printed for out-of-band sharing
    #[clap(long, value_parser, env = "SAFE_TX_SERVICE_URL")]
    pub safe_tx_service_url: Option<String>,
    /// The GraphQL endpoint serving vault analytics
    #[clap(long, value_parser, default_value = ANALYTICS_GRAPHQL_URL)]
    pub analytics_url: String,

    // -------------------
    // | Account Configs |
    // -------------------

    /// The on-chain private key used to sign transactions and Safe bundles
    ///
    /// Defaults to the first pre-funded devnet key, which is rejected on any
    /// other chain
    #[clap(long, value_parser, env = "PRIVATE_KEY", default_value = DEVNET_PRIVATE_KEY)]
    pub private_key: String,
    /// The connected account, defaults to the signer's address
    ///
    /// May name a Safe owned by the signer, in which case deposits are bundled
    #[clap(long, value_parser, env = "ACCOUNT")]
    pub account: Option<String>,
    /// Approve deposits with an EIP-2612 permit signature instead of an approve transaction
    #[clap(long, value_parser)]
    pub use_permit: bool,
    /// The interval at which to poll for transaction receipts, in milliseconds
    #[clap(long, value_parser, default_value = "1000")]
    pub block_polling_interval_ms: u64,

    // -------------
    // | Telemetry |
    // -------------

    /// Whether or not to emit logs as structured JSON
    #[clap(long, value_parser)]
    pub json_logs: bool,
    /// Whether or not to enable metrics collection
    #[clap(long, value_parser)]
    pub metrics_enabled: bool,
    /// The StatsD recorder host to send metrics to
    #[clap(long, value_parser, default_value = "127.0.0.1")]
    pub statsd_host: String,
    /// The StatsD recorder port to send metrics to
    #[clap(long, value_parser, default_value = "8125")]
    pub statsd_port: u16,

    // ------------
    // | Commands |
    // ------------

    /// The operation to run, defaults to `snapshot`
    #[clap(subcommand)]
    pub command: Option<Command>,
}

/// The operations the CLI runs against the vault
#[derive(Clone, Debug, PartialEq, Eq, Subcommand, Serialize, Deserialize)]
#[rustfmt::skip]
pub enum Command {
    /// Deposit assets into the vault
    Deposit {
        /// The amount of assets to deposit, in decimal units of the asset
        #[clap(long, value_parser, default_value = "")]
        amount: String,
        /// Deposit the account's full asset balance
        #[clap(long, value_parser)]
        max: bool,
    },
    /// Withdraw assets from the vault
    Withdraw {
        /// The amount of assets to withdraw, in decimal units of the asset
        #[clap(long, value_parser, default_value = "")]
        amount: String,
        /// Redeem every share the account holds
        #[clap(long, value_parser)]
        max: bool,
    },
    /// Print the vault's state and the account's position
    Snapshot,
    /// Print the vault's APY and deposit history
    History {
        /// The window to fetch: 1W, 1M or 3M
        #[clap(long, value_parser, default_value = "1M")]
        range: String,
    },
    /// Print the account's PnL and position history
    Position {
        /// The window to fetch: 1W, 1M or 3M
        #[clap(long, value_parser, default_value = "1M")]
        range: String,
    },
}

// ----------
// | Config |
// ----------

/// The parsed and validated configuration of the vault tooling
#[derive(Clone, Debug)]
pub struct VaultConfig {
    // -----------------------
    // | Environment Configs |
    // -----------------------
    /// The chain the vault is deployed on
    pub chain: Chain,
    /// The HTTP addressable JSON-RPC node of the chain
    pub rpc_url: String,
    /// The vault contract
    pub vault_address: Address,
    /// The deposit asset
    pub asset_address: Address,
    /// The decimals of the deposit asset
    pub asset_decimals: u8,
    /// The `MultiSendCallOnly` contract used to batch Safe transactions
    pub multisend_address: Address,
    /// The Safe transaction service to propose signed bundles to
    pub safe_tx_service_url: Option<Url>,
    /// The GraphQL endpoint serving vault analytics
    pub analytics_url: Url,

    // -------------------
    // | Account Configs |
    // -------------------
    /// The signer of transactions and Safe bundles
    pub private_key: PrivateKeySigner,
    /// The connected account, `None` means the signer itself
    pub account: Option<Address>,
    /// Whether deposits use permit signatures in place of approvals
    pub use_permit: bool,
    /// The interval at which to poll for transaction receipts
    pub block_polling_interval: Duration,

    // -------------
    // | Telemetry |
    // -------------
    /// Whether or not to emit logs as structured JSON
    pub json_logs: bool,
    /// Whether or not to enable metrics collection
    pub metrics_enabled: bool,
    /// The StatsD recorder host to send metrics to
    pub statsd_host: String,
    /// The StatsD recorder port to send metrics to
    pub statsd_port: u16,
}

impl VaultConfig {
    /// The connected account, falling back to the signer's address
    pub fn account_address(&self) -> Address {
        self.account.unwrap_or_else(|| self.private_key.address())
    }
}
