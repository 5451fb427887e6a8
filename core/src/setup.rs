//! Builds the clients a command runs against from the parsed config

use std::sync::Arc;

use alloy_primitives::Address;
use analytics_client::AnalyticsClient;
use config::VaultConfig;
use eyre::Result;
use vault_client::{SafeBatcher, SafeBatcherConfig, VaultClient, VaultClientConfig};
use vault_tasks::{
    deposit::DepositOrchestrator, snapshot::SnapshotAggregator, withdraw::WithdrawOperation,
};

/// The clients and settings shared by every command
pub struct VaultServices {
    /// The vault and asset client
    pub client: Arc<VaultClient>,
    /// The Safe batcher used when the account is a Safe
    pub batcher: Arc<SafeBatcher>,
    /// The analytics API client
    pub analytics: AnalyticsClient,
    /// The vault contract
    pub vault: Address,
    /// The connected account
    pub account: Address,
    /// The decimals of the deposit asset
    pub asset_decimals: u8,
    /// Whether deposits use permit signatures in place of approvals
    pub use_permit: bool,
}

impl VaultServices {
    /// Build the services from the config
    pub fn new(config: &VaultConfig) -> Result<Self> {
        let client = VaultClient::new(VaultClientConfig {
            vault_addr: config.vault_address,
            asset_addr: config.asset_address,
            account: config.account,
            chain: config.chain,
            rpc_url: config.rpc_url.clone(),
            private_key: config.private_key.clone(),
            block_polling_interval: config.block_polling_interval,
        })?;

        let batcher = SafeBatcher::new(
            SafeBatcherConfig {
                multisend_addr: config.multisend_address,
                tx_service_url: config.safe_tx_service_url.clone(),
            },
            &client,
        );
        let analytics = AnalyticsClient::new(config.analytics_url.clone(), config.chain.chain_id());

        Ok(Self {
            client: Arc::new(client),
            batcher: Arc::new(batcher),
            analytics,
            vault: config.vault_address,
            account: config.account_address(),
            asset_decimals: config.asset_decimals,
            use_permit: config.use_permit,
        })
    }

    /// A deposit orchestrator over the vault client
    pub fn deposit_orchestrator(&self) -> DepositOrchestrator<VaultClient, SafeBatcher> {
        DepositOrchestrator::new(self.client.clone(), self.batcher.clone(), self.use_permit)
    }

    /// A withdraw operation over the vault client
    pub fn withdraw_operation(&self) -> WithdrawOperation<VaultClient, SafeBatcher> {
        WithdrawOperation::new(self.client.clone(), self.batcher.clone())
    }

    /// A snapshot aggregator that includes the vault's APY
    pub fn snapshot_aggregator(&self) -> SnapshotAggregator<VaultClient> {
        SnapshotAggregator::new(
            self.client.clone(),
            Some(self.analytics.clone()),
            self.asset_decimals,
        )
    }
}
