//! Assembles a snapshot of the vault and the connected account
//!
//! Every read is issued in parallel and the refresh resolves once all have
//! returned; the first failure fails the refresh

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use analytics_client::{AnalyticsClient, types::VaultApy};
use common::amount::to_decimal;
use constants::FEE_SCALE;
use tracing::{debug, instrument};
use vault_client::{errors::VaultClientError, traits::VaultReader};

use crate::{error::VaultOpError, metrics::record_failed_refresh};

/// The state of the vault and an account at one refresh
#[derive(Clone, Debug, PartialEq)]
pub struct VaultSnapshot {
    /// The vault's name
    pub vault_name: String,
    /// The vault's share symbol
    pub vault_symbol: String,
    /// The asset the vault reports
    pub asset: Address,
    /// The decimals of vault shares
    pub vault_decimals: u8,
    /// The decimals of the deposit asset
    pub asset_decimals: u8,
    /// The performance fee, scaled by 1e18
    pub performance_fee: U256,
    /// The recipient of the performance fee
    pub fee_recipient: Address,
    /// The total assets managed by the vault
    pub total_assets: U256,
    /// The total supply of shares
    pub total_supply: U256,
    /// The account's share balance
    pub share_balance: U256,
    /// The assets the account's shares redeem for
    pub user_assets: U256,
    /// The maximum the account may deposit
    pub max_deposit: U256,
    /// The maximum assets the account may withdraw
    pub max_withdraw: U256,
    /// The account's asset balance
    pub asset_balance: U256,
    /// The account's allowance to the vault
    pub allowance: U256,
    /// The vault's yield from the analytics API, if queried
    pub apy: Option<VaultApy>,
}

impl VaultSnapshot {
    /// The assets backing one share, 1.0 for an empty vault
    pub fn share_price(&self) -> f64 {
        if self.total_supply.is_zero() {
            return 1.;
        }

        let assets = to_decimal(self.total_assets, self.asset_decimals);
        let supply = to_decimal(self.total_supply, self.vault_decimals);
        assets / supply
    }

    /// The performance fee, in percent
    pub fn fee_percentage(&self) -> f64 {
        to_decimal(self.performance_fee, 0) / FEE_SCALE * 100.
    }

    /// The assets the account can withdraw now
    ///
    /// Falls back to the value of the account's shares when the vault reports
    /// no withdrawal limit
    pub fn available_to_withdraw(&self) -> U256 {
        if self.max_withdraw.is_zero() { self.user_assets } else { self.max_withdraw }
    }
}

/// Reads vault and account state in parallel
pub struct SnapshotAggregator<R: VaultReader> {
    /// The chain reader
    reader: Arc<R>,
    /// The analytics client, if APY should be included
    analytics: Option<AnalyticsClient>,
    /// The decimals of the deposit asset
    asset_decimals: u8,
}

impl<R: VaultReader> SnapshotAggregator<R> {
    /// Create a new aggregator
    pub fn new(reader: Arc<R>, analytics: Option<AnalyticsClient>, asset_decimals: u8) -> Self {
        Self { reader, analytics, asset_decimals }
    }

    /// Read a fresh snapshot for `account`
    #[instrument(skip_all, err, fields(account = %account))]
    pub async fn refresh(&self, account: Address) -> Result<VaultSnapshot, VaultOpError> {
        let res = self.read_all(account).await;
        if res.is_err() {
            record_failed_refresh();
        }

        res
    }

    /// Issue every read, failing on the first error
    async fn read_all(&self, account: Address) -> Result<VaultSnapshot, VaultOpError> {
        let reader = self.reader.as_ref();
        let vault = reader.vault_address();

        let position = async {
            let shares = reader.share_balance(account).await?;
            let assets = reader.convert_to_assets(shares).await?;
            Ok::<_, VaultClientError>((shares, assets))
        };

        let chain_reads = async {
            tokio::try_join!(
                reader.vault_name(),
                reader.vault_symbol(),
                reader.vault_asset(),
                reader.vault_decimals(),
                reader.performance_fee(),
                reader.fee_recipient(),
                reader.total_assets(),
                reader.total_supply(),
                position,
                reader.max_deposit(account),
                reader.max_withdraw(account),
                reader.asset_balance(account),
                reader.allowance(account, vault),
            )
            .map_err(VaultOpError::from)
        };

        let apy = async {
            match &self.analytics {
                Some(client) => client.vault_apy(vault).await.map_err(VaultOpError::from),
                None => Ok(None),
            }
        };

        let (reads, apy) = tokio::try_join!(chain_reads, apy)?;
        let (
            vault_name,
            vault_symbol,
            asset,
            vault_decimals,
            performance_fee,
            fee_recipient,
            total_assets,
            total_supply,
            (share_balance, user_assets),
            max_deposit,
            max_withdraw,
            asset_balance,
            allowance,
        ) = reads;
        debug!("read snapshot of {vault_name} ({vault_symbol})");

        Ok(VaultSnapshot {
            vault_name,
            vault_symbol,
            asset,
            vault_decimals,
            asset_decimals: self.asset_decimals,
            performance_fee,
            fee_recipient,
            total_assets,
            total_supply,
            share_balance,
            user_assets,
            max_deposit,
            max_withdraw,
            asset_balance,
            allowance,
            apy,
        })
    }
}
