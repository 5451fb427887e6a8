//! Read-only queries against the vault and asset contracts

use alloy::providers::Provider;
use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use tracing::instrument;

use crate::{errors::VaultClientError, traits::VaultReader};

use super::VaultClient;

#[async_trait]
impl VaultReader for VaultClient {
    fn vault_address(&self) -> Address {
        *self.vault.address()
    }

    fn asset_address(&self) -> Address {
        *self.asset.address()
    }

    // ---------
    // | Vault |
    // ---------

    #[instrument(skip_all, err)]
    async fn vault_name(&self) -> Result<String, VaultClientError> {
        self.vault.name().call().await.map_err(VaultClientError::vault)
    }

    #[instrument(skip_all, err)]
    async fn vault_symbol(&self) -> Result<String, VaultClientError> {
        self.vault.symbol().call().await.map_err(VaultClientError::vault)
    }

    #[instrument(skip_all, err)]
    async fn vault_decimals(&self) -> Result<u8, VaultClientError> {
        self.vault.decimals().call().await.map_err(VaultClientError::vault)
    }

    #[instrument(skip_all, err)]
    async fn vault_asset(&self) -> Result<Address, VaultClientError> {
        self.vault.asset().call().await.map_err(VaultClientError::vault)
    }

    #[instrument(skip_all, err)]
    async fn performance_fee(&self) -> Result<U256, VaultClientError> {
        // The fee is stored as a `uint96`
        let fee = self.vault.fee().call().await.map_err(VaultClientError::vault)?;
        Ok(U256::from(fee))
    }

    #[instrument(skip_all, err)]
    async fn fee_recipient(&self) -> Result<Address, VaultClientError> {
        self.vault.feeRecipient().call().await.map_err(VaultClientError::vault)
    }

    #[instrument(skip_all, err)]
    async fn total_assets(&self) -> Result<U256, VaultClientError> {
        self.vault.totalAssets().call().await.map_err(VaultClientError::vault)
    }

    #[instrument(skip_all, err)]
    async fn total_supply(&self) -> Result<U256, VaultClientError> {
        self.vault.totalSupply().call().await.map_err(VaultClientError::vault)
    }

    #[instrument(skip_all, err, fields(owner = %owner))]
    async fn share_balance(&self, owner: Address) -> Result<U256, VaultClientError> {
        self.vault.balanceOf(owner).call().await.map_err(VaultClientError::vault)
    }

    #[instrument(skip_all, err, fields(shares = %shares))]
    async fn convert_to_assets(&self, shares: U256) -> Result<U256, VaultClientError> {
        self.vault.convertToAssets(shares).call().await.map_err(VaultClientError::vault)
    }

    #[instrument(skip_all, err, fields(receiver = %receiver))]
    async fn max_deposit(&self, receiver: Address) -> Result<U256, VaultClientError> {
        self.vault.maxDeposit(receiver).call().await.map_err(VaultClientError::vault)
    }

    #[instrument(skip_all, err, fields(owner = %owner))]
    async fn max_withdraw(&self, owner: Address) -> Result<U256, VaultClientError> {
        self.vault.maxWithdraw(owner).call().await.map_err(VaultClientError::vault)
    }

    // ---------
    // | Asset |
    // ---------

    #[instrument(skip_all, err, fields(owner = %owner))]
    async fn asset_balance(&self, owner: Address) -> Result<U256, VaultClientError> {
        self.asset.balanceOf(owner).call().await.map_err(VaultClientError::erc20)
    }

    #[instrument(skip_all, err, fields(owner = %owner, spender = %spender))]
    async fn allowance(
        &self,
        owner: Address,
        spender: Address,
    ) -> Result<U256, VaultClientError> {
        self.asset.allowance(owner, spender).call().await.map_err(VaultClientError::erc20)
    }

    // ---------
    // | Chain |
    // ---------

    #[instrument(skip_all, err, fields(address = %address))]
    async fn get_code(&self, address: Address) -> Result<Bytes, VaultClientError> {
        self.provider().get_code_at(address).await.map_err(VaultClientError::rpc)
    }
}
