//! Defines the transaction submitting half of the `VaultClient`

use alloy::{
    network::ReceiptResponse,
    providers::{PendingTransactionBuilder, Provider},
};
use alloy_contract::CallDecoder;
use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use tracing::{info, instrument};
use util::telemetry::helpers::backfill_trace_field;

use crate::{
    errors::VaultClientError,
    traits::{ConfirmedTx, PermitSignature, VaultChain},
};

use super::{VaultCallBuilder, VaultClient};

impl VaultClient {
    /// Send a transaction, returning its hash once the node has accepted it
    ///
    /// Errors raised during gas estimation or submission are classified by
    /// their JSON-RPC error code
    pub async fn send_tx<C: CallDecoder>(
        &self,
        tx: VaultCallBuilder<'_, C>,
    ) -> Result<TxHash, VaultClientError> {
        let pending_tx = tx.send().await.map_err(VaultClientError::from_submission)?;
        let tx_hash = *pending_tx.tx_hash();
        backfill_trace_field("tx_hash", format!("{tx_hash:#x}").as_str());

        Ok(tx_hash)
    }
}

#[async_trait]
impl VaultChain for VaultClient {
    fn account(&self) -> Address {
        self.account
    }

    fn signer_address(&self) -> Address {
        self.signer.address()
    }

    #[instrument(skip_all, err, fields(tx_hash, spender = %spender, amount = %amount))]
    async fn approve(&self, spender: Address, amount: U256) -> Result<TxHash, VaultClientError> {
        let call = self.asset.approve(spender, amount);
        let tx_hash = self.send_tx(call).await?;
        info!("`approve` tx hash: {tx_hash:#x}");

        Ok(tx_hash)
    }

    async fn sign_permit(
        &self,
        spender: Address,
        value: U256,
    ) -> Result<PermitSignature, VaultClientError> {
        self.sign_permit_message(spender, value).await
    }

    #[instrument(skip_all, err, fields(tx_hash, owner = %owner, spender = %spender))]
    async fn permit(
        &self,
        owner: Address,
        spender: Address,
        value: U256,
        signature: PermitSignature,
    ) -> Result<TxHash, VaultClientError> {
        let PermitSignature { deadline, v, r, s } = signature;
        let call = self.asset.permit(owner, spender, value, deadline, v, r, s);
        let tx_hash = self.send_tx(call).await?;
        info!("`permit` tx hash: {tx_hash:#x}");

        Ok(tx_hash)
    }

    #[instrument(skip_all, err, fields(tx_hash, assets = %assets, receiver = %receiver))]
    async fn deposit(&self, assets: U256, receiver: Address) -> Result<TxHash, VaultClientError> {
        let call = self.vault.deposit(assets, receiver);
        let tx_hash = self.send_tx(call).await?;
        info!("`deposit` tx hash: {tx_hash:#x}");

        Ok(tx_hash)
    }

    #[instrument(skip_all, err, fields(tx_hash, assets = %assets, owner = %owner))]
    async fn withdraw(
        &self,
        assets: U256,
        receiver: Address,
        owner: Address,
    ) -> Result<TxHash, VaultClientError> {
        let call = self.vault.withdraw(assets, receiver, owner);
        let tx_hash = self.send_tx(call).await?;
        info!("`withdraw` tx hash: {tx_hash:#x}");

        Ok(tx_hash)
    }

    #[instrument(skip_all, err, fields(tx_hash, shares = %shares, owner = %owner))]
    async fn redeem(
        &self,
        shares: U256,
        receiver: Address,
        owner: Address,
    ) -> Result<TxHash, VaultClientError> {
        let call = self.vault.redeem(shares, receiver, owner);
        let tx_hash = self.send_tx(call).await?;
        info!("`redeem` tx hash: {tx_hash:#x}");

        Ok(tx_hash)
    }

    #[instrument(skip_all, err, fields(tx_hash = %tx_hash))]
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<ConfirmedTx, VaultClientError> {
        let receipt = PendingTransactionBuilder::new(self.provider().root().clone(), tx_hash)
            .get_receipt()
            .await
            .map_err(VaultClientError::tx_querying)?;

        // Check for failure
        if !receipt.status() {
            let error_msg = format!("tx ({tx_hash:#x}) failed with status 0");
            return Err(VaultClientError::Reverted(error_msg));
        }

        Ok(ConfirmedTx {
            tx_hash,
            block_number: receipt.block_number(),
            gas_used: receipt.gas_used(),
        })
    }
}
