//! HTTP client for proposing signed transactions to a Safe transaction
//! service

use alloy_primitives::{Address, B256, Bytes, U256};
use reqwest::Client;
use serde::Serialize;
use tracing::info;
use url::Url;

use crate::errors::VaultClientError;

/// The path template for proposing a multisig transaction, relative to the
/// service's base URL
fn proposal_path(safe: Address) -> String {
    format!("api/v1/safes/{}/multisig-transactions/", safe.to_checksum(None))
}

/// A signed Safe transaction proposal, in the transaction service's format
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeTxProposal {
    /// The call target, checksummed
    pub to: String,
    /// The value sent, as a decimal string
    pub value: String,
    /// The calldata, hex encoded
    pub data: String,
    /// The operation, 0 for call and 1 for delegate call
    pub operation: u8,
    /// The gas reserved for the Safe's inner execution
    pub safe_tx_gas: u64,
    /// The gas paid outside the inner execution
    pub base_gas: u64,
    /// The gas price used for refunds
    pub gas_price: String,
    /// The refund token, checksummed
    pub gas_token: String,
    /// The refund recipient, checksummed
    pub refund_receiver: String,
    /// The Safe nonce
    pub nonce: String,
    /// The Safe transaction hash
    pub contract_transaction_hash: String,
    /// The proposing owner, checksummed
    pub sender: String,
    /// The proposing owner's signature, hex encoded
    pub signature: String,
}

impl SafeTxProposal {
    /// Build a proposal for a zero-refund Safe transaction
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        to: Address,
        value: U256,
        data: &Bytes,
        operation: u8,
        nonce: U256,
        safe_tx_hash: B256,
        sender: Address,
        signature: &Bytes,
    ) -> Self {
        Self {
            to: to.to_checksum(None),
            value: value.to_string(),
            data: data.to_string(),
            operation,
            safe_tx_gas: 0,
            base_gas: 0,
            gas_price: "0".to_string(),
            gas_token: Address::ZERO.to_checksum(None),
            refund_receiver: Address::ZERO.to_checksum(None),
            nonce: nonce.to_string(),
            contract_transaction_hash: format!("{safe_tx_hash:#x}"),
            sender: sender.to_checksum(None),
            signature: signature.to_string(),
        }
    }
}

/// HTTP client for a Safe transaction service
#[derive(Clone)]
pub struct SafeTxServiceClient {
    /// The underlying HTTP client
    client: Client,
    /// The base URL of the transaction service
    base_url: Url,
}

impl SafeTxServiceClient {
    /// Create a new transaction service client
    ///
    /// The base URL is treated as a directory so that services mounted under
    /// a prefix keep it when the proposal path is joined
    pub fn new(mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Self { client: Client::new(), base_url }
    }

    /// The URL a proposal for `safe` is posted to
    fn proposal_url(&self, safe: Address) -> Result<Url, VaultClientError> {
        self.base_url.join(&proposal_path(safe)).map_err(VaultClientError::tx_service)
    }

    /// Propose a signed transaction so the remaining owners can sign it
    pub async fn propose(
        &self,
        safe: Address,
        proposal: &SafeTxProposal,
    ) -> Result<(), VaultClientError> {
        // Build the request URL
        let url = self.proposal_url(safe)?;

        // Send the request
        let response = self
            .client
            .post(url)
            .json(proposal)
            .send()
            .await
            .map_err(VaultClientError::tx_service)?;

        // Check for errors
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let msg = format!("proposal failed with status {}: {body}", status.as_u16());
            return Err(VaultClientError::tx_service(msg));
        }

        info!("proposed Safe tx {} to transaction service", proposal.contract_transaction_hash);
        Ok(())
    }
}
