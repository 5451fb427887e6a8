//! Builds and signs batched Safe multisig transactions
//!
//! A batch of calls is packed into a single delegate call to
//! `MultiSendCallOnly`, hashed by the Safe itself, and signed with the local
//! owner key. Execution requires the remaining owners' signatures, collected
//! out of band or through a Safe transaction service.

use alloy::signers::{Signer, local::PrivateKeySigner};
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use tracing::{info, instrument};
use url::Url;

use crate::{
    abis::{IMultiSendCallOnly, ISafe},
    client::{VaultClient, VaultProvider},
    errors::VaultClientError,
    traits::{MetaTransaction, MultisigBatcher, SignedBundle},
};

mod multisend;
mod tx_service;

pub use multisend::{OPERATION_CALL, OPERATION_DELEGATE_CALL, encode_multisend};
pub use tx_service::{SafeTxProposal, SafeTxServiceClient};

/// The configuration of the Safe batcher
#[derive(Clone, Debug)]
pub struct SafeBatcherConfig {
    /// The `MultiSendCallOnly` contract batches are delegate called into
    pub multisend_addr: Address,
    /// The Safe transaction service to propose signed batches to, if any
    pub tx_service_url: Option<Url>,
}

/// The target, value, calldata and operation of a Safe transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SafeCall {
    /// The call target
    pub to: Address,
    /// The value sent
    pub value: U256,
    /// The calldata
    pub data: Bytes,
    /// The Safe operation code
    pub operation: u8,
}

impl SafeCall {
    /// Collapse a batch into the single call the Safe executes
    ///
    /// A batch of one is executed directly, larger batches are routed through
    /// the `MultiSendCallOnly` contract
    pub fn from_batch(
        multisend: Address,
        calls: &[MetaTransaction],
    ) -> Result<Self, VaultClientError> {
        match calls {
            [] => Err(VaultClientError::safe("cannot build a Safe transaction for an empty batch")),
            [call] => Ok(Self {
                to: call.to,
                value: call.value,
                data: call.data.clone(),
                operation: OPERATION_CALL,
            }),
            calls => {
                let transactions = encode_multisend(calls);
                let data = IMultiSendCallOnly::multiSendCall { transactions }.abi_encode();
                Ok(Self {
                    to: multisend,
                    value: U256::ZERO,
                    data: data.into(),
                    operation: OPERATION_DELEGATE_CALL,
                })
            },
        }
    }
}

/// Builds and signs Safe transactions with the local owner key
#[derive(Clone)]
pub struct SafeBatcher {
    /// The provider used to read Safe state
    provider: VaultProvider,
    /// The owner key signing Safe transaction hashes
    signer: PrivateKeySigner,
    /// The `MultiSendCallOnly` contract
    multisend: Address,
    /// The transaction service client, if proposals are enabled
    tx_service: Option<SafeTxServiceClient>,
}

impl SafeBatcher {
    /// Create a batcher sharing the vault client's provider and signer
    pub fn new(config: SafeBatcherConfig, client: &VaultClient) -> Self {
        Self {
            provider: client.provider().clone(),
            signer: client.signer().clone(),
            multisend: config.multisend_addr,
            tx_service: config.tx_service_url.map(SafeTxServiceClient::new),
        }
    }
}

#[async_trait]
impl MultisigBatcher for SafeBatcher {
    #[instrument(skip_all, err, fields(safe = %safe, n_calls = calls.len()))]
    async fn create_bundle(
        &self,
        safe: Address,
        calls: Vec<MetaTransaction>,
    ) -> Result<SignedBundle, VaultClientError> {
        let call = SafeCall::from_batch(self.multisend, &calls)?;
        let safe_contract = ISafe::new(safe, &self.provider);

        // Only an owner's signature counts towards the threshold
        let signer = self.signer.address();
        let is_owner =
            safe_contract.isOwner(signer).call().await.map_err(VaultClientError::safe)?;
        if !is_owner {
            return Err(VaultClientError::NotSafeOwner {
                safe: safe.to_string(),
                signer: signer.to_string(),
            });
        }

        let nonce = safe_contract.nonce().call().await.map_err(VaultClientError::safe)?;
        let safe_tx_hash = safe_contract
            .getTransactionHash(
                call.to,
                call.value,
                call.data.clone(),
                call.operation,
                U256::ZERO, // safeTxGas
                U256::ZERO, // baseGas
                U256::ZERO, // gasPrice
                Address::ZERO,
                Address::ZERO,
                nonce,
            )
            .call()
            .await
            .map_err(VaultClientError::safe)?;

        let sig = self.signer.sign_hash(&safe_tx_hash).await.map_err(VaultClientError::signing)?;
        let signature = Bytes::from(sig.as_bytes().to_vec());
        info!("signed Safe tx {safe_tx_hash:#x} at nonce {nonce}");

        let mut proposed = false;
        if let Some(tx_service) = &self.tx_service {
            let proposal = SafeTxProposal::new(
                call.to,
                call.value,
                &call.data,
                call.operation,
                nonce,
                safe_tx_hash,
                signer,
                &signature,
            );
            tx_service.propose(safe, &proposal).await?;
            proposed = true;
        }

        Ok(SignedBundle { safe, safe_tx_hash, nonce, signature, proposed })
    }
}
