//! Helpers for the asset's EIP-2612 permit extension

use alloy::signers::Signer;
use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{Eip712Domain, SolStruct};
use constants::{DEFAULT_PERMIT_TOKEN_NAME, PERMIT_DEADLINE_SECS, PERMIT_DOMAIN_VERSION};
use tracing::{instrument, warn};
use util::get_current_time_seconds;

use crate::{abis::Permit, errors::VaultClientError, traits::PermitSignature};

use super::VaultClient;

impl VaultClient {
    /// Get the name the asset signs permits under
    ///
    /// Falls back to the USDC name if the token does not report one
    pub(crate) async fn permit_token_name(&self) -> String {
        match self.asset.name().call().await {
            Ok(name) if !name.is_empty() => name,
            Ok(_) => DEFAULT_PERMIT_TOKEN_NAME.to_string(),
            Err(e) => {
                warn!("error reading token name, using default permit domain: {e}");
                DEFAULT_PERMIT_TOKEN_NAME.to_string()
            },
        }
    }

    /// Get the current permit nonce of an owner
    pub(crate) async fn permit_nonce(&self, owner: Address) -> Result<U256, VaultClientError> {
        self.asset.nonces(owner).call().await.map_err(VaultClientError::erc20)
    }

    /// Build the EIP-712 domain of the asset's permit
    pub(crate) async fn permit_domain(&self) -> Result<Eip712Domain, VaultClientError> {
        let name = self.permit_token_name().await;
        let chain_id = self.chain_id().await?;

        Ok(Eip712Domain::new(
            Some(name.into()),
            Some(PERMIT_DOMAIN_VERSION.into()),
            Some(U256::from(chain_id)),
            Some(*self.asset.address()),
            None, // salt
        ))
    }

    /// Sign a permit for `spender` to pull `value` of the asset from the
    /// signer, valid for one hour
    #[instrument(skip_all, err, fields(spender = %spender, value = %value))]
    pub(crate) async fn sign_permit_message(
        &self,
        spender: Address,
        value: U256,
    ) -> Result<PermitSignature, VaultClientError> {
        let owner = self.signer.address();
        let nonce = self.permit_nonce(owner).await?;
        let deadline = U256::from(get_current_time_seconds() + PERMIT_DEADLINE_SECS);
        let domain = self.permit_domain().await?;

        let permit = Permit { owner, spender, value, nonce, deadline };
        let signing_hash = permit.eip712_signing_hash(&domain);
        let sig = self.signer.sign_hash(&signing_hash).await.map_err(VaultClientError::signing)?;

        Ok(PermitSignature {
            deadline,
            v: 27 + u8::from(sig.v()),
            r: B256::from(sig.r().to_be_bytes::<32>()),
            s: B256::from(sig.s().to_be_bytes::<32>()),
        })
    }
}

#[cfg(test)]
mod test {
    use alloy::signers::local::PrivateKeySigner;
    use alloy_primitives::{Signature, address};

    use super::*;

    /// Signs a permit under a fixed domain and checks the split signature
    /// recovers the owner
    #[tokio::test]
    async fn test_permit_signature_recovers_owner() {
        let signer = PrivateKeySigner::random();
        let token = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
        let spender = address!("4F2ba48FaF0bA42c4E4b7871d3861418c83aE568");
        let domain = Eip712Domain::new(
            Some(DEFAULT_PERMIT_TOKEN_NAME.into()),
            Some(PERMIT_DOMAIN_VERSION.into()),
            Some(U256::from(1u64)),
            Some(token),
            None,
        );

        let permit = Permit {
            owner: signer.address(),
            spender,
            value: U256::from(100_500_000u64),
            nonce: U256::ZERO,
            deadline: U256::from(1_700_003_600u64),
        };
        let hash = permit.eip712_signing_hash(&domain);
        let sig = signer.sign_hash(&hash).await.unwrap();

        let v = 27 + u8::from(sig.v());
        assert!(v == 27 || v == 28);

        let rebuilt = Signature::new(sig.r(), sig.s(), v == 28);
        let recovered = rebuilt.recover_address_from_prehash(&hash).unwrap();
        assert_eq!(recovered, signer.address());
    }
}
