//! Config validation

use alloy::primitives::Address;
use common::types::chain::Chain;
use constants::DEVNET_SIGNER_ADDRESS;
use url::Url;

use crate::VaultConfig;

/// Validate a parsed config
pub fn validate_config(config: &VaultConfig) -> Result<(), String> {
    // Contract addresses must be set
    check_nonzero("vault-address", config.vault_address)?;
    check_nonzero("asset-address", config.asset_address)?;
    check_nonzero("multisend-address", config.multisend_address)?;
    if config.account == Some(Address::ZERO) {
        return Err("`account` must not be the zero address".to_string());
    }

    if config.vault_address == config.asset_address {
        return Err("`vault-address` and `asset-address` must differ".to_string());
    }

    // The RPC url must be an absolute http(s) url
    let rpc_url = Url::parse(&config.rpc_url).map_err(|e| format!("invalid `rpc-url`: {e}"))?;
    if !matches!(rpc_url.scheme(), "http" | "https") {
        return Err(format!("`rpc-url` must be an http(s) url, got {}", rpc_url.scheme()));
    }

    if config.block_polling_interval.is_zero() {
        return Err("`block-polling-interval-ms` must be positive".to_string());
    }

    // The devnet key is public, anyone can move funds it controls
    if config.chain != Chain::Devnet && config.private_key.address() == DEVNET_SIGNER_ADDRESS {
        return Err(format!(
            "`private-key` must be set on {}, the default devnet key is public",
            config.chain
        ));
    }

    Ok(())
}

/// Reject the zero address for the given argument
fn check_nonzero(arg: &str, addr: Address) -> Result<(), String> {
    if addr.is_zero() {
        return Err(format!("`{arg}` must not be the zero address"));
    }

    Ok(())
}
