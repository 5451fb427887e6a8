//! Known vault deployments

use std::{fmt::Display, str::FromStr};

use alloy_primitives::Address;
use constants::{
    DEFAULT_ASSET_DECIMALS, ETHEREUM_USDC_ADDRESS, ETHEREUM_USDC_VAULT_ADDRESS,
    ETHEREUM_WETH_ADDRESS, ETHEREUM_WETH_VAULT_ADDRESS, POLYGON_USDC_ADDRESS,
    POLYGON_USDC_VAULT_ADDRESS, WETH_DECIMALS,
};
use serde::{Deserialize, Serialize};

use super::chain::Chain;

/// The vaults the tooling knows deployments for
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum KnownVault {
    /// The USDC yield vault
    Usdc,
    /// The WETH yield vault
    Weth,
}

/// The addresses and asset parameters of a vault deployment
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VaultDeployment {
    /// The ERC-4626 vault contract
    pub vault: Address,
    /// The deposit asset, an ERC-20 token
    pub asset: Address,
    /// The decimals of the deposit asset
    pub asset_decimals: u8,
}

impl KnownVault {
    /// Look up the deployment of this vault on the given chain, if any
    pub fn deployment(&self, chain: Chain) -> Option<VaultDeployment> {
        match (chain, self) {
            (Chain::Ethereum, KnownVault::Usdc) => Some(VaultDeployment {
                vault: ETHEREUM_USDC_VAULT_ADDRESS,
                asset: ETHEREUM_USDC_ADDRESS,
                asset_decimals: DEFAULT_ASSET_DECIMALS,
            }),
            (Chain::Ethereum, KnownVault::Weth) => Some(VaultDeployment {
                vault: ETHEREUM_WETH_VAULT_ADDRESS,
                asset: ETHEREUM_WETH_ADDRESS,
                asset_decimals: WETH_DECIMALS,
            }),
            (Chain::Polygon, KnownVault::Usdc) => Some(VaultDeployment {
                vault: POLYGON_USDC_VAULT_ADDRESS,
                asset: POLYGON_USDC_ADDRESS,
                asset_decimals: DEFAULT_ASSET_DECIMALS,
            }),
            _ => None,
        }
    }
}

impl Display for KnownVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KnownVault::Usdc => write!(f, "usdc"),
            KnownVault::Weth => write!(f, "weth"),
        }
    }
}

impl FromStr for KnownVault {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "usdc" => Ok(KnownVault::Usdc),
            "weth" | "eth" => Ok(KnownVault::Weth),
            _ => Err(format!("Unknown vault: {s}")),
        }
    }
}
