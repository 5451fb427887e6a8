//! Represents a chain environment

use std::{fmt::Display, str::FromStr};

use constants::{DEVNET_CHAIN_ID, ETHEREUM_CHAIN_ID, POLYGON_CHAIN_ID};
use serde::{Deserialize, Serialize};

/// The chain environment
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Chain {
    /// Ethereum mainnet
    Ethereum,
    /// Polygon PoS
    Polygon,
    /// Any local devnet chain
    Devnet,
}

impl Chain {
    /// The EVM chain ID
    pub fn chain_id(&self) -> u64 {
        match self {
            Chain::Ethereum => ETHEREUM_CHAIN_ID,
            Chain::Polygon => POLYGON_CHAIN_ID,
            Chain::Devnet => DEVNET_CHAIN_ID,
        }
    }
}

impl Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Chain::Ethereum => write!(f, "ethereum"),
            Chain::Polygon => write!(f, "polygon"),
            Chain::Devnet => write!(f, "devnet"),
        }
    }
}

impl FromStr for Chain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ethereum" | "mainnet" => Ok(Chain::Ethereum),
            "polygon" => Ok(Chain::Polygon),
            "devnet" => Ok(Chain::Devnet),
            _ => Err(format!("Invalid chain: {s}")),
        }
    }
}
