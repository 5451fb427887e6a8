//! Defines system-wide constants for vault interaction

#![deny(unsafe_code)]
#![deny(clippy::missing_docs_in_private_items)]
#![deny(missing_docs)]

use alloy_primitives::{Address, address};

// -------------
// | Chain IDs |
// -------------

/// The chain ID of Ethereum mainnet
pub const ETHEREUM_CHAIN_ID: u64 = 1;
/// The chain ID of Polygon PoS
pub const POLYGON_CHAIN_ID: u64 = 137;
/// The chain ID used by local devnets (anvil, hardhat)
pub const DEVNET_CHAIN_ID: u64 = 31337;

// ----------------------
// | Contract Addresses |
// ----------------------

/// The USDC vault deployed on Ethereum mainnet
pub const ETHEREUM_USDC_VAULT_ADDRESS: Address =
    address!("4F2ba48FaF0bA42c4E4b7871d3861418c83aE568");
/// USDC on Ethereum mainnet
pub const ETHEREUM_USDC_ADDRESS: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
/// The WETH vault deployed on Ethereum mainnet
pub const ETHEREUM_WETH_VAULT_ADDRESS: Address =
    address!("633bdc298c7f663a9000257dc495c30e910351a4");
/// WETH on Ethereum mainnet
pub const ETHEREUM_WETH_ADDRESS: Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
/// The USDC vault deployed on Polygon
pub const POLYGON_USDC_VAULT_ADDRESS: Address =
    address!("c95961616eCa3DBbabB89dC160Ac67088bC52c90");
/// Native USDC on Polygon
pub const POLYGON_USDC_ADDRESS: Address = address!("3c499c542cEF5E3811e1192ce70d8cC03d5c3359");

/// The canonical `MultiSendCallOnly` (v1.3.0) deployment used to batch Safe
/// transactions
pub const SAFE_MULTISEND_CALL_ONLY_ADDRESS: Address =
    address!("40A2aCCbd92BCA938b02010E17A5b8929b49130D");

// ------------------
// | Asset Defaults |
// ------------------

/// The decimals of the USDC deposit asset
pub const DEFAULT_ASSET_DECIMALS: u8 = 6;
/// The decimals of WETH
pub const WETH_DECIMALS: u8 = 18;
/// The decimals assumed for vault shares when the contract read is missing
pub const DEFAULT_VAULT_DECIMALS: u8 = 18;
/// The fixed-point scale of the vault's performance fee
pub const FEE_SCALE: f64 = 1e18;

// -----------
// | Permits |
// -----------

/// The validity window of an EIP-2612 permit signature, in seconds
pub const PERMIT_DEADLINE_SECS: u64 = 3600;
/// The EIP-712 domain version used by USDC-style permit tokens
pub const PERMIT_DOMAIN_VERSION: &str = "2";
/// The token name used in the permit domain if the token does not report one
pub const DEFAULT_PERMIT_TOKEN_NAME: &str = "USD Coin";

// -------------
// | Analytics |
// -------------

/// The GraphQL endpoint of the analytics service providing APY data
pub const ANALYTICS_GRAPHQL_URL: &str = "https://api.morpho.org/graphql";

// ----------
// | Devnet |
// ----------

/// The first pre-funded key of a local devnet; it is public and only safe to
/// use against a devnet
pub const DEVNET_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
/// The address of [`DEVNET_PRIVATE_KEY`]
pub const DEVNET_SIGNER_ADDRESS: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
