//! Provides a client for interacting with ERC-4626 yield vaults, their
//! ERC-20 deposit assets, and Safe multisig wallets.
//!
//! This contains abstractions for handling configuration details like
//! RPC endpoint, contract addresses, etc.; executing transactions and reading
//! state from the vault and token contracts; and batching calls into a single
//! signed Safe transaction.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod abis;
pub mod client;
pub mod errors;
pub mod safe;
pub mod traits;

pub use client::{VaultClient, VaultClientConfig};
pub use safe::{SafeBatcher, SafeBatcherConfig};
