//! Vault operations composed from the vault client's collaborators
//!
//! - [`deposit::DepositOrchestrator`] selects between an approve and deposit
//!   sequence, a permit and deposit sequence, or a batched Safe transaction,
//!   and publishes its progress as a [`step::DepositStep`]
//! - [`withdraw::WithdrawOperation`] withdraws by asset amount or redeems the
//!   full share balance
//! - [`snapshot::SnapshotAggregator`] reads the vault and account state in
//!   parallel

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod deposit;
pub mod error;
pub mod metrics;
pub mod snapshot;
pub mod step;
pub mod withdraw;

#[cfg(test)]
mod test_helpers;
