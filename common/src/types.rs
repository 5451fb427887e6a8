//! Shared types for the vault tooling

pub mod chain;
pub mod vault;
