//! A client for the external analytics API serving vault APY, historical
//! vault state and per-user position data over GraphQL

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

mod client;
mod errors;
mod parsing;
mod queries;
pub mod types;

pub use client::AnalyticsClient;
pub use errors::AnalyticsClientError;
