//! Defines common types and helpers useful throughout the workspace

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod amount;
pub mod types;
