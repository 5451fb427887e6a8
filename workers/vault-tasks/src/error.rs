//! The error taxonomy of vault operations

use analytics_client::AnalyticsClientError;
use common::amount::AmountError;
use thiserror::Error;
use vault_client::errors::VaultClientError;

/// The error type returned by vault operations
///
/// Errors are surfaced to the caller unrecovered; no operation retries or
/// rolls back on failure
#[derive(Debug, Error)]
pub enum VaultOpError {
    /// The amount was empty, malformed or zero; raised before any network
    /// call
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),
    /// A precondition of the operation is missing, e.g. a signer that does
    /// not control the connected account; carries the client error that
    /// detected it, if any
    #[error("missing context: {0}")]
    MissingContext(String, #[source] Option<VaultClientError>),
    /// The signer declined a request
    #[error("transaction rejected: {0}")]
    TransactionRejected(#[source] VaultClientError),
    /// A transaction reverted, in simulation or on chain
    #[error("transaction reverted: {0}")]
    TransactionReverted(#[source] VaultClientError),
    /// The node or an HTTP service could not be reached or answered with an
    /// error
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl VaultOpError {
    /// Create a new missing context error
    #[allow(clippy::needless_pass_by_value)]
    pub fn missing_context<T: ToString>(msg: T) -> Self {
        Self::MissingContext(msg.to_string(), None)
    }

    /// Wrap an error as a network error, regardless of its kind
    pub fn network<E: std::error::Error + Send + Sync + 'static>(err: E) -> Self {
        Self::Network(Box::new(err))
    }

    /// A short label for the error kind, used in metrics
    pub fn kind(&self) -> &'static str {
        match self {
            VaultOpError::InvalidAmount(_) => "invalid_amount",
            VaultOpError::MissingContext(..) => "missing_context",
            VaultOpError::TransactionRejected(_) => "rejected",
            VaultOpError::TransactionReverted(_) => "reverted",
            VaultOpError::Network(_) => "network",
        }
    }
}

impl From<VaultClientError> for VaultOpError {
    fn from(err: VaultClientError) -> Self {
        match err {
            VaultClientError::Rejected(_) | VaultClientError::Signing(_) => {
                VaultOpError::TransactionRejected(err)
            },
            VaultClientError::Reverted(_) => VaultOpError::TransactionReverted(err),
            VaultClientError::NotSafeOwner { .. } => {
                VaultOpError::MissingContext(err.to_string(), Some(err))
            },
            _ => VaultOpError::network(err),
        }
    }
}

impl From<AnalyticsClientError> for VaultOpError {
    fn from(err: AnalyticsClientError) -> Self {
        VaultOpError::network(err)
    }
}
