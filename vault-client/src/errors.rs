//! Possible errors thrown by the vault client

use alloy::{contract::Error as ContractError, transports::TransportError};
use alloy_sol_types::Error as SolError;

/// The JSON-RPC error code a wallet returns when the user declines a request
/// (EIP-1193)
pub const USER_REJECTED_REQUEST_CODE: i64 = 4001;
/// The JSON-RPC error code nodes use for execution reverts
pub const EXECUTION_REVERTED_CODE: i64 = 3;

/// The error type returned by the vault client interface
#[derive(Clone, Debug, thiserror::Error)]
pub enum VaultClientError {
    /// Error thrown when the vault client configuration fails
    #[error("vault client configuration error: {0}")]
    Config(#[from] VaultClientConfigError),
    /// Error thrown when a contract call fails
    #[error("contract interaction error: {0}")]
    ContractInteraction(String),
    /// An error interacting with an erc20 contract
    #[error("ERC20 error: {0}")]
    Erc20(String),
    /// An error interacting with the vault contract
    #[error("vault error: {0}")]
    Vault(String),
    /// An error interacting with a Safe wallet
    #[error("Safe error: {0}")]
    Safe(String),
    /// The local signer is not an owner of the Safe it is acting for
    #[error("{signer} is not an owner of Safe {safe}")]
    NotSafeOwner {
        /// The Safe being acted on
        safe: String,
        /// The address of the local signer
        signer: String,
    },
    /// An error submitting a proposal to the Safe transaction service
    #[error("Safe transaction service error: {0}")]
    TxService(String),
    /// An error interacting with the lower level rpc client
    #[error("RPC error: {0}")]
    Rpc(String),
    /// The signer declined to sign a request
    #[error("request rejected by signer: {0}")]
    Rejected(String),
    /// A transaction reverted, either in simulation or on chain
    #[error("transaction reverted: {0}")]
    Reverted(String),
    /// A signing error
    #[error("signing error: {0}")]
    Signing(String),
    /// Error thrown when awaiting a transaction fails
    #[error("transaction querying error: {0}")]
    TxQuerying(String),
}

impl VaultClientError {
    /// Create a new contract interaction error
    #[allow(clippy::needless_pass_by_value)]
    pub fn contract_interaction<T: ToString>(msg: T) -> Self {
        Self::ContractInteraction(msg.to_string())
    }

    /// Create a new erc20 error
    #[allow(clippy::needless_pass_by_value)]
    pub fn erc20<T: ToString>(msg: T) -> Self {
        Self::Erc20(msg.to_string())
    }

    /// Create a new vault error
    #[allow(clippy::needless_pass_by_value)]
    pub fn vault<T: ToString>(msg: T) -> Self {
        Self::Vault(msg.to_string())
    }

    /// Create a new Safe error
    #[allow(clippy::needless_pass_by_value)]
    pub fn safe<T: ToString>(msg: T) -> Self {
        Self::Safe(msg.to_string())
    }

    /// Create a new transaction service error
    #[allow(clippy::needless_pass_by_value)]
    pub fn tx_service<T: ToString>(msg: T) -> Self {
        Self::TxService(msg.to_string())
    }

    /// Create a new RPC error
    #[allow(clippy::needless_pass_by_value)]
    pub fn rpc<T: ToString>(msg: T) -> Self {
        Self::Rpc(msg.to_string())
    }

    /// Create a new signing error
    #[allow(clippy::needless_pass_by_value)]
    pub fn signing<T: ToString>(msg: T) -> Self {
        Self::Signing(msg.to_string())
    }

    /// Create a new transaction querying error
    #[allow(clippy::needless_pass_by_value)]
    pub fn tx_querying<T: ToString>(msg: T) -> Self {
        Self::TxQuerying(msg.to_string())
    }

    /// Classify an error returned when submitting a transaction
    ///
    /// Error responses carry a JSON-RPC code that distinguishes a user
    /// declining the request and a revert during gas estimation from other
    /// node failures
    pub fn from_submission(err: ContractError) -> Self {
        match err {
            ContractError::TransportError(TransportError::ErrorResp(payload)) => {
                let msg = payload.message.to_string();
                if payload.code == USER_REJECTED_REQUEST_CODE {
                    Self::Rejected(msg)
                } else if payload.code == EXECUTION_REVERTED_CODE
                    || msg.contains("execution reverted")
                {
                    let data = payload.data.map(|d| d.get().to_string()).unwrap_or_default();
                    Self::Reverted(format!("{msg} (data = {data})"))
                } else {
                    Self::Rpc(format!("{msg} (code = {})", payload.code))
                }
            },
            e => Self::contract_interaction(e),
        }
    }
}

/// The error type returned by the vault client configuration interface
#[derive(Clone, Debug, thiserror::Error)]
pub enum VaultClientConfigError {
    /// Error thrown when the RPC client fails to initialize
    #[error("RPC client initialization error: {0}")]
    RpcClientInitialization(String),
    /// Error thrown when a URL can't be parsed
    #[error("URL parsing error: {0}")]
    UrlParsing(String),
}

impl From<SolError> for VaultClientError {
    fn from(e: SolError) -> Self {
        Self::ContractInteraction(e.to_string())
    }
}
