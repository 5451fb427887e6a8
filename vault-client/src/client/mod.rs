//! The definition of the vault client, which holds the configuration
//! details, along with lower-level handles for the vault and asset contracts

use std::time::Duration;

use alloy::{
    providers::{
        DynProvider, Provider, ProviderBuilder,
        fillers::{BlobGasFiller, ChainIdFiller, GasFiller},
    },
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use alloy_contract::CallBuilder;
use alloy_primitives::{Address, ChainId};
use common::types::chain::Chain;
use util::err_str;

use crate::{
    abis::{IERC20Permit::IERC20PermitInstance, IERC4626::IERC4626Instance},
    errors::{VaultClientConfigError, VaultClientError},
};

mod contract_interaction;
mod erc20;
mod getters;

/// A type alias for the RPC client, which is an alloy middleware stack that
/// includes a signer derived from a raw private key, and a provider that
/// connects to the RPC endpoint over HTTP.
pub type VaultProvider = DynProvider;
/// A call builder over the vault client's provider
pub type VaultCallBuilder<'a, C> = CallBuilder<&'a VaultProvider, C>;

/// A configuration struct for the vault client, consists of the vault and
/// asset addresses, an endpoint for setting up an RPC client, and a private
/// key for signing transactions.
#[derive(Clone)]
pub struct VaultClientConfig {
    /// The address of the ERC-4626 vault
    pub vault_addr: Address,
    /// The address of the vault's deposit asset
    pub asset_addr: Address,
    /// The connected account, if it differs from the signer
    ///
    /// This is set when acting for a smart contract wallet the signer owns.
    /// Defaults to the signer's address
    pub account: Option<Address>,
    /// Which chain the client should interact with
    pub chain: Chain,
    /// HTTP-addressable RPC endpoint for the client to connect to
    pub rpc_url: String,
    /// The private key of the account to use for signing transactions
    pub private_key: PrivateKeySigner,
    /// The interval at which to poll for pending transactions
    pub block_polling_interval: Duration,
}

impl VaultClientConfig {
    /// Constructs RPC clients capable of signing transactions from the
    /// configuration
    pub(crate) fn get_provider(&self) -> Result<VaultProvider, VaultClientConfigError> {
        let url =
            Url::parse(&self.rpc_url).map_err(err_str!(VaultClientConfigError::UrlParsing))?;
        let key = self.private_key.clone();
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .with_simple_nonce_management()
            .filler(ChainIdFiller::new(Some(self.chain.chain_id())))
            .filler(GasFiller)
            .filler(BlobGasFiller::default())
            .wallet(key)
            .connect_http(url);
        provider.client().set_poll_interval(self.block_polling_interval);

        Ok(DynProvider::new(provider))
    }
}

/// The vault client, which provides a higher-level interface to an ERC-4626
/// vault and its deposit asset
#[derive(Clone)]
pub struct VaultClient {
    /// The vault contract instance
    vault: IERC4626Instance<VaultProvider>,
    /// The asset contract instance
    asset: IERC20PermitInstance<VaultProvider>,
    /// The key used to sign transactions and permits
    signer: PrivateKeySigner,
    /// The connected account
    account: Address,
    /// The chain the client is connected to
    chain: Chain,
}

impl VaultClient {
    /// Constructs a new vault client from the given configuration
    #[allow(clippy::needless_pass_by_value)]
    pub fn new(config: VaultClientConfig) -> Result<Self, VaultClientError> {
        let provider = config.get_provider()?;
        let vault = IERC4626Instance::new(config.vault_addr, provider.clone());
        let asset = IERC20PermitInstance::new(config.asset_addr, provider);
        let account = config.account.unwrap_or_else(|| config.private_key.address());

        Ok(Self { vault, asset, signer: config.private_key, account, chain: config.chain })
    }

    /// Get a vault contract client
    pub fn vault(&self) -> &IERC4626Instance<VaultProvider> {
        &self.vault
    }

    /// Get an asset contract client
    pub fn asset(&self) -> &IERC20PermitInstance<VaultProvider> {
        &self.asset
    }

    /// Get the local signer
    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    /// Get the chain the client was configured for
    pub fn chain(&self) -> Chain {
        self.chain
    }

    /// Get a reference to the underlying RPC client
    pub fn provider(&self) -> &VaultProvider {
        self.vault.provider()
    }

    /// Get the chain ID reported by the node
    pub async fn chain_id(&self) -> Result<ChainId, VaultClientError> {
        self.provider().get_chain_id().await.map_err(err_str!(VaultClientError::Rpc))
    }
}
