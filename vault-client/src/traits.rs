//! Trait definitions for the collaborators of vault operations
//!
//! The operations in `vault-tasks` are written against these traits rather
//! than the concrete alloy client so that the decision logic can be exercised
//! without a node.

use alloy_primitives::{Address, B256, BlockNumber, Bytes, TxHash, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;

use crate::{
    abis::{IERC20Permit, IERC4626},
    errors::VaultClientError,
};

// ---------
// | Types |
// ---------

/// A transaction that was mined with a successful status
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmedTx {
    /// The hash of the transaction
    pub tx_hash: TxHash,
    /// The block the transaction was included in
    pub block_number: Option<BlockNumber>,
    /// The gas used by the transaction
    pub gas_used: u64,
}

/// An EIP-2612 permit signature, split into the components `permit` expects
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PermitSignature {
    /// The timestamp after which the permit is invalid
    pub deadline: U256,
    /// The recovery byte, 27 or 28
    pub v: u8,
    /// The `r` component of the signature
    pub r: B256,
    /// The `s` component of the signature
    pub s: B256,
}

/// A single call to include in a multisig bundle
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetaTransaction {
    /// The contract being called
    pub to: Address,
    /// The value sent with the call
    pub value: U256,
    /// The calldata
    pub data: Bytes,
}

impl MetaTransaction {
    /// An `approve(spender, amount)` call on the given token
    pub fn approve(token: Address, spender: Address, amount: U256) -> Self {
        let data = IERC20Permit::approveCall { spender, value: amount }.abi_encode();
        Self { to: token, value: U256::ZERO, data: data.into() }
    }

    /// A `deposit(assets, receiver)` call on the given vault
    pub fn deposit(vault: Address, assets: U256, receiver: Address) -> Self {
        let data = IERC4626::depositCall { assets, receiver }.abi_encode();
        Self { to: vault, value: U256::ZERO, data: data.into() }
    }

    /// A `withdraw(assets, receiver, owner)` call on the given vault
    pub fn withdraw(vault: Address, assets: U256, receiver: Address, owner: Address) -> Self {
        let data = IERC4626::withdrawCall { assets, receiver, owner }.abi_encode();
        Self { to: vault, value: U256::ZERO, data: data.into() }
    }

    /// A `redeem(shares, receiver, owner)` call on the given vault
    pub fn redeem(vault: Address, shares: U256, receiver: Address, owner: Address) -> Self {
        let data = IERC4626::redeemCall { shares, receiver, owner }.abi_encode();
        Self { to: vault, value: U256::ZERO, data: data.into() }
    }
}

/// A multisig transaction that has been built and signed by the local owner,
/// but still requires the remaining owners' signatures before execution
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedBundle {
    /// The Safe the transaction belongs to
    pub safe: Address,
    /// The Safe transaction hash the owners sign over
    pub safe_tx_hash: B256,
    /// The Safe nonce the transaction was built for
    pub nonce: U256,
    /// The local owner's signature over the Safe transaction hash
    pub signature: Bytes,
    /// Whether the bundle was proposed to a Safe transaction service
    pub proposed: bool,
}

// ----------
// | Traits |
// ----------

/// Read-only access to the vault and its deposit asset
#[async_trait]
pub trait VaultReader: Send + Sync {
    /// The address of the vault contract
    fn vault_address(&self) -> Address;
    /// The address of the vault's deposit asset
    fn asset_address(&self) -> Address;

    // --- Vault --- //

    /// The vault's ERC-20 name
    async fn vault_name(&self) -> Result<String, VaultClientError>;
    /// The vault's ERC-20 symbol
    async fn vault_symbol(&self) -> Result<String, VaultClientError>;
    /// The vault's share decimals
    async fn vault_decimals(&self) -> Result<u8, VaultClientError>;
    /// The asset the vault reports it accepts
    async fn vault_asset(&self) -> Result<Address, VaultClientError>;
    /// The vault's performance fee, scaled by 1e18
    async fn performance_fee(&self) -> Result<U256, VaultClientError>;
    /// The recipient of the vault's performance fee
    async fn fee_recipient(&self) -> Result<Address, VaultClientError>;
    /// The total assets managed by the vault
    async fn total_assets(&self) -> Result<U256, VaultClientError>;
    /// The total supply of vault shares
    async fn total_supply(&self) -> Result<U256, VaultClientError>;
    /// The share balance of an account
    async fn share_balance(&self, owner: Address) -> Result<U256, VaultClientError>;
    /// The assets redeemable for the given number of shares
    async fn convert_to_assets(&self, shares: U256) -> Result<U256, VaultClientError>;
    /// The maximum deposit the vault accepts for a receiver
    async fn max_deposit(&self, receiver: Address) -> Result<U256, VaultClientError>;
    /// The maximum assets an owner may withdraw
    async fn max_withdraw(&self, owner: Address) -> Result<U256, VaultClientError>;

    // --- Asset --- //

    /// The asset balance of an account
    async fn asset_balance(&self, owner: Address) -> Result<U256, VaultClientError>;
    /// The asset allowance an owner has granted a spender
    async fn allowance(&self, owner: Address, spender: Address)
    -> Result<U256, VaultClientError>;

    // --- Chain --- //

    /// The bytecode deployed at an address, empty for externally owned
    /// accounts
    async fn get_code(&self, address: Address) -> Result<Bytes, VaultClientError>;
}

/// A connected wallet able to submit vault transactions
///
/// Submission methods return once the node has accepted the transaction;
/// `wait_for_receipt` awaits its inclusion
#[async_trait]
pub trait VaultChain: VaultReader {
    /// The connected account; deposits are made for and shares credited to
    /// this account
    fn account(&self) -> Address;
    /// The address of the key that signs submitted transactions
    fn signer_address(&self) -> Address;

    /// Submit `approve(spender, amount)` on the asset
    async fn approve(&self, spender: Address, amount: U256) -> Result<TxHash, VaultClientError>;
    /// Sign an EIP-2612 permit granting `spender` an allowance of `value`
    async fn sign_permit(
        &self,
        spender: Address,
        value: U256,
    ) -> Result<PermitSignature, VaultClientError>;
    /// Submit `permit(owner, spender, value, ...)` on the asset
    async fn permit(
        &self,
        owner: Address,
        spender: Address,
        value: U256,
        signature: PermitSignature,
    ) -> Result<TxHash, VaultClientError>;
    /// Submit `deposit(assets, receiver)` on the vault
    async fn deposit(&self, assets: U256, receiver: Address) -> Result<TxHash, VaultClientError>;
    /// Submit `withdraw(assets, receiver, owner)` on the vault
    async fn withdraw(
        &self,
        assets: U256,
        receiver: Address,
        owner: Address,
    ) -> Result<TxHash, VaultClientError>;
    /// Submit `redeem(shares, receiver, owner)` on the vault
    async fn redeem(
        &self,
        shares: U256,
        receiver: Address,
        owner: Address,
    ) -> Result<TxHash, VaultClientError>;

    /// Await the receipt of a submitted transaction
    ///
    /// Resolves with an error if the transaction reverted
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<ConfirmedTx, VaultClientError>;
}

/// A multisig service able to build and sign a batch of calls as a single
/// transaction
#[async_trait]
pub trait MultisigBatcher: Send + Sync {
    /// Build a transaction executing `calls` atomically from `safe`, and sign
    /// it with the local owner key
    ///
    /// Resolves once the local signature exists; execution requires the
    /// remaining owners to sign out of band
    async fn create_bundle(
        &self,
        safe: Address,
        calls: Vec<MetaTransaction>,
    ) -> Result<SignedBundle, VaultClientError>;
}
