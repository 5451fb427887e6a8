//! Scriptable in-memory implementations of the vault collaborators

use std::{
    collections::HashMap,
    future::Future,
    sync::{Mutex, MutexGuard},
};

use alloy_primitives::{Address, B256, Bytes, TxHash, U256, address};
use async_trait::async_trait;
use metrics_util::debugging::DebuggingRecorder;
use tokio::sync::watch;
use vault_client::{
    errors::VaultClientError,
    traits::{
        ConfirmedTx, MetaTransaction, MultisigBatcher, PermitSignature, SignedBundle, VaultChain,
        VaultReader,
    },
};

use crate::{
    metrics::{OUTCOME_METRIC_TAG, PATH_METRIC_TAG},
    step::DepositStep,
};

/// The key-controlled test account
pub const EOA: Address = address!("1111111111111111111111111111111111111111");
/// A second key-controlled account the signer does not control
pub const OTHER_EOA: Address = address!("2222222222222222222222222222222222222222");
/// A Safe owned by `EOA`
pub const SAFE: Address = address!("5afe5afe5afe5afe5afe5afe5afe5afe5afe5afe");
/// The vault
pub const VAULT: Address = address!("4F2ba48FaF0bA42c4E4b7871d3861418c83aE568");
/// The vault's asset
pub const ASSET: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
/// The vault's fee recipient
pub const FEE_RECIPIENT: Address = address!("fee0fee0fee0fee0fee0fee0fee0fee0fee0fee0");

/// `n` whole units of a 6 decimal asset
pub fn usdc(n: u64) -> U256 {
    U256::from(n) * U256::from(1_000_000u64)
}

/// `n` whole vault shares at 18 decimals
pub fn shares(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
}

// ---------
// | Calls |
// ---------

/// A call made on the mock chain
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    /// A bytecode probe
    GetCode(Address),
    /// An allowance read
    Allowance {
        /// The owner
        owner: Address,
        /// The spender
        spender: Address,
    },
    /// Any other read, by method name
    Read(&'static str),
    /// An `approve` submission
    Approve {
        /// The spender
        spender: Address,
        /// The amount
        amount: U256,
    },
    /// A permit signature request
    SignPermit {
        /// The spender
        spender: Address,
        /// The value
        value: U256,
    },
    /// A `permit` submission
    Permit {
        /// The owner
        owner: Address,
        /// The spender
        spender: Address,
        /// The value
        value: U256,
    },
    /// A `deposit` submission
    Deposit {
        /// The assets deposited
        assets: U256,
        /// The share receiver
        receiver: Address,
    },
    /// A `withdraw` submission
    Withdraw {
        /// The assets withdrawn
        assets: U256,
        /// The asset receiver
        receiver: Address,
        /// The share owner
        owner: Address,
    },
    /// A `redeem` submission
    Redeem {
        /// The shares burned
        shares: U256,
        /// The asset receiver
        receiver: Address,
        /// The share owner
        owner: Address,
    },
    /// A receipt wait
    WaitForReceipt(TxHash),
}

impl Call {
    /// The name of the bytecode probe
    pub const GET_CODE: &'static str = "get_code";
    /// The name of the allowance read
    pub const ALLOWANCE: &'static str = "allowance";
    /// The name of the `approve` submission
    pub const APPROVE: &'static str = "approve";
    /// The name of the permit signature request
    pub const SIGN_PERMIT: &'static str = "sign_permit";
    /// The name of the `permit` submission
    pub const PERMIT: &'static str = "permit";
    /// The name of the `deposit` submission
    pub const DEPOSIT: &'static str = "deposit";
    /// The name of the `withdraw` submission
    pub const WITHDRAW: &'static str = "withdraw";
    /// The name of the `redeem` submission
    pub const REDEEM: &'static str = "redeem";

    /// The method name of the call
    pub fn name(&self) -> &'static str {
        match self {
            Call::GetCode(_) => Self::GET_CODE,
            Call::Allowance { .. } => Self::ALLOWANCE,
            Call::Read(name) => *name,
            Call::Approve { .. } => Self::APPROVE,
            Call::SignPermit { .. } => Self::SIGN_PERMIT,
            Call::Permit { .. } => Self::PERMIT,
            Call::Deposit { .. } => Self::DEPOSIT,
            Call::Withdraw { .. } => Self::WITHDRAW,
            Call::Redeem { .. } => Self::REDEEM,
            Call::WaitForReceipt(_) => "wait_for_receipt",
        }
    }

    /// Whether the call asks the user to sign something
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Call::Approve { .. }
                | Call::SignPermit { .. }
                | Call::Permit { .. }
                | Call::Deposit { .. }
                | Call::Withdraw { .. }
                | Call::Redeem { .. }
        )
    }
}

// --------------
// | Mock Chain |
// --------------

/// The on-chain values the mock reports
#[derive(Clone, Debug)]
pub struct MockReads {
    /// The account's allowance to the vault; `approve` and `permit` set it
    pub allowance: U256,
    /// The account's asset balance
    pub asset_balance: U256,
    /// The account's share balance
    pub share_balance: U256,
    /// The vault's total assets
    pub total_assets: U256,
    /// The vault's total share supply
    pub total_supply: U256,
    /// The vault's performance fee, scaled by 1e18
    pub fee: U256,
    /// The vault's share decimals
    pub vault_decimals: u8,
    /// The account's maximum withdrawal
    pub max_withdraw: U256,
}

impl Default for MockReads {
    fn default() -> Self {
        Self {
            allowance: U256::ZERO,
            asset_balance: usdc(500),
            share_balance: shares(100),
            total_assets: usdc(1_050_000),
            total_supply: shares(1_000_000),
            fee: U256::from(100_000_000_000_000_000u64),
            vault_decimals: 18,
            max_withdraw: usdc(105),
        }
    }
}

/// The mutable state of the mock chain
#[derive(Default)]
struct MockState {
    /// Every call, in order
    calls: Vec<Call>,
    /// The deposit step observed at each mutating call
    steps: Vec<DepositStep>,
    /// Failures returned by the next call of a method
    failures: HashMap<&'static str, VaultClientError>,
    /// Failures returned when awaiting a given transaction
    receipt_failures: HashMap<TxHash, VaultClientError>,
    /// The number of submitted transactions
    n_submitted: u8,
    /// The reported values
    reads: MockReads,
    /// A deposit step receiver
    observer: Option<watch::Receiver<DepositStep>>,
}

/// A mock chain recording calls and returning scripted values
pub struct MockVaultChain {
    /// The connected account
    account: Address,
    /// The signing key's address
    signer: Address,
    /// The bytecode at the connected account
    code: Bytes,
    /// The mutable state
    state: Mutex<MockState>,
}

impl MockVaultChain {
    /// A chain connected to a key-controlled account
    pub fn eoa() -> Self {
        Self::new(EOA, EOA, Bytes::new())
    }

    /// A chain connected to a Safe owned by the signer
    pub fn safe() -> Self {
        Self::new(SAFE, EOA, Bytes::from_static(&[0x60, 0x80, 0x60, 0x40]))
    }

    /// Construct a mock
    fn new(account: Address, signer: Address, code: Bytes) -> Self {
        Self { account, signer, code, state: Mutex::new(MockState::default()) }
    }

    /// Connect to a key-controlled account the signer does not control
    pub fn with_foreign_account(mut self) -> Self {
        self.account = OTHER_EOA;
        self
    }

    /// Set the account's allowance to the vault
    pub fn with_allowance(self, allowance: U256) -> Self {
        self.lock().reads.allowance = allowance;
        self
    }

    /// Set the reported values
    pub fn with_reads(self, reads: MockReads) -> Self {
        self.lock().reads = reads;
        self
    }

    /// Record the deposit step at every mutating call
    pub fn observe_steps(&self, observer: watch::Receiver<DepositStep>) {
        self.lock().observer = Some(observer);
    }

    /// Fail the next call of the named method
    pub fn fail_next(&self, method: &'static str, err: VaultClientError) {
        self.lock().failures.insert(method, err);
    }

    /// Fail the receipt wait of a transaction
    pub fn fail_receipt(&self, tx_hash: TxHash, err: VaultClientError) {
        self.lock().receipt_failures.insert(tx_hash, err);
    }

    /// The hash of the `i`th submitted transaction
    pub fn tx_hash(i: u8) -> TxHash {
        TxHash::with_last_byte(i + 1)
    }

    /// Every call made, in order
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// The mutating calls made, in order
    pub fn mutating_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutating).collect()
    }

    /// The deposit step observed at each mutating call
    pub fn steps_at_mutations(&self) -> Vec<DepositStep> {
        self.lock().steps.clone()
    }

    /// Lock the mock state
    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Record a call, returning its scripted failure if any
    fn record(&self, call: Call) -> Result<(), VaultClientError> {
        let mut state = self.lock();
        if call.is_mutating() {
            let step = state.observer.as_ref().map(|rx| *rx.borrow()).unwrap_or_default();
            state.steps.push(step);
        }

        let name = call.name();
        state.calls.push(call);
        match state.failures.remove(name) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Record a submission, returning its transaction hash
    fn submit(&self, call: Call) -> Result<TxHash, VaultClientError> {
        self.record(call)?;
        let mut state = self.lock();
        let tx_hash = Self::tx_hash(state.n_submitted);
        state.n_submitted += 1;
        Ok(tx_hash)
    }

    /// Record a read, returning a value from the scripted reads
    fn read<T>(&self, call: Call, f: impl FnOnce(&MockReads) -> T) -> Result<T, VaultClientError> {
        self.record(call)?;
        Ok(f(&self.lock().reads))
    }
}

#[async_trait]
impl VaultReader for MockVaultChain {
    fn vault_address(&self) -> Address {
        VAULT
    }

    fn asset_address(&self) -> Address {
        ASSET
    }

    async fn vault_name(&self) -> Result<String, VaultClientError> {
        self.read(Call::Read("vault_name"), |_| "Sova USDC Vault".to_string())
    }

    async fn vault_symbol(&self) -> Result<String, VaultClientError> {
        self.read(Call::Read("vault_symbol"), |_| "svUSDC".to_string())
    }

    async fn vault_decimals(&self) -> Result<u8, VaultClientError> {
        self.read(Call::Read("vault_decimals"), |r| r.vault_decimals)
    }

    async fn vault_asset(&self) -> Result<Address, VaultClientError> {
        self.read(Call::Read("vault_asset"), |_| ASSET)
    }

    async fn performance_fee(&self) -> Result<U256, VaultClientError> {
        self.read(Call::Read("performance_fee"), |r| r.fee)
    }

    async fn fee_recipient(&self) -> Result<Address, VaultClientError> {
        self.read(Call::Read("fee_recipient"), |_| FEE_RECIPIENT)
    }

    async fn total_assets(&self) -> Result<U256, VaultClientError> {
        self.read(Call::Read("total_assets"), |r| r.total_assets)
    }

    async fn total_supply(&self) -> Result<U256, VaultClientError> {
        self.read(Call::Read("total_supply"), |r| r.total_supply)
    }

    async fn share_balance(&self, _owner: Address) -> Result<U256, VaultClientError> {
        self.read(Call::Read("share_balance"), |r| r.share_balance)
    }

    async fn convert_to_assets(&self, shares: U256) -> Result<U256, VaultClientError> {
        self.read(Call::Read("convert_to_assets"), |r| {
            if r.total_supply.is_zero() {
                return shares;
            }
            shares * r.total_assets / r.total_supply
        })
    }

    async fn max_deposit(&self, _receiver: Address) -> Result<U256, VaultClientError> {
        self.read(Call::Read("max_deposit"), |_| U256::MAX)
    }

    async fn max_withdraw(&self, _owner: Address) -> Result<U256, VaultClientError> {
        self.read(Call::Read("max_withdraw"), |r| r.max_withdraw)
    }

    async fn asset_balance(&self, _owner: Address) -> Result<U256, VaultClientError> {
        self.read(Call::Read("asset_balance"), |r| r.asset_balance)
    }

    async fn allowance(
        &self,
        owner: Address,
        spender: Address,
    ) -> Result<U256, VaultClientError> {
        self.read(Call::Allowance { owner, spender }, |r| r.allowance)
    }

    async fn get_code(&self, address: Address) -> Result<Bytes, VaultClientError> {
        let code = if address == self.account { self.code.clone() } else { Bytes::new() };
        self.read(Call::GetCode(address), |_| code)
    }
}

#[async_trait]
impl VaultChain for MockVaultChain {
    fn account(&self) -> Address {
        self.account
    }

    fn signer_address(&self) -> Address {
        self.signer
    }

    async fn approve(&self, spender: Address, amount: U256) -> Result<TxHash, VaultClientError> {
        let tx_hash = self.submit(Call::Approve { spender, amount })?;
        self.lock().reads.allowance = amount;
        Ok(tx_hash)
    }

    async fn sign_permit(
        &self,
        spender: Address,
        value: U256,
    ) -> Result<PermitSignature, VaultClientError> {
        self.record(Call::SignPermit { spender, value })?;
        Ok(PermitSignature {
            deadline: U256::from(1_700_003_600u64),
            v: 27,
            r: B256::repeat_byte(0x11),
            s: B256::repeat_byte(0x22),
        })
    }

    async fn permit(
        &self,
        owner: Address,
        spender: Address,
        value: U256,
        _signature: PermitSignature,
    ) -> Result<TxHash, VaultClientError> {
        let tx_hash = self.submit(Call::Permit { owner, spender, value })?;
        self.lock().reads.allowance = value;
        Ok(tx_hash)
    }

    async fn deposit(&self, assets: U256, receiver: Address) -> Result<TxHash, VaultClientError> {
        self.submit(Call::Deposit { assets, receiver })
    }

    async fn withdraw(
        &self,
        assets: U256,
        receiver: Address,
        owner: Address,
    ) -> Result<TxHash, VaultClientError> {
        self.submit(Call::Withdraw { assets, receiver, owner })
    }

    async fn redeem(
        &self,
        shares: U256,
        receiver: Address,
        owner: Address,
    ) -> Result<TxHash, VaultClientError> {
        self.submit(Call::Redeem { shares, receiver, owner })
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<ConfirmedTx, VaultClientError> {
        // Suspend like a real receipt wait so step subscribers can run
        tokio::task::yield_now().await;
        self.record(Call::WaitForReceipt(tx_hash))?;
        if let Some(err) = self.lock().receipt_failures.remove(&tx_hash) {
            return Err(err);
        }

        Ok(ConfirmedTx { tx_hash, block_number: Some(1), gas_used: 21_000 })
    }
}

// ----------------
// | Mock Batcher |
// ----------------

/// A mock multisig batcher recording every bundle
#[derive(Default)]
pub struct MockBatcher {
    /// The bundles requested, in order
    bundles: Mutex<Vec<(Address, Vec<MetaTransaction>)>>,
}

impl MockBatcher {
    /// The bundles requested, in order
    pub fn bundles(&self) -> Vec<(Address, Vec<MetaTransaction>)> {
        self.bundles.lock().unwrap().clone()
    }
}

#[async_trait]
impl MultisigBatcher for MockBatcher {
    async fn create_bundle(
        &self,
        safe: Address,
        calls: Vec<MetaTransaction>,
    ) -> Result<SignedBundle, VaultClientError> {
        self.bundles.lock().unwrap().push((safe, calls));
        Ok(SignedBundle {
            safe,
            safe_tx_hash: B256::repeat_byte(0xab),
            nonce: U256::from(3u8),
            signature: Bytes::from(vec![0x1b; 65]),
            proposed: false,
        })
    }
}

// -----------
// | Metrics |
// -----------

/// The labels of one recorded metric, in the order they were given
pub type MetricLabels = Vec<(String, String)>;

/// Run `fut` on a current-thread runtime with a local metrics recorder,
/// returning its output and the labels of every metric named `name`
pub fn with_recorded_metrics<F: Future>(name: &str, fut: F) -> (F::Output, Vec<MetricLabels>) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
    let output = metrics::with_local_recorder(&recorder, || runtime.block_on(fut));

    let labels = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(key, ..)| key.into_parts().1)
        .filter(|key| key.name() == name)
        .map(|key| key.labels().map(|l| (l.key().to_string(), l.value().to_string())).collect())
        .collect();
    (output, labels)
}

/// The path and outcome labels of an operation counter
pub fn path_labels(path: &str, outcome: &str) -> MetricLabels {
    vec![
        (PATH_METRIC_TAG.to_string(), path.to_string()),
        (OUTCOME_METRIC_TAG.to_string(), outcome.to_string()),
    ]
}
