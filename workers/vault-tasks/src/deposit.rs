//! Moves an account's asset balance into the vault
//!
//! The orchestrator picks the fewest transactions that complete the deposit:
//! - allowance covers the amount: a single `deposit`
//! - an EOA needing approval: `approve` (or a signed permit), confirmed, then
//!   `deposit`
//! - a contract wallet needing approval: one Safe transaction batching both
//!   calls, signed by the local owner and left for the remaining owners

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    sync::Arc,
};

use alloy_primitives::{Address, B256, Bytes, U256};
use common::amount::{parse_amount, to_decimal};
use tokio::sync::watch;
use tracing::{info, instrument, warn};
use vault_client::traits::{ConfirmedTx, MetaTransaction, MultisigBatcher, VaultChain};

use crate::{
    error::VaultOpError,
    metrics::{
        OUTCOME_PENDING_SIGNATURES, OUTCOME_SUCCESS, PATH_UNRESOLVED, record_deposit,
        record_deposit_volume,
    },
    step::{DepositStep, StepTracker},
};

// ---------
// | Types |
// ---------

/// A user's deposit request
#[derive(Clone, Debug)]
pub struct DepositRequest {
    /// The amount as entered, in whole units of the asset
    pub amount_text: String,
    /// The decimals of the asset
    pub asset_decimals: u8,
    /// Whether the user asked to deposit their full balance
    pub is_max_deposit: bool,
    /// The account's asset balance read from chain, in base units
    pub available_balance: Option<U256>,
}

impl DepositRequest {
    /// Resolve the amount to deposit, in base units of the asset
    ///
    /// A max deposit uses the on-chain balance verbatim so no dust is left
    /// behind by a rounded display value. Otherwise the text is parsed as a
    /// fixed-point decimal, rounding down extra precision
    pub fn resolve_amount(&self) -> Result<U256, VaultOpError> {
        let max_balance = self.available_balance.filter(|b| self.is_max_deposit && !b.is_zero());
        if let Some(balance) = max_balance {
            return Ok(balance);
        }

        Ok(parse_amount(&self.amount_text, self.asset_decimals)?)
    }
}

/// Whether an account is controlled directly by a key or by contract code
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalletKind {
    /// A key-controlled account without bytecode
    ExternallyOwnedAccount,
    /// An account with deployed bytecode, e.g. a Safe
    ContractWallet,
}

impl WalletKind {
    /// Classify an account by its deployed bytecode
    pub fn from_code(code: &Bytes) -> Self {
        if code.is_empty() { WalletKind::ExternallyOwnedAccount } else { WalletKind::ContractWallet }
    }
}

/// The sequence of transactions a deposit used
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DepositPath {
    /// A single `deposit` against an existing allowance
    Direct,
    /// `approve` then `deposit`
    ApproveThenDeposit,
    /// `permit` then `deposit`
    PermitThenDeposit,
    /// A Safe transaction batching the calls
    SafeBundle,
}

impl DepositPath {
    /// The metric tag for the path
    pub fn as_str(&self) -> &'static str {
        match self {
            DepositPath::Direct => "direct",
            DepositPath::ApproveThenDeposit => "approve",
            DepositPath::PermitThenDeposit => "permit",
            DepositPath::SafeBundle => "safe_bundle",
        }
    }
}

impl Display for DepositPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// The result of a successful deposit
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DepositOutcome {
    /// The deposit was mined
    Confirmed {
        /// The approval or permit transaction, if one was needed
        approval: Option<ConfirmedTx>,
        /// The deposit transaction
        deposit: ConfirmedTx,
    },
    /// A Safe transaction was built and signed by the local owner; it
    /// executes once the remaining owners sign
    PendingSignatures {
        /// The Safe transaction hash the owners sign over
        safe_tx_hash: B256,
        /// The Safe nonce the transaction occupies
        nonce: U256,
        /// The local owner's signature
        signature: Bytes,
        /// Whether the transaction was proposed to a transaction service
        proposed: bool,
    },
}

impl DepositOutcome {
    /// Whether the deposit is final on chain
    pub fn is_confirmed(&self) -> bool {
        matches!(self, DepositOutcome::Confirmed { .. })
    }
}

/// A deposit whose amount is resolved and whose path is selected
#[derive(Clone, Copy, Debug)]
struct DepositPlan {
    /// The account depositing and receiving shares
    account: Address,
    /// The amount to deposit, in base units of the asset
    amount: U256,
    /// Whether the vault's allowance must be raised first
    needs_approval: bool,
    /// The selected path
    path: DepositPath,
}

// ----------------
// | Orchestrator |
// ----------------

/// Runs deposits for the connected account and publishes their progress
///
/// At most one deposit should be in flight per orchestrator; callers gate
/// new requests on [`DepositOrchestrator::is_processing`]
pub struct DepositOrchestrator<C: VaultChain, B: MultisigBatcher> {
    /// The chain client
    chain: Arc<C>,
    /// The multisig batcher used for contract wallets
    batcher: Arc<B>,
    /// Whether EOAs grant allowance with a signed permit instead of `approve`
    use_permit: bool,
    /// The current step
    step: StepTracker,
}

impl<C: VaultChain, B: MultisigBatcher> DepositOrchestrator<C, B> {
    /// Create a new orchestrator
    pub fn new(chain: Arc<C>, batcher: Arc<B>, use_permit: bool) -> Self {
        Self { chain, batcher, use_permit, step: StepTracker::new() }
    }

    /// Subscribe to step changes
    pub fn subscribe(&self) -> watch::Receiver<DepositStep> {
        self.step.subscribe()
    }

    /// The current step
    pub fn current_step(&self) -> DepositStep {
        self.step.current()
    }

    /// Whether a deposit is submitting or awaiting a transaction
    pub fn is_processing(&self) -> bool {
        self.current_step().is_processing()
    }

    /// Deposit into the vault for the connected account
    ///
    /// The step is reset to `Idle`, advanced before each mutating call, and
    /// ends at `Completed` or `Error`. Errors carry their underlying cause
    #[instrument(skip_all, err, fields(max = request.is_max_deposit))]
    pub async fn deposit(&self, request: &DepositRequest) -> Result<DepositOutcome, VaultOpError> {
        self.step.reset();

        let plan = match self.plan(request).await {
            Ok(plan) => plan,
            Err(e) => return Err(self.fail(PATH_UNRESOLVED, e)),
        };
        let outcome = match self.run(&plan).await {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.fail(plan.path.as_str(), e)),
        };

        self.step.advance(DepositStep::Completed)?;
        let tag = match outcome {
            DepositOutcome::Confirmed { .. } => OUTCOME_SUCCESS,
            DepositOutcome::PendingSignatures { .. } => OUTCOME_PENDING_SIGNATURES,
        };
        record_deposit(plan.path.as_str(), tag);
        if outcome.is_confirmed() {
            record_deposit_volume(to_decimal(plan.amount, request.asset_decimals));
        }
        info!("deposit completed via {}", plan.path);

        Ok(outcome)
    }

    /// Move the step to `Error` and record the failure against `path`
    fn fail(&self, path: &'static str, err: VaultOpError) -> VaultOpError {
        self.step.fail();
        record_deposit(path, err.kind());
        err
    }

    /// Resolve the amount and select the path the deposit takes
    async fn plan(&self, request: &DepositRequest) -> Result<DepositPlan, VaultOpError> {
        // Rejected before any network call
        let amount = request.resolve_amount()?;

        let account = self.chain.account();
        let vault = self.chain.vault_address();
        let wallet = self.wallet_kind(account).await?;
        let allowance = self.chain.allowance(account, vault).await?;
        let needs_approval = allowance < amount;
        info!(
            "depositing {amount} for {account} ({wallet:?}), allowance {allowance}, \
             needs approval: {needs_approval}"
        );

        // A contract wallet the signer does not control deposits through its
        // own transaction even when no approval is needed
        let signer = self.chain.signer_address();
        let path = match wallet {
            WalletKind::ContractWallet if needs_approval || account != signer => {
                DepositPath::SafeBundle
            },
            _ if !needs_approval => DepositPath::Direct,
            _ if self.use_permit => DepositPath::PermitThenDeposit,
            _ => DepositPath::ApproveThenDeposit,
        };

        Ok(DepositPlan { account, amount, needs_approval, path })
    }

    /// Run a planned deposit
    async fn run(&self, plan: &DepositPlan) -> Result<DepositOutcome, VaultOpError> {
        match plan.path {
            DepositPath::SafeBundle => {
                let vault = self.chain.vault_address();
                let mut calls = Vec::with_capacity(2);
                if plan.needs_approval {
                    calls.push(MetaTransaction::approve(
                        self.chain.asset_address(),
                        vault,
                        plan.amount,
                    ));
                }
                calls.push(MetaTransaction::deposit(vault, plan.amount, plan.account));

                self.deposit_with_bundle(plan.account, calls).await
            },
            path => self.deposit_sequential(plan.account, plan.amount, path).await,
        }
    }

    /// Probe whether an account has deployed bytecode
    ///
    /// A failed probe is a network error rather than evidence of an EOA
    async fn wallet_kind(&self, account: Address) -> Result<WalletKind, VaultOpError> {
        let code = self.chain.get_code(account).await.map_err(VaultOpError::network)?;
        Ok(WalletKind::from_code(&code))
    }

    /// Deposit from a key-controlled account, granting allowance first unless
    /// the path is direct
    ///
    /// The deposit is submitted only after the approval's receipt resolves
    async fn deposit_sequential(
        &self,
        account: Address,
        amount: U256,
        path: DepositPath,
    ) -> Result<DepositOutcome, VaultOpError> {
        let signer = self.chain.signer_address();
        if account != signer {
            return Err(VaultOpError::missing_context(format!(
                "signer {signer} cannot submit transactions for account {account}"
            )));
        }

        let mut approval = None;
        if path != DepositPath::Direct {
            self.step.advance(DepositStep::Approving)?;
            let confirmed = if path == DepositPath::PermitThenDeposit {
                self.grant_with_permit(account, amount).await?
            } else {
                self.grant_with_approve(amount).await?
            };

            approval = Some(confirmed);
            self.refetch_allowance(account, amount).await?;
        }

        self.step.advance(DepositStep::Depositing)?;
        let tx_hash = self.chain.deposit(amount, account).await?;
        let deposit = self.chain.wait_for_receipt(tx_hash).await?;

        Ok(DepositOutcome::Confirmed { approval, deposit })
    }

    /// Approve the vault to pull `amount`, awaiting confirmation
    async fn grant_with_approve(&self, amount: U256) -> Result<ConfirmedTx, VaultOpError> {
        let vault = self.chain.vault_address();
        let tx_hash = self.chain.approve(vault, amount).await?;
        Ok(self.chain.wait_for_receipt(tx_hash).await?)
    }

    /// Grant the vault an allowance of `amount` with a signed permit,
    /// awaiting confirmation of the `permit` call
    async fn grant_with_permit(
        &self,
        owner: Address,
        amount: U256,
    ) -> Result<ConfirmedTx, VaultOpError> {
        let vault = self.chain.vault_address();
        let signature = self.chain.sign_permit(vault, amount).await?;
        let tx_hash = self.chain.permit(owner, vault, amount, signature).await?;
        Ok(self.chain.wait_for_receipt(tx_hash).await?)
    }

    /// Re-read the allowance after an approval is confirmed
    ///
    /// A node that has not caught up may still report the old allowance; this
    /// is logged but does not fail the deposit
    async fn refetch_allowance(&self, owner: Address, amount: U256) -> Result<(), VaultOpError> {
        let vault = self.chain.vault_address();
        let allowance = self.chain.allowance(owner, vault).await?;
        if allowance < amount {
            warn!("allowance {allowance} still below {amount} after approval confirmed");
        }

        Ok(())
    }

    /// Build and sign a Safe transaction executing `calls` from `safe`
    ///
    /// Completes once the local owner has signed; execution is left to the
    /// remaining owners
    async fn deposit_with_bundle(
        &self,
        safe: Address,
        calls: Vec<MetaTransaction>,
    ) -> Result<DepositOutcome, VaultOpError> {
        let first = if calls.len() > 1 { DepositStep::Approving } else { DepositStep::Depositing };
        self.step.advance(first)?;

        let bundle = self.batcher.create_bundle(safe, calls).await?;
        info!(
            "Safe tx {:#x} signed at nonce {}, awaiting remaining owners",
            bundle.safe_tx_hash, bundle.nonce
        );

        if first == DepositStep::Approving {
            self.step.advance(DepositStep::Depositing)?;
        }

        Ok(DepositOutcome::PendingSignatures {
            safe_tx_hash: bundle.safe_tx_hash,
            nonce: bundle.nonce,
            signature: bundle.signature,
            proposed: bundle.proposed,
        })
    }
}
