//! Burns vault shares for the underlying asset
//!
//! A full withdrawal redeems the exact share balance so no dust is left in
//! the vault; a partial withdrawal names the asset amount and lets the vault
//! compute the shares to burn. Shares are burned from the owner directly, so
//! there is no approval step

use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use common::amount::{AmountError, parse_amount};
use tracing::{info, instrument};
use vault_client::traits::{ConfirmedTx, MetaTransaction, MultisigBatcher, VaultChain};

use crate::{
    deposit::WalletKind,
    error::VaultOpError,
    metrics::{OUTCOME_PENDING_SIGNATURES, OUTCOME_SUCCESS, PATH_UNRESOLVED, record_withdrawal},
};

/// A user's withdrawal request
#[derive(Clone, Debug)]
pub struct WithdrawRequest {
    /// The amount as entered, in whole units of the asset
    pub amount_text: String,
    /// The decimals of the asset
    pub asset_decimals: u8,
    /// Whether the user asked to withdraw their full position
    pub is_max_withdraw: bool,
    /// The account's share balance, if already read; read from chain
    /// otherwise
    pub share_balance: Option<U256>,
}

/// How a withdrawal is expressed to the vault
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WithdrawMode {
    /// `redeem` an exact number of shares
    RedeemShares(U256),
    /// `withdraw` an exact amount of the asset
    WithdrawAssets(U256),
}

impl WithdrawMode {
    /// The metric tag for the mode
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawMode::RedeemShares(_) => "redeem",
            WithdrawMode::WithdrawAssets(_) => "withdraw",
        }
    }
}

/// The result of a successful withdrawal
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WithdrawOutcome {
    /// The withdrawal was mined
    Confirmed(ConfirmedTx),
    /// A Safe transaction was built and signed by the local owner
    PendingSignatures {
        /// The Safe transaction hash the owners sign over
        safe_tx_hash: B256,
        /// Whether the transaction was proposed to a transaction service
        proposed: bool,
    },
}

/// Withdraws from the vault for the connected account
pub struct WithdrawOperation<C: VaultChain, B: MultisigBatcher> {
    /// The chain client
    chain: Arc<C>,
    /// The multisig batcher used when the signer acts for a Safe
    batcher: Arc<B>,
}

impl<C: VaultChain, B: MultisigBatcher> WithdrawOperation<C, B> {
    /// Create a new withdraw operation
    pub fn new(chain: Arc<C>, batcher: Arc<B>) -> Self {
        Self { chain, batcher }
    }

    /// Resolve how the withdrawal is expressed
    ///
    /// A max withdrawal with a non-zero share balance redeems the balance;
    /// anything else parses the amount text, rejecting empty input
    pub async fn resolve_mode(
        &self,
        request: &WithdrawRequest,
    ) -> Result<WithdrawMode, VaultOpError> {
        if request.is_max_withdraw {
            let shares = match request.share_balance {
                Some(shares) => shares,
                None => self.chain.share_balance(self.chain.account()).await?,
            };

            if !shares.is_zero() {
                return Ok(WithdrawMode::RedeemShares(shares));
            }
        }

        if request.amount_text.trim().is_empty() {
            return Err(AmountError::Empty.into());
        }
        let assets = parse_amount(&request.amount_text, request.asset_decimals)?;
        Ok(WithdrawMode::WithdrawAssets(assets))
    }

    /// Withdraw for the connected account, sending the assets to it
    #[instrument(skip_all, err, fields(max = request.is_max_withdraw))]
    pub async fn withdraw(
        &self,
        request: &WithdrawRequest,
    ) -> Result<WithdrawOutcome, VaultOpError> {
        let mode = match self.resolve_mode(request).await {
            Ok(mode) => mode,
            Err(e) => {
                record_withdrawal(PATH_UNRESOLVED, e.kind());
                return Err(e);
            },
        };

        let res = self.execute(mode).await;
        let tag = match &res {
            Ok(WithdrawOutcome::Confirmed(_)) => OUTCOME_SUCCESS,
            Ok(WithdrawOutcome::PendingSignatures { .. }) => OUTCOME_PENDING_SIGNATURES,
            Err(e) => e.kind(),
        };
        record_withdrawal(mode.as_str(), tag);

        res
    }

    /// Submit the withdrawal from the account or through its Safe
    ///
    /// An account the signer does not hold the key for must be a contract
    /// wallet; a foreign EOA is rejected before any transaction
    async fn execute(&self, mode: WithdrawMode) -> Result<WithdrawOutcome, VaultOpError> {
        let account = self.chain.account();
        let signer = self.chain.signer_address();
        info!("withdrawing for {account} via {mode:?}");
        if account == signer {
            return self.withdraw_direct(account, mode).await;
        }

        let code = self.chain.get_code(account).await.map_err(VaultOpError::network)?;
        match WalletKind::from_code(&code) {
            WalletKind::ContractWallet => self.withdraw_with_bundle(account, mode).await,
            WalletKind::ExternallyOwnedAccount => Err(VaultOpError::missing_context(format!(
                "signer {signer} cannot submit transactions for account {account}"
            ))),
        }
    }

    /// Submit the withdrawal from the signer's own account and await it
    async fn withdraw_direct(
        &self,
        account: Address,
        mode: WithdrawMode,
    ) -> Result<WithdrawOutcome, VaultOpError> {
        let tx_hash = match mode {
            WithdrawMode::RedeemShares(shares) => {
                self.chain.redeem(shares, account, account).await?
            },
            WithdrawMode::WithdrawAssets(assets) => {
                self.chain.withdraw(assets, account, account).await?
            },
        };

        let receipt = self.chain.wait_for_receipt(tx_hash).await?;
        Ok(WithdrawOutcome::Confirmed(receipt))
    }

    /// Build and sign a Safe transaction withdrawing for the Safe
    async fn withdraw_with_bundle(
        &self,
        safe: Address,
        mode: WithdrawMode,
    ) -> Result<WithdrawOutcome, VaultOpError> {
        let vault = self.chain.vault_address();
        let call = match mode {
            WithdrawMode::RedeemShares(shares) => MetaTransaction::redeem(vault, shares, safe, safe),
            WithdrawMode::WithdrawAssets(assets) => {
                MetaTransaction::withdraw(vault, assets, safe, safe)
            },
        };

        let bundle = self.batcher.create_bundle(safe, vec![call]).await?;
        Ok(WithdrawOutcome::PendingSignatures {
            safe_tx_hash: bundle.safe_tx_hash,
            proposed: bundle.proposed,
        })
    }
}

#[cfg(test)]
mod test {
    use vault_client::{errors::VaultClientError, traits::VaultReader};

    use super::*;
    use crate::{
        metrics::NUM_WITHDRAWALS_METRIC,
        test_helpers::{
            Call, MockBatcher, MockVaultChain, path_labels, shares, usdc, with_recorded_metrics,
        },
    };

    /// A request for `text` of a 6 decimal asset
    fn request(text: &str, is_max: bool, share_balance: Option<U256>) -> WithdrawRequest {
        WithdrawRequest {
            amount_text: text.to_string(),
            asset_decimals: 6,
            is_max_withdraw: is_max,
            share_balance,
        }
    }

    /// Build an operation over the given mock chain
    fn operation(
        chain: &Arc<MockVaultChain>,
    ) -> (WithdrawOperation<MockVaultChain, MockBatcher>, Arc<MockBatcher>) {
        let batcher = Arc::new(MockBatcher::default());
        (WithdrawOperation::new(chain.clone(), batcher.clone()), batcher)
    }

    #[tokio::test]
    async fn test_max_withdraw_redeems_share_balance() {
        let chain = Arc::new(MockVaultChain::eoa());
        let (op, _) = operation(&chain);

        let balance = shares(42);
        let outcome = op.withdraw(&request("105.00", true, Some(balance))).await.unwrap();
        assert!(matches!(outcome, WithdrawOutcome::Confirmed(_)));

        let account = chain.account();
        assert_eq!(
            chain.mutating_calls(),
            vec![Call::Redeem { shares: balance, receiver: account, owner: account }]
        );
    }

    #[tokio::test]
    async fn test_max_withdraw_reads_share_balance() {
        let chain = Arc::new(MockVaultChain::eoa());
        let (op, _) = operation(&chain);

        op.withdraw(&request("", true, None)).await.unwrap();

        let account = chain.account();
        assert!(chain.calls().contains(&Call::Read("share_balance")));
        assert_eq!(
            chain.mutating_calls(),
            vec![Call::Redeem { shares: shares(100), receiver: account, owner: account }]
        );
    }

    #[tokio::test]
    async fn test_partial_withdraw_by_assets() {
        let chain = Arc::new(MockVaultChain::eoa());
        let (op, _) = operation(&chain);

        op.withdraw(&request("12.5", false, Some(shares(42)))).await.unwrap();

        let account = chain.account();
        assert_eq!(
            chain.mutating_calls(),
            vec![Call::Withdraw { assets: U256::from(12_500_000u64), receiver: account, owner: account }]
        );
    }

    #[tokio::test]
    async fn test_max_with_no_shares_falls_back_to_amount() {
        let chain = Arc::new(MockVaultChain::eoa());
        let (op, _) = operation(&chain);

        op.withdraw(&request("3", true, Some(U256::ZERO))).await.unwrap();
        assert!(matches!(chain.mutating_calls()[0], Call::Withdraw { assets, .. } if assets == usdc(3)));
    }

    #[tokio::test]
    async fn test_empty_amount_rejected_before_network() {
        let chain = Arc::new(MockVaultChain::eoa());
        let (op, _) = operation(&chain);

        let err = op.withdraw(&request("  ", false, None)).await.unwrap_err();
        assert!(matches!(err, VaultOpError::InvalidAmount(AmountError::Empty)));
        assert!(chain.calls().is_empty());
    }

    #[tokio::test]
    async fn test_reverted_withdraw_surfaces() {
        let chain = Arc::new(MockVaultChain::eoa());
        chain.fail_receipt(MockVaultChain::tx_hash(0), VaultClientError::Reverted("status 0".into()));
        let (op, _) = operation(&chain);

        let err = op.withdraw(&request("1", false, None)).await.unwrap_err();
        assert!(matches!(err, VaultOpError::TransactionReverted(_)));
    }

    #[tokio::test]
    async fn test_safe_withdraw_is_bundled() {
        let chain = Arc::new(MockVaultChain::safe());
        let (op, batcher) = operation(&chain);

        let outcome = op.withdraw(&request("", true, Some(shares(7)))).await.unwrap();
        assert!(matches!(outcome, WithdrawOutcome::PendingSignatures { .. }));
        assert!(chain.mutating_calls().is_empty());

        let safe = chain.account();
        let bundles = batcher.bundles();
        assert_eq!(
            bundles,
            vec![(safe, vec![MetaTransaction::redeem(chain.vault_address(), shares(7), safe, safe)])]
        );
    }

    #[tokio::test]
    async fn test_foreign_eoa_is_missing_context() {
        let chain = Arc::new(MockVaultChain::eoa().with_foreign_account());
        let (op, batcher) = operation(&chain);

        let err = op.withdraw(&request("1", false, None)).await.unwrap_err();
        assert!(matches!(err, VaultOpError::MissingContext(..)));
        assert!(chain.calls().contains(&Call::GetCode(chain.account())));
        assert!(chain.mutating_calls().is_empty());
        assert!(batcher.bundles().is_empty());
    }

    #[tokio::test]
    async fn test_wallet_probe_failure_is_network_error() {
        let chain = Arc::new(MockVaultChain::safe());
        chain.fail_next(Call::GET_CODE, VaultClientError::rpc("connection refused"));
        let (op, batcher) = operation(&chain);

        let err = op.withdraw(&request("1", false, None)).await.unwrap_err();
        assert!(matches!(err, VaultOpError::Network(_)));
        assert!(batcher.bundles().is_empty());
    }

    #[test]
    fn test_metrics_tag_withdraw_mode() {
        let chain = Arc::new(MockVaultChain::eoa().with_foreign_account());
        let (op, _) = operation(&chain);

        let (res, labels) =
            with_recorded_metrics(NUM_WITHDRAWALS_METRIC, op.withdraw(&request("1", false, None)));
        assert!(res.is_err());
        assert_eq!(labels, vec![path_labels("withdraw", "missing_context")]);

        let chain = Arc::new(MockVaultChain::eoa());
        let (op, _) = operation(&chain);
        let (res, labels) = with_recorded_metrics(
            NUM_WITHDRAWALS_METRIC,
            op.withdraw(&request("", true, Some(shares(3)))),
        );
        assert!(res.is_ok());
        assert_eq!(labels, vec![path_labels("redeem", OUTCOME_SUCCESS)]);
    }
}
