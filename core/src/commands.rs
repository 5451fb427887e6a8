//! Runs a single command and prints its result

use analytics_client::types::{DataPoint, TimeRange};
use common::amount::format_amount;
use eyre::{Result, eyre};
use tokio::{sync::watch, task::JoinHandle};
use tracing::info;
use vault_client::traits::{ConfirmedTx, VaultReader};
use vault_tasks::{
    deposit::{DepositOutcome, DepositRequest},
    step::DepositStep,
    withdraw::{WithdrawOutcome, WithdrawRequest},
};

use crate::setup::VaultServices;

/// The number of trailing history points printed
const HISTORY_TAIL_LEN: usize = 7;

// ------------
// | Deposits |
// ------------

/// Deposit `amount` (or the full balance with `max`) into the vault
pub async fn deposit(services: &VaultServices, amount: String, max: bool) -> Result<()> {
    let available_balance = if max {
        Some(services.client.asset_balance(services.account).await?)
    } else {
        None
    };
    let request = DepositRequest {
        amount_text: amount,
        asset_decimals: services.asset_decimals,
        is_max_deposit: max,
        available_balance,
    };

    let orchestrator = services.deposit_orchestrator();
    let watcher = print_steps(orchestrator.subscribe());
    let res = orchestrator.deposit(&request).await;

    // Close the step channel so the watcher drains and exits
    drop(orchestrator);
    watcher.await?;

    match res? {
        DepositOutcome::Confirmed { approval, deposit } => {
            if let Some(tx) = approval {
                print_confirmed("approval", &tx);
            }
            print_confirmed("deposit", &deposit);
        },
        DepositOutcome::PendingSignatures { safe_tx_hash, nonce, signature, proposed } => {
            println!("Safe transaction signed, awaiting the remaining owners");
            println!("  safe tx hash: {safe_tx_hash:#x}");
            println!("  nonce:        {nonce}");
            println!("  signature:    {signature}");
            print_proposal_status(proposed);
        },
    }

    Ok(())
}

/// Print each deposit step until the orchestrator is dropped
fn print_steps(mut steps: watch::Receiver<DepositStep>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while steps.changed().await.is_ok() {
            let step = *steps.borrow_and_update();
            if step != DepositStep::Idle {
                println!("[{step}]");
            }
        }
    })
}

// ---------------
// | Withdrawals |
// ---------------

/// Withdraw `amount` from the vault, or redeem every share with `max`
pub async fn withdraw(services: &VaultServices, amount: String, max: bool) -> Result<()> {
    let request = WithdrawRequest {
        amount_text: amount,
        asset_decimals: services.asset_decimals,
        is_max_withdraw: max,
        share_balance: None,
    };

    match services.withdraw_operation().withdraw(&request).await? {
        WithdrawOutcome::Confirmed(tx) => print_confirmed("withdrawal", &tx),
        WithdrawOutcome::PendingSignatures { safe_tx_hash, proposed } => {
            println!("Safe transaction signed, awaiting the remaining owners");
            println!("  safe tx hash: {safe_tx_hash:#x}");
            print_proposal_status(proposed);
        },
    }

    Ok(())
}

// ---------
// | Reads |
// ---------

/// Print the vault's state and the account's position
pub async fn snapshot(services: &VaultServices) -> Result<()> {
    let snap = services.snapshot_aggregator().refresh(services.account).await?;
    let decimals = snap.asset_decimals;

    println!("{} ({})", snap.vault_name, snap.vault_symbol);
    println!("  asset:                 {}", snap.asset);
    println!("  total assets:          {}", format_amount(snap.total_assets, decimals));
    println!("  total supply:          {}", format_amount(snap.total_supply, snap.vault_decimals));
    println!("  share price:           {:.6}", snap.share_price());
    println!("  performance fee:       {:.2}%", snap.fee_percentage());
    println!("  fee recipient:         {}", snap.fee_recipient);
    if let Some(apy) = &snap.apy {
        println!("  apy:                   {}", format_percent(apy.apy));
        println!("  net apy:               {}", format_percent(apy.net_apy));
    }

    println!("Account {}", services.account);
    println!("  wallet balance:        {}", format_amount(snap.asset_balance, decimals));
    println!("  allowance:             {}", format_amount(snap.allowance, decimals));
    println!("  shares:                {}", format_amount(snap.share_balance, snap.vault_decimals));
    println!("  position:              {}", format_amount(snap.user_assets, decimals));
    println!("  max deposit:           {}", format_amount(snap.max_deposit, decimals));
    println!("  available to withdraw: {}", format_amount(snap.available_to_withdraw(), decimals));

    Ok(())
}

/// Print the vault's APY and deposit history over `range`
pub async fn history(services: &VaultServices, range: &str) -> Result<()> {
    let range = parse_range(range)?;
    let Some(history) = services.analytics.vault_history(services.vault, range).await? else {
        println!("No history for vault {}", services.vault);
        return Ok(());
    };

    println!("Vault {} over {range}", services.vault);
    println!("  current apy:      {:.2}%", history.current_apy);
    println!("  average apy:      {:.2}%", history.avg_apy);
    println!("  current deposits: ${:.2}", history.current_deposits);
    print_series("apy (%)", &history.apy_history);
    print_series("deposits ($)", &history.deposits_history);

    Ok(())
}

/// Print the account's PnL and position history over `range`
pub async fn position(services: &VaultServices, range: &str) -> Result<()> {
    let range = parse_range(range)?;
    let position = services
        .analytics
        .user_position(services.vault, services.account, range, services.asset_decimals)
        .await?;

    if position.is_empty() {
        println!("No position for {} in vault {}", services.account, services.vault);
        return Ok(());
    }

    println!("Position of {} over {range}", services.account);
    println!("  pnl: {:.2}", position.pnl);
    println!("  roe: {:.2}%", position.roe);
    print_series("position", &position.position_history);

    Ok(())
}

// -----------
// | Helpers |
// -----------

/// Parse a history range argument
fn parse_range(range: &str) -> Result<TimeRange> {
    range.parse().map_err(|e: String| eyre!(e))
}

/// Print a confirmed transaction
fn print_confirmed(label: &str, tx: &ConfirmedTx) {
    info!("{label} confirmed: {:#x}", tx.tx_hash);
    let block = tx.block_number.map(|b| b.to_string()).unwrap_or_else(|| "pending".to_string());
    println!("{label} confirmed in block {block} (gas used {})", tx.gas_used);
    println!("  tx hash: {:#x}", tx.tx_hash);
}

/// Print whether a Safe transaction was proposed to a transaction service
fn print_proposal_status(proposed: bool) {
    if proposed {
        println!("  proposed to the Safe transaction service");
    } else {
        println!("  share the hash and signature with the other owners to execute");
    }
}

/// Print the trailing points of a daily series
fn print_series(label: &str, series: &[DataPoint]) {
    println!("  {label}:");
    let start = series.len().saturating_sub(HISTORY_TAIL_LEN);
    for point in &series[start..] {
        println!("    {:>6}  {:.2}", point.date, point.value);
    }
}

/// Format an optional fraction as a percentage
fn format_percent(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}%", v * 100.)).unwrap_or_else(|| "-".to_string())
}
