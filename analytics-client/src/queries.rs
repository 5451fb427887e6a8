//! GraphQL query documents sent to the analytics API

use alloy_primitives::Address;

/// The current yield of a vault
pub(crate) fn vault_apy_query(vault: Address, chain_id: u64) -> String {
    format!(
        r#"query {{ vaultByAddress(address: "{vault}", chainId: {chain_id}) {{ address state {{ apy netApy avgApy }} }} }}"#
    )
}

/// The daily options clause of a historical series
fn daily_series(start: u64, end: u64) -> String {
    format!("options: {{ startTimestamp: {start}, endTimestamp: {end}, interval: DAY }}")
}

/// The current state and daily APY and deposit series of a vault
pub(crate) fn vault_history_query(vault: Address, chain_id: u64, start: u64, end: u64) -> String {
    let series = daily_series(start, end);
    format!(
        r#"query {{
  vaultByAddress(address: "{vault}", chainId: {chain_id}) {{
    address
    state {{ apy netApy avgApy totalAssetsUsd }}
    historicalState {{
      apy({series}) {{ x y }}
      totalAssetsUsd({series}) {{ x y }}
    }}
  }}
}}"#
    )
}

/// A user's position state and daily asset series in a vault
pub(crate) fn user_position_query(
    vault: Address,
    user: Address,
    chain_id: u64,
    start: u64,
    end: u64,
) -> String {
    let series = daily_series(start, end);
    format!(
        r#"query {{
  vaultPosition(vaultAddress: "{vault}", userAddress: "{user}", chainId: {chain_id}) {{
    state {{ pnl roe assets }}
    historicalState {{
      assets({series}) {{ x y }}
    }}
  }}
}}"#
    )
}
