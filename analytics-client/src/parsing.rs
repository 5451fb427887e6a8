//! Deserialization of analytics API responses into the client's types
//!
//! The API reports yields as fractions and position amounts in base units of
//! the deposit asset. Points with a null value are dropped and every series
//! is sorted by timestamp.

use chrono::DateTime;
use serde::Deserialize;

use crate::{
    errors::AnalyticsClientError,
    types::{DataPoint, UserPosition, VaultApy, VaultHistory},
};

// ------------------
// | Response Types |
// ------------------

/// The envelope of a GraphQL response
#[derive(Deserialize)]
struct GraphQlResponse<T> {
    /// The query result
    data: Option<T>,
    /// The errors raised by the query, if any
    errors: Option<Vec<GraphQlError>>,
}

/// An error raised by a GraphQL query
#[derive(Deserialize)]
struct GraphQlError {
    /// The error message
    #[serde(default)]
    message: String,
}

/// A number the API encodes either as a JSON number or a decimal string
#[derive(Clone, Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    /// A JSON number
    Number(f64),
    /// A decimal string, used for big integers
    Text(String),
}

impl LooseNumber {
    /// Convert to a float, `None` if the string is not numeric
    fn as_f64(&self) -> Option<f64> {
        match self {
            LooseNumber::Number(n) => Some(*n),
            LooseNumber::Text(s) => s.parse().ok(),
        }
    }
}

/// A point of a historical series
#[derive(Deserialize)]
struct RawPoint {
    /// The timestamp, in seconds
    x: f64,
    /// The value, null when the API has no data for the day
    y: Option<LooseNumber>,
}

/// The `vaultByAddress` query result
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VaultByAddressData {
    /// The vault, null if unknown to the API
    vault_by_address: Option<RawVault>,
}

/// A vault as returned by the API
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVault {
    /// The current state of the vault
    state: Option<RawVaultState>,
    /// The vault's historical series
    historical_state: Option<RawVaultHistory>,
}

/// The current state of a vault
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVaultState {
    /// The gross APY
    apy: Option<LooseNumber>,
    /// The APY net of fees
    net_apy: Option<LooseNumber>,
    /// The average APY
    avg_apy: Option<LooseNumber>,
    /// The total deposits, in USD
    total_assets_usd: Option<LooseNumber>,
}

/// The historical series of a vault
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVaultHistory {
    /// The daily APY
    #[serde(default)]
    apy: Option<Vec<RawPoint>>,
    /// The daily total deposits, in USD
    #[serde(default)]
    total_assets_usd: Option<Vec<RawPoint>>,
}

/// The `vaultPosition` query result
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VaultPositionData {
    /// The position, null if the user never deposited
    vault_position: Option<RawPosition>,
}

/// A user position as returned by the API
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPosition {
    /// The current state of the position
    state: Option<RawPositionState>,
    /// The position's historical series
    historical_state: Option<RawPositionHistory>,
}

/// The current state of a position
#[derive(Deserialize)]
struct RawPositionState {
    /// Profit and loss, in base units
    pnl: Option<LooseNumber>,
    /// Return on equity, as a fraction
    roe: Option<LooseNumber>,
}

/// The historical series of a position
#[derive(Deserialize)]
struct RawPositionHistory {
    /// The daily position value, in base units
    #[serde(default)]
    assets: Option<Vec<RawPoint>>,
}

// -----------
// | Parsing |
// -----------

/// Deserialize a response envelope
fn parse_envelope<T: for<'de> Deserialize<'de>>(
    body: &str,
) -> Result<GraphQlResponse<T>, AnalyticsClientError> {
    serde_json::from_str(body).map_err(AnalyticsClientError::serde)
}

/// The message of the first error in a response, if any
fn first_error(errors: Option<&Vec<GraphQlError>>) -> Option<String> {
    let errors = errors?;
    let first = errors.first().map(|e| e.message.clone()).unwrap_or_default();
    if first.is_empty() { Some("GraphQL query failed".to_string()) } else { Some(first) }
}

/// Format a short date label for a timestamp in seconds
fn date_label(timestamp_secs: i64) -> String {
    DateTime::from_timestamp(timestamp_secs, 0)
        .map(|dt| dt.format("%b %-d").to_string())
        .unwrap_or_default()
}

/// Convert a raw series, scaling each value, dropping null points and sorting
/// by timestamp
fn to_series(points: Option<Vec<RawPoint>>, scale: f64) -> Vec<DataPoint> {
    let mut series: Vec<DataPoint> = points
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| {
            let value = p.y.as_ref().and_then(LooseNumber::as_f64)?;
            let secs = p.x as i64;
            Some(DataPoint { timestamp_ms: secs * 1000, date: date_label(secs), value: value * scale })
        })
        .collect();

    series.sort_by_key(|p| p.timestamp_ms);
    series
}

/// Read an optional loose number
fn loose(n: Option<&LooseNumber>) -> Option<f64> {
    n.and_then(LooseNumber::as_f64)
}

/// Parse the current yield of a vault
///
/// Returns `None` if the API has no state for the vault
pub(crate) fn parse_vault_apy(body: &str) -> Result<Option<VaultApy>, AnalyticsClientError> {
    let resp: GraphQlResponse<VaultByAddressData> = parse_envelope(body)?;
    let state = resp.data.and_then(|d| d.vault_by_address).and_then(|v| v.state);

    Ok(state.map(|s| VaultApy {
        apy: loose(s.apy.as_ref()),
        net_apy: loose(s.net_apy.as_ref()),
        avg_apy: loose(s.avg_apy.as_ref()),
    }))
}

/// Parse the historical state of a vault
///
/// GraphQL errors are surfaced as errors, an unknown vault as `None`
pub(crate) fn parse_vault_history(
    body: &str,
) -> Result<Option<VaultHistory>, AnalyticsClientError> {
    let resp: GraphQlResponse<VaultByAddressData> = parse_envelope(body)?;
    if let Some(msg) = first_error(resp.errors.as_ref()) {
        return Err(AnalyticsClientError::GraphQl(msg));
    }

    let Some(vault) = resp.data.and_then(|d| d.vault_by_address) else {
        return Ok(None);
    };

    let (apy_points, deposit_points) = match vault.historical_state {
        Some(h) => (h.apy, h.total_assets_usd),
        None => (None, None),
    };
    let apy_history = to_series(apy_points, 100.);
    let deposits_history = to_series(deposit_points, 1.);

    let state = vault.state;
    let api_avg_apy = state.as_ref().and_then(|s| loose(s.avg_apy.as_ref()));
    let avg_apy = if apy_history.is_empty() {
        api_avg_apy.map(|a| a * 100.).unwrap_or_default()
    } else {
        apy_history.iter().map(|p| p.value).sum::<f64>() / apy_history.len() as f64
    };
    let current_apy =
        state.as_ref().and_then(|s| loose(s.apy.as_ref())).map(|a| a * 100.).unwrap_or_default();
    let current_deposits =
        state.as_ref().and_then(|s| loose(s.total_assets_usd.as_ref())).unwrap_or_default();

    Ok(Some(VaultHistory { apy_history, avg_apy, current_apy, deposits_history, current_deposits }))
}

/// Parse a user's position, with amounts converted from base units of an
/// asset with `asset_decimals` decimals
///
/// A response with GraphQL errors or without a position means the user has
/// no position, and yields an empty one
pub(crate) fn parse_user_position(
    body: &str,
    asset_decimals: u8,
) -> Result<UserPosition, AnalyticsClientError> {
    let resp: GraphQlResponse<VaultPositionData> = parse_envelope(body)?;
    if resp.errors.is_some() {
        return Ok(UserPosition::default());
    }

    let Some(position) = resp.data.and_then(|d| d.vault_position) else {
        return Ok(UserPosition::default());
    };

    let unit = 10f64.powi(i32::from(asset_decimals));
    let history_points = position.historical_state.and_then(|h| h.assets);
    let position_history = to_series(history_points, 1. / unit);

    let state = position.state;
    let pnl = state.as_ref().and_then(|s| loose(s.pnl.as_ref())).map(|p| p / unit);
    let roe = state.as_ref().and_then(|s| loose(s.roe.as_ref())).map(|r| r * 100.);

    Ok(UserPosition {
        pnl: pnl.unwrap_or_default(),
        roe: roe.unwrap_or_default(),
        position_history,
    })
}
