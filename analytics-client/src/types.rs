//! Types returned by the analytics client

use std::{fmt::Display, str::FromStr};

/// The number of seconds in a day
const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// The window of a historical query
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimeRange {
    /// The last seven days
    OneWeek,
    /// The last thirty days
    #[default]
    OneMonth,
    /// The last ninety days
    ThreeMonths,
}

impl TimeRange {
    /// The number of days the range covers
    pub fn days(&self) -> u64 {
        match self {
            TimeRange::OneWeek => 7,
            TimeRange::OneMonth => 30,
            TimeRange::ThreeMonths => 90,
        }
    }

    /// The start timestamp of the range ending at `now`, in seconds
    pub fn start_timestamp(&self, now: u64) -> u64 {
        now.saturating_sub(self.days() * SECS_PER_DAY)
    }
}

impl Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TimeRange::OneWeek => "1W",
            TimeRange::OneMonth => "1M",
            TimeRange::ThreeMonths => "3M",
        };
        write!(f, "{s}")
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "1W" => Ok(TimeRange::OneWeek),
            "1M" => Ok(TimeRange::OneMonth),
            "3M" => Ok(TimeRange::ThreeMonths),
            _ => Err(format!("invalid time range {s}, expected one of 1W, 1M, 3M")),
        }
    }
}

/// The vault's current yield, as fractions (0.05 is 5%)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VaultApy {
    /// The gross APY
    pub apy: Option<f64>,
    /// The APY net of fees
    pub net_apy: Option<f64>,
    /// The average APY reported by the API
    pub avg_apy: Option<f64>,
}

/// A point in a daily time series
#[derive(Clone, Debug, PartialEq)]
pub struct DataPoint {
    /// The timestamp of the point, in milliseconds
    pub timestamp_ms: i64,
    /// A short date label, e.g. "Jan 5"
    pub date: String,
    /// The value at the point
    pub value: f64,
}

/// The vault's historical yield and deposits
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VaultHistory {
    /// The daily APY series, in percent
    pub apy_history: Vec<DataPoint>,
    /// The average APY over the series, in percent
    pub avg_apy: f64,
    /// The current APY, in percent
    pub current_apy: f64,
    /// The daily total deposits series, in USD
    pub deposits_history: Vec<DataPoint>,
    /// The current total deposits, in USD
    pub current_deposits: f64,
}

/// A user's position in the vault
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserPosition {
    /// Profit and loss, in units of the deposit asset
    pub pnl: f64,
    /// Return on equity, in percent
    pub roe: f64,
    /// The daily position value series, in units of the deposit asset
    pub position_history: Vec<DataPoint>,
}

impl UserPosition {
    /// Whether the user has no recorded position
    pub fn is_empty(&self) -> bool {
        self.position_history.is_empty() && self.pnl == 0. && self.roe == 0.
    }
}
