//! Metrics recorded by vault operations
//!
//! Recording is a no-op unless a global recorder is installed

// ----------------
// | METRIC NAMES |
// ----------------

/// Metric describing the number of deposits attempted
pub const NUM_DEPOSITS_METRIC: &str = "num_deposits";
/// Metric describing the volume of confirmed deposits
pub const DEPOSIT_VOLUME_METRIC: &str = "deposit_volume";
/// Metric describing the number of withdrawals attempted
pub const NUM_WITHDRAWALS_METRIC: &str = "num_withdrawals";
/// Metric describing the number of failed snapshot refreshes
pub const NUM_FAILED_REFRESHES_METRIC: &str = "num_failed_refreshes";

// ---------------
// | METRIC TAGS |
// ---------------

/// Metric tag for the path an operation took
pub const PATH_METRIC_TAG: &str = "path";
/// Metric tag for the outcome of an operation
pub const OUTCOME_METRIC_TAG: &str = "outcome";

/// The path tag of an operation that failed before selecting a path
pub const PATH_UNRESOLVED: &str = "unresolved";

/// The outcome tag of a successful operation
pub const OUTCOME_SUCCESS: &str = "success";
/// The outcome tag of a deposit awaiting co-signers
pub const OUTCOME_PENDING_SIGNATURES: &str = "pending_signatures";

/// Record an attempted deposit
pub fn record_deposit(path: &'static str, outcome: &'static str) {
    metrics::counter!(NUM_DEPOSITS_METRIC, PATH_METRIC_TAG => path, OUTCOME_METRIC_TAG => outcome)
        .increment(1);
}

/// Record the volume of a confirmed deposit, in units of the asset
pub fn record_deposit_volume(volume: f64) {
    // A gauge captures the float value
    metrics::gauge!(DEPOSIT_VOLUME_METRIC).set(volume);
}

/// Record an attempted withdrawal
pub fn record_withdrawal(path: &'static str, outcome: &'static str) {
    metrics::counter!(
        NUM_WITHDRAWALS_METRIC,
        PATH_METRIC_TAG => path,
        OUTCOME_METRIC_TAG => outcome
    )
    .increment(1);
}

/// Record a failed snapshot refresh
pub fn record_failed_refresh() {
    metrics::counter!(NUM_FAILED_REFRESHES_METRIC).increment(1);
}
