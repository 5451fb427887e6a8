//! Configures a metrics recorder to send metrics to a statsd server

use metrics_exporter_statsd::StatsdBuilder;

use crate::err_str;

use super::TelemetrySetupError;

/// The prefix used for metrics emitted by the vault tooling
pub const VAULT_METRICS_PREFIX: &str = "vaultctl";

/// The size (in bytes) of the buffer which metrics data must fill before being
/// flushed out over UDP
pub const METRICS_BUFFER_SIZE: usize = 1024;
/// The size (in # of elements) of the queue which the metrics exporter
/// maintains.
///
/// If the queue is full, metrics data will be dropped.
pub const METRICS_QUEUE_SIZE: usize = 1024 * 16;

/// Configures a statsd metrics recorder
pub fn configure_metrics_statsd_recorder(
    statsd_host: &str,
    statsd_port: u16,
) -> Result<(), TelemetrySetupError> {
    let recorder = StatsdBuilder::from(statsd_host, statsd_port)
        .with_buffer_size(METRICS_BUFFER_SIZE)
        .with_queue_size(METRICS_QUEUE_SIZE)
        .build(Some(VAULT_METRICS_PREFIX))
        .map_err(err_str!(TelemetrySetupError::Metrics))?;

    metrics::set_global_recorder(recorder).map_err(err_str!(TelemetrySetupError::Metrics))
}
