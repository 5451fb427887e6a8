//! Defines helpers for logging and metrics

use std::{error::Error, fmt::Display};
pub use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

pub mod helpers;
pub mod metrics;

/// Possible errors that occur when setting up telemetry
#[derive(Debug)]
pub enum TelemetrySetupError {
    /// Error emitted when setting up the statsd metrics recorder
    Metrics(String),
    /// Error emitted when a global subscriber is already installed
    Subscriber(String),
}

impl Error for TelemetrySetupError {}
impl Display for TelemetrySetupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A builder for configuring telemetry
#[derive(Default)]
pub struct TelemetryBuilder {
    /// The subscriber layers to add to the telemetry stack
    layers: Vec<Box<dyn Layer<Registry> + Send + Sync + 'static>>,
}

impl TelemetryBuilder {
    /// Add a subscriber layer to the telemetry builder
    fn with_layer<L: Layer<Registry> + Send + Sync>(mut self, layer: L) -> Self {
        self.layers.push(layer.boxed());
        self
    }

    /// Configure logging, either as structured json or human readable output
    pub fn with_logging(self, json_logs: bool) -> Self {
        if json_logs {
            self.with_layer(fmt::layer().json())
        } else {
            self.with_layer(fmt::layer().compact().with_target(false))
        }
    }

    /// Configure StatsD metrics
    pub fn with_metrics(
        self,
        statsd_host: &str,
        statsd_port: u16,
    ) -> Result<Self, TelemetrySetupError> {
        metrics::configure_metrics_statsd_recorder(statsd_host, statsd_port)?;
        Ok(self)
    }

    /// Initialize the global subscriber with the configured telemetry layers
    pub fn build(self) -> Result<(), TelemetrySetupError> {
        let layers = self.layers.with_filter(
            EnvFilter::builder().with_default_directive(LevelFilter::INFO.into()).from_env_lossy(),
        );
        tracing_subscriber::registry()
            .with(layers)
            .try_init()
            .map_err(crate::err_str!(TelemetrySetupError::Subscriber))
    }
}

/// Configures logging and metrics from the parsed config flags
pub fn configure_telemetry(
    json_logs: bool,
    metrics_enabled: bool,
    statsd_host: &str,
    statsd_port: u16,
) -> Result<(), TelemetrySetupError> {
    let mut telemetry = TelemetryBuilder::default().with_logging(json_logs);
    if metrics_enabled {
        telemetry = telemetry.with_metrics(statsd_host, statsd_port)?;
    }

    telemetry.build()
}
