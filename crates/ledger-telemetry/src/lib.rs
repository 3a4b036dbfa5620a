//! # Ledger Telemetry
//!
//! Logging and metrics for the ledger RPC service.
//!
//! - **Logs**: `tracing` events rendered by `tracing-subscriber`, either
//!   human-readable or JSON.
//! - **Metrics**: Prometheus collectors in a global [`REGISTRY`], plus
//!   constructors for the per-method limiter gauges and counters.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ledger_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     init_telemetry(&TelemetryConfig::from_env()).expect("Failed to init telemetry");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LR_SERVICE_NAME` | `ledger-rpc` | Service name in logs |
//! | `LR_LOG_LEVEL` | `info` | Log level filter (`RUST_LOG` also honoured) |
//! | `LR_JSON_LOGS` | `false` | One JSON object per log line |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::{env_filter, init_logging};
pub use metrics::{
    encode_metrics, execution_threshold_counters, inflight_gauge, register_metrics,
    ExecutionThresholdCounters, INGESTION_ERRORS, LATEST_LEDGER, LEDGERS_INGESTED, REGISTRY,
    REQUEST_DURATION,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Register the static metrics and install the global log subscriber.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_logging(config)?;
    tracing::info!(service = %config.service_name, "Telemetry initialized");
    Ok(())
}
