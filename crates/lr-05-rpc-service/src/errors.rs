//! Errors raised while building the service.

use ledger_telemetry::TelemetryError;
use lr_02_event_store::EventStoreError;
use lr_03_transaction_store::TransactionStoreError;
use lr_04_request_limiters::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Limits(#[from] ConfigError),

    #[error("method {0} registered twice")]
    DuplicateMethod(String),

    #[error("telemetry: {0}")]
    Telemetry(#[from] TelemetryError),

    #[error("event store: {0}")]
    EventStore(#[from] EventStoreError),

    #[error("transaction store: {0}")]
    TransactionStore(#[from] TransactionStoreError),
}
