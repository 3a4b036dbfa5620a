//! Service configuration with validation.

use lr_04_request_limiters::domain::config::humantime_serde;
use lr_04_request_limiters::RequestLimitsConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ServiceError;

/// Everything needed to build the stores and the method registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Network passphrase; transaction hashes are bound to it
    pub network_passphrase: String,
    /// Ledgers of events kept in memory
    pub event_ledger_retention_window: u32,
    /// Ledgers of transactions kept in memory
    pub transaction_ledger_retention_window: u32,
    /// getHealth reports unhealthy past this ledger age
    #[serde(with = "humantime_serde")]
    pub max_healthy_ledger_latency: Duration,
    /// getEvents page size when the request sets none
    pub default_events_limit: u32,
    /// Largest page size getEvents accepts
    pub max_events_limit: u32,
    /// Backlog and duration limits, global and per method
    pub request_limits: RequestLimitsConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            network_passphrase: "Test SDF Network ; September 2015".to_string(),
            event_ledger_retention_window: 17280,
            transaction_ledger_retention_window: 1440,
            max_healthy_ledger_latency: Duration::from_secs(30),
            default_events_limit: 100,
            max_events_limit: 10_000,
            request_limits: RequestLimitsConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.network_passphrase.is_empty() {
            return Err(ServiceError::Config("network_passphrase cannot be empty".into()));
        }

        // Retention windows
        if self.event_ledger_retention_window == 0 {
            return Err(ServiceError::Config(
                "event_ledger_retention_window cannot be 0".into(),
            ));
        }
        if self.transaction_ledger_retention_window == 0 {
            return Err(ServiceError::Config(
                "transaction_ledger_retention_window cannot be 0".into(),
            ));
        }

        // getEvents paging
        if self.default_events_limit == 0 || self.default_events_limit > self.max_events_limit {
            return Err(ServiceError::Config(format!(
                "default_events_limit must be between 1 and max_events_limit ({})",
                self.max_events_limit
            )));
        }

        self.request_limits.validate()?;
        Ok(())
    }
}
