//! # getHealth
//!
//! Healthy while the newest ingested ledger closed recently enough. An empty
//! store or a stalled ingestion pipeline is reported as an internal error.

use async_trait::async_trait;
use chrono::Utc;
use lr_03_transaction_store::TransactionStoreApi;
use lr_04_request_limiters::{ApiError, RpcHandler, RpcRequest, RpcResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::to_result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResult {
    pub status: String,
    pub latest_ledger: u32,
    pub oldest_ledger: u32,
    pub ledger_retention_window: u32,
}

pub struct GetHealthHandler {
    store: Arc<dyn TransactionStoreApi>,
    max_healthy_ledger_latency: Duration,
    ledger_retention_window: u32,
}

impl GetHealthHandler {
    pub fn new(
        store: Arc<dyn TransactionStoreApi>,
        max_healthy_ledger_latency: Duration,
        ledger_retention_window: u32,
    ) -> Self {
        Self {
            store,
            max_healthy_ledger_latency,
            ledger_retention_window,
        }
    }

    /// Health as of `now` (unix seconds).
    pub fn check(&self, now: i64) -> Result<HealthCheckResult, ApiError> {
        let range = self.store.transaction_ledger_range();
        if range.last_ledger.sequence == 0 {
            return Err(ApiError::internal("data stores are not initialized"));
        }

        let latency = Duration::from_secs(now.saturating_sub(range.last_ledger.close_time).max(0) as u64);
        if latency > self.max_healthy_ledger_latency {
            return Err(ApiError::internal(format!(
                "latency ({}s) since last known ledger closed is too high (>{}s)",
                latency.as_secs(),
                self.max_healthy_ledger_latency.as_secs()
            )));
        }

        Ok(HealthCheckResult {
            status: "healthy".to_string(),
            latest_ledger: range.last_ledger.sequence,
            oldest_ledger: range.first_ledger.sequence,
            ledger_retention_window: self.ledger_retention_window,
        })
    }
}

#[async_trait]
impl RpcHandler for GetHealthHandler {
    async fn handle(&self, _cancel: CancellationToken, _request: RpcRequest) -> RpcResult {
        to_result(&self.check(Utc::now().timestamp())?)
    }
}
