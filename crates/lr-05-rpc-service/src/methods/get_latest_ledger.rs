//! # getLatestLedger

use async_trait::async_trait;
use lr_03_transaction_store::TransactionStoreApi;
use lr_04_request_limiters::{RpcHandler, RpcRequest, RpcResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::to_result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetLatestLedgerResponse {
    /// Zero until the first ledger is ingested.
    pub sequence: u32,
    pub close_time: i64,
}

pub struct GetLatestLedgerHandler {
    store: Arc<dyn TransactionStoreApi>,
}

impl GetLatestLedgerHandler {
    pub fn new(store: Arc<dyn TransactionStoreApi>) -> Self {
        Self { store }
    }

    pub fn get_latest_ledger(&self) -> GetLatestLedgerResponse {
        let latest = self.store.get_latest_ledger();
        GetLatestLedgerResponse {
            sequence: latest.sequence,
            close_time: latest.close_time,
        }
    }
}

#[async_trait]
impl RpcHandler for GetLatestLedgerHandler {
    async fn handle(&self, _cancel: CancellationToken, _request: RpcRequest) -> RpcResult {
        to_result(&self.get_latest_ledger())
    }
}
