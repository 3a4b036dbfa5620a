//! # getTransaction
//!
//! Point lookup by hash. A miss is not an error: the response reports
//! `NOT_FOUND` together with the retained ledger range so the caller can tell
//! a transaction that aged out from one that never existed.

use async_trait::async_trait;
use lr_03_transaction_store::{Transaction, TransactionStoreApi};
use lr_04_request_limiters::{ApiError, RpcHandler, RpcRequest, RpcResult};
use serde::{Deserialize, Serialize};
use shared_types::{Hash, StoreRange};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::{parse_params, to_result, EventBody};

pub const TRANSACTION_STATUS_SUCCESS: &str = "SUCCESS";
pub const TRANSACTION_STATUS_NOT_FOUND: &str = "NOT_FOUND";
pub const TRANSACTION_STATUS_FAILED: &str = "FAILED";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GetTransactionRequest {
    #[serde(default)]
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTransactionResponse {
    pub status: String,
    pub latest_ledger: u32,
    pub latest_ledger_close_time: i64,
    pub oldest_ledger: u32,
    pub oldest_ledger_close_time: i64,

    // Set only when the transaction was found
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_order: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_bump: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub envelope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_meta: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic_events: Option<Vec<EventBody>>,
}

impl GetTransactionResponse {
    fn new(tx: Option<Transaction>, range: StoreRange) -> Self {
        let mut response = Self {
            status: TRANSACTION_STATUS_NOT_FOUND.to_string(),
            latest_ledger: range.last_ledger.sequence,
            latest_ledger_close_time: range.last_ledger.close_time,
            oldest_ledger: range.first_ledger.sequence,
            oldest_ledger_close_time: range.first_ledger.close_time,
            ..Self::default()
        };
        let Some(tx) = tx else {
            return response;
        };

        response.status = if tx.successful() {
            TRANSACTION_STATUS_SUCCESS
        } else {
            TRANSACTION_STATUS_FAILED
        }
        .to_string();
        response.application_order = Some(tx.application_order);
        response.fee_bump = Some(tx.fee_bump);
        response.envelope = Some(hex::encode(tx.envelope.payload()));
        response.result = Some(hex::encode(&tx.result.encoded));
        response.result_meta = Some(hex::encode(&tx.meta));
        response.ledger = Some(tx.ledger.sequence);
        response.created_at = Some(tx.ledger.close_time);
        response.diagnostic_events = Some(tx.diagnostic_events.iter().map(EventBody::from).collect());
        response
    }
}

/// Parse a hex-encoded 32-byte hash.
pub fn parse_hash(hash: &str) -> Result<Hash, ApiError> {
    if hash.len() != 64 {
        return Err(ApiError::invalid_params(format!(
            "unexpected hash length ({})",
            hash.len()
        )));
    }
    let mut out = [0u8; 32];
    hex::decode_to_slice(hash, &mut out)
        .map_err(|e| ApiError::invalid_params(format!("incorrect hash: {}", e)))?;
    Ok(out)
}

pub struct GetTransactionHandler {
    store: Arc<dyn TransactionStoreApi>,
}

impl GetTransactionHandler {
    pub fn new(store: Arc<dyn TransactionStoreApi>) -> Self {
        Self { store }
    }

    pub fn get_transaction(
        &self,
        request: &GetTransactionRequest,
    ) -> Result<GetTransactionResponse, ApiError> {
        let hash = parse_hash(&request.hash)?;
        let (tx, range) = self.store.get_transaction(&hash);
        Ok(GetTransactionResponse::new(tx, range))
    }
}

#[async_trait]
impl RpcHandler for GetTransactionHandler {
    async fn handle(&self, _cancel: CancellationToken, request: RpcRequest) -> RpcResult {
        let request: GetTransactionRequest = parse_params(request.params)?;
        to_result(&self.get_transaction(&request)?)
    }
}
