//! # RPC Methods
//!
//! One handler per JSON-RPC method. Handlers read the stores through their
//! inbound ports and never hold a lock across an await point.

pub mod get_events;
pub mod get_health;
pub mod get_latest_ledger;
pub mod get_transaction;

pub use get_events::{EventInfo, GetEventsHandler, GetEventsRequest, GetEventsResponse};
pub use get_health::{GetHealthHandler, HealthCheckResult};
pub use get_latest_ledger::{GetLatestLedgerHandler, GetLatestLedgerResponse};
pub use get_transaction::{GetTransactionHandler, GetTransactionRequest, GetTransactionResponse};

use chrono::{DateTime, SecondsFormat};
use lr_04_request_limiters::{ApiError, RpcResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::ContractEvent;

pub const GET_EVENTS: &str = "getEvents";
pub const GET_HEALTH: &str = "getHealth";
pub const GET_LATEST_LEDGER: &str = "getLatestLedger";
pub const GET_TRANSACTION: &str = "getTransaction";

/// Decode method params; absent params decode as the default request.
pub(crate) fn parse_params<T>(params: Value) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    if params.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(params).map_err(|e| ApiError::invalid_params(e.to_string()))
}

pub(crate) fn to_result<T: Serialize>(response: &T) -> RpcResult {
    serde_json::to_value(response).map_err(|e| ApiError::internal(e.to_string()))
}

/// RFC 3339 UTC rendering of a ledger close time.
pub(crate) fn format_close_time(close_time: i64) -> String {
    DateTime::from_timestamp(close_time, 0)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| close_time.to_string())
}

/// Wire form of a contract event; byte fields are hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBody {
    #[serde(rename = "type")]
    pub event_type: String,
    /// Empty when the event has no emitting contract.
    pub contract_id: String,
    pub topic: Vec<String>,
    pub value: String,
}

impl From<&ContractEvent> for EventBody {
    fn from(event: &ContractEvent) -> Self {
        Self {
            event_type: event.event_type.as_str().to_string(),
            contract_id: event.contract_id.map(hex::encode).unwrap_or_default(),
            topic: event.topics.iter().map(hex::encode).collect(),
            value: hex::encode(&event.data),
        }
    }
}
