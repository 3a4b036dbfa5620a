//! # getEvents
//!
//! Paginated, filtered scan over the event retention window.
//!
//! A request starts either at `startLedger` or just after a pagination
//! cursor, never both. The scan covers at most [`MAX_LEDGER_RANGE`] ledgers
//! and stops once `limit` matching events were collected; the last event's
//! id is the cursor for the next page.

use async_trait::async_trait;
use lr_02_event_store::domain::filter::matches_any;
use lr_02_event_store::{Cursor, EventFilter, EventRange, EventStoreApi, EventStoreError};
use lr_04_request_limiters::{codes, ApiError, RpcHandler, RpcRequest, RpcResult};
use serde::{Deserialize, Serialize};
use shared_types::ContractEvent;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{format_close_time, parse_params, to_result, EventBody};

/// Widest ledger span a single request may scan.
pub const MAX_LEDGER_RANGE: u32 = 4320;
/// Most filters a request may carry.
pub const MAX_FILTERS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Cursor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetEventsRequest {
    #[serde(default)]
    pub start_ledger: u32,
    #[serde(default)]
    pub filters: Vec<EventFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationOptions>,
}

impl GetEventsRequest {
    fn cursor(&self) -> Option<Cursor> {
        self.pagination.as_ref().and_then(|p| p.cursor)
    }

    fn limit(&self) -> Option<u32> {
        self.pagination.as_ref().and_then(|p| p.limit)
    }

    pub fn validate(&self, max_limit: u32) -> Result<(), ApiError> {
        match (self.cursor(), self.start_ledger) {
            (Some(_), 0) => {}
            (Some(_), _) => {
                return Err(ApiError::invalid_params(
                    "startLedger and cursor cannot both be set",
                ))
            }
            (None, 0) => return Err(ApiError::invalid_params("startLedger must be positive")),
            (None, _) => {}
        }

        if let Some(limit) = self.limit() {
            if limit > max_limit {
                return Err(ApiError::invalid_params(format!(
                    "limit must not exceed {}",
                    max_limit
                )));
            }
        }

        if self.filters.len() > MAX_FILTERS {
            return Err(ApiError::invalid_params(format!(
                "maximum {} filters per request",
                MAX_FILTERS
            )));
        }
        for (i, filter) in self.filters.iter().enumerate() {
            filter
                .validate()
                .map_err(|e| ApiError::invalid_params(format!("filter {} invalid: {}", i + 1, e)))?;
        }
        Ok(())
    }

    /// Scan range for this request. `clamp_start` stays off so a page that
    /// fell out of the window is reported rather than silently skipped.
    fn range(&self) -> EventRange {
        let start = match self.cursor() {
            Some(cursor) => cursor.successor(),
            None => Cursor::ledger_start(self.start_ledger),
        };
        EventRange {
            start,
            clamp_start: false,
            end: Cursor::ledger_start(start.ledger.saturating_add(MAX_LEDGER_RANGE)),
            clamp_end: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInfo {
    #[serde(flatten)]
    pub body: EventBody,
    pub ledger: u32,
    pub ledger_closed_at: String,
    pub id: String,
    pub paging_token: String,
    pub in_successful_contract_call: bool,
}

impl EventInfo {
    fn new(event: &ContractEvent, cursor: Cursor, close_time: i64) -> Self {
        let id = cursor.to_string();
        Self {
            body: EventBody::from(event),
            ledger: cursor.ledger,
            ledger_closed_at: format_close_time(close_time),
            paging_token: id.clone(),
            id,
            in_successful_contract_call: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetEventsResponse {
    pub events: Vec<EventInfo>,
    pub latest_ledger: u32,
}

pub struct GetEventsHandler {
    store: Arc<dyn EventStoreApi>,
    default_limit: u32,
    max_limit: u32,
}

impl GetEventsHandler {
    pub fn new(store: Arc<dyn EventStoreApi>, default_limit: u32, max_limit: u32) -> Self {
        Self {
            store,
            default_limit,
            max_limit,
        }
    }

    /// Run one request to completion. Stops early and reports cancellation
    /// once `cancel` fires.
    pub fn get_events(
        &self,
        cancel: &CancellationToken,
        request: &GetEventsRequest,
    ) -> Result<GetEventsResponse, ApiError> {
        request.validate(self.max_limit)?;
        let limit = request
            .limit()
            .filter(|limit| *limit > 0)
            .unwrap_or(self.default_limit) as usize;

        let mut events = Vec::new();
        let mut visit = |event: &ContractEvent, cursor: Cursor, close_time: i64| {
            if cancel.is_cancelled() {
                return false;
            }
            if matches_any(&request.filters, event) {
                events.push(EventInfo::new(event, cursor, close_time));
            }
            events.len() < limit
        };
        let latest_ledger = self
            .store
            .scan_events(request.range(), &mut visit)
            .map_err(scan_error)?;

        if cancel.is_cancelled() {
            return Err(ApiError::request_cancelled());
        }
        debug!(
            start = %request.range().start,
            found = events.len(),
            latest_ledger,
            "Scanned events"
        );
        Ok(GetEventsResponse {
            events,
            latest_ledger,
        })
    }
}

fn scan_error(err: EventStoreError) -> ApiError {
    if err.is_range_error() {
        ApiError::new(codes::INVALID_REQUEST, err.to_string())
    } else {
        ApiError::internal(err.to_string())
    }
}

#[async_trait]
impl RpcHandler for GetEventsHandler {
    async fn handle(&self, cancel: CancellationToken, request: RpcRequest) -> RpcResult {
        let request: GetEventsRequest = parse_params(request.params)?;
        to_result(&self.get_events(&cancel, &request)?)
    }
}
