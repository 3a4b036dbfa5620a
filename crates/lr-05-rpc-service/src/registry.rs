//! # Method Registry
//!
//! Name → handler table. Every registered handler is wrapped once, at
//! startup, in the per-method limiter chain:
//!
//! ```text
//! Instrumented ──→ RequestDuration ──→ BacklogQueue ──→ handler
//!   (log, histogram)  (warn / cancel)     (admit / reject)
//! ```
//!
//! The HTTP-level pair built by [`global_http_layers`] wraps whole requests
//! the same way before any method is looked up.

use async_trait::async_trait;
use ledger_telemetry::metrics::{execution_threshold_counters, inflight_gauge, REQUEST_DURATION};
use lr_02_event_store::EventStoreApi;
use lr_03_transaction_store::TransactionStoreApi;
use lr_04_request_limiters::{
    ApiError, BacklogQueue, BacklogQueueLayer, DurationLimits, LimiterConfig, RequestDurationLayer,
    RpcBacklogQueueLimiter, RpcHandler, RpcRequest, RpcRequestDurationLimiter, RpcResult,
};
use prometheus::Registry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, Instrument};

use crate::config::ServiceConfig;
use crate::errors::ServiceError;
use crate::methods::{
    GetEventsHandler, GetHealthHandler, GetLatestLedgerHandler, GetTransactionHandler, GET_EVENTS,
    GET_HEALTH, GET_LATEST_LEDGER, GET_TRANSACTION,
};

/// Limiter name used for the HTTP-level layers.
pub const GLOBAL_LIMITER_NAME: &str = "global";

/// Logs each call and records its latency.
struct InstrumentedHandler<H> {
    method: String,
    inner: H,
}

#[async_trait]
impl<H: RpcHandler> RpcHandler for InstrumentedHandler<H> {
    async fn handle(&self, cancel: CancellationToken, request: RpcRequest) -> RpcResult {
        let span = info_span!("json_rpc", method = %self.method);
        async move {
            debug!("starting JSONRPC request");
            let start = Instant::now();
            let result = self.inner.handle(cancel, request).await;
            let elapsed = start.elapsed();

            let status = if result.is_ok() { "ok" } else { "error" };
            REQUEST_DURATION
                .with_label_values(&[self.method.as_str(), status])
                .observe(elapsed.as_secs_f64());

            match &result {
                Ok(_) => info!(duration_ms = elapsed.as_millis() as u64, "finished JSONRPC request"),
                Err(e) => info!(
                    duration_ms = elapsed.as_millis() as u64,
                    code = e.code,
                    error = %e.message,
                    "finished JSONRPC request"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }
}

/// Backlog queue and duration limits for `name`, with their metrics
/// registered in `registry`.
fn limiter_parts(
    name: &str,
    limits: &LimiterConfig,
    registry: &Registry,
) -> Result<(Arc<BacklogQueue>, DurationLimits), ServiceError> {
    let gauge = inflight_gauge(registry, name)?;
    let counters = execution_threshold_counters(registry, name)?;

    let queue = BacklogQueue::new(name, limits.queue_limit, Some(Arc::new(gauge)));
    let duration = DurationLimits::from_config(name, limits)
        .with_warning_counter(Arc::new(counters.warning))
        .with_limit_counter(Arc::new(counters.limit));
    Ok((queue, duration))
}

#[derive(Default)]
pub struct MethodRegistry {
    handlers: HashMap<String, Arc<dyn RpcHandler>>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`, behind limiters built from `limits`.
    pub fn register<H: RpcHandler>(
        &mut self,
        name: &str,
        handler: H,
        limits: &LimiterConfig,
        registry: &Registry,
    ) -> Result<(), ServiceError> {
        if self.handlers.contains_key(name) {
            return Err(ServiceError::DuplicateMethod(name.to_string()));
        }
        let (queue, duration) = limiter_parts(name, limits, registry)?;
        let handler = InstrumentedHandler {
            method: name.to_string(),
            inner: RpcRequestDurationLimiter::new(
                RpcBacklogQueueLimiter::new(handler, queue),
                duration,
            ),
        };
        self.handlers.insert(name.to_string(), Arc::new(handler));
        debug!(
            method = name,
            queue_limit = limits.queue_limit,
            max_duration = ?limits.max_execution_duration,
            "Registered RPC method"
        );
        Ok(())
    }

    /// The four standard methods over the given stores.
    pub fn from_config(
        events: Arc<dyn EventStoreApi>,
        transactions: Arc<dyn TransactionStoreApi>,
        config: &ServiceConfig,
        registry: &Registry,
    ) -> Result<Self, ServiceError> {
        config.validate()?;
        let limits = &config.request_limits;
        let mut methods = Self::new();

        methods.register(
            GET_HEALTH,
            GetHealthHandler::new(
                Arc::clone(&transactions),
                config.max_healthy_ledger_latency,
                config.transaction_ledger_retention_window,
            ),
            &limits.for_method(GET_HEALTH),
            registry,
        )?;
        methods.register(
            GET_EVENTS,
            GetEventsHandler::new(events, config.default_events_limit, config.max_events_limit),
            &limits.for_method(GET_EVENTS),
            registry,
        )?;
        methods.register(
            GET_LATEST_LEDGER,
            GetLatestLedgerHandler::new(Arc::clone(&transactions)),
            &limits.for_method(GET_LATEST_LEDGER),
            registry,
        )?;
        methods.register(
            GET_TRANSACTION,
            GetTransactionHandler::new(transactions),
            &limits.for_method(GET_TRANSACTION),
            registry,
        )?;

        info!(methods = ?methods.methods(), "RPC methods registered");
        Ok(methods)
    }

    /// Route `request` to its handler.
    pub async fn dispatch(&self, cancel: CancellationToken, request: RpcRequest) -> RpcResult {
        match self.handlers.get(&request.method) {
            Some(handler) => handler.handle(cancel, request).await,
            None => Err(ApiError::method_not_found(&request.method)),
        }
    }

    pub fn contains(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// Registered method names, sorted.
    pub fn methods(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Backlog and duration layers for whole HTTP requests. Apply the duration
/// layer outermost so queued time counts against the limit.
pub fn global_http_layers(
    limits: &LimiterConfig,
    registry: &Registry,
) -> Result<(RequestDurationLayer, BacklogQueueLayer), ServiceError> {
    let (queue, duration) = limiter_parts(GLOBAL_LIMITER_NAME, limits, registry)?;
    Ok((RequestDurationLayer::new(duration), BacklogQueueLayer::new(queue)))
}
