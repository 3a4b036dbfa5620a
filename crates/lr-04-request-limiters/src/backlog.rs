//! # Backlog Queue Limiter
//!
//! Caps the number of requests in flight for one handler. A request that
//! would push the count over the limit is turned away before the handler
//! runs: HTTP callers get `503 Service Unavailable`, RPC callers get
//! [`codes::BACKLOG_LIMIT_EXCEEDED`](crate::domain::codes::BACKLOG_LIMIT_EXCEEDED).
//!
//! All state is atomic. The "limit reached" log line is guarded by a flag so
//! a sustained overload logs once; the flag clears whenever an admitted
//! request finishes.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tower::{Layer, Service};
use tracing::{debug, info};

use crate::buffered::error_response;
use crate::domain::ApiError;
use crate::metrics::Gauge;
use crate::rpc::{RpcHandler, RpcRequest, RpcResult};

/// Disables counting entirely.
pub const REQUEST_BACKLOG_NO_LIMIT: u64 = u64::MAX;

/// Returned when admission would exceed the limit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("rpc queue for {name} surpassed queue limit of {limit} requests")]
pub struct BacklogFull {
    pub name: String,
    pub limit: u64,
}

impl From<BacklogFull> for ApiError {
    fn from(full: BacklogFull) -> Self {
        ApiError::backlog_limit_exceeded(&full.name, full.limit)
    }
}

/// Shared admission counter.
pub struct BacklogQueue {
    name: String,
    limit: u64,
    pending: AtomicU64,
    limit_reached: AtomicBool,
    gauge: Option<Arc<dyn Gauge>>,
}

impl BacklogQueue {
    pub fn new(name: impl Into<String>, limit: u64, gauge: Option<Arc<dyn Gauge>>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            limit,
            pending: AtomicU64::new(0),
            limit_reached: AtomicBool::new(false),
            gauge,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn is_unlimited(&self) -> bool {
        self.limit == REQUEST_BACKLOG_NO_LIMIT
    }

    /// Requests currently admitted.
    pub fn pending(&self) -> u64 {
        self.pending.load(Ordering::Acquire)
    }

    /// Admit one request. The returned permit releases the slot on drop,
    /// including when the holder unwinds or its future is dropped.
    pub fn try_acquire(self: &Arc<Self>) -> Result<BacklogPermit, BacklogFull> {
        if self.is_unlimited() {
            return Ok(BacklogPermit { queue: None });
        }

        let pending = self.pending.fetch_add(1, Ordering::AcqRel) + 1;
        if pending > self.limit {
            self.pending.fetch_sub(1, Ordering::AcqRel);
            if self
                .limit_reached
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                info!(queue = %self.name, limit = self.limit, "Request backlog limit reached");
            }
            return Err(BacklogFull {
                name: self.name.clone(),
                limit: self.limit,
            });
        }

        self.report(pending);
        Ok(BacklogPermit {
            queue: Some(Arc::clone(self)),
        })
    }

    fn release(&self) {
        let pending = self.pending.fetch_sub(1, Ordering::AcqRel) - 1;
        self.report(pending);
        self.limit_reached.store(false, Ordering::Release);
    }

    fn report(&self, pending: u64) {
        if let Some(gauge) = &self.gauge {
            gauge.set(pending as f64);
        }
    }
}

/// Slot held by an admitted request.
#[must_use = "dropping the permit releases the backlog slot"]
pub struct BacklogPermit {
    queue: Option<Arc<BacklogQueue>>,
}

impl Drop for BacklogPermit {
    fn drop(&mut self) {
        if let Some(queue) = self.queue.take() {
            queue.release();
        }
    }
}

// =============================================================================
// HTTP
// =============================================================================

/// Tower layer limiting concurrent HTTP requests.
#[derive(Clone)]
pub struct BacklogQueueLayer {
    queue: Arc<BacklogQueue>,
}

impl BacklogQueueLayer {
    pub fn new(queue: Arc<BacklogQueue>) -> Self {
        Self { queue }
    }

    pub fn queue(&self) -> &Arc<BacklogQueue> {
        &self.queue
    }
}

impl<S> Layer<S> for BacklogQueueLayer {
    type Service = BacklogQueueService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        BacklogQueueService {
            inner,
            queue: Arc::clone(&self.queue),
        }
    }
}

#[derive(Clone)]
pub struct BacklogQueueService<S> {
    inner: S,
    queue: Arc<BacklogQueue>,
}

impl<S> Service<Request<Body>> for BacklogQueueService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let permit = match self.queue.try_acquire() {
            Ok(permit) => permit,
            Err(full) => {
                debug!(queue = %full.name, "Rejecting HTTP request");
                return Box::pin(async move {
                    Ok(error_response(StatusCode::SERVICE_UNAVAILABLE, full.into()))
                });
            }
        };

        let mut inner = self.inner.clone();
        Box::pin(async move {
            let _permit = permit;
            inner.call(req).await
        })
    }
}

// =============================================================================
// RPC
// =============================================================================

/// Decorates an [`RpcHandler`] with backlog admission.
pub struct RpcBacklogQueueLimiter<H> {
    inner: H,
    queue: Arc<BacklogQueue>,
}

impl<H> RpcBacklogQueueLimiter<H> {
    pub fn new(inner: H, queue: Arc<BacklogQueue>) -> Self {
        Self { inner, queue }
    }

    pub fn queue(&self) -> &Arc<BacklogQueue> {
        &self.queue
    }
}

#[async_trait]
impl<H: RpcHandler> RpcHandler for RpcBacklogQueueLimiter<H> {
    async fn handle(&self, cancel: CancellationToken, request: RpcRequest) -> RpcResult {
        let _permit = self.queue.try_acquire()?;
        self.inner.handle(cancel, request).await
    }
}
