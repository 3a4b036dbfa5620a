//! # Request Duration Limiter
//!
//! Runs the downstream handler on its own task and watches two timers:
//!
//! ```text
//!   0 ──────── warning_threshold ──────── limit_threshold ────▶ t
//!   │ completes: deliver │ completes: deliver,    │ fires: cancel handler,
//!   │                    │ count one warning      │ count limit, reply timeout
//! ```
//!
//! HTTP responses are buffered inside the task, so nothing reaches the client
//! until the limiter decides. A handler that panics is reported as an
//! internal failure. Timed-out tasks are cancelled through their
//! [`CancellationToken`] and detached, never aborted.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
};
use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Sleep};
use tokio_util::sync::CancellationToken;
use tower::{Layer, Service};
use tracing::{error, warn};

use crate::buffered::{error_response, BufferedResponse};
use crate::domain::{ApiError, LimiterConfig};
use crate::metrics::IncreasingCounter;
use crate::rpc::{RpcHandler, RpcRequest, RpcResult};

/// Disables the watchdog; the handler runs inline.
pub const REQUEST_DURATION_NO_LIMIT: Duration = Duration::MAX;

/// How a supervised task ended.
#[derive(Debug)]
pub enum Outcome<T> {
    Completed(T),
    TimedOut,
    Cancelled,
    Failed(String),
}

/// Thresholds and counters shared by the HTTP and RPC limiters.
#[derive(Clone)]
pub struct DurationLimits {
    name: String,
    warning_threshold: Duration,
    limit_threshold: Duration,
    warning_counter: Option<Arc<dyn IncreasingCounter>>,
    limit_counter: Option<Arc<dyn IncreasingCounter>>,
}

impl DurationLimits {
    /// A warning threshold above the limit is clamped down to it.
    pub fn new(name: impl Into<String>, warning_threshold: Duration, limit_threshold: Duration) -> Self {
        Self {
            name: name.into(),
            warning_threshold: warning_threshold.min(limit_threshold),
            limit_threshold,
            warning_counter: None,
            limit_counter: None,
        }
    }

    pub fn from_config(name: impl Into<String>, config: &LimiterConfig) -> Self {
        Self::new(
            name,
            config.warning_threshold(),
            config.max_execution_duration,
        )
    }

    pub fn with_warning_counter(mut self, counter: Arc<dyn IncreasingCounter>) -> Self {
        self.warning_counter = Some(counter);
        self
    }

    pub fn with_limit_counter(mut self, counter: Arc<dyn IncreasingCounter>) -> Self {
        self.limit_counter = Some(counter);
        self
    }

    pub fn warning_threshold(&self) -> Duration {
        self.warning_threshold
    }

    pub fn limit_threshold(&self) -> Duration {
        self.limit_threshold
    }

    pub fn is_unlimited(&self) -> bool {
        self.limit_threshold == REQUEST_DURATION_NO_LIMIT
    }

    /// Wait for `task` while enforcing both thresholds.
    ///
    /// `child` is the token handed to the task; it is cancelled when the hard
    /// limit fires. A zero threshold arms no timer.
    pub async fn supervise<T>(
        &self,
        parent: &CancellationToken,
        child: &CancellationToken,
        mut task: JoinHandle<T>,
    ) -> Outcome<T> {
        let started = Instant::now();
        let mut warning_timer = arm(self.warning_threshold, self.limit_threshold);
        let mut limit_timer = arm(self.limit_threshold, REQUEST_DURATION_NO_LIMIT);
        let mut warned = false;

        loop {
            tokio::select! {
                biased;

                joined = &mut task => {
                    if warned {
                        self.record_warning(started.elapsed());
                    }
                    return match joined {
                        Ok(value) => Outcome::Completed(value),
                        Err(err) if err.is_panic() => {
                            let message = panic_message(err.into_panic());
                            error!(
                                handler = %self.name,
                                panic = %message,
                                "Request handler panicked"
                            );
                            Outcome::Failed(message)
                        }
                        Err(err) => {
                            error!(handler = %self.name, error = %err, "Request handler task failed");
                            Outcome::Failed(err.to_string())
                        }
                    };
                }
                _ = wait(&mut limit_timer) => {
                    child.cancel();
                    if let Some(counter) = &self.limit_counter {
                        counter.inc();
                    }
                    warn!(
                        handler = %self.name,
                        limit_ms = self.limit_threshold.as_millis() as u64,
                        "Request processing exceeded limiting threshold"
                    );
                    return Outcome::TimedOut;
                }
                _ = wait(&mut warning_timer), if !warned => {
                    warned = true;
                }
                _ = parent.cancelled() => {
                    return Outcome::Cancelled;
                }
            }
        }
    }

    fn record_warning(&self, elapsed: Duration) {
        if let Some(counter) = &self.warning_counter {
            counter.inc();
        }
        warn!(
            handler = %self.name,
            warning_ms = self.warning_threshold.as_millis() as u64,
            elapsed_ms = elapsed.as_millis() as u64,
            "Request processing exceeded warning threshold"
        );
    }
}

/// Timer for `threshold` unless it is zero or not below `ceiling`.
fn arm(threshold: Duration, ceiling: Duration) -> Option<Pin<Box<Sleep>>> {
    if threshold.is_zero() || threshold >= ceiling {
        return None;
    }
    Some(Box::pin(tokio::time::sleep(threshold)))
}

async fn wait(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(sleep) => sleep.as_mut().await,
        None => std::future::pending().await,
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

// =============================================================================
// HTTP
// =============================================================================

/// Tower layer enforcing [`DurationLimits`] on HTTP requests.
///
/// The inner service finds a [`CancellationToken`] in the request
/// extensions; it fires when the hard limit is reached.
#[derive(Clone)]
pub struct RequestDurationLayer {
    limits: DurationLimits,
}

impl RequestDurationLayer {
    pub fn new(limits: DurationLimits) -> Self {
        Self { limits }
    }
}

impl<S> Layer<S> for RequestDurationLayer {
    type Service = RequestDurationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestDurationService {
            inner,
            limits: self.limits.clone(),
        }
    }
}

#[derive(Clone)]
pub struct RequestDurationService<S> {
    inner: S,
    limits: DurationLimits,
}

impl<S> Service<Request<Body>> for RequestDurationService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let limits = self.limits.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            if limits.is_unlimited() {
                return inner.call(req).await;
            }

            let parent = req
                .extensions()
                .get::<CancellationToken>()
                .cloned()
                .unwrap_or_default();
            let child = parent.child_token();
            req.extensions_mut().insert(child.clone());

            let task = tokio::spawn(async move {
                let response = inner.call(req).await?;
                Ok::<_, S::Error>(BufferedResponse::collect(response).await)
            });

            match limits.supervise(&parent, &child, task).await {
                Outcome::Completed(Ok(Ok(buffered))) => Ok(buffered.into_response()),
                Outcome::Completed(Ok(Err(err))) => {
                    error!(error = %err, "Failed to buffer response body");
                    Ok(error_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiError::processing_failed(),
                    ))
                }
                Outcome::Completed(Err(err)) => Err(err),
                Outcome::TimedOut => Ok(error_response(
                    StatusCode::GATEWAY_TIMEOUT,
                    ApiError::processing_limit_exceeded(),
                )),
                Outcome::Cancelled => Ok(error_response(
                    StatusCode::REQUEST_TIMEOUT,
                    ApiError::request_cancelled(),
                )),
                Outcome::Failed(_) => Ok(error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::processing_failed(),
                )),
            }
        })
    }
}

// =============================================================================
// RPC
// =============================================================================

/// Decorates an [`RpcHandler`] with [`DurationLimits`].
pub struct RpcRequestDurationLimiter<H> {
    inner: Arc<H>,
    limits: DurationLimits,
}

impl<H> RpcRequestDurationLimiter<H> {
    pub fn new(inner: H, limits: DurationLimits) -> Self {
        Self {
            inner: Arc::new(inner),
            limits,
        }
    }

    pub fn limits(&self) -> &DurationLimits {
        &self.limits
    }
}

#[async_trait]
impl<H: RpcHandler> RpcHandler for RpcRequestDurationLimiter<H> {
    async fn handle(&self, cancel: CancellationToken, request: RpcRequest) -> RpcResult {
        if self.limits.is_unlimited() {
            return self.inner.handle(cancel, request).await;
        }

        let child = cancel.child_token();
        let inner = Arc::clone(&self.inner);
        let task_token = child.clone();
        let task = tokio::spawn(async move { inner.handle(task_token, request).await });

        match self.limits.supervise(&cancel, &child, task).await {
            Outcome::Completed(result) => result,
            Outcome::TimedOut => Err(ApiError::processing_limit_exceeded()),
            Outcome::Cancelled => Err(ApiError::request_cancelled()),
            Outcome::Failed(_) => Err(ApiError::processing_failed()),
        }
    }
}
