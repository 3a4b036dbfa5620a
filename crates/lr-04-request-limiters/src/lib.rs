//! # Request Limiters
//!
//! Two orthogonal decorators for request handlers, each available as a tower
//! [`Layer`](tower::Layer) for HTTP and as an [`RpcHandler`] wrapper for
//! JSON-RPC methods:
//!
//! - **Backlog** ([`backlog`]): bounds the number of in-flight requests and
//!   rejects the excess before it reaches the handler.
//! - **Duration** ([`duration`]): runs the handler on its own task, counts
//!   slow requests and cancels the ones that exceed the hard limit.
//!
//! ```text
//! request ─▶ BacklogQueue ──admit──▶ DurationLimits ──spawn──▶ handler
//!               │ full                    │ timeout / panic
//!               ▼                         ▼
//!            503 / -32005           504 / -32001, 500 / -32003
//! ```
//!
//! Both shapes share one core per concern, so the HTTP and RPC variants
//! behave identically.

pub mod backlog;
pub mod buffered;
pub mod domain;
pub mod duration;
pub mod metrics;
pub mod rpc;

pub use backlog::{
    BacklogFull, BacklogPermit, BacklogQueue, BacklogQueueLayer, BacklogQueueService,
    RpcBacklogQueueLimiter, REQUEST_BACKLOG_NO_LIMIT,
};
pub use buffered::{error_response, BufferedResponse};
pub use domain::{codes, ApiError, ConfigError, LimiterConfig, RequestLimitsConfig};
pub use duration::{
    DurationLimits, Outcome, RequestDurationLayer, RequestDurationService,
    RpcRequestDurationLimiter, REQUEST_DURATION_NO_LIMIT,
};
pub use metrics::{Gauge, IncreasingCounter};
pub use rpc::{handler_fn, HandlerFn, RpcHandler, RpcRequest, RpcResult};
