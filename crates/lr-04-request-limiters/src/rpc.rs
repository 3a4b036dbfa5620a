//! Handler shape for JSON-RPC methods.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::domain::ApiError;

/// A single decoded JSON-RPC call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }
}

pub type RpcResult = Result<Value, ApiError>;

/// Something that can answer an RPC call.
///
/// Handlers should observe `cancel` and stop promptly once it fires; the
/// duration limiter cancels it when the hard limit is reached.
#[async_trait]
pub trait RpcHandler: Send + Sync + 'static {
    async fn handle(&self, cancel: CancellationToken, request: RpcRequest) -> RpcResult;
}

#[async_trait]
impl<H: RpcHandler + ?Sized> RpcHandler for Arc<H> {
    async fn handle(&self, cancel: CancellationToken, request: RpcRequest) -> RpcResult {
        (**self).handle(cancel, request).await
    }
}

/// Adapter turning an async closure into an [`RpcHandler`].
pub struct HandlerFn<F>(F);

pub fn handler_fn<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(CancellationToken, RpcRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = RpcResult> + Send + 'static,
{
    HandlerFn(f)
}

#[async_trait]
impl<F, Fut> RpcHandler for HandlerFn<F>
where
    F: Fn(CancellationToken, RpcRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = RpcResult> + Send + 'static,
{
    async fn handle(&self, cancel: CancellationToken, request: RpcRequest) -> RpcResult {
        (self.0)(cancel, request).await
    }
}
