//! # Limiter Stack
//!
//! The global HTTP layers wrapped around a minimal JSON-RPC endpoint that
//! dispatches into the method registry, so both limiter levels are active.

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use ledger_telemetry::metrics::encode_metrics;
    use lr_04_request_limiters::{
        codes, handler_fn, LimiterConfig, RpcRequest, REQUEST_BACKLOG_NO_LIMIT,
    };
    use lr_05_rpc_service::{global_http_layers, MethodRegistry};
    use prometheus::Registry;
    use serde_json::{json, Value};
    use tokio::sync::Semaphore;
    use tokio_util::sync::CancellationToken;
    use tower::{service_fn, ServiceBuilder, ServiceExt};

    use crate::fixtures::{busy_ledger, service};

    fn rpc_request(method: &str, params: Value) -> Request<Body> {
        let body = json!({ "method": method, "params": params }).to_string();
        Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Decode the body, dispatch with the limiter's token, encode the result.
    async fn endpoint(methods: Arc<MethodRegistry>, req: Request<Body>) -> Result<Response, Infallible> {
        let cancel = req
            .extensions()
            .get::<CancellationToken>()
            .cloned()
            .unwrap_or_default();
        let bytes = axum::body::to_bytes(req.into_body(), usize::MAX)
            .await
            .unwrap_or_default();
        let body = match serde_json::from_slice::<RpcRequest>(&bytes) {
            Ok(request) => match methods.dispatch(cancel, request).await {
                Ok(result) => json!({ "result": result }),
                Err(error) => error.to_response_body(),
            },
            Err(e) => json!({ "error": { "code": codes::PARSE_ERROR, "message": e.to_string() } }),
        };
        Ok(Response::new(Body::from(body.to_string())))
    }

    fn stack(
        methods: Arc<MethodRegistry>,
        http: LimiterConfig,
        registry: &Registry,
    ) -> impl tower::Service<
        Request<Body>,
        Response = Response,
        Error = Infallible,
        Future = impl Send,
    > + Clone {
        let (duration, backlog) = global_http_layers(&http, registry).unwrap();
        ServiceBuilder::new()
            .layer(duration)
            .layer(backlog)
            .service(service_fn(move |req| endpoint(Arc::clone(&methods), req)))
    }

    /// Registry with one `wait` method blocked on `gate`, limited to one
    /// in-flight call.
    fn gated_methods(gate: Arc<Semaphore>, registry: &Registry) -> Arc<MethodRegistry> {
        let mut methods = MethodRegistry::new();
        methods
            .register(
                "wait",
                handler_fn(move |_cancel, _request| {
                    let gate = Arc::clone(&gate);
                    async move {
                        let _permit = gate.acquire().await;
                        Ok(json!("released"))
                    }
                }),
                &LimiterConfig::new(1, Duration::from_secs(60)),
                registry,
            )
            .unwrap();
        Arc::new(methods)
    }

    #[tokio::test]
    async fn test_full_stack_serves_rpc_methods() {
        let rpc = service(10, 10);
        for seq in 1..=3 {
            rpc.on_ledger_closed(&busy_ledger(seq)).unwrap();
        }
        let registry = Registry::new();
        let methods = Arc::new(
            MethodRegistry::from_config(
                Arc::clone(rpc.ingestor().event_store()) as _,
                Arc::clone(rpc.ingestor().transaction_store()) as _,
                rpc.config(),
                &registry,
            )
            .unwrap(),
        );
        let http = stack(methods, LimiterConfig::new(10, Duration::from_secs(5)), &registry);

        let response = http
            .clone()
            .oneshot(rpc_request("getEvents", json!({ "startLedger": 2 })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["result"]["latestLedger"], 3);
        assert_eq!(body["result"]["events"].as_array().unwrap().len(), 2);

        let response = http
            .oneshot(rpc_request("getVersionInfo", Value::Null))
            .await
            .unwrap();
        assert_eq!(json_body(response).await["error"]["code"], codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_global_backlog_rejects_with_503() {
        let registry = Registry::new();
        let gate = Arc::new(Semaphore::new(0));
        let methods = gated_methods(Arc::clone(&gate), &registry);
        let http = stack(methods, LimiterConfig::new(1, Duration::from_secs(60)), &registry);

        let first = tokio::spawn(http.clone().oneshot(rpc_request("wait", Value::Null)));
        while !encode_metrics(&registry)
            .unwrap()
            .contains("lr_global_inflight_requests 1")
        {
            tokio::task::yield_now().await;
        }

        let rejected = http
            .clone()
            .oneshot(rpc_request("wait", Value::Null))
            .await
            .unwrap();
        assert_eq!(rejected.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = json_body(rejected).await;
        assert_eq!(body["error"]["code"], codes::BACKLOG_LIMIT_EXCEEDED);
        assert_eq!(
            body["error"]["message"],
            "rpc queue for global surpassed queue limit of 1 requests"
        );

        gate.add_permits(1);
        let response = first.await.unwrap().unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["result"], "released");
    }

    #[tokio::test]
    async fn test_method_backlog_rejects_inside_open_global_queue() {
        let registry = Registry::new();
        let gate = Arc::new(Semaphore::new(0));
        let methods = gated_methods(Arc::clone(&gate), &registry);
        let http = stack(
            methods,
            LimiterConfig::new(REQUEST_BACKLOG_NO_LIMIT, Duration::from_secs(60)),
            &registry,
        );

        let first = tokio::spawn(http.clone().oneshot(rpc_request("wait", Value::Null)));
        while !encode_metrics(&registry)
            .unwrap()
            .contains("lr_wait_inflight_requests 1")
        {
            tokio::task::yield_now().await;
        }

        // The HTTP layer admits it; the method queue answers with a JSON-RPC error.
        let response = http
            .clone()
            .oneshot(rpc_request("wait", Value::Null))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], codes::BACKLOG_LIMIT_EXCEEDED);
        assert_eq!(
            body["error"]["message"],
            "rpc queue for wait surpassed queue limit of 1 requests"
        );

        gate.add_permits(1);
        first.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_global_duration_limit_returns_504() {
        let registry = Registry::new();
        let mut methods = MethodRegistry::new();
        methods
            .register(
                "stall",
                handler_fn(|_cancel, _request| async {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(json!("late"))
                }),
                &LimiterConfig::new(10, Duration::from_secs(60)),
                &registry,
            )
            .unwrap();
        let http = stack(
            Arc::new(methods),
            LimiterConfig::new(10, Duration::from_secs(3)),
            &registry,
        );

        let response = http
            .oneshot(rpc_request("stall", Value::Null))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            json_body(response).await["error"]["code"],
            codes::PROCESSING_LIMIT_EXCEEDED
        );

        let metrics = encode_metrics(&registry).unwrap();
        assert!(metrics.contains("lr_global_execution_threshold_limit 1"));
        assert!(metrics.contains("lr_global_execution_threshold_warning 0"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_method_duration_limit_cancels_handler() {
        let registry = Registry::new();
        let mut methods = MethodRegistry::new();
        methods
            .register(
                "stall",
                handler_fn(|cancel: CancellationToken, _request| async move {
                    cancel.cancelled().await;
                    Ok(json!("cancelled"))
                }),
                &LimiterConfig::new(10, Duration::from_secs(2)),
                &registry,
            )
            .unwrap();
        let http = stack(
            Arc::new(methods),
            LimiterConfig::new(10, Duration::from_secs(60)),
            &registry,
        );

        let response = http
            .oneshot(rpc_request("stall", Value::Null))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await["error"]["code"],
            codes::PROCESSING_LIMIT_EXCEEDED
        );
        let metrics = encode_metrics(&registry).unwrap();
        assert!(metrics.contains("lr_stall_execution_threshold_limit 1"));
    }
}
