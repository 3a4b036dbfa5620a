//! Prometheus metrics for the ledger RPC service.
//!
//! Static metrics follow `lr_<area>_<metric>_<unit>`. Per-method limiter
//! metrics are created at startup, one set per RPC method, and registered in
//! whichever [`Registry`] the caller passes (the global [`REGISTRY`] in
//! production, a fresh one in tests).

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, Encoder, Gauge, HistogramOpts, HistogramVec, IntCounterVec,
    IntGauge, Opts, Registry, TextEncoder,
};

use crate::TelemetryError;

/// Namespace prefixed to every metric name.
pub const NAMESPACE: &str = "lr";

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // INGESTION METRICS
    // =========================================================================

    /// Ledgers ingested, per store
    pub static ref LEDGERS_INGESTED: IntCounterVec = IntCounterVec::new(
        Opts::new("ingest_ledgers_total", "Total ledgers ingested").namespace(NAMESPACE),
        &["store"]  // store: events/transactions
    ).expect("metric creation failed");

    /// Ingestion failures, per store and kind
    pub static ref INGESTION_ERRORS: IntCounterVec = IntCounterVec::new(
        Opts::new("ingest_errors_total", "Ledger ingestion failures").namespace(NAMESPACE),
        &["store", "kind"]  // kind: invariant/read
    ).expect("metric creation failed");

    /// Newest ingested ledger sequence
    pub static ref LATEST_LEDGER: IntGauge = IntGauge::with_opts(
        Opts::new("ingest_latest_ledger", "Sequence of the newest ingested ledger")
            .namespace(NAMESPACE)
    ).expect("metric creation failed");

    // =========================================================================
    // RPC METRICS
    // =========================================================================

    /// JSON-RPC request duration
    pub static ref REQUEST_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "json_rpc_request_duration_seconds",
            "JSON-RPC request duration"
        )
        .namespace(NAMESPACE)
        .buckets(exponential_buckets(0.0005, 2.0, 16).expect("valid buckets")),
        &["endpoint", "status"]  // status: ok/error
    ).expect("metric creation failed");
}

/// Register the static metrics with the global registry.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(LEDGERS_INGESTED.clone()),
        Box::new(INGESTION_ERRORS.clone()),
        Box::new(LATEST_LEDGER.clone()),
        Box::new(REQUEST_DURATION.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }
    Ok(())
}

/// Gauge `lr_<name>_inflight_requests`, registered in `registry`.
pub fn inflight_gauge(registry: &Registry, name: &str) -> Result<Gauge, TelemetryError> {
    let gauge = Gauge::with_opts(
        Opts::new(
            format!("{}_inflight_requests", name),
            format!("Number of concurrently in-flight {} requests", name),
        )
        .namespace(NAMESPACE),
    )
    .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    registry
        .register(Box::new(gauge.clone()))
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    Ok(gauge)
}

/// Warning and limit counters for one duration limiter.
pub struct ExecutionThresholdCounters {
    pub warning: Counter,
    pub limit: Counter,
}

/// Counters `lr_<name>_execution_threshold_warning` and
/// `lr_<name>_execution_threshold_limit`, registered in `registry`.
pub fn execution_threshold_counters(
    registry: &Registry,
    name: &str,
) -> Result<ExecutionThresholdCounters, TelemetryError> {
    let counter = |suffix: &str, help: String| -> Result<Counter, TelemetryError> {
        let counter = Counter::with_opts(
            Opts::new(format!("{}_execution_threshold_{}", name, suffix), help)
                .namespace(NAMESPACE),
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
        registry
            .register(Box::new(counter.clone()))
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
        Ok(counter)
    };

    Ok(ExecutionThresholdCounters {
        warning: counter(
            "warning",
            format!("{} requests exceeding the warning execution threshold", name),
        )?,
        limit: counter(
            "limit",
            format!("{} requests cancelled at the execution limit", name),
        )?,
    })
}

/// Encode `registry` in the Prometheus text format.
pub fn encode_metrics(registry: &Registry) -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
