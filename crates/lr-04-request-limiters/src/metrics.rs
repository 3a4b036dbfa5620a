//! Metric sinks used by the limiters.
//!
//! The limiters only need to bump a counter or set a gauge, so they take
//! these traits instead of a concrete registry. Prometheus types implement
//! them behind the `metrics` feature; atomics implement them for tests and
//! for embedders without a registry.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counter.
pub trait IncreasingCounter: Send + Sync {
    fn inc(&self);
}

/// Point-in-time value.
pub trait Gauge: Send + Sync {
    fn set(&self, value: f64);
}

impl IncreasingCounter for AtomicU64 {
    fn inc(&self) {
        self.fetch_add(1, Ordering::Relaxed);
    }
}

impl Gauge for AtomicU64 {
    fn set(&self, value: f64) {
        self.store(value as u64, Ordering::Relaxed);
    }
}

#[cfg(feature = "metrics")]
mod prometheus_impls {
    use super::{Gauge, IncreasingCounter};

    impl IncreasingCounter for prometheus::Counter {
        fn inc(&self) {
            prometheus::Counter::inc(self);
        }
    }

    impl IncreasingCounter for prometheus::IntCounter {
        fn inc(&self) {
            prometheus::IntCounter::inc(self);
        }
    }

    impl Gauge for prometheus::Gauge {
        fn set(&self, value: f64) {
            prometheus::Gauge::set(self, value);
        }
    }

    impl Gauge for prometheus::IntGauge {
        fn set(&self, value: f64) {
            prometheus::IntGauge::set(self, value as i64);
        }
    }
}
