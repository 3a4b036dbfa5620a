//! Limiter configuration with validation.
//!
//! Each RPC method gets its own backlog and duration budget; the HTTP
//! endpoint as a whole gets a global one in front of them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use crate::backlog::REQUEST_BACKLOG_NO_LIMIT;
use crate::duration::REQUEST_DURATION_NO_LIMIT;

/// Warning threshold as a fraction of the hard limit.
const WARNING_DIVISOR: u32 = 3;

/// Backlog and duration budget for one handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimiterConfig {
    /// Max concurrently executing requests. `u64::MAX` disables counting.
    pub queue_limit: u64,
    /// Hard execution limit. `"unlimited"` disables the watchdog.
    #[serde(with = "humantime_serde")]
    pub max_execution_duration: Duration,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            queue_limit: 1000,
            max_execution_duration: Duration::from_secs(5),
        }
    }
}

impl LimiterConfig {
    pub const fn new(queue_limit: u64, max_execution_duration: Duration) -> Self {
        Self {
            queue_limit,
            max_execution_duration,
        }
    }

    /// No backlog limit and no duration limit.
    pub const fn unlimited() -> Self {
        Self::new(REQUEST_BACKLOG_NO_LIMIT, REQUEST_DURATION_NO_LIMIT)
    }

    /// Soft threshold logged and counted but not enforced.
    pub fn warning_threshold(&self) -> Duration {
        if self.max_execution_duration == REQUEST_DURATION_NO_LIMIT {
            return REQUEST_DURATION_NO_LIMIT;
        }
        self.max_execution_duration / WARNING_DIVISOR
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if self.queue_limit == 0 {
            return Err(ConfigError::InvalidLimit(format!(
                "{}: queue_limit cannot be 0",
                name
            )));
        }
        if self.max_execution_duration.is_zero() {
            return Err(ConfigError::InvalidTimeout(format!(
                "{}: max_execution_duration cannot be 0",
                name
            )));
        }
        Ok(())
    }
}

/// Limits for the whole RPC endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestLimitsConfig {
    /// Global budget applied to every HTTP request.
    pub http: LimiterConfig,
    /// Per-method budgets keyed by RPC method name.
    pub methods: HashMap<String, LimiterConfig>,
    /// Budget for methods without an entry in `methods`.
    pub default_method: LimiterConfig,
}

impl Default for RequestLimitsConfig {
    fn default() -> Self {
        let methods = [
            ("getHealth", LimiterConfig::new(1000, Duration::from_secs(5))),
            ("getEvents", LimiterConfig::new(1000, Duration::from_secs(10))),
            ("getLatestLedger", LimiterConfig::new(1000, Duration::from_secs(5))),
            ("getTransaction", LimiterConfig::new(1000, Duration::from_secs(5))),
        ]
        .into_iter()
        .map(|(name, limits)| (name.to_string(), limits))
        .collect();

        Self {
            http: LimiterConfig::new(5000, Duration::from_secs(25)),
            methods,
            default_method: LimiterConfig::default(),
        }
    }
}

impl RequestLimitsConfig {
    pub fn for_method(&self, method: &str) -> LimiterConfig {
        self.methods
            .get(method)
            .copied()
            .unwrap_or(self.default_method)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.http.validate("http")?;
        self.default_method.validate("default_method")?;
        for (name, limits) in &self.methods {
            limits.validate(name)?;
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Invalid size or count limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
}

/// Duration (de)serialization as "10s", "500ms", "250us", "2m" or "unlimited".
pub mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    use crate::duration::REQUEST_DURATION_NO_LIMIT;

    const NANOS_PER_SEC: u128 = 1_000_000_000;

    /// Coarsest unit that represents `duration` exactly.
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if *duration == REQUEST_DURATION_NO_LIMIT {
            return serializer.serialize_str("unlimited");
        }
        let nanos = duration.subsec_nanos();
        let text = if nanos % 1_000 != 0 {
            format!("{}ns", duration.as_nanos())
        } else if nanos % 1_000_000 != 0 {
            format!("{}us", duration.as_micros())
        } else if nanos != 0 {
            format!("{}ms", duration.as_millis())
        } else {
            format!("{}s", duration.as_secs())
        };
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    fn from_nanos(nanos: u128) -> Option<Duration> {
        let secs = u64::try_from(nanos / NANOS_PER_SEC).ok()?;
        Some(Duration::new(secs, (nanos % NANOS_PER_SEC) as u32))
    }

    fn scaled(
        value: &str,
        nanos_per_unit: u128,
        what: &'static str,
    ) -> Result<Duration, &'static str> {
        let value = value.trim().parse::<u128>().map_err(|_| what)?;
        value
            .checked_mul(nanos_per_unit)
            .and_then(from_nanos)
            .ok_or("duration out of range")
    }

    pub(super) fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("unlimited") {
            return Ok(REQUEST_DURATION_NO_LIMIT);
        }
        if let Some(ns) = s.strip_suffix("ns") {
            scaled(ns, 1, "invalid nanoseconds")
        } else if let Some(us) = s.strip_suffix("us") {
            scaled(us, 1_000, "invalid microseconds")
        } else if let Some(ms) = s.strip_suffix("ms") {
            scaled(ms, 1_000_000, "invalid milliseconds")
        } else if let Some(secs) = s.strip_suffix('s') {
            scaled(secs, NANOS_PER_SEC, "invalid seconds")
        } else if let Some(mins) = s.strip_suffix('m') {
            scaled(mins, 60 * NANOS_PER_SEC, "invalid minutes")
        } else {
            // Plain seconds
            scaled(s, NANOS_PER_SEC, "invalid duration format")
        }
    }
}
