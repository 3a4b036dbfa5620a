//! Domain types shared by both limiter shapes.

pub mod config;
pub mod error;

pub use config::{ConfigError, LimiterConfig, RequestLimitsConfig};
pub use error::{codes, ApiError};
