//! RPC error type with JSON-RPC 2.0 error codes.
//!
//! Limiter rejections use the server-error range so clients can tell
//! overload from bad input.

use serde::{Deserialize, Serialize};
use std::fmt;

/// JSON-RPC 2.0 error codes
pub mod codes {
    // JSON-RPC 2.0 standard errors (-32700 to -32600)
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    // Server errors (-32000 to -32099)
    pub const SERVER_ERROR: i32 = -32000;
    pub const PROCESSING_LIMIT_EXCEEDED: i32 = -32001;
    pub const REQUEST_CANCELLED: i32 = -32002;
    pub const PROCESSING_FAILED: i32 = -32003;
    pub const BACKLOG_LIMIT_EXCEEDED: i32 = -32005;
}

/// RPC error with JSON-RPC code
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// JSON-RPC error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Optional additional data
    pub data: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Create error with additional data
    pub fn with_data(code: i32, message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Method not found
    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", method),
        )
    }

    /// Invalid parameters
    pub fn invalid_params(details: impl Into<String>) -> Self {
        Self::new(codes::INVALID_PARAMS, details.into())
    }

    /// Internal error
    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(
            codes::INTERNAL_ERROR,
            format!("Internal error: {}", details.into()),
        )
    }

    /// Per-method backlog full
    pub fn backlog_limit_exceeded(method: &str, limit: u64) -> Self {
        Self::with_data(
            codes::BACKLOG_LIMIT_EXCEEDED,
            format!(
                "rpc queue for {} surpassed queue limit of {} requests",
                method, limit
            ),
            serde_json::json!({ "limit": limit }),
        )
    }

    /// Hard duration limit hit; the handler was cancelled
    pub fn processing_limit_exceeded() -> Self {
        Self::new(
            codes::PROCESSING_LIMIT_EXCEEDED,
            "request exceeded processing limit threshold",
        )
    }

    /// Handler panicked or could not complete
    pub fn processing_failed() -> Self {
        Self::new(
            codes::PROCESSING_FAILED,
            "request failed to process due to internal issue",
        )
    }

    /// Caller went away before the handler finished
    pub fn request_cancelled() -> Self {
        Self::new(codes::REQUEST_CANCELLED, "request cancelled")
    }

    /// JSON-RPC error response body with a null id.
    pub fn to_response_body(&self) -> serde_json::Value {
        serde_json::json!({
            "jsonrpc": "2.0",
            "error": self,
            "id": null
        })
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl Serialize for ApiError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ApiError", 3)?;
        state.serialize_field("code", &self.code)?;
        state.serialize_field("message", &self.message)?;
        if let Some(ref data) = self.data {
            state.serialize_field("data", data)?;
        }
        state.end()
    }
}

impl<'de> Deserialize<'de> for ApiError {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ErrorHelper {
            code: i32,
            message: String,
            data: Option<serde_json::Value>,
        }

        let helper = ErrorHelper::deserialize(deserializer)?;
        Ok(ApiError {
            code: helper.code,
            message: helper.message,
            data: helper.data,
        })
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::invalid_params(e.to_string())
    }
}
