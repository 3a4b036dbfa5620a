//! Fully collected HTTP responses.
//!
//! The duration limiter lets the downstream service write into one of these
//! instead of the live connection, so a timed-out request never leaks a
//! partial response.

use axum::{
    body::Body,
    http::{header, response::Parts, HeaderValue, StatusCode},
    response::Response,
};
use bytes::Bytes;

use crate::domain::ApiError;

/// Largest body the limiter will buffer.
pub const MAX_BUFFERED_BODY: usize = 64 * 1024 * 1024;

pub struct BufferedResponse {
    parts: Parts,
    body: Bytes,
}

impl BufferedResponse {
    /// Drain `response` into memory.
    pub async fn collect(response: Response) -> Result<Self, axum::Error> {
        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(body, MAX_BUFFERED_BODY).await?;
        Ok(Self { parts, body })
    }

    pub fn status(&self) -> StatusCode {
        self.parts.status
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Write the captured status, headers and body out verbatim.
    pub fn into_response(self) -> Response {
        Response::from_parts(self.parts, Body::from(self.body))
    }
}

/// JSON-RPC error body with the given HTTP status.
pub fn error_response(status: StatusCode, error: ApiError) -> Response {
    let body = serde_json::to_vec(&error.to_response_body()).unwrap_or_default();
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}
