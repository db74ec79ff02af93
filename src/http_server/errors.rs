//! # API Errors
//!
//! Errors that end a request before or outside the service's envelope
//! responses: malformed input, rate limiting, and store faults.

use std::time::Duration;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::employees::{StoreError, ValidationError};
use crate::rate_limit::RateLimitError;

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP API errors
#[derive(Debug, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Request body failed validation
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Path or query parameter could not be parsed
    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    /// A rate limit tier rejected the request
    #[error("Too Many Requests")]
    RateLimited { tier: String, retry_after: Duration },

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Store or limiter fault
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidParam(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<RateLimitError> for ApiError {
    fn from(err: RateLimitError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        let details = match err {
            ApiError::Validation(v) => v.violations.clone(),
            _ => Vec::new(),
        };
        Self {
            error: match err {
                ApiError::Validation(_) => "Bad Request".to_string(),
                other => other.to_string(),
            },
            code: err.status_code().as_u16(),
            details,
        }
    }
}

/// Whole seconds until `after` has passed, never less than one
pub(crate) fn ceil_secs(after: Duration) -> u64 {
    let millis = after.as_millis() as u64;
    ((millis + 999) / 1000).max(1)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if let ApiError::Internal(message) = &self {
            tracing::error!(error = %message, "request failed");
        }

        let mut response = (status, Json(ErrorResponse::from(&self))).into_response();

        if let ApiError::RateLimited { retry_after, .. } = &self {
            if let Ok(value) = HeaderValue::from_str(&ceil_secs(*retry_after).to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}
