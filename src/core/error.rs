//! Error type system for Setlist
//!
//! This module provides the error type system with:
//! - The error taxonomy used across the catalog and streaming layers
//! - HTTP status code mapping
//! - Structured error payloads with trace IDs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Main error type for the Setlist system
#[derive(Debug, thiserror::Error)]
pub enum SetlistError {
    // System-level errors
    #[error("System initialization failed: {0}")]
    InitializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Request-level errors
    #[error("Invalid request: {0}")]
    ValidationError(String),

    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    // Upstream provider errors
    #[error("Upstream catalog error: {0}")]
    UpstreamError(String),

    // Streaming errors
    #[error("Stream error: {0}")]
    StreamError(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // I/O errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SetlistError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            SetlistError::ValidationError(_) => StatusCode::BAD_REQUEST,

            // 401 Unauthorized
            SetlistError::AuthenticationError(_) => StatusCode::UNAUTHORIZED,

            // 404 Not Found
            SetlistError::NotFound(_) => StatusCode::NOT_FOUND,

            // 429 Too Many Requests
            SetlistError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,

            // 502 Bad Gateway
            SetlistError::UpstreamError(_) => StatusCode::BAD_GATEWAY,

            // 500 Internal Server Error
            SetlistError::InitializationError(_)
            | SetlistError::ConfigError(_)
            | SetlistError::StreamError(_)
            | SetlistError::SerializationError(_)
            | SetlistError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type name for API responses
    pub fn error_type(&self) -> &'static str {
        match self {
            SetlistError::InitializationError(_) => "InitializationError",
            SetlistError::ConfigError(_) => "ConfigError",
            SetlistError::ValidationError(_) => "ValidationError",
            SetlistError::AuthenticationError(_) => "AuthenticationError",
            SetlistError::NotFound(_) => "NotFound",
            SetlistError::RateLimited(_) => "RateLimited",
            SetlistError::UpstreamError(_) => "UpstreamError",
            SetlistError::StreamError(_) => "StreamError",
            SetlistError::SerializationError(_) => "SerializationError",
            SetlistError::IoError(_) => "IoError",
        }
    }
}

impl From<serde_json::Error> for SetlistError {
    fn from(err: serde_json::Error) -> Self {
        SetlistError::SerializationError(err.to_string())
    }
}

/// Error response structure for API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error type identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Unique trace ID for this error
    pub trace_id: String,
}

impl ErrorResponse {
    /// Create a new error response with a generated trace ID
    pub fn new(error: String, message: String) -> Self {
        Self {
            error,
            message,
            details: None,
            trace_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an error response with additional details
    pub fn with_details(error: String, message: String, details: serde_json::Value) -> Self {
        Self {
            error,
            message,
            details: Some(details),
            trace_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an error response from a SetlistError
    pub fn from_error(error: &SetlistError) -> Self {
        Self::new(error.error_type().to_string(), error.to_string())
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} (trace_id: {})",
            self.error, self.message, self.trace_id
        )
    }
}

/// Implement IntoResponse for SetlistError to enable automatic error handling in Axum
impl IntoResponse for SetlistError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let error_response = ErrorResponse::from_error(&self);

        // Log the error with trace ID
        tracing::error!(
            error_type = self.error_type(),
            trace_id = %error_response.trace_id,
            status_code = %status_code,
            "Request failed: {}",
            self
        );

        (status_code, Json(error_response)).into_response()
    }
}

/// Result type alias for operations that can fail with SetlistError
pub type Result<T> = std::result::Result<T, SetlistError>;
