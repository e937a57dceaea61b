//! Error types for relay-rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use research_core::schema::{FieldViolation, ValidationError};
use serde::Serialize;
use thiserror::Error;

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// Relay error types
#[derive(Error, Debug)]
pub enum RelayError {
    /// Request body failed validation
    #[error("Invalid request")]
    InvalidRequest(#[from] ValidationError),

    /// Research webhook could not be reached
    #[error("Unable to connect to research service. Please ensure it is running at {endpoint}")]
    ServiceUnavailable { endpoint: String },

    /// Research webhook answered with a non-success status
    #[error("Research service responded with status: {status}")]
    UpstreamStatus { status: u16 },

    /// Research webhook did not answer in time
    #[error("Research service at {endpoint} did not respond within {seconds}s")]
    UpstreamTimeout { endpoint: String, seconds: u64 },

    /// Research webhook answered with something other than search results
    #[error("Research service returned an invalid response: {0}")]
    InvalidUpstreamResponse(String),

    /// Unexpected fault inside the relay
    #[error("Internal error: {0}")]
    Internal(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    /// HTTP status reported to the caller
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RelayError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            RelayError::UpstreamStatus { .. }
            | RelayError::UpstreamTimeout { .. }
            | RelayError::InvalidUpstreamResponse(_) => StatusCode::BAD_GATEWAY,
            RelayError::Internal(_) | RelayError::Config(_) | RelayError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<config::ConfigError> for RelayError {
    fn from(e: config::ConfigError) -> Self {
        RelayError::Config(e.to_string())
    }
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse<'a> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<&'a [FieldViolation]>,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            message: self.to_string(),
            errors: match &self {
                RelayError::InvalidRequest(e) => Some(e.violations.as_slice()),
                _ => None,
            },
        };
        (status, Json(body)).into_response()
    }
}
