//! Error handling for the gateway.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use orderfetch_core::Error;
use serde::{Deserialize, Serialize};

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A fetch failed in the core.
    #[error(transparent)]
    Fetch(#[from] Error),
    /// Bad request parameters.
    #[error("{0}")]
    BadRequest(String),
    /// The request did not finish within the gateway timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    /// Internal server error.
    #[error("{0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error flag.
    pub error: bool,
    /// Error code.
    pub code: String,
    /// Error message.
    pub message: String,
}

impl AppError {
    /// HTTP status and machine-readable code for this error.
    pub fn status(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Fetch(Error::StaleReference { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "USAGE_ERROR")
            }
            AppError::Fetch(Error::PaginationUnsupported { .. }) => {
                (StatusCode::BAD_REQUEST, "PAGINATION_UNSUPPORTED")
            }
            AppError::Fetch(Error::NotFound) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Fetch(Error::PoolExhausted(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "POOL_EXHAUSTED")
            }
            AppError::Fetch(Error::Storage(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR")
            }
            AppError::Fetch(Error::InvalidData(_)) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status();
        if status.is_server_error() {
            tracing::error!(code, error = %self, "request failed");
        }

        let body = ErrorResponse {
            error: true,
            code: code.to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
