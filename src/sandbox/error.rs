//! Sandbox Error Types
//!
//! Every failure leaves the sandbox as `{"detail": "..."}` with the status
//! code the portal backend uses for the same situation.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorDetail;

/// Sandbox API errors
#[derive(Error, Debug)]
pub enum SandboxError {
    /// Malformed or rejected input
    #[error("{0}")]
    BadRequest(String),

    /// Missing or invalid credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but the role does not allow it
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Well-formed body with out-of-range values
    #[error("{0}")]
    Unprocessable(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SandboxError {
    pub fn forbidden() -> Self {
        SandboxError::Forbidden("Forbidden".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            SandboxError::BadRequest(_) => StatusCode::BAD_REQUEST,
            SandboxError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            SandboxError::Forbidden(_) => StatusCode::FORBIDDEN,
            SandboxError::NotFound(_) => StatusCode::NOT_FOUND,
            SandboxError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SandboxError::Internal(_) | SandboxError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SandboxError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Sandbox request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Sandbox request rejected");
        }

        let body = ErrorDetail {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for sandbox handlers
pub type SandboxResult<T> = Result<T, SandboxError>;
