//! HTTP mapping for authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

use crate::error::AuthError;

/// Error body returned by every endpoint.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub status: u16,
    pub code: &'static str,
    pub message: String,
    pub details: Vec<String>,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AuthError::Identity(_) | AuthError::Publish(_) | AuthError::Configuration(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> ErrorResponse {
        let status = self.status_code();
        let (code, message, details) = match self {
            AuthError::Validation(details) => {
                ("VALIDATION_ERROR", "Validation failed".to_string(), details.clone())
            }
            AuthError::Unauthorized(detail) => {
                ("AUTH_ERROR", "Authentication failed".to_string(), vec![detail.clone()])
            }
            AuthError::Identity(_) | AuthError::Publish(_) | AuthError::Configuration(_) => (
                "INTERNAL_SERVER_ERROR",
                "An unexpected error occurred".to_string(),
                Vec::new(),
            ),
        };

        ErrorResponse {
            status: status.as_u16(),
            code,
            message,
            details,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = self.error_response();

        if self.status_code().is_server_error() {
            error!(code = body.code, error = %self, "http_request_failed");
        } else {
            warn!(code = body.code, error = %self, "http_request_rejected");
        }

        (self.status_code(), Json(body)).into_response()
    }
}
