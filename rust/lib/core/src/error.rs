use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

// ── Error codes ─────────────────────────────────────────────────────
//
// Stable, machine-readable identifiers. Clients match on these,
// never on the human-readable message string.

/// Stable error code constants.
///
/// Clients should match on `code` from `{"code": "UNAUTHENTICATED", "message": "..."}`.
pub mod error_code {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";
    pub const UPSTREAM_ERROR: &str = "UPSTREAM_ERROR";
    pub const UNAVAILABLE: &str = "UNAVAILABLE";
    pub const INTERNAL: &str = "INTERNAL";
}

/// Message shown to users when an operation fails for a reason they
/// should not see (decode failures, bugs, misconfiguration).
pub const DEFAULT_SERVER_ERROR_MESSAGE: &str =
    "Something went wrong while executing the operation.";

/// Message shown to users when the backend API cannot be reached.
pub const UNAVAILABLE_MESSAGE: &str =
    "The service is not responding right now. Please try again later.";

// ── ServiceError ────────────────────────────────────────────────────

/// Unified service error type used across the front-end crates.
///
/// Each variant maps to a stable error code (see [`error_code`]) and an
/// HTTP status code. The JSON response always includes both:
///
/// ```json
/// {"code": "UPSTREAM_ERROR", "message": "Flight not found"}
/// ```
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Resource does not exist. HTTP 404.
    #[error("{0}")]
    NotFound(String),

    /// Input data is invalid. HTTP 400.
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid session. HTTP 401.
    #[error("{0}")]
    Unauthorized(String),

    /// The backend API answered with a non-success status. The message is
    /// already normalized (`detail` field or HTTP status text).
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// The backend API could not be reached. HTTP 503.
    #[error("{0}")]
    Unavailable(String),

    /// Unexpected internal error. HTTP 500.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// Stable, machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => error_code::NOT_FOUND,
            ServiceError::Validation(_) => error_code::VALIDATION_FAILED,
            ServiceError::Unauthorized(_) => error_code::UNAUTHENTICATED,
            ServiceError::Upstream { .. } => error_code::UPSTREAM_ERROR,
            ServiceError::Unavailable(_) => error_code::UNAVAILABLE,
            ServiceError::Internal(_) => error_code::INTERNAL,
        }
    }

    /// HTTP status code for this error.
    ///
    /// Upstream client errors (4xx) pass through; upstream server errors
    /// become 502.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Upstream { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(StatusCode::is_client_error)
                .unwrap_or(StatusCode::BAD_GATEWAY),
            ServiceError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the end user.
    ///
    /// Internal errors collapse to [`DEFAULT_SERVER_ERROR_MESSAGE`] and
    /// transport failures to [`UNAVAILABLE_MESSAGE`]; their detail only goes
    /// to the log. Everything else is already user-facing.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::Internal(_) => DEFAULT_SERVER_ERROR_MESSAGE.to_string(),
            ServiceError::Unavailable(_) => UNAVAILABLE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "code": self.error_code(),
            "message": self.public_message(),
        });
        (status, axum::Json(body)).into_response()
    }
}
