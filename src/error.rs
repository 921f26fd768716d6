/// Unified error types for the rolodex service
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the service
#[derive(Error, Debug)]
pub enum RolodexError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration errors (startup only)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider metadata discovery failures (startup only)
    #[error("Provider discovery failed: {0}")]
    Discovery(String),

    /// Signing-algorithm policy violations (startup only)
    #[error("Signing policy violation: {0}")]
    Policy(String),

    /// Authentication errors; the inner detail is logged, never returned
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Identity-provider call failures
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// JSON error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Convert RolodexError to HTTP response
impl IntoResponse for RolodexError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            // Every rejection reason gets the same outward body; the concrete
            // reason is only logged.
            RolodexError::Authentication(reason) => {
                tracing::warn!(reason = %reason, "request authentication rejected");
                (
                    StatusCode::UNAUTHORIZED,
                    "AuthenticationRequired",
                    "Authentication required".to_string(),
                )
            }
            RolodexError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                "InvalidRequest",
                self.to_string(),
            ),
            RolodexError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                "NotFound",
                self.to_string(),
            ),
            RolodexError::Upstream(detail) => {
                tracing::error!(detail = %detail, "identity provider call failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "InternalServerError",
                    "Internal server error".to_string(),
                )
            }
            RolodexError::Database(_)
            | RolodexError::Internal(_)
            | RolodexError::Io(_)
            | RolodexError::Config(_)
            | RolodexError::Discovery(_)
            | RolodexError::Policy(_) => {
                tracing::error!(error = %self, "internal failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "InternalServerError",
                    "Internal server error".to_string(), // Don't leak details
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for service operations
pub type RolodexResult<T> = Result<T, RolodexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_response_is_generic() {
        for err in [
            RolodexError::Authentication("signature mismatch".to_string()),
            RolodexError::Authentication("token expired".to_string()),
            RolodexError::Authentication("missing claim sub".to_string()),
        ] {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn upstream_response_is_opaque() {
        let err = RolodexError::Upstream("provider returned 503".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_maps_to_bad_request() {
        let err = RolodexError::Validation("email is required".to_string());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
