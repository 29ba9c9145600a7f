use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::backend_client::BackendError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// Client-side validation; always raised before any backend call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Duplicate in-flight action, wrong phase, or a superseded response.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// The message shown to the user and stored on the session after a failed transition.
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::Conflict(msg)
            | AppError::NotImplemented(msg) => msg.clone(),
            AppError::Unauthorized => "Please sign in to use this feature".to_string(),
            AppError::Backend(e) => e.to_string(),
            AppError::Internal(_) => "An internal error occurred".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Backend(e) => {
                tracing::error!("Backend error: {e}");
                (StatusCode::BAD_GATEWAY, "BACKEND_ERROR")
            }
            AppError::NotImplemented(_) => (StatusCode::NOT_IMPLEMENTED, "NOT_IMPLEMENTED"),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.user_message()
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT),
            (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                AppError::Backend(BackendError::Status {
                    status: 500,
                    message: String::new(),
                }),
                StatusCode::BAD_GATEWAY,
            ),
            (AppError::NotImplemented("x".into()), StatusCode::NOT_IMPLEMENTED),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_backend_status_message_mentions_code() {
        let err = AppError::Backend(BackendError::Status {
            status: 503,
            message: "down".into(),
        });
        assert_eq!(err.user_message(), "HTTP error! status: 503");
    }

    #[test]
    fn test_internal_message_hides_details() {
        let err = AppError::Internal(anyhow::anyhow!("lock poisoned at line 12"));
        assert_eq!(err.user_message(), "An internal error occurred");
    }
}
