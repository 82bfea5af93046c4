//! Error handling middleware - RFC 7807 compliant responses.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use social_core::RepoError;
use social_shared::ErrorResponse;
use std::fmt;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Timeout,
    Unavailable,
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Timeout => write!(f, "Timed out"),
            AppError::Unavailable => write!(f, "Request cancelled"),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Conflict(detail) => ErrorResponse::conflict(detail),
            AppError::Timeout => ErrorResponse::new(504, "Gateway Timeout")
                .with_detail("The request took too long to complete"),
            AppError::Unavailable => ErrorResponse::new(503, "Service Unavailable"),
            AppError::Internal(detail) => {
                // Log internal errors
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        if err.is_generic() {
            tracing::warn!(error = %err, "Store operation failed");
        }

        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Conflict(_) => AppError::Conflict("Resource already exists".to_string()),
            RepoError::Timeout(_) => AppError::Timeout,
            RepoError::Cancelled => AppError::Unavailable,
            RepoError::Connection(_) | RepoError::Constraint(_) | RepoError::Query(_) => {
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn store_errors_map_to_status_classes() {
        let cases = [
            (RepoError::NotFound, StatusCode::NOT_FOUND),
            (
                RepoError::Conflict("followers_pkey".into()),
                StatusCode::CONFLICT,
            ),
            (
                RepoError::Timeout(Duration::from_secs(5)),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (RepoError::Cancelled, StatusCode::SERVICE_UNAVAILABLE),
            (
                RepoError::Query("syntax error".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                RepoError::Constraint("comments_post_id_fkey".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(AppError::from(err).status_code(), expected);
        }
    }

    #[test]
    fn generic_failures_hide_backend_detail() {
        let err = AppError::from(RepoError::Connection(
            "password authentication failed for user admin".into(),
        ));

        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.to_string().contains("admin"));
    }
}
