//! API error handling
//!
//! Maps domain errors onto HTTP responses with stable machine-readable codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// API error
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid request body")]
    InvalidRequestBody,

    #[error("Database error")]
    DatabaseError,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Stable machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidRequestBody => "INVALID_REQUEST_BODY",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) | Self::ValidationError(_) | Self::InvalidRequestBody => {
                StatusCode::BAD_REQUEST
            }
            Self::DatabaseError | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error response body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub error: String,
    /// Human-readable error message
    pub message: String,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            error: err.error_code().to_string(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::from(&self);
        (status, Json(body)).into_response()
    }
}

impl From<compass_auth::AuthError> for ApiError {
    fn from(err: compass_auth::AuthError) -> Self {
        use compass_auth::AuthError;
        match err {
            AuthError::TokenExpired | AuthError::InvalidToken | AuthError::Unauthenticated => {
                Self::Unauthorized
            }
            AuthError::MagicLinkInvalid => {
                Self::BadRequest("Invalid or already used login link".to_string())
            }
            AuthError::MagicLinkExpired => Self::BadRequest("Login link has expired".to_string()),
            AuthError::UserNotFound => Self::NotFound("User not found".to_string()),
            AuthError::Config(msg) | AuthError::Internal(msg) => {
                tracing::error!(error = %msg, "Auth service error");
                Self::Internal(msg)
            }
        }
    }
}

impl From<compass_db::DbError> for ApiError {
    fn from(err: compass_db::DbError) -> Self {
        use compass_db::DbError;
        match err {
            DbError::NotFound(msg) => Self::NotFound(msg),
            DbError::Duplicate(msg) => Self::Conflict(msg),
            DbError::InvalidInput(msg) => Self::BadRequest(msg),
            other => {
                tracing::error!(error = ?other, "Database error");
                Self::DatabaseError
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(_: serde_json::Error) -> Self {
        Self::InvalidRequestBody
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(crate::extractors::format_validation_errors(&err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::NotFound("budget".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("budget exists".to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(ApiError::DatabaseError.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ApiError::Forbidden.error_code(), "FORBIDDEN");
        assert_eq!(
            ApiError::ValidationError("x".to_string()).error_code(),
            "VALIDATION_ERROR"
        );
    }

    #[test]
    fn test_db_error_mapping() {
        let err: ApiError = compass_db::DbError::Duplicate("Budget for 3/2024 already exists".to_string()).into();
        assert!(matches!(err, ApiError::Conflict(_)));

        let err: ApiError = compass_db::DbError::NotFound("category".to_string()).into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_auth_error_mapping() {
        let err: ApiError = compass_auth::AuthError::TokenExpired.into();
        assert!(matches!(err, ApiError::Unauthorized));

        let err: ApiError = compass_auth::AuthError::MagicLinkExpired.into();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
