//! Authentication error types
//!
//! Errors are designed to be:
//! - Informative for logging/debugging
//! - Safe for external exposure (no sensitive data leakage)
//! - Convertible to HTTP status codes

use thiserror::Error;

/// Result type alias for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    /// Token has expired
    #[error("Token has expired")]
    TokenExpired,

    /// Token is invalid (malformed, wrong signature, etc.)
    #[error("Invalid token")]
    InvalidToken,

    /// Magic link token is unknown or already used
    #[error("Invalid or already used login link")]
    MagicLinkInvalid,

    /// Magic link token has expired
    #[error("Login link has expired")]
    MagicLinkExpired,

    /// User is not authenticated
    #[error("Authentication required")]
    Unauthenticated,

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not be exposed to clients)
    #[error("Internal error")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::TokenExpired
            | Self::InvalidToken
            | Self::MagicLinkInvalid
            | Self::MagicLinkExpired
            | Self::Unauthenticated => 401,

            Self::UserNotFound => 404,

            Self::Config(_) | Self::Internal(_) => 500,
        }
    }

    /// Get an error code for the client (safe to expose)
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::MagicLinkInvalid => "MAGIC_LINK_INVALID",
            Self::MagicLinkExpired => "MAGIC_LINK_EXPIRED",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::Config(_) | Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// Get safe message for client (doesn't leak internal details)
    pub fn client_message(&self) -> String {
        match self {
            Self::Config(_) | Self::Internal(_) => "An internal error occurred".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Error response for API clients
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    /// Error code (machine-readable)
    pub code: String,
    /// Error message (human-readable)
    pub message: String,
}

impl From<&AuthError> for ErrorResponse {
    fn from(error: &AuthError) -> Self {
        Self {
            code: error.error_code().to_string(),
            message: error.client_message(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::TokenExpired,
            _ => Self::InvalidToken,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::InvalidToken.status_code(), 401);
        assert_eq!(AuthError::MagicLinkExpired.status_code(), 401);
        assert_eq!(AuthError::UserNotFound.status_code(), 404);
        assert_eq!(AuthError::Internal("test".to_string()).status_code(), 500);
    }

    #[test]
    fn test_client_message_hides_internal_details() {
        let err = AuthError::Internal("connection string with password".to_string());
        assert!(!err.client_message().contains("password"));
        assert_eq!(err.client_message(), "An internal error occurred");
    }

    #[test]
    fn test_error_response() {
        let err = AuthError::MagicLinkInvalid;
        let response = ErrorResponse::from(&err);
        assert_eq!(response.code, "MAGIC_LINK_INVALID");
    }
}
