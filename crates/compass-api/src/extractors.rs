//! Custom Axum extractors
//!
//! Request extractors for authentication and validated input.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::{ApiError, ErrorResponse};

// =============================================================================
// Authenticated User Extractor
// =============================================================================

/// Authenticated user extracted from the request, set by the auth middleware
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// User ID
    pub user_id: Uuid,
    /// User email
    pub email: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<compass_auth::types::AuthenticatedUser>()
            .cloned()
            .map(|u| AuthenticatedUser {
                user_id: u.user_id,
                email: u.email,
            })
            .ok_or_else(|| error_response(ApiError::Unauthorized))
    }
}

// =============================================================================
// Validated JSON Extractor
// =============================================================================

/// JSON extractor with validation
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> axum::extract::FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + validator::Validate,
{
    type Rejection = Response;

    async fn from_request(
        req: axum::http::Request<axum::body::Body>,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| error_response(ApiError::BadRequest(e.to_string())))?;

        value
            .validate()
            .map_err(|e| error_response(ApiError::ValidationError(format_validation_errors(&e))))?;

        Ok(ValidatedJson(value))
    }
}

// =============================================================================
// Validated Query Extractor
// =============================================================================

/// Query extractor with validation
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + validator::Validate,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| error_response(ApiError::BadRequest(e.to_string())))?;

        value
            .validate()
            .map_err(|e| error_response(ApiError::ValidationError(format_validation_errors(&e))))?;

        Ok(ValidatedQuery(value))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Create error response from ApiError
pub fn error_response(error: ApiError) -> Response {
    let status = error.status_code();
    let body = ErrorResponse::from(&error);

    (status, Json(body)).into_response()
}

/// Format validation errors into a readable string
pub fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: validation failed", field))
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Debug, serde::Deserialize, Validate)]
    struct EmailPayload {
        #[validate(email(message = "Invalid email address"))]
        email: String,
    }

    #[test]
    fn test_format_validation_errors() {
        let payload = EmailPayload {
            email: "not-an-email".to_string(),
        };
        let errors = payload.validate().unwrap_err();
        assert_eq!(format_validation_errors(&errors), "Invalid email address");
    }

    #[test]
    fn test_error_response_status() {
        let response = error_response(ApiError::Forbidden);
        assert_eq!(response.status(), axum::http::StatusCode::FORBIDDEN);
    }
}
