//! Authentication Middleware for Axum
//!
//! Extracts and validates Bearer tokens, providing authenticated user
//! context to handlers. Requests without credentials pass through; handlers
//! decide whether authentication is required.

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, Request},
    http::{request::Parts, StatusCode},
    response::Response,
};
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use uuid::Uuid;

use crate::error::{AuthError, ErrorResponse};
use crate::jwt::JwtService;
use crate::types::AuthenticatedUser;

/// Authentication middleware layer
#[derive(Clone)]
pub struct AuthLayer {
    jwt: Arc<JwtService>,
}

impl AuthLayer {
    /// Create a new authentication layer
    pub fn new(jwt: Arc<JwtService>) -> Self {
        Self { jwt }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            jwt: self.jwt.clone(),
        }
    }
}

/// Authentication middleware service
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    jwt: Arc<JwtService>,
}

impl<S> Service<Request> for AuthMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let jwt = self.jwt.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            match authenticate_request(req.headers(), &jwt) {
                Ok(user) => {
                    let (mut parts, body) = req.into_parts();
                    parts.extensions.insert(user);
                    let req = Request::from_parts(parts, body);
                    inner.call(req).await
                }
                Err(AuthError::Unauthenticated) => {
                    // No auth provided - let the request through without user
                    // context. Handler can decide if auth is required.
                    inner.call(req).await
                }
                Err(e) => Ok(auth_error_response(e)),
            }
        })
    }
}

/// Authenticate a request from its Bearer token
fn authenticate_request(
    headers: &axum::http::HeaderMap,
    jwt: &JwtService,
) -> Result<AuthenticatedUser, AuthError> {
    if let Some(auth_header) = headers.get("Authorization") {
        let auth_str = auth_header.to_str().map_err(|_| AuthError::InvalidToken)?;
        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            let claims = jwt.validate_access_token(token)?;
            let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
            return Ok(AuthenticatedUser {
                user_id,
                email: claims.email,
            });
        }
    }

    Err(AuthError::Unauthenticated)
}

/// Create error response for authentication errors
pub fn auth_error_response(error: AuthError) -> Response {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let response = ErrorResponse::from(&error);

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(
            serde_json::to_string(&response).unwrap_or_default(),
        ))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}

/// Extractor for required authenticated user.
/// Returns 401 if not authenticated.
pub struct RequireAuth(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(RequireAuth)
            .ok_or_else(|| auth_error_response(AuthError::Unauthenticated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use axum::http::HeaderMap;

    fn test_jwt() -> JwtService {
        JwtService::new(JwtConfig {
            secret: "test-secret-key-for-jwt-tokens-min-32-bytes!".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_authenticate_valid_bearer() {
        let jwt = test_jwt();
        let user_id = Uuid::new_v4();
        let issued = jwt.generate_access_token(user_id, "test@example.com").unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            format!("Bearer {}", issued.token).parse().unwrap(),
        );

        let user = authenticate_request(&headers, &jwt).unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.email, "test@example.com");
    }

    #[test]
    fn test_no_auth_header_is_unauthenticated() {
        let jwt = test_jwt();
        let headers = HeaderMap::new();
        let result = authenticate_request(&headers, &jwt);
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let jwt = test_jwt();
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", "Bearer not-a-jwt".parse().unwrap());
        let result = authenticate_request(&headers, &jwt);
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_auth_error_response_status() {
        let response = auth_error_response(AuthError::InvalidToken);
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
