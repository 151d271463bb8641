//! Budget Compass REST API
//!
//! # API Structure
//!
//! ```text
//! /api/
//! ├── /auth          - Magic-link login and token issuance
//! ├── /users         - User profile
//! ├── /categories    - Spending categories
//! ├── /budgets       - Monthly budgets and their items
//! └── /transactions  - Transactions, variance summary, savings balances
//! ```
//!
//! All routes except `/health`, `/ready`, and `/api/auth/*` require a
//! Bearer JWT obtained through the magic-link flow.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod openapi;
pub mod reconcile;
pub mod routes;
pub mod state;

use axum::http::HeaderName;
use axum::Router;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// API configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Enable CORS for browser clients
    pub enable_cors: bool,
    /// Allowed origins for CORS
    pub cors_origins: Vec<String>,
    /// Enable request tracing
    pub enable_tracing: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enable_cors: true,
            cors_origins: vec!["*".to_string()],
            enable_tracing: true,
        }
    }
}

/// Create the main API router with all middleware
pub fn create_router(state: Arc<AppState>, config: ApiConfig) -> Router {
    let auth_layer = state.auth.layer();

    let mut router = Router::new()
        .nest("/api", routes::api_routes())
        .route("/health", axum::routing::get(handlers::health::health_check))
        .route("/ready", axum::routing::get(handlers::health::readiness_check))
        .merge(routes::swagger_routes())
        .with_state(state)
        // Validates Bearer tokens and inserts the user extension
        .layer(auth_layer);

    let x_request_id = HeaderName::from_static("x-request-id");
    router = router
        .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
        .layer(PropagateRequestIdLayer::new(x_request_id));

    if config.enable_tracing {
        router = router.layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");

                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        );
    }

    if config.enable_cors {
        let cors = if config.cors_origins.contains(&"*".to_string()) {
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
                .allow_origin(
                    config
                        .cors_origins
                        .iter()
                        .filter_map(|o| o.parse().ok())
                        .collect::<Vec<_>>(),
                )
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::PATCH,
                    axum::http::Method::DELETE,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers(Any)
        };
        router = router.layer(cors);
    }

    router
}

/// Create a minimal router for testing (no CORS/tracing layers)
pub fn create_test_router(state: Arc<AppState>) -> Router {
    let auth_layer = state.auth.layer();

    Router::new()
        .nest("/api", routes::api_routes())
        .route("/health", axum::routing::get(handlers::health::health_check))
        .with_state(state)
        .layer(auth_layer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert!(config.enable_cors);
        assert!(config.enable_tracing);
        assert_eq!(config.cors_origins, vec!["*".to_string()]);
    }
}
