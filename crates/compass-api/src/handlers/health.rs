//! Health check handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Timestamp
    pub timestamp: i64,
}

/// Readiness check response
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    /// Overall status
    pub status: String,
    /// Database status
    pub database: ComponentStatus,
}

/// Component status
#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    /// Component name
    pub name: String,
    /// Status (healthy/unhealthy)
    pub status: String,
    /// Error message if unhealthy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Health check endpoint
///
/// Returns 200 if the service is running. Does not verify dependencies.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy")
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0);

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp,
    })
}

/// Readiness check endpoint
///
/// Returns 200 if the service and the database are ready.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready"),
        (status = 503, description = "Service is not ready")
    )
)]
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let (healthy, database) = match state.db.health_check().await {
        Ok(health) if health.postgres => (
            true,
            ComponentStatus {
                name: "PostgreSQL".to_string(),
                status: "healthy".to_string(),
                error: None,
            },
        ),
        Ok(_) => (
            false,
            ComponentStatus {
                name: "PostgreSQL".to_string(),
                status: "unhealthy".to_string(),
                error: Some("PostgreSQL health check failed".to_string()),
            },
        ),
        Err(e) => (
            false,
            ComponentStatus {
                name: "PostgreSQL".to_string(),
                status: "unhealthy".to_string(),
                error: Some(e.to_string()),
            },
        ),
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(ReadinessResponse {
            status: if healthy { "ready" } else { "not_ready" }.to_string(),
            database,
        }),
    )
}
