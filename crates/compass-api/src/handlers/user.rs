//! User handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::dto::UserResponse;
use crate::error::{ApiError, ApiResult};
use crate::extractors::AuthenticatedUser;
use crate::state::AppState;

/// Current user profile
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer" = []))
)]
pub async fn me(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> ApiResult<Json<UserResponse>> {
    let profile = state
        .db
        .user_repo()
        .find_by_id(user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(profile.into()))
}
