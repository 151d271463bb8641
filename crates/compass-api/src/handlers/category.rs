//! Category handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::{
    is_valid_category_type, CategoryResponse, CreateCategoryRequest, UpdateCategoryRequest,
};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{AuthenticatedUser, ValidatedJson};
use crate::state::AppState;

fn check_category_type(category_type: &str) -> ApiResult<()> {
    if is_valid_category_type(category_type) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "Invalid category type '{}', expected one of: income, savings, monthly, cash",
            category_type
        )))
    }
}

/// Create a category
#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "Categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Invalid category type")
    ),
    security(("bearer" = []))
)]
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<CategoryResponse>)> {
    check_category_type(&request.category_type)?;

    let category = state
        .db
        .category_repo()
        .create(user.user_id, &request.name, &request.category_type)
        .await?;

    tracing::info!(
        user_id = %user.user_id,
        category_id = %category.id,
        category_type = %category.category_type,
        "Category created"
    );

    Ok((StatusCode::CREATED, Json(category.into())))
}

/// List the caller's active categories
#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Categories",
    responses(
        (status = 200, description = "Categories", body = [CategoryResponse])
    ),
    security(("bearer" = []))
)]
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Vec<CategoryResponse>>> {
    let categories = state.db.category_repo().list_by_user(user.user_id).await?;

    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

/// Get one category
#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category", body = CategoryResponse),
        (status = 404, description = "Not found")
    ),
    security(("bearer" = []))
)]
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CategoryResponse>> {
    let category = state
        .db
        .category_repo()
        .find_active_for_user(id, user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    Ok(Json(category.into()))
}

/// Update a category
#[utoipa::path(
    patch,
    path = "/api/categories/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 404, description = "Not found")
    ),
    security(("bearer" = []))
)]
pub async fn update_category(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateCategoryRequest>,
) -> ApiResult<Json<CategoryResponse>> {
    if let Some(category_type) = &request.category_type {
        check_category_type(category_type)?;
    }

    let category = state
        .db
        .category_repo()
        .update(
            id,
            user.user_id,
            request.name.as_deref(),
            request.category_type.as_deref(),
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    Ok(Json(category.into()))
}

/// Archive a category
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category archived"),
        (status = 404, description = "Not found")
    ),
    security(("bearer" = []))
)]
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let archived = state.db.category_repo().archive(id, user.user_id).await?;
    if !archived {
        return Err(ApiError::NotFound("Category not found".to_string()));
    }

    tracing::info!(user_id = %user.user_id, category_id = %id, "Category archived");

    Ok(StatusCode::NO_CONTENT)
}
