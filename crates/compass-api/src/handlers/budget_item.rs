//! Budget item handlers
//!
//! Items allocate an amount to a category within one budget. The category's
//! type is copied onto the item at creation so later category edits do not
//! reclassify existing allocations.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::{BudgetItemResponse, CreateBudgetItemRequest, UpdateBudgetItemRequest};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{AuthenticatedUser, ValidatedJson};
use crate::state::AppState;

fn check_positive_amount(amount: Decimal) -> ApiResult<()> {
    if amount > Decimal::ZERO {
        Ok(())
    } else {
        Err(ApiError::BadRequest("Amount must be positive".to_string()))
    }
}

/// The caller's budget, or 404
async fn owned_budget(
    state: &AppState,
    budget_id: Uuid,
    user_id: Uuid,
) -> ApiResult<compass_db::DbBudget> {
    state
        .db
        .budget_repo()
        .find_active_for_user(budget_id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Budget not found".to_string()))
}

/// Allocate an amount to a category. If the category already has an active
/// item in this budget, its amount is updated instead.
#[utoipa::path(
    post,
    path = "/api/budgets/{budget_id}/items",
    tag = "Budget Items",
    params(("budget_id" = Uuid, Path, description = "Budget ID")),
    request_body = CreateBudgetItemRequest,
    responses(
        (status = 201, description = "Item created or updated", body = BudgetItemResponse),
        (status = 400, description = "Invalid amount"),
        (status = 404, description = "Budget or category not found")
    ),
    security(("bearer" = []))
)]
pub async fn create_budget_item(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(budget_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<CreateBudgetItemRequest>,
) -> ApiResult<(StatusCode, Json<BudgetItemResponse>)> {
    check_positive_amount(request.amount)?;
    owned_budget(&state, budget_id, user.user_id).await?;

    let category = state
        .db
        .category_repo()
        .find_active_for_user(request.category_id, user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    let item = state
        .db
        .budget_item_repo()
        .upsert(
            budget_id,
            category.id,
            &category.category_type,
            request.amount,
        )
        .await?;

    tracing::info!(
        user_id = %user.user_id,
        budget_id = %budget_id,
        item_id = %item.id,
        amount = %item.amount,
        "Budget item saved"
    );

    Ok((StatusCode::CREATED, Json(item.into())))
}

/// List a budget's active items
#[utoipa::path(
    get,
    path = "/api/budgets/{budget_id}/items",
    tag = "Budget Items",
    params(("budget_id" = Uuid, Path, description = "Budget ID")),
    responses(
        (status = 200, description = "Items", body = [BudgetItemResponse]),
        (status = 404, description = "Budget not found")
    ),
    security(("bearer" = []))
)]
pub async fn list_budget_items(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(budget_id): Path<Uuid>,
) -> ApiResult<Json<Vec<BudgetItemResponse>>> {
    owned_budget(&state, budget_id, user.user_id).await?;

    let items = state.db.budget_item_repo().list_by_budget(budget_id).await?;

    Ok(Json(items.into_iter().map(Into::into).collect()))
}

/// Change an item's allocated amount
#[utoipa::path(
    patch,
    path = "/api/budgets/{budget_id}/items/{item_id}",
    tag = "Budget Items",
    params(
        ("budget_id" = Uuid, Path, description = "Budget ID"),
        ("item_id" = Uuid, Path, description = "Budget item ID")
    ),
    request_body = UpdateBudgetItemRequest,
    responses(
        (status = 200, description = "Item updated", body = BudgetItemResponse),
        (status = 404, description = "Budget or item not found")
    ),
    security(("bearer" = []))
)]
pub async fn update_budget_item(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path((budget_id, item_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(request): ValidatedJson<UpdateBudgetItemRequest>,
) -> ApiResult<Json<BudgetItemResponse>> {
    check_positive_amount(request.amount)?;
    owned_budget(&state, budget_id, user.user_id).await?;

    let item = state
        .db
        .budget_item_repo()
        .update_amount(item_id, budget_id, request.amount)
        .await?
        .ok_or_else(|| ApiError::NotFound("Budget item not found".to_string()))?;

    Ok(Json(item.into()))
}

/// Archive a budget item. Past transactions keep their reference.
#[utoipa::path(
    delete,
    path = "/api/budgets/{budget_id}/items/{item_id}",
    tag = "Budget Items",
    params(
        ("budget_id" = Uuid, Path, description = "Budget ID"),
        ("item_id" = Uuid, Path, description = "Budget item ID")
    ),
    responses(
        (status = 204, description = "Item archived"),
        (status = 404, description = "Budget or item not found")
    ),
    security(("bearer" = []))
)]
pub async fn delete_budget_item(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path((budget_id, item_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    owned_budget(&state, budget_id, user.user_id).await?;

    let archived = state
        .db
        .budget_item_repo()
        .archive(item_id, budget_id)
        .await?;
    if !archived {
        return Err(ApiError::NotFound("Budget item not found".to_string()));
    }

    tracing::info!(
        user_id = %user.user_id,
        budget_id = %budget_id,
        item_id = %item_id,
        "Budget item archived"
    );

    Ok(StatusCode::NO_CONTENT)
}
