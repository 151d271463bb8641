//! Savings balance handlers

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::SavingsBalanceResponse;
use crate::error::{ApiError, ApiResult};
use crate::extractors::AuthenticatedUser;
use crate::state::AppState;

/// All savings balances for the caller, with category names
#[utoipa::path(
    get,
    path = "/api/transactions/savings/balances",
    tag = "Savings Balances",
    responses(
        (status = 200, description = "Balances", body = [SavingsBalanceResponse])
    ),
    security(("bearer" = []))
)]
pub async fn list_balances(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Vec<SavingsBalanceResponse>>> {
    let balances = state
        .db
        .savings_balance_repo()
        .list_with_categories(user.user_id)
        .await?;

    Ok(Json(balances.into_iter().map(Into::into).collect()))
}

/// One category's balance; all-zero if it has never been funded
#[utoipa::path(
    get,
    path = "/api/transactions/savings/balances/{category_id}",
    tag = "Savings Balances",
    params(("category_id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Balance", body = SavingsBalanceResponse),
        (status = 404, description = "Category not found")
    ),
    security(("bearer" = []))
)]
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(category_id): Path<Uuid>,
) -> ApiResult<Json<SavingsBalanceResponse>> {
    let category = state
        .db
        .category_repo()
        .find_by_id(category_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    if category.user_id != user.user_id {
        return Err(ApiError::Forbidden);
    }

    let response = match state
        .db
        .savings_balance_repo()
        .find_for_category(user.user_id, category_id)
        .await?
    {
        Some(balance) => SavingsBalanceResponse::from_balance(balance, Some(category.name)),
        None => SavingsBalanceResponse::zero(category_id, Some(category.name)),
    };

    Ok(Json(response))
}
