//! Budget handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{Datelike, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::{month_name, BudgetResponse, CreateBudgetRequest};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{AuthenticatedUser, ValidatedJson};
use crate::state::AppState;

/// Create a monthly budget
#[utoipa::path(
    post,
    path = "/api/budgets",
    tag = "Budgets",
    request_body = CreateBudgetRequest,
    responses(
        (status = 201, description = "Budget created", body = BudgetResponse),
        (status = 409, description = "Budget already exists for this month")
    ),
    security(("bearer" = []))
)]
pub async fn create_budget(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateBudgetRequest>,
) -> ApiResult<(StatusCode, Json<BudgetResponse>)> {
    let name = format!("{} {}", month_name(request.month), request.year);

    let budget = state
        .db
        .budget_repo()
        .create(user.user_id, request.month, request.year, &name)
        .await?;

    tracing::info!(
        user_id = %user.user_id,
        budget_id = %budget.id,
        month = budget.month,
        year = budget.year,
        "Budget created"
    );

    Ok((StatusCode::CREATED, Json(budget.into())))
}

/// List the caller's budgets, newest first
#[utoipa::path(
    get,
    path = "/api/budgets",
    tag = "Budgets",
    responses(
        (status = 200, description = "Budgets", body = [BudgetResponse])
    ),
    security(("bearer" = []))
)]
pub async fn list_budgets(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Vec<BudgetResponse>>> {
    let budgets = state.db.budget_repo().list_by_user(user.user_id).await?;

    Ok(Json(budgets.into_iter().map(Into::into).collect()))
}

/// The budget for the current month, falling back to the most recent one
#[utoipa::path(
    get,
    path = "/api/budgets/current",
    tag = "Budgets",
    responses(
        (status = 200, description = "Current budget", body = BudgetResponse),
        (status = 404, description = "No budgets exist")
    ),
    security(("bearer" = []))
)]
pub async fn current_budget(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> ApiResult<Json<BudgetResponse>> {
    let now = Utc::now();
    let repo = state.db.budget_repo();

    let budget = match repo
        .find_by_month(user.user_id, now.month() as i16, now.year() as i16)
        .await?
    {
        Some(budget) => budget,
        None => repo
            .find_latest(user.user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("No budgets found".to_string()))?,
    };

    Ok(Json(budget.into()))
}

/// Get one budget
#[utoipa::path(
    get,
    path = "/api/budgets/{id}",
    tag = "Budgets",
    params(("id" = Uuid, Path, description = "Budget ID")),
    responses(
        (status = 200, description = "Budget", body = BudgetResponse),
        (status = 404, description = "Not found")
    ),
    security(("bearer" = []))
)]
pub async fn get_budget(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BudgetResponse>> {
    let budget = state
        .db
        .budget_repo()
        .find_active_for_user(id, user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Budget not found".to_string()))?;

    Ok(Json(budget.into()))
}
