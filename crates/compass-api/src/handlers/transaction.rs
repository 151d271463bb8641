//! Transaction handlers
//!
//! Create/update/delete run the savings balance reconciler: the planner in
//! [`crate::reconcile`] turns each mutation into signed balance effects,
//! applied here through the savings balance repository. Reversals are
//! applied before new effects.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use compass_db::{DbTransaction, TransactionFilter};

use crate::dto::{
    AccountSummary, CategoryVariance, CreateTransactionRequest, SummaryResponse,
    TransactionListQuery, TransactionResponse, UpdateTransactionRequest,
};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{AuthenticatedUser, ValidatedJson, ValidatedQuery};
use crate::reconcile::{self, AccountType, BalanceEffect, TransactionFacts};
use crate::state::AppState;

fn parse_account_type(value: &str) -> ApiResult<AccountType> {
    value.parse().map_err(ApiError::BadRequest)
}

fn check_positive_amount(amount: Decimal) -> ApiResult<()> {
    if amount > Decimal::ZERO {
        Ok(())
    } else {
        Err(ApiError::BadRequest("Amount must be positive".to_string()))
    }
}

/// The resolved linkage of one transaction state: which budget item or
/// category it points at, and the facts the reconciler needs.
struct ResolvedLinkage {
    budget_item_id: Option<Uuid>,
    category_id: Option<Uuid>,
    facts: TransactionFacts,
}

/// Validate the linkage for a transaction state and resolve its
/// reconciliation facts. Checking transactions must point at a budget item
/// whose budget the caller owns; savings transactions must point at a
/// category the caller owns.
async fn resolve_linkage(
    state: &AppState,
    user_id: Uuid,
    account_type: AccountType,
    amount: Decimal,
    budget_item_id: Option<Uuid>,
    category_id: Option<Uuid>,
) -> ApiResult<ResolvedLinkage> {
    match account_type {
        AccountType::Checking => {
            let item_id = budget_item_id.ok_or_else(|| {
                ApiError::BadRequest(
                    "Checking transactions require budget_item_id".to_string(),
                )
            })?;

            let item = state
                .db
                .budget_item_repo()
                .find_by_id(item_id)
                .await?
                .ok_or_else(|| ApiError::NotFound("Budget item not found".to_string()))?;

            let budget = state
                .db
                .budget_repo()
                .find_by_id(item.budget_id)
                .await?
                .ok_or_else(|| ApiError::NotFound("Budget not found".to_string()))?;

            if budget.user_id != user_id {
                return Err(ApiError::Forbidden);
            }

            let savings_category =
                (item.category_type == "savings").then_some(item.category_id);

            Ok(ResolvedLinkage {
                budget_item_id: Some(item.id),
                category_id: None,
                facts: TransactionFacts {
                    account_type,
                    amount,
                    savings_category,
                },
            })
        }
        AccountType::Savings => {
            let category_id = category_id.ok_or_else(|| {
                ApiError::BadRequest("Savings transactions require category_id".to_string())
            })?;

            let category = state
                .db
                .category_repo()
                .find_by_id(category_id)
                .await?
                .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

            if category.user_id != user_id {
                return Err(ApiError::Forbidden);
            }

            Ok(ResolvedLinkage {
                budget_item_id: None,
                category_id: Some(category.id),
                facts: TransactionFacts {
                    account_type,
                    amount,
                    savings_category: Some(category.id),
                },
            })
        }
    }
}

/// Reconstruct the reconciliation facts of a stored transaction
async fn stored_facts(state: &AppState, txn: &DbTransaction) -> ApiResult<TransactionFacts> {
    let account_type = parse_account_type(&txn.account_type)?;

    let savings_category = match account_type {
        AccountType::Checking => match txn.budget_item_id {
            Some(item_id) => state
                .db
                .budget_item_repo()
                .find_by_id(item_id)
                .await?
                .and_then(|item| (item.category_type == "savings").then_some(item.category_id)),
            None => None,
        },
        AccountType::Savings => txn.category_id,
    };

    Ok(TransactionFacts {
        account_type,
        amount: txn.amount,
        savings_category,
    })
}

/// Apply planned balance effects, one atomic upsert each
async fn apply_effects(
    state: &AppState,
    user_id: Uuid,
    transaction_id: Uuid,
    effects: &[BalanceEffect],
) -> ApiResult<()> {
    let repo = state.db.savings_balance_repo();

    for effect in effects {
        let balance = match effect {
            BalanceEffect::Funding {
                category_id,
                amount,
            } => {
                repo.apply_funding(user_id, *category_id, *amount, transaction_id)
                    .await?
            }
            BalanceEffect::Spending {
                category_id,
                amount,
            } => {
                repo.apply_spending(user_id, *category_id, *amount, transaction_id)
                    .await?
            }
        };

        tracing::debug!(
            user_id = %user_id,
            category_id = %effect.category_id(),
            delta = %effect.amount(),
            available = %balance.available_balance,
            "Balance effect applied"
        );
    }

    Ok(())
}

/// A transaction owned by the caller, or 404
async fn owned_transaction(
    state: &AppState,
    id: Uuid,
    user_id: Uuid,
) -> ApiResult<DbTransaction> {
    let txn = state
        .db
        .transaction_repo()
        .find_by_id(id)
        .await?
        .filter(|t| t.user_id == user_id && t.is_active)
        .ok_or_else(|| ApiError::NotFound("Transaction not found".to_string()))?;

    Ok(txn)
}

/// Record a transaction
#[utoipa::path(
    post,
    path = "/api/transactions",
    tag = "Transactions",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transaction recorded", body = TransactionResponse),
        (status = 400, description = "Invalid account type or missing linkage"),
        (status = 403, description = "Linked budget or category not owned by caller"),
        (status = 404, description = "Linked budget item or category not found")
    ),
    security(("bearer" = []))
)]
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateTransactionRequest>,
) -> ApiResult<(StatusCode, Json<TransactionResponse>)> {
    let account_type = parse_account_type(&request.account_type)?;
    check_positive_amount(request.amount)?;

    let linkage = resolve_linkage(
        &state,
        user.user_id,
        account_type,
        request.amount,
        request.budget_item_id,
        request.category_id,
    )
    .await?;

    let txn = state
        .db
        .transaction_repo()
        .create(
            user.user_id,
            request.amount,
            request.description.as_deref(),
            request.transaction_date.unwrap_or_else(Utc::now),
            account_type.as_str(),
            linkage.budget_item_id,
            linkage.category_id,
        )
        .await?;

    let effects = reconcile::plan_create(&linkage.facts);
    apply_effects(&state, user.user_id, txn.id, &effects).await?;

    tracing::info!(
        user_id = %user.user_id,
        transaction_id = %txn.id,
        account_type = %txn.account_type,
        amount = %txn.amount,
        "Transaction recorded"
    );

    Ok((StatusCode::CREATED, Json(txn.into())))
}

/// List transactions, newest first
#[utoipa::path(
    get,
    path = "/api/transactions",
    tag = "Transactions",
    params(
        ("budget_id" = Option<Uuid>, Query, description = "Restrict to one budget"),
        ("account_type" = Option<String>, Query, description = "checking or savings"),
        ("month" = Option<i32>, Query, description = "Month 1-12"),
        ("year" = Option<i32>, Query, description = "Calendar year")
    ),
    responses(
        (status = 200, description = "Transactions", body = [TransactionResponse])
    ),
    security(("bearer" = []))
)]
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    ValidatedQuery(query): ValidatedQuery<TransactionListQuery>,
) -> ApiResult<Json<Vec<TransactionResponse>>> {
    if let Some(account_type) = &query.account_type {
        parse_account_type(account_type)?;
    }

    let filter = TransactionFilter {
        budget_id: query.budget_id,
        account_type: query.account_type,
        month: query.month,
        year: query.year,
    };

    let transactions = state
        .db
        .transaction_repo()
        .list(user.user_id, &filter)
        .await?;

    Ok(Json(transactions.into_iter().map(Into::into).collect()))
}

/// Get one transaction
#[utoipa::path(
    get,
    path = "/api/transactions/{id}",
    tag = "Transactions",
    params(("id" = Uuid, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Transaction", body = TransactionResponse),
        (status = 404, description = "Not found")
    ),
    security(("bearer" = []))
)]
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TransactionResponse>> {
    let txn = owned_transaction(&state, id, user.user_id).await?;

    Ok(Json(txn.into()))
}

/// Edit a transaction. The old state's balance effect is reversed before
/// the new state's effect is applied, so amount, category, and
/// account-type changes all land on the right side of the balance.
#[utoipa::path(
    put,
    path = "/api/transactions/{id}",
    tag = "Transactions",
    params(("id" = Uuid, Path, description = "Transaction ID")),
    request_body = UpdateTransactionRequest,
    responses(
        (status = 200, description = "Transaction updated", body = TransactionResponse),
        (status = 400, description = "Invalid account type or missing linkage"),
        (status = 404, description = "Not found")
    ),
    security(("bearer" = []))
)]
pub async fn update_transaction(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateTransactionRequest>,
) -> ApiResult<Json<TransactionResponse>> {
    let existing = owned_transaction(&state, id, user.user_id).await?;

    let amount = request.amount.unwrap_or(existing.amount);
    check_positive_amount(amount)?;

    let account_type = match &request.account_type {
        Some(value) => parse_account_type(value)?,
        None => parse_account_type(&existing.account_type)?,
    };

    // Resolve the new linkage under the new account type. Switching sides
    // drops the other side's reference unless the request supplies it.
    let (budget_item_id, category_id) = match account_type {
        AccountType::Checking => (request.budget_item_id.or(existing.budget_item_id), None),
        AccountType::Savings => (None, request.category_id.or(existing.category_id)),
    };

    let linkage = resolve_linkage(
        &state,
        user.user_id,
        account_type,
        amount,
        budget_item_id,
        category_id,
    )
    .await?;

    let old_facts = stored_facts(&state, &existing).await?;
    let effects = reconcile::plan_update(&old_facts, &linkage.facts);
    apply_effects(&state, user.user_id, existing.id, &effects).await?;

    let txn = state
        .db
        .transaction_repo()
        .update(
            existing.id,
            amount,
            request
                .description
                .as_deref()
                .or(existing.description.as_deref()),
            request
                .transaction_date
                .unwrap_or(existing.transaction_date),
            account_type.as_str(),
            linkage.budget_item_id,
            linkage.category_id,
        )
        .await?;

    tracing::info!(
        user_id = %user.user_id,
        transaction_id = %txn.id,
        "Transaction updated"
    );

    Ok(Json(txn.into()))
}

/// Soft-delete a transaction, reversing its balance effect
#[utoipa::path(
    delete,
    path = "/api/transactions/{id}",
    tag = "Transactions",
    params(("id" = Uuid, Path, description = "Transaction ID")),
    responses(
        (status = 204, description = "Transaction deleted"),
        (status = 404, description = "Not found")
    ),
    security(("bearer" = []))
)]
pub async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let existing = owned_transaction(&state, id, user.user_id).await?;

    let facts = stored_facts(&state, &existing).await?;
    let effects = reconcile::plan_delete(&facts);
    apply_effects(&state, user.user_id, existing.id, &effects).await?;

    state.db.transaction_repo().soft_delete(existing.id).await?;

    tracing::info!(
        user_id = %user.user_id,
        transaction_id = %id,
        "Transaction deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Variance report for one budget: per-account-type spending totals and
/// per-category budgeted/spent/remaining.
#[utoipa::path(
    get,
    path = "/api/transactions/budget/{budget_id}/summary",
    tag = "Transactions",
    params(("budget_id" = Uuid, Path, description = "Budget ID")),
    responses(
        (status = 200, description = "Variance summary", body = SummaryResponse),
        (status = 404, description = "Budget not found")
    ),
    security(("bearer" = []))
)]
pub async fn budget_summary(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(budget_id): Path<Uuid>,
) -> ApiResult<Json<SummaryResponse>> {
    state
        .db
        .budget_repo()
        .find_active_for_user(budget_id, user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Budget not found".to_string()))?;

    let rows = state
        .db
        .transaction_repo()
        .summary_rows(budget_id, user.user_id)
        .await?;

    let mut summary = SummaryResponse::default();

    for row in rows {
        let bucket: &mut AccountSummary = match row.account_type.as_str() {
            "savings" => &mut summary.savings,
            _ => &mut summary.checking,
        };

        bucket.total_spent += row.amount;
        let entry = bucket
            .categories
            .entry(row.category_name)
            .or_insert(CategoryVariance {
                budgeted: row.budgeted,
                spent: Decimal::ZERO,
                remaining: row.budgeted,
            });
        entry.spent += row.amount;
        entry.remaining = entry.budgeted - entry.spent;
    }

    Ok(Json(summary))
}
