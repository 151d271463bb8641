//! OpenAPI documentation

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

use crate::dto;
use crate::error::ErrorResponse;
use crate::handlers;

/// Budget Compass API documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Budget Compass API",
        description = "Personal budgeting API: magic-link auth, monthly budgets, transactions, and savings balance tracking.",
        version = "0.1.0",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0"
        )
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    paths(
        // Health
        handlers::health::health_check,
        handlers::health::readiness_check,
        // Auth
        handlers::auth::login,
        handlers::auth::verify,
        // Users
        handlers::user::me,
        // Categories
        handlers::category::create_category,
        handlers::category::list_categories,
        handlers::category::get_category,
        handlers::category::update_category,
        handlers::category::delete_category,
        // Budgets
        handlers::budget::create_budget,
        handlers::budget::list_budgets,
        handlers::budget::current_budget,
        handlers::budget::get_budget,
        // Budget items
        handlers::budget_item::create_budget_item,
        handlers::budget_item::list_budget_items,
        handlers::budget_item::update_budget_item,
        handlers::budget_item::delete_budget_item,
        // Transactions
        handlers::transaction::create_transaction,
        handlers::transaction::list_transactions,
        handlers::transaction::get_transaction,
        handlers::transaction::update_transaction,
        handlers::transaction::delete_transaction,
        handlers::transaction::budget_summary,
        // Savings balances
        handlers::savings::list_balances,
        handlers::savings::get_balance,
    ),
    components(
        schemas(
            ErrorResponse,
            // Auth
            dto::LoginRequest,
            dto::LoginResponse,
            dto::VerifyRequest,
            dto::TokenResponse,
            // Users
            dto::UserResponse,
            // Categories
            dto::CreateCategoryRequest,
            dto::UpdateCategoryRequest,
            dto::CategoryResponse,
            // Budgets
            dto::CreateBudgetRequest,
            dto::BudgetResponse,
            dto::CreateBudgetItemRequest,
            dto::UpdateBudgetItemRequest,
            dto::BudgetItemResponse,
            // Transactions
            dto::CreateTransactionRequest,
            dto::UpdateTransactionRequest,
            dto::TransactionResponse,
            dto::CategoryVariance,
            dto::AccountSummary,
            dto::SummaryResponse,
            dto::SavingsBalanceResponse,
        )
    ),
    tags(
        (name = "Health", description = "Service health and status"),
        (name = "Authentication", description = "Magic-link login and token issuance"),
        (name = "Users", description = "User profile"),
        (name = "Categories", description = "Spending categories"),
        (name = "Budgets", description = "Monthly budgets"),
        (name = "Budget Items", description = "Per-category budget allocations"),
        (name = "Transactions", description = "Checking and savings transactions"),
        (name = "Savings Balances", description = "Running savings category balances")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Security scheme modifier
pub struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = &mut openapi.components {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let doc = ApiDoc::openapi();
        assert_eq!(doc.info.title, "Budget Compass API");
    }

    #[test]
    fn test_openapi_json() {
        let json = ApiDoc::openapi().to_json().unwrap();
        assert!(json.contains("Budget Compass API"));
        assert!(json.contains("/api/transactions/savings/balances"));
    }
}
