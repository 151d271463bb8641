//! API routes

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::state::AppState;

/// Create the /api routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/users", user_routes())
        .nest("/categories", category_routes())
        .nest("/budgets", budget_routes())
        .nest("/transactions", transaction_routes())
}

/// Authentication routes (no bearer token required)
fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/verify", post(handlers::auth::verify))
}

/// User routes
fn user_routes() -> Router<Arc<AppState>> {
    Router::new().route("/me", get(handlers::user::me))
}

/// Category routes
fn category_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(handlers::category::create_category))
        .route("/", get(handlers::category::list_categories))
        .route("/:id", get(handlers::category::get_category))
        .route("/:id", patch(handlers::category::update_category))
        .route("/:id", delete(handlers::category::delete_category))
}

/// Budget and budget item routes
fn budget_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(handlers::budget::create_budget))
        .route("/", get(handlers::budget::list_budgets))
        .route("/current", get(handlers::budget::current_budget))
        .route("/:id", get(handlers::budget::get_budget))
        .route(
            "/:budget_id/items",
            post(handlers::budget_item::create_budget_item),
        )
        .route(
            "/:budget_id/items",
            get(handlers::budget_item::list_budget_items),
        )
        .route(
            "/:budget_id/items/:item_id",
            patch(handlers::budget_item::update_budget_item),
        )
        .route(
            "/:budget_id/items/:item_id",
            delete(handlers::budget_item::delete_budget_item),
        )
}

/// Transaction, summary, and savings balance routes
fn transaction_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(handlers::transaction::create_transaction))
        .route("/", get(handlers::transaction::list_transactions))
        .route(
            "/budget/:budget_id/summary",
            get(handlers::transaction::budget_summary),
        )
        .route(
            "/savings/balances",
            get(handlers::savings::list_balances),
        )
        .route(
            "/savings/balances/:category_id",
            get(handlers::savings::get_balance),
        )
        .route("/:id", get(handlers::transaction::get_transaction))
        .route("/:id", put(handlers::transaction::update_transaction))
        .route("/:id", delete(handlers::transaction::delete_transaction))
}

/// Create Swagger UI routes
pub fn swagger_routes() -> Router<Arc<AppState>> {
    use crate::openapi::ApiDoc;
    use utoipa::OpenApi;
    use utoipa_swagger_ui::SwaggerUi;

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
