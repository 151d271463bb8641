//! End-to-end API tests against a real PostgreSQL database.
//!
//! Run with a scratch database:
//!
//! ```bash
//! TEST_DATABASE_URL=postgres://localhost/compass_test \
//!     cargo test -p compass-api -- --ignored
//! ```

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use compass_api::{create_test_router, AppState};
use compass_auth::{AuthConfig, AuthService};
use compass_db::{Database, DatabaseConfig};

async fn test_state() -> Arc<AppState> {
    let url = std::env::var("TEST_DATABASE_URL")
        .expect("TEST_DATABASE_URL must point at a scratch database");

    let db_config = DatabaseConfig {
        postgres_url: url,
        ..Default::default()
    };
    let db = Database::connect(&db_config).await.expect("db connect");
    db.migrate().await.expect("migrations");

    let mut auth_config = AuthConfig::default();
    auth_config.jwt.secret = "integration-test-secret-at-least-32-bytes!".to_string();
    let auth = AuthService::new(auth_config);

    Arc::new(AppState::new(Arc::new(db), Arc::new(auth)))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

/// Log in a fresh user and return a bearer token
async fn login(state: &Arc<AppState>, email: &str) -> String {
    let app = create_test_router(state.clone());
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"email": email}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The magic link is only logged; for tests, mint the token directly
    let user = state
        .db
        .user_repo()
        .find_by_email(email)
        .await
        .unwrap()
        .unwrap();
    state
        .auth
        .jwt
        .generate_access_token(user.id, &user.email)
        .unwrap()
        .token
}

fn unique_email(tag: &str) -> String {
    format!("{}+{}@compass.test", tag, uuid::Uuid::new_v4().simple())
}

#[tokio::test]
#[ignore]
async fn test_health_endpoint() {
    let state = test_state().await;
    let app = create_test_router(state);

    let response = app.oneshot(get_request("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_requests_without_token_are_unauthorized() {
    let state = test_state().await;
    let app = create_test_router(state);

    let response = app
        .oneshot(get_request("/api/categories", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_login_rejects_invalid_email() {
    let state = test_state().await;
    let app = create_test_router(state);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"email": "not-an-email"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_new_user_gets_default_categories() {
    let state = test_state().await;
    let token = login(&state, &unique_email("defaults")).await;

    let app = create_test_router(state);
    let response = app
        .oneshot(get_request("/api/categories", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let categories = body.as_array().unwrap();
    assert!(!categories.is_empty());
    assert!(categories
        .iter()
        .any(|c| c["name"] == "Emergency Fund" && c["category_type"] == "savings"));
}

#[tokio::test]
#[ignore]
async fn test_duplicate_budget_conflicts() {
    let state = test_state().await;
    let token = login(&state, &unique_email("budgets")).await;

    let payload = json!({"month": 6, "year": 2031});

    let response = create_test_router(state.clone())
        .oneshot(json_request("POST", "/api/budgets", Some(&token), payload.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["name"], "June 2031");

    let response = create_test_router(state)
        .oneshot(json_request("POST", "/api/budgets", Some(&token), payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// Funding from checking, spending from savings, then editing and deleting
/// transactions must keep available = funded - spent.
#[tokio::test]
#[ignore]
async fn test_savings_balance_reconciliation_flow() {
    let state = test_state().await;
    let token = login(&state, &unique_email("reconcile")).await;

    // Budget for a fixed month
    let response = create_test_router(state.clone())
        .oneshot(json_request(
            "POST",
            "/api/budgets",
            Some(&token),
            json!({"month": 1, "year": 2032}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let budget = body_json(response).await;
    let budget_id = budget["id"].as_str().unwrap().to_string();

    // Find the seeded Vacation savings category
    let response = create_test_router(state.clone())
        .oneshot(get_request("/api/categories", Some(&token)))
        .await
        .unwrap();
    let categories = body_json(response).await;
    let vacation = categories
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "Vacation")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    // Allocate to Vacation in this budget
    let response = create_test_router(state.clone())
        .oneshot(json_request(
            "POST",
            &format!("/api/budgets/{}/items", budget_id),
            Some(&token),
            json!({"category_id": vacation, "amount": "500"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let item = body_json(response).await;
    let item_id = item["id"].as_str().unwrap().to_string();

    // Fund from checking
    let response = create_test_router(state.clone())
        .oneshot(json_request(
            "POST",
            "/api/transactions",
            Some(&token),
            json!({
                "amount": "300",
                "account_type": "checking",
                "budget_item_id": item_id,
                "description": "Vacation fund"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let funding = body_json(response).await;
    let funding_id = funding["id"].as_str().unwrap().to_string();

    // Spend from savings
    let response = create_test_router(state.clone())
        .oneshot(json_request(
            "POST",
            "/api/transactions",
            Some(&token),
            json!({
                "amount": "120",
                "account_type": "savings",
                "category_id": vacation,
                "description": "Flights"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let spending = body_json(response).await;
    let spending_id = spending["id"].as_str().unwrap().to_string();

    // funded 300, spent 120, available 180
    let response = create_test_router(state.clone())
        .oneshot(get_request(
            &format!("/api/transactions/savings/balances/{}", vacation),
            Some(&token),
        ))
        .await
        .unwrap();
    let balance = body_json(response).await;
    assert_eq!(balance["funded_amount"], "300.00");
    assert_eq!(balance["spent_amount"], "120.00");
    assert_eq!(balance["available_balance"], "180.00");

    // Edit the funding amount: 300 -> 450
    let response = create_test_router(state.clone())
        .oneshot(json_request(
            "PUT",
            &format!("/api/transactions/{}", funding_id),
            Some(&token),
            json!({"amount": "450"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Delete the spending
    let response = create_test_router(state.clone())
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/transactions/{}", spending_id))
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // funded 450, spent 0, available 450
    let response = create_test_router(state.clone())
        .oneshot(get_request(
            &format!("/api/transactions/savings/balances/{}", vacation),
            Some(&token),
        ))
        .await
        .unwrap();
    let balance = body_json(response).await;
    assert_eq!(balance["funded_amount"], "450.00");
    assert_eq!(balance["spent_amount"], "0.00");
    assert_eq!(balance["available_balance"], "450.00");

    // Summary covers the checking side of this budget
    let response = create_test_router(state)
        .oneshot(get_request(
            &format!("/api/transactions/budget/{}/summary", budget_id),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let summary = body_json(response).await;
    assert_eq!(summary["checking"]["total_spent"], "450.00");
    assert_eq!(summary["checking"]["categories"]["Vacation"]["budgeted"], "500.00");
}

#[tokio::test]
#[ignore]
async fn test_checking_transaction_requires_budget_item() {
    let state = test_state().await;
    let token = login(&state, &unique_email("linkage")).await;

    let response = create_test_router(state)
        .oneshot(json_request(
            "POST",
            "/api/transactions",
            Some(&token),
            json!({"amount": "10", "account_type": "checking"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_savings_balance_forbidden_for_other_users_category() {
    let state = test_state().await;
    let owner_token = login(&state, &unique_email("owner")).await;
    let intruder_token = login(&state, &unique_email("intruder")).await;

    let response = create_test_router(state.clone())
        .oneshot(get_request("/api/categories", Some(&owner_token)))
        .await
        .unwrap();
    let categories = body_json(response).await;
    let category_id = categories.as_array().unwrap()[0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = create_test_router(state)
        .oneshot(get_request(
            &format!("/api/transactions/savings/balances/{}", category_id),
            Some(&intruder_token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
