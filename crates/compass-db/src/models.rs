//! Database models - mapped from PostgreSQL tables

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================================================
// User Models
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Category Models
// ============================================================================

/// category_type is one of: income, savings, monthly, cash
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbCategory {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub category_type: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Budget Models
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbBudget {
    pub id: Uuid,
    pub user_id: Uuid,
    pub month: i16,
    pub year: i16,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbBudgetItem {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub category_id: Uuid,
    pub category_type: String,
    pub amount: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Transaction Models
// ============================================================================

/// account_type is 'checking' or 'savings'. Checking transactions carry a
/// budget_item_id; savings transactions carry a category_id.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub description: Option<String>,
    pub transaction_date: DateTime<Utc>,
    pub account_type: String,
    pub budget_item_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Savings Balance Models
// ============================================================================

/// Running balance per (user, savings category).
/// available_balance = funded_amount - spent_amount at all times.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbSavingsBalance {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub funded_amount: Decimal,
    pub spent_amount: Decimal,
    pub available_balance: Decimal,
    pub last_transaction_id: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

/// Savings balance joined with its category name for reporting
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbSavingsBalanceWithCategory {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub category_name: String,
    pub funded_amount: Decimal,
    pub spent_amount: Decimal,
    pub available_balance: Decimal,
    pub last_transaction_id: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

/// One transaction row joined with its budget item and category, used to
/// build the per-budget variance summary
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbSummaryRow {
    pub account_type: String,
    pub category_name: String,
    pub budgeted: Decimal,
    pub amount: Decimal,
}
