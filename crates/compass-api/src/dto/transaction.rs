//! Transaction, summary, and savings balance DTOs

use chrono::{DateTime, Utc};
use compass_db::{DbSavingsBalance, DbSavingsBalanceWithCategory, DbTransaction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Record a transaction. Checking transactions require `budget_item_id`;
/// savings transactions require `category_id`.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTransactionRequest {
    /// Transaction amount, must be positive
    pub amount: Decimal,
    /// Free-form description
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
    /// When the transaction happened; defaults to now
    pub transaction_date: Option<DateTime<Utc>>,
    /// "checking" or "savings"
    pub account_type: String,
    /// Budget item a checking transaction is recorded against
    pub budget_item_id: Option<Uuid>,
    /// Savings category a savings transaction spends from
    pub category_id: Option<Uuid>,
}

/// Edit a transaction; unset fields keep their value
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateTransactionRequest {
    /// New amount, must be positive
    pub amount: Option<Decimal>,
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
    pub transaction_date: Option<DateTime<Utc>>,
    /// "checking" or "savings"
    pub account_type: Option<String>,
    pub budget_item_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
}

/// Filters for listing transactions
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct TransactionListQuery {
    /// Restrict to one budget's transactions
    pub budget_id: Option<Uuid>,
    /// "checking" or "savings"
    pub account_type: Option<String>,
    /// Month 1-12, combined with `year`
    #[validate(range(min = 1, max = 12, message = "Month must be between 1 and 12"))]
    pub month: Option<i32>,
    /// Calendar year, combined with `month`
    #[validate(range(min = 2000, max = 2100, message = "Year must be between 2000 and 2100"))]
    pub year: Option<i32>,
}

/// Transaction representation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub amount: Decimal,
    pub description: Option<String>,
    pub transaction_date: DateTime<Utc>,
    pub account_type: String,
    pub budget_item_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<DbTransaction> for TransactionResponse {
    fn from(txn: DbTransaction) -> Self {
        Self {
            id: txn.id,
            amount: txn.amount,
            description: txn.description,
            transaction_date: txn.transaction_date,
            account_type: txn.account_type,
            budget_item_id: txn.budget_item_id,
            category_id: txn.category_id,
            created_at: txn.created_at,
        }
    }
}

// =============================================================================
// Variance summary
// =============================================================================

/// Budgeted vs. actual for one category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryVariance {
    pub budgeted: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
}

/// Per-account-type slice of the summary
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AccountSummary {
    pub total_spent: Decimal,
    pub categories: BTreeMap<String, CategoryVariance>,
}

/// Variance report for one budget
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SummaryResponse {
    pub checking: AccountSummary,
    pub savings: AccountSummary,
}

// =============================================================================
// Savings balances
// =============================================================================

/// Running balance of one savings category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SavingsBalanceResponse {
    pub category_id: Uuid,
    /// Category name, when known
    pub category_name: Option<String>,
    pub funded_amount: Decimal,
    pub spent_amount: Decimal,
    pub available_balance: Decimal,
    pub last_transaction_id: Option<Uuid>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl SavingsBalanceResponse {
    /// A category that has never been funded or spent from
    pub fn zero(category_id: Uuid, category_name: Option<String>) -> Self {
        Self {
            category_id,
            category_name,
            funded_amount: Decimal::ZERO,
            spent_amount: Decimal::ZERO,
            available_balance: Decimal::ZERO,
            last_transaction_id: None,
            updated_at: None,
        }
    }

    /// Attach a category name to a raw balance row
    pub fn from_balance(balance: DbSavingsBalance, category_name: Option<String>) -> Self {
        Self {
            category_id: balance.category_id,
            category_name,
            funded_amount: balance.funded_amount,
            spent_amount: balance.spent_amount,
            available_balance: balance.available_balance,
            last_transaction_id: balance.last_transaction_id,
            updated_at: Some(balance.updated_at),
        }
    }
}

impl From<DbSavingsBalanceWithCategory> for SavingsBalanceResponse {
    fn from(balance: DbSavingsBalanceWithCategory) -> Self {
        Self {
            category_id: balance.category_id,
            category_name: Some(balance.category_name),
            funded_amount: balance.funded_amount,
            spent_amount: balance.spent_amount,
            available_balance: balance.available_balance,
            last_transaction_id: balance.last_transaction_id,
            updated_at: Some(balance.updated_at),
        }
    }
}
