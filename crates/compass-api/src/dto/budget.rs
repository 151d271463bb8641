//! Budget and budget item DTOs

use chrono::{DateTime, Utc};
use compass_db::{DbBudget, DbBudgetItem};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Create a monthly budget. The name is generated as "<MonthName> <year>".
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBudgetRequest {
    /// Month 1-12
    #[validate(range(min = 1, max = 12, message = "Month must be between 1 and 12"))]
    pub month: i16,
    /// Calendar year
    #[validate(range(min = 2000, max = 2100, message = "Year must be between 2000 and 2100"))]
    pub year: i16,
}

/// Budget representation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BudgetResponse {
    pub id: Uuid,
    pub month: i16,
    pub year: i16,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<DbBudget> for BudgetResponse {
    fn from(budget: DbBudget) -> Self {
        Self {
            id: budget.id,
            month: budget.month,
            year: budget.year,
            name: budget.name,
            is_active: budget.is_active,
            created_at: budget.created_at,
        }
    }
}

/// Allocate an amount to a category within a budget. Creating an item for
/// a category that already has one updates that item's amount instead.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBudgetItemRequest {
    /// Category the allocation is for
    pub category_id: Uuid,
    /// Allocated amount, must be positive
    pub amount: Decimal,
}

/// Change an item's allocated amount
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateBudgetItemRequest {
    /// New allocated amount, must be positive
    pub amount: Decimal,
}

/// Budget item representation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BudgetItemResponse {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub category_id: Uuid,
    pub category_type: String,
    pub amount: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<DbBudgetItem> for BudgetItemResponse {
    fn from(item: DbBudgetItem) -> Self {
        Self {
            id: item.id,
            budget_id: item.budget_id,
            category_id: item.category_id,
            category_type: item.category_type,
            amount: item.amount,
            is_active: item.is_active,
            created_at: item.created_at,
        }
    }
}

/// Month number to display name, for generated budget names
pub fn month_name(month: i16) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_names() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
        assert_eq!(month_name(13), "Unknown");
    }
}
