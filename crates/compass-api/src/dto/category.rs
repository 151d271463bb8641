//! Category DTOs

use chrono::{DateTime, Utc};
use compass_db::DbCategory;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// The four category types
pub const CATEGORY_TYPES: &[&str] = &["income", "savings", "monthly", "cash"];

/// Check a category type string against the allowed set
pub fn is_valid_category_type(category_type: &str) -> bool {
    CATEGORY_TYPES.contains(&category_type)
}

/// Create a category
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryRequest {
    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    /// One of: income, savings, monthly, cash
    pub category_type: String,
}

/// Update a category; unset fields keep their value
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
    /// One of: income, savings, monthly, cash
    pub category_type: Option<String>,
}

/// Category representation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub category_type: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<DbCategory> for CategoryResponse {
    fn from(category: DbCategory) -> Self {
        Self {
            id: category.id,
            name: category.name,
            category_type: category.category_type,
            is_active: category.is_active,
            created_at: category.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_type_set() {
        assert!(is_valid_category_type("savings"));
        assert!(is_valid_category_type("cash"));
        assert!(!is_valid_category_type("crypto"));
    }
}
