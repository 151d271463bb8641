//! Category repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::{DbCategory, DbResult};

/// Default categories seeded for every new user: (name, category_type)
pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    // Income
    ("Salary", "income"),
    ("Freelance", "income"),
    ("Investments", "income"),
    ("Other Income", "income"),
    // Savings
    ("Emergency Fund", "savings"),
    ("Retirement", "savings"),
    ("Vacation", "savings"),
    ("Major Purchase", "savings"),
    // Monthly bills
    ("Rent/Mortgage", "monthly"),
    ("Utilities", "monthly"),
    ("Internet/Phone", "monthly"),
    ("Insurance", "monthly"),
    ("Subscriptions", "monthly"),
    // Common expenses
    ("Groceries", "cash"),
    ("Dining Out", "cash"),
    ("Entertainment", "cash"),
    ("Transportation", "cash"),
    ("Shopping", "cash"),
    ("Personal Care", "cash"),
    ("Gifts", "cash"),
    ("Miscellaneous", "cash"),
];

/// Category repository
pub struct CategoryRepo {
    pool: PgPool,
}

impl CategoryRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new category
    pub async fn create(
        &self,
        user_id: Uuid,
        name: &str,
        category_type: &str,
    ) -> DbResult<DbCategory> {
        let category = sqlx::query_as::<_, DbCategory>(
            r#"
            INSERT INTO categories (user_id, name, category_type)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, name, category_type, is_active, created_at, updated_at
            "#
        )
        .bind(user_id)
        .bind(name)
        .bind(category_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    /// Seed the default category set for a newly created user.
    /// Does nothing if the user already has any categories.
    pub async fn seed_defaults(&self, user_id: Uuid) -> DbResult<Vec<DbCategory>> {
        let existing: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM categories WHERE user_id = $1 LIMIT 1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        if existing.is_some() {
            return Ok(Vec::new());
        }

        let mut created = Vec::with_capacity(DEFAULT_CATEGORIES.len());
        for (name, category_type) in DEFAULT_CATEGORIES {
            created.push(self.create(user_id, name, category_type).await?);
        }
        Ok(created)
    }

    /// Find category by ID
    pub async fn find_by_id(&self, id: Uuid) -> DbResult<Option<DbCategory>> {
        let category = sqlx::query_as::<_, DbCategory>(
            r#"
            SELECT id, user_id, name, category_type, is_active, created_at, updated_at
            FROM categories
            WHERE id = $1
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Find an active category owned by a specific user
    pub async fn find_active_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> DbResult<Option<DbCategory>> {
        let category = sqlx::query_as::<_, DbCategory>(
            r#"
            SELECT id, user_id, name, category_type, is_active, created_at, updated_at
            FROM categories
            WHERE id = $1 AND user_id = $2 AND is_active = TRUE
            "#
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// List active categories for a user
    pub async fn list_by_user(&self, user_id: Uuid) -> DbResult<Vec<DbCategory>> {
        let categories = sqlx::query_as::<_, DbCategory>(
            r#"
            SELECT id, user_id, name, category_type, is_active, created_at, updated_at
            FROM categories
            WHERE user_id = $1 AND is_active = TRUE
            ORDER BY category_type, name
            "#
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Update category name and/or type; unset fields keep their value
    pub async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        name: Option<&str>,
        category_type: Option<&str>,
    ) -> DbResult<Option<DbCategory>> {
        let category = sqlx::query_as::<_, DbCategory>(
            r#"
            UPDATE categories
            SET name = COALESCE($3, name),
                category_type = COALESCE($4, category_type),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND is_active = TRUE
            RETURNING id, user_id, name, category_type, is_active, created_at, updated_at
            "#
        )
        .bind(id)
        .bind(user_id)
        .bind(name)
        .bind(category_type)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Archive a category (soft delete)
    pub async fn archive(&self, id: Uuid, user_id: Uuid) -> DbResult<bool> {
        let result = sqlx::query(
            "UPDATE categories SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND user_id = $2 AND is_active = TRUE"
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
