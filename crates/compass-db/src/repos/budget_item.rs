//! Budget item repository

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{DbBudgetItem, DbResult};

/// Budget item repository
pub struct BudgetItemRepo {
    pool: PgPool,
}

impl BudgetItemRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a budget item. If an active item already exists for the same
    /// (budget, category, category_type), its amount is updated instead.
    pub async fn upsert(
        &self,
        budget_id: Uuid,
        category_id: Uuid,
        category_type: &str,
        amount: Decimal,
    ) -> DbResult<DbBudgetItem> {
        let existing = sqlx::query_as::<_, DbBudgetItem>(
            r#"
            SELECT id, budget_id, category_id, category_type, amount, is_active, created_at, updated_at
            FROM budget_items
            WHERE budget_id = $1 AND category_id = $2 AND category_type = $3 AND is_active = TRUE
            "#
        )
        .bind(budget_id)
        .bind(category_id)
        .bind(category_type)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(item) = existing {
            let updated = sqlx::query_as::<_, DbBudgetItem>(
                r#"
                UPDATE budget_items
                SET amount = $2, updated_at = NOW()
                WHERE id = $1
                RETURNING id, budget_id, category_id, category_type, amount, is_active, created_at, updated_at
                "#
            )
            .bind(item.id)
            .bind(amount)
            .fetch_one(&self.pool)
            .await?;

            return Ok(updated);
        }

        let item = sqlx::query_as::<_, DbBudgetItem>(
            r#"
            INSERT INTO budget_items (budget_id, category_id, category_type, amount)
            VALUES ($1, $2, $3, $4)
            RETURNING id, budget_id, category_id, category_type, amount, is_active, created_at, updated_at
            "#
        )
        .bind(budget_id)
        .bind(category_id)
        .bind(category_type)
        .bind(amount)
        .fetch_one(&self.pool)
        .await?;

        Ok(item)
    }

    /// Find budget item by ID
    pub async fn find_by_id(&self, id: Uuid) -> DbResult<Option<DbBudgetItem>> {
        let item = sqlx::query_as::<_, DbBudgetItem>(
            r#"
            SELECT id, budget_id, category_id, category_type, amount, is_active, created_at, updated_at
            FROM budget_items
            WHERE id = $1
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// List active items for a budget
    pub async fn list_by_budget(&self, budget_id: Uuid) -> DbResult<Vec<DbBudgetItem>> {
        let items = sqlx::query_as::<_, DbBudgetItem>(
            r#"
            SELECT id, budget_id, category_id, category_type, amount, is_active, created_at, updated_at
            FROM budget_items
            WHERE budget_id = $1 AND is_active = TRUE
            ORDER BY created_at
            "#
        )
        .bind(budget_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Update an item's amount
    pub async fn update_amount(
        &self,
        id: Uuid,
        budget_id: Uuid,
        amount: Decimal,
    ) -> DbResult<Option<DbBudgetItem>> {
        let item = sqlx::query_as::<_, DbBudgetItem>(
            r#"
            UPDATE budget_items
            SET amount = $3, updated_at = NOW()
            WHERE id = $1 AND budget_id = $2 AND is_active = TRUE
            RETURNING id, budget_id, category_id, category_type, amount, is_active, created_at, updated_at
            "#
        )
        .bind(id)
        .bind(budget_id)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Archive a budget item (soft delete). Transactions referencing the
    /// item keep resolving it through find_by_id.
    pub async fn archive(&self, id: Uuid, budget_id: Uuid) -> DbResult<bool> {
        let result = sqlx::query(
            "UPDATE budget_items SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND budget_id = $2 AND is_active = TRUE"
        )
        .bind(id)
        .bind(budget_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
