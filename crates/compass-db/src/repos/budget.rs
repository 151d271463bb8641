//! Budget repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::{DbBudget, DbError, DbResult};

/// Budget repository
pub struct BudgetRepo {
    pool: PgPool,
}

impl BudgetRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new budget. Fails with Duplicate if an active budget
    /// already exists for the same user, month, and year.
    pub async fn create(
        &self,
        user_id: Uuid,
        month: i16,
        year: i16,
        name: &str,
    ) -> DbResult<DbBudget> {
        let budget = sqlx::query_as::<_, DbBudget>(
            r#"
            INSERT INTO budgets (user_id, month, year, name)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, month, year, name, is_active, created_at, updated_at
            "#
        )
        .bind(user_id)
        .bind(month)
        .bind(year)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.constraint() == Some("budgets_user_month_year_key") {
                    return DbError::Duplicate(format!(
                        "Budget for {}/{} already exists",
                        month, year
                    ));
                }
            }
            DbError::Query(e)
        })?;

        Ok(budget)
    }

    /// Find budget by ID
    pub async fn find_by_id(&self, id: Uuid) -> DbResult<Option<DbBudget>> {
        let budget = sqlx::query_as::<_, DbBudget>(
            r#"
            SELECT id, user_id, month, year, name, is_active, created_at, updated_at
            FROM budgets
            WHERE id = $1
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(budget)
    }

    /// Find an active budget owned by a specific user
    pub async fn find_active_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> DbResult<Option<DbBudget>> {
        let budget = sqlx::query_as::<_, DbBudget>(
            r#"
            SELECT id, user_id, month, year, name, is_active, created_at, updated_at
            FROM budgets
            WHERE id = $1 AND user_id = $2 AND is_active = TRUE
            "#
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(budget)
    }

    /// Find the active budget for a given month and year
    pub async fn find_by_month(
        &self,
        user_id: Uuid,
        month: i16,
        year: i16,
    ) -> DbResult<Option<DbBudget>> {
        let budget = sqlx::query_as::<_, DbBudget>(
            r#"
            SELECT id, user_id, month, year, name, is_active, created_at, updated_at
            FROM budgets
            WHERE user_id = $1 AND month = $2 AND year = $3 AND is_active = TRUE
            "#
        )
        .bind(user_id)
        .bind(month)
        .bind(year)
        .fetch_optional(&self.pool)
        .await?;

        Ok(budget)
    }

    /// Find the most recent active budget for a user
    pub async fn find_latest(&self, user_id: Uuid) -> DbResult<Option<DbBudget>> {
        let budget = sqlx::query_as::<_, DbBudget>(
            r#"
            SELECT id, user_id, month, year, name, is_active, created_at, updated_at
            FROM budgets
            WHERE user_id = $1 AND is_active = TRUE
            ORDER BY year DESC, month DESC
            LIMIT 1
            "#
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(budget)
    }

    /// List all active budgets for a user, newest first
    pub async fn list_by_user(&self, user_id: Uuid) -> DbResult<Vec<DbBudget>> {
        let budgets = sqlx::query_as::<_, DbBudget>(
            r#"
            SELECT id, user_id, month, year, name, is_active, created_at, updated_at
            FROM budgets
            WHERE user_id = $1 AND is_active = TRUE
            ORDER BY year DESC, month DESC
            "#
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(budgets)
    }
}
