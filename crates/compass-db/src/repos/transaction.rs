//! Transaction repository

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{DbResult, DbSummaryRow, DbTransaction};

/// Optional filters for listing transactions
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub budget_id: Option<Uuid>,
    pub account_type: Option<String>,
    pub month: Option<i32>,
    pub year: Option<i32>,
}

/// Transaction repository
pub struct TransactionRepo {
    pool: PgPool,
}

impl TransactionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new transaction
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        user_id: Uuid,
        amount: Decimal,
        description: Option<&str>,
        transaction_date: DateTime<Utc>,
        account_type: &str,
        budget_item_id: Option<Uuid>,
        category_id: Option<Uuid>,
    ) -> DbResult<DbTransaction> {
        let transaction = sqlx::query_as::<_, DbTransaction>(
            r#"
            INSERT INTO transactions
                (user_id, amount, description, transaction_date, account_type, budget_item_id, category_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING
                id, user_id, amount, description, transaction_date, account_type,
                budget_item_id, category_id, is_active, created_at, updated_at, deleted_at
            "#
        )
        .bind(user_id)
        .bind(amount)
        .bind(description)
        .bind(transaction_date)
        .bind(account_type)
        .bind(budget_item_id)
        .bind(category_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(transaction)
    }

    /// Find transaction by ID
    pub async fn find_by_id(&self, id: Uuid) -> DbResult<Option<DbTransaction>> {
        let transaction = sqlx::query_as::<_, DbTransaction>(
            r#"
            SELECT
                id, user_id, amount, description, transaction_date, account_type,
                budget_item_id, category_id, is_active, created_at, updated_at, deleted_at
            FROM transactions
            WHERE id = $1
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(transaction)
    }

    /// List active transactions for a user, newest first.
    ///
    /// With both budget_id and month/year set, checking transactions are
    /// filtered through their budget item's budget while savings transactions
    /// match on date alone. With budget_id only, the budget item join is
    /// required, so only checking transactions are returned.
    pub async fn list(
        &self,
        user_id: Uuid,
        filter: &TransactionFilter,
    ) -> DbResult<Vec<DbTransaction>> {
        let transactions = sqlx::query_as::<_, DbTransaction>(
            r#"
            SELECT
                t.id, t.user_id, t.amount, t.description, t.transaction_date, t.account_type,
                t.budget_item_id, t.category_id, t.is_active, t.created_at, t.updated_at, t.deleted_at
            FROM transactions t
            LEFT JOIN budget_items bi ON t.budget_item_id = bi.id
            WHERE t.user_id = $1
              AND t.is_active = TRUE
              AND ($2::text IS NULL OR t.account_type = $2)
              AND ($3::int IS NULL OR EXTRACT(MONTH FROM t.transaction_date) = $3)
              AND ($4::int IS NULL OR EXTRACT(YEAR FROM t.transaction_date) = $4)
              AND ($5::uuid IS NULL OR CASE
                    WHEN $3::int IS NOT NULL AND $4::int IS NOT NULL
                        THEN t.account_type = 'savings' OR bi.budget_id = $5
                    ELSE bi.budget_id = $5
                  END)
            ORDER BY t.transaction_date DESC
            "#
        )
        .bind(user_id)
        .bind(filter.account_type.as_deref())
        .bind(filter.month)
        .bind(filter.year)
        .bind(filter.budget_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    /// Update a transaction with fully resolved new values
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: Uuid,
        amount: Decimal,
        description: Option<&str>,
        transaction_date: DateTime<Utc>,
        account_type: &str,
        budget_item_id: Option<Uuid>,
        category_id: Option<Uuid>,
    ) -> DbResult<DbTransaction> {
        let transaction = sqlx::query_as::<_, DbTransaction>(
            r#"
            UPDATE transactions
            SET amount = $2,
                description = $3,
                transaction_date = $4,
                account_type = $5,
                budget_item_id = $6,
                category_id = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, user_id, amount, description, transaction_date, account_type,
                budget_item_id, category_id, is_active, created_at, updated_at, deleted_at
            "#
        )
        .bind(id)
        .bind(amount)
        .bind(description)
        .bind(transaction_date)
        .bind(account_type)
        .bind(budget_item_id)
        .bind(category_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(transaction)
    }

    /// Soft delete a transaction
    pub async fn soft_delete(&self, id: Uuid) -> DbResult<()> {
        sqlx::query(
            "UPDATE transactions SET is_active = FALSE, deleted_at = NOW(), updated_at = NOW() WHERE id = $1"
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch the rows feeding a budget's variance summary: every active
    /// transaction attached to one of the budget's items, with the item's
    /// budgeted amount and category name.
    pub async fn summary_rows(
        &self,
        budget_id: Uuid,
        user_id: Uuid,
    ) -> DbResult<Vec<DbSummaryRow>> {
        let rows = sqlx::query_as::<_, DbSummaryRow>(
            r#"
            SELECT t.account_type, c.name AS category_name, bi.amount AS budgeted, t.amount
            FROM transactions t
            JOIN budget_items bi ON t.budget_item_id = bi.id
            JOIN categories c ON bi.category_id = c.id
            WHERE bi.budget_id = $1 AND t.user_id = $2 AND t.is_active = TRUE
            "#
        )
        .bind(budget_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
