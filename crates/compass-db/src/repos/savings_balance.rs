//! Savings category balance repository
//!
//! Maintains the running balance per (user, savings category):
//! available_balance = funded_amount - spent_amount. Each application is a
//! single upsert statement, zero-initializing the row on first touch.
//! Deltas may be negative (reversals).

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{DbResult, DbSavingsBalance, DbSavingsBalanceWithCategory};

/// Savings balance repository
pub struct SavingsBalanceRepo {
    pool: PgPool,
}

impl SavingsBalanceRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply a funding delta (checking transaction into a savings item)
    pub async fn apply_funding(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        delta: Decimal,
        transaction_id: Uuid,
    ) -> DbResult<DbSavingsBalance> {
        let balance = sqlx::query_as::<_, DbSavingsBalance>(
            r#"
            INSERT INTO savings_category_balances
                (user_id, category_id, funded_amount, spent_amount, available_balance, last_transaction_id)
            VALUES ($1, $2, $3, 0, $3, $4)
            ON CONFLICT (user_id, category_id)
            DO UPDATE SET
                funded_amount = savings_category_balances.funded_amount + $3,
                available_balance = savings_category_balances.funded_amount + $3
                    - savings_category_balances.spent_amount,
                last_transaction_id = $4,
                updated_at = NOW()
            RETURNING
                id, user_id, category_id, funded_amount, spent_amount,
                available_balance, last_transaction_id, updated_at
            "#
        )
        .bind(user_id)
        .bind(category_id)
        .bind(delta)
        .bind(transaction_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(balance)
    }

    /// Apply a spending delta (savings transaction against a category)
    pub async fn apply_spending(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        delta: Decimal,
        transaction_id: Uuid,
    ) -> DbResult<DbSavingsBalance> {
        let balance = sqlx::query_as::<_, DbSavingsBalance>(
            r#"
            INSERT INTO savings_category_balances
                (user_id, category_id, funded_amount, spent_amount, available_balance, last_transaction_id)
            VALUES ($1, $2, 0, $3, -$3, $4)
            ON CONFLICT (user_id, category_id)
            DO UPDATE SET
                spent_amount = savings_category_balances.spent_amount + $3,
                available_balance = savings_category_balances.funded_amount
                    - (savings_category_balances.spent_amount + $3),
                last_transaction_id = $4,
                updated_at = NOW()
            RETURNING
                id, user_id, category_id, funded_amount, spent_amount,
                available_balance, last_transaction_id, updated_at
            "#
        )
        .bind(user_id)
        .bind(category_id)
        .bind(delta)
        .bind(transaction_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(balance)
    }

    /// Find the balance for a specific category
    pub async fn find_for_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
    ) -> DbResult<Option<DbSavingsBalance>> {
        let balance = sqlx::query_as::<_, DbSavingsBalance>(
            r#"
            SELECT
                id, user_id, category_id, funded_amount, spent_amount,
                available_balance, last_transaction_id, updated_at
            FROM savings_category_balances
            WHERE user_id = $1 AND category_id = $2
            "#
        )
        .bind(user_id)
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(balance)
    }

    /// List all balances for a user, with category names
    pub async fn list_with_categories(
        &self,
        user_id: Uuid,
    ) -> DbResult<Vec<DbSavingsBalanceWithCategory>> {
        let balances = sqlx::query_as::<_, DbSavingsBalanceWithCategory>(
            r#"
            SELECT
                b.id, b.user_id, b.category_id, c.name AS category_name,
                b.funded_amount, b.spent_amount, b.available_balance,
                b.last_transaction_id, b.updated_at
            FROM savings_category_balances b
            JOIN categories c ON b.category_id = c.id
            WHERE b.user_id = $1
            ORDER BY c.name
            "#
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(balances)
    }
}
