//! User repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::{DbError, DbResult, DbUser};

/// User repository for authentication and profile management
pub struct UserRepo {
    pool: PgPool,
}

impl UserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(&self, email: &str, name: Option<&str>) -> DbResult<DbUser> {
        let user = sqlx::query_as::<_, DbUser>(
            r#"
            INSERT INTO users (email, name)
            VALUES ($1, $2)
            RETURNING id, email, name, is_active, created_at, updated_at, deleted_at
            "#
        )
        .bind(email)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.constraint() == Some("users_email_key") {
                    return DbError::Duplicate(format!("Email {} already exists", email));
                }
            }
            DbError::Query(e)
        })?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: Uuid) -> DbResult<Option<DbUser>> {
        let user = sqlx::query_as::<_, DbUser>(
            r#"
            SELECT id, email, name, is_active, created_at, updated_at, deleted_at
            FROM users
            WHERE id = $1 AND deleted_at IS NULL
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<DbUser>> {
        let user = sqlx::query_as::<_, DbUser>(
            r#"
            SELECT id, email, name, is_active, created_at, updated_at, deleted_at
            FROM users
            WHERE email = $1 AND deleted_at IS NULL
            "#
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update user profile name
    pub async fn update_name(&self, user_id: Uuid, name: Option<&str>) -> DbResult<()> {
        sqlx::query("UPDATE users SET name = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Soft delete user
    pub async fn soft_delete(&self, user_id: Uuid) -> DbResult<()> {
        sqlx::query("UPDATE users SET is_active = FALSE, deleted_at = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
