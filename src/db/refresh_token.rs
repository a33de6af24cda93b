//! Refresh token storage.
//!
//! Only refresh tokens are stored in the database; access tokens are
//! stateless and short-lived. This store is the sole authority for whether
//! a refresh token exists. Expiry checking and the single-active-token
//! replacement policy live in the lifecycle manager ([`crate::refresh`]).

use sqlx::sqlite::SqlitePool;

/// An active refresh token record.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshToken {
    pub id: i64,
    /// Opaque, unguessable token string (v4 UUID), globally unique.
    pub token: String,
    pub user_id: i64,
    /// Absolute expiry, Unix seconds.
    pub expires_at: i64,
}

/// Store for refresh token records.
pub struct RefreshTokenStore {
    pool: SqlitePool,
}

impl RefreshTokenStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new refresh token record. Returns the row ID.
    pub async fn create(
        &self,
        token: &str,
        user_id: i64,
        expires_at: i64,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO refresh_tokens (token, user_id, expires_at) VALUES (?, ?, ?)",
        )
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Exact-match lookup by token string. Absence is a normal outcome.
    pub async fn get_by_token(&self, token: &str) -> Result<Option<RefreshToken>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, token, user_id, expires_at FROM refresh_tokens WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
    }

    /// Delete a token by its token string.
    pub async fn delete_by_token(&self, token: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete all tokens for a user. Returns the number of rows removed;
    /// deleting zero rows is success.
    pub async fn delete_by_user(&self, user_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
