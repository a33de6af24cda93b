//! Refresh token lifecycle: creation, expiry verification, invalidation.
//!
//! Refresh tokens are opaque v4 UUID strings tracked in the database; the
//! store is the sole authority for whether one exists. Creation replaces any
//! prior token for the same user, so at most one refresh token per user is
//! ever valid for renewal. Expired tokens are cleaned up lazily, when they
//! are presented for verification; there is no background eviction.

use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use crate::db::{Database, RefreshToken};

/// Refresh token duration: 7 days
pub const REFRESH_TOKEN_DURATION_SECS: u64 = 7 * 24 * 60 * 60;

/// Failure to renew from a refresh token. Carries the offending token
/// string so the client-visible message can name it.
#[derive(Debug)]
pub struct TokenRefreshError {
    pub token: String,
    pub reason: &'static str,
}

impl TokenRefreshError {
    pub fn new(token: impl Into<String>, reason: &'static str) -> Self {
        Self {
            token: token.into(),
            reason,
        }
    }
}

impl std::fmt::Display for TokenRefreshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed for [{}]: {}", self.token, self.reason)
    }
}

impl std::error::Error for TokenRefreshError {}

/// Errors from refresh token lifecycle operations.
#[derive(Debug)]
pub enum RefreshError {
    /// The presented token is absent or expired.
    Refresh(TokenRefreshError),
    /// Underlying storage failure.
    Database(sqlx::Error),
}

impl From<sqlx::Error> for RefreshError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(e)
    }
}

impl std::fmt::Display for RefreshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshError::Refresh(e) => e.fmt(f),
            RefreshError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for RefreshError {}

/// Manager for the refresh token lifecycle.
#[derive(Clone)]
pub struct RefreshTokens {
    db: Database,
}

impl RefreshTokens {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a new refresh token for a user, superseding any existing one.
    ///
    /// Concurrent logins for the same user race here; last write wins, which
    /// is acceptable under the single-active-session policy.
    pub async fn create_refresh_token(&self, user_id: i64) -> Result<RefreshToken, RefreshError> {
        let store = self.db.refresh_tokens();
        store.delete_by_user(user_id).await?;

        let token = Uuid::new_v4().to_string();
        let expires_at = now_unix() as i64 + REFRESH_TOKEN_DURATION_SECS as i64;
        let id = store.create(&token, user_id, expires_at).await?;

        Ok(RefreshToken {
            id,
            token,
            user_id,
            expires_at,
        })
    }

    /// Look up a refresh token by its string. Absence is a normal outcome.
    pub async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, RefreshError> {
        Ok(self.db.refresh_tokens().get_by_token(token).await?)
    }

    /// Verify a token has not expired.
    ///
    /// An expired token is deleted from the store (one-time-use cleanup)
    /// before the error is returned; a live token comes back unchanged.
    pub async fn verify_expiration(
        &self,
        token: RefreshToken,
    ) -> Result<RefreshToken, RefreshError> {
        if token.expires_at <= now_unix() as i64 {
            self.db.refresh_tokens().delete_by_token(&token.token).await?;
            return Err(RefreshError::Refresh(TokenRefreshError::new(
                token.token,
                "Refresh token expired",
            )));
        }
        Ok(token)
    }

    /// Delete all refresh tokens owned by a user. Returns the count removed;
    /// zero is success (logout is idempotent).
    pub async fn delete_by_user(&self, user_id: i64) -> Result<u64, RefreshError> {
        Ok(self.db.refresh_tokens().delete_by_user(user_id).await?)
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewUser;

    async fn setup() -> (Database, RefreshTokens, i64) {
        let db = Database::open(":memory:").await.unwrap();
        let user_id = db
            .users()
            .create(&NewUser {
                username: "alice".to_string(),
                email: "alice@x.com".to_string(),
                password_hash: "$argon2id$stub".to_string(),
                role: "Student".to_string(),
            })
            .await
            .unwrap();
        (db.clone(), RefreshTokens::new(db), user_id)
    }

    #[tokio::test]
    async fn test_create_refresh_token() {
        let (_db, refresh, user_id) = setup().await;

        let token = refresh.create_refresh_token(user_id).await.unwrap();

        assert_eq!(token.user_id, user_id);
        assert!(token.expires_at > now_unix() as i64);

        let found = refresh.find_by_token(&token.token).await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_create_supersedes_prior_token() {
        let (db, refresh, user_id) = setup().await;

        let first = refresh.create_refresh_token(user_id).await.unwrap();
        let second = refresh.create_refresh_token(user_id).await.unwrap();
        assert_ne!(first.token, second.token);

        // The first token no longer authorizes renewal
        assert!(refresh.find_by_token(&first.token).await.unwrap().is_none());
        assert!(refresh.find_by_token(&second.token).await.unwrap().is_some());

        // Exactly one row remains
        let count: (i32,) =
            sqlx::query_as("SELECT COUNT(*) FROM refresh_tokens WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(count.0, 1);
    }

    #[tokio::test]
    async fn test_verify_expiration_live_token_unchanged() {
        let (_db, refresh, user_id) = setup().await;

        let token = refresh.create_refresh_token(user_id).await.unwrap();
        let token_string = token.token.clone();

        let verified = refresh.verify_expiration(token).await.unwrap();
        assert_eq!(verified.token, token_string);

        // Still present in the store
        assert!(refresh.find_by_token(&token_string).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_verify_expiration_deletes_expired_token() {
        let (db, refresh, user_id) = setup().await;

        let expired_at = now_unix() as i64 - 60;
        db.refresh_tokens()
            .create("stale-token", user_id, expired_at)
            .await
            .unwrap();
        let record = refresh.find_by_token("stale-token").await.unwrap().unwrap();

        let err = refresh.verify_expiration(record).await.unwrap_err();
        match err {
            RefreshError::Refresh(e) => {
                assert_eq!(e.token, "stale-token");
                assert_eq!(e.reason, "Refresh token expired");
            }
            RefreshError::Database(e) => panic!("unexpected database error: {}", e),
        }

        // Cleanup side effect: the token is gone from the store
        assert!(refresh.find_by_token("stale-token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_by_user_counts() {
        let (_db, refresh, user_id) = setup().await;

        refresh.create_refresh_token(user_id).await.unwrap();
        assert_eq!(refresh.delete_by_user(user_id).await.unwrap(), 1);
        assert_eq!(refresh.delete_by_user(user_id).await.unwrap(), 0);
    }
}
