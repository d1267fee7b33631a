//! # Reset-Code Store
//!
//! Tracks whether a password-reset code is currently pending for an
//! email. Grounded in `models/resetcodes/redisstore.go`: email keys
//! under a `reset:`-prefixed namespace, a 5-minute TTL, and an
//! existence-only `Get` — the stored value is never read back. The
//! namespace keeps this store's keys from colliding with
//! [`crate::attempts`]'s own per-email keys on the same Redis client
//! (§6: "different DBs or prefixes recommended to avoid collision").
//! The code itself reuses the signed session id codec (see
//! [`shared::auth::SessionId`]), so verifying a submitted code is a
//! signature check against the process key, not a stored-value
//! comparison; the store only answers "is one still outstanding?".

use async_trait::async_trait;
use shared::errors::ApiError;
use shared::redis_client::RedisClient;
use std::time::Duration;

pub const CODE_DURATION: Duration = Duration::from_secs(5 * 60);
const KEY_PREFIX: &str = "reset:";

fn redis_key(email: &str) -> String {
    format!("{KEY_PREFIX}{email}")
}

/// Storage abstraction over the per-email pending-reset-code flag.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait ResetCodeStore: Send + Sync {
    /// Records that a reset code was issued for `email`.
    async fn save(&self, email: &str, reset_code: &str) -> Result<(), ApiError>;

    /// Returns `Ok(())` if a code is still pending, `Err(ResetCodeNotFound)`
    /// otherwise.
    async fn exists(&self, email: &str) -> Result<(), ApiError>;

    /// Clears the pending-code flag for `email`.
    async fn delete(&self, email: &str) -> Result<(), ApiError>;
}

pub struct RedisResetCodeStore {
    redis: RedisClient,
}

impl RedisResetCodeStore {
    pub fn new(redis: RedisClient) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl ResetCodeStore for RedisResetCodeStore {
    async fn save(&self, email: &str, reset_code: &str) -> Result<(), ApiError> {
        self.redis.set(&redis_key(email), &reset_code.to_string(), Some(CODE_DURATION)).await
    }

    async fn exists(&self, email: &str) -> Result<(), ApiError> {
        if self.redis.exists(&redis_key(email)).await? {
            Ok(())
        } else {
            Err(ApiError::ResetCodeNotFound)
        }
    }

    async fn delete(&self, email: &str) -> Result<(), ApiError> {
        self.redis.delete(&redis_key(email)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_store_reports_missing_code() {
        let mut mock = MockResetCodeStore::new();
        mock.expect_exists().returning(|_| Err(ApiError::ResetCodeNotFound));

        let err = mock.exists("a@b.com").await.unwrap_err();
        assert!(matches!(err, ApiError::ResetCodeNotFound));
    }

    #[tokio::test]
    async fn mock_store_save_then_delete() {
        let mut mock = MockResetCodeStore::new();
        mock.expect_save().returning(|_, _| Ok(()));
        mock.expect_delete().returning(|_| Ok(()));

        mock.save("a@b.com", "code").await.unwrap();
        mock.delete("a@b.com").await.unwrap();
    }
}
