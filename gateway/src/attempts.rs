//! # Attempt Store & Lockout
//!
//! Per-email failed-sign-in counter with a temporary lockout once it
//! crosses a threshold. Grounded in `models/attempts/redisstore.go`,
//! keyed on email under an `attempt:`-prefixed namespace — distinct
//! from the `sid:`-prefixed session keys and from the reset-code
//! store's `reset:` namespace (see `crate::resetcodes`), since both
//! stores key on the same bare email and share the store-role Redis
//! client (§6: "different DBs or prefixes recommended to avoid
//! collision"). The state machine itself is from the account-lockout
//! design this gateway generalizes.
//!
//! ```text
//! (none) --bad attempt--> COUNTING{count=1}
//! COUNTING{n<MAX} --bad attempt--> COUNTING{n+1}
//! COUNTING{n=MAX} --bad attempt--> BLOCKED (TTL reset to BLOCK_WINDOW)
//! BLOCKED --any attempt--> BLOCKED (TTL not re-extended)
//! *  --good sign-in--> (none), key deleted
//! *  --TTL elapses--> (none)
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::errors::ApiError;
use shared::redis_client::RedisClient;
use std::time::Duration;

pub const MAX_ATTEMPTS: u32 = 5;
const COUNTING_TTL: Duration = Duration::from_secs(10 * 60);
const BLOCK_WINDOW: Duration = Duration::from_secs(10 * 60);
const KEY_PREFIX: &str = "attempt:";

fn redis_key(email: &str) -> String {
    format!("{KEY_PREFIX}{email}")
}

/// Failed sign-in counter for one email.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Attempt {
    pub count: u32,
    pub is_blocked: bool,
}

/// Storage abstraction over the per-email attempt counter.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait AttemptStore: Send + Sync {
    /// Records a failed sign-in, advancing the state machine above.
    /// Returns the resulting [`Attempt`].
    async fn record_failure(&self, email: &str) -> Result<Attempt, ApiError>;

    /// Returns `true` if `email` is currently locked out.
    async fn is_blocked(&self, email: &str) -> Result<bool, ApiError>;

    /// Clears all attempt state for `email` (called on a good sign-in).
    async fn clear(&self, email: &str) -> Result<(), ApiError>;
}

pub struct RedisAttemptStore {
    redis: RedisClient,
}

impl RedisAttemptStore {
    pub fn new(redis: RedisClient) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl AttemptStore for RedisAttemptStore {
    async fn record_failure(&self, email: &str) -> Result<Attempt, ApiError> {
        let key = redis_key(email);
        let current: Option<Attempt> = self.redis.get(&key).await?;
        let mut attempt = current.unwrap_or_default();

        if attempt.is_blocked {
            // BLOCKED --any attempt--> BLOCKED, TTL untouched.
            return Ok(attempt);
        }

        attempt.count += 1;

        if attempt.count >= MAX_ATTEMPTS {
            attempt.is_blocked = true;
            self.redis.set(&key, &attempt, Some(BLOCK_WINDOW)).await?;
        } else {
            self.redis.set(&key, &attempt, Some(COUNTING_TTL)).await?;
        }

        Ok(attempt)
    }

    async fn is_blocked(&self, email: &str) -> Result<bool, ApiError> {
        let attempt: Option<Attempt> = self.redis.get(&redis_key(email)).await?;
        Ok(attempt.map(|a| a.is_blocked).unwrap_or(false))
    }

    async fn clear(&self, email: &str) -> Result<(), ApiError> {
        self.redis.delete(&redis_key(email)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_attempts_matches_lockout_threshold() {
        assert_eq!(MAX_ATTEMPTS, 5);
    }

    #[tokio::test]
    async fn mock_store_transitions_to_blocked_at_threshold() {
        let mut mock = MockAttemptStore::new();
        mock.expect_record_failure().times(1).returning(|_| {
            Ok(Attempt { count: 5, is_blocked: true })
        });

        let attempt = mock.record_failure("a@b.com").await.unwrap();
        assert!(attempt.is_blocked);
        assert_eq!(attempt.count, MAX_ATTEMPTS);
    }

    #[tokio::test]
    async fn mock_store_clears_on_good_sign_in() {
        let mut mock = MockAttemptStore::new();
        mock.expect_clear().times(1).returning(|_| Ok(()));
        mock.clear("a@b.com").await.unwrap();
    }
}
