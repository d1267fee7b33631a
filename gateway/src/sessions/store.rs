//! # Session Store
//!
//! Server-side state backing opaque [`SessionId`] bearer tokens. Grounded
//! in `sessions/redisstore.go`'s `RedisStore`: JSON-serialized state under
//! a `sid:`-prefixed key, with the read path resetting the TTL so an
//! active session never expires mid-use.

use super::state::SessionState;
use async_trait::async_trait;
use shared::errors::ApiError;
use shared::redis_client::RedisClient;
use std::time::Duration;

const KEY_PREFIX: &str = "sid:";

fn redis_key(session_id: &str) -> String {
    format!("{KEY_PREFIX}{session_id}")
}

/// Storage abstraction for session state, so handlers and tests don't
/// depend on Redis directly.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait SessionStore: Send + Sync {
    async fn save(&self, session_id: &str, state: &SessionState) -> Result<(), ApiError>;
    async fn get(&self, session_id: &str) -> Result<SessionState, ApiError>;
    async fn delete(&self, session_id: &str) -> Result<(), ApiError>;
}

/// Redis-backed [`SessionStore`].
pub struct RedisSessionStore {
    redis: RedisClient,
    session_duration: Duration,
}

impl RedisSessionStore {
    pub fn new(redis: RedisClient, session_duration: Duration) -> Self {
        Self { redis, session_duration }
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn save(&self, session_id: &str, state: &SessionState) -> Result<(), ApiError> {
        self.redis
            .set(&redis_key(session_id), state, Some(self.session_duration))
            .await
    }

    async fn get(&self, session_id: &str) -> Result<SessionState, ApiError> {
        self.redis
            .get_with_ttl_refresh::<SessionState>(&redis_key(session_id), self.session_duration)
            .await?
            .ok_or(ApiError::InvalidSession)
    }

    async fn delete(&self, session_id: &str) -> Result<(), ApiError> {
        self.redis.delete(&redis_key(session_id)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::User;
    use uuid::Uuid;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "a@b.com".into(),
            pass_hash: "hash".into(),
            user_name: "ab".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            photo_url: String::new(),
        }
    }

    #[tokio::test]
    async fn get_returns_invalid_session_when_store_reports_missing() {
        let mut mock = MockSessionStore::new();
        mock.expect_get().returning(|_| Err(ApiError::InvalidSession));

        let err = mock.get("nonexistent").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidSession));
    }

    #[tokio::test]
    async fn save_then_get_roundtrips_with_a_mock_store() {
        let mut mock = MockSessionStore::new();
        let user = sample_user();
        let state = SessionState::new(user.clone());
        let expected = state.clone();

        mock.expect_save().returning(|_, _| Ok(()));
        mock.expect_get().return_once(move |_| Ok(expected.clone()));

        mock.save("sid-1", &state).await.unwrap();
        let fetched = mock.get("sid-1").await.unwrap();
        assert_eq!(fetched.user.id, user.id);
    }
}
