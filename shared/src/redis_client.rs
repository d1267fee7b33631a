//! # Redis Client — Cache, Session Store & Pub/Sub
//!
//! High-level Redis client backing the gateway's session/attempt/reset-code
//! stores and its pub/sub consumers (the service registry listener and the
//! MQ-to-WebSocket notifier, which treat the same Redis deployment as a
//! stand-in for the dedicated message broker SPEC_FULL's `MQADDR` names).
//!
//! ## Connection Management
//!
//! We use a `ConnectionManager`, which reconnects automatically on
//! failure — more resilient than a bare connection for a long-running
//! gateway process.
//!
//! ## Key Naming Convention
//!
//! Callers choose their own key prefixes; this client is prefix-agnostic.
//! The gateway's own conventions (see `gateway::sessions`/`attempts`/
//! `resetcodes`) are:
//!
//! | Pattern | Example | Purpose |
//! |---------|---------|---------|
//! | `sid:<token>` | `sid:qf8z...` | Session state |
//! | `<email>` | `a@b.c` | Attempt / reset-code state (no prefix) |
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use shared::redis_client::RedisClient;
//!
//! let redis = RedisClient::new(&config.redis()).await?;
//! redis.set("key", &"value", Some(Duration::from_secs(3600))).await?;
//! let value: Option<String> = redis.get("key").await?;
//! ```

use crate::config::RedisConfig;
use crate::errors::ApiError;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;
use tracing::info;

/// Async Redis client with automatic reconnection.
///
/// `Clone + Send + Sync`; cloning is cheap (an `Arc` clone internally).
#[derive(Clone)]
pub struct RedisClient {
    conn: ConnectionManager,
    /// A second client handle dedicated to pub/sub — subscriptions hold
    /// the connection in a blocking-receive loop, so they can't share
    /// the `ConnectionManager` used for request/response commands.
    client: redis::Client,
}

impl RedisClient {
    /// Creates a new Redis client and establishes connection.
    pub async fn new(config: &RedisConfig) -> Result<Self, ApiError> {
        info!(url = %config.url, "Connecting to Redis");

        let client = redis::Client::open(config.url.as_str()).map_err(ApiError::RedisError)?;
        let conn = ConnectionManager::new(client.clone())
            .await
            .map_err(ApiError::RedisError)?;

        info!("Redis connection established");

        Ok(Self { conn, client })
    }

    // =========================================================================
    // Basic Operations
    // =========================================================================

    /// Stores a JSON-serialized value with an optional TTL.
    pub async fn set<T: serde::Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), ApiError> {
        let serialized = serde_json::to_string(value)
            .map_err(|e| ApiError::InternalError { message: e.to_string() })?;

        let mut conn = self.conn.clone();

        match ttl {
            Some(duration) => {
                conn.set_ex::<_, _, ()>(key, &serialized, duration.as_secs())
                    .await
                    .map_err(ApiError::RedisError)?;
            }
            None => {
                conn.set::<_, _, ()>(key, &serialized)
                    .await
                    .map_err(ApiError::RedisError)?;
            }
        }

        Ok(())
    }

    /// Retrieves and deserializes a value; `None` if the key is absent.
    pub async fn get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ApiError> {
        let mut conn = self.conn.clone();

        let value: Option<String> = conn.get(key).await.map_err(ApiError::RedisError)?;

        match value {
            Some(s) => {
                let deserialized = serde_json::from_str(&s)
                    .map_err(|e| ApiError::InternalError { message: e.to_string() })?;
                Ok(Some(deserialized))
            }
            None => Ok(None),
        }
    }

    /// Gets a value and refreshes its TTL in a single round trip
    /// (pipelined `GET` + `EXPIRE`) — used by the session store so that
    /// reading a session also extends its lifetime.
    pub async fn get_with_ttl_refresh<T: serde::de::DeserializeOwned>(
        &self,
        key: &str,
        ttl: Duration,
    ) -> Result<Option<T>, ApiError> {
        let mut conn = self.conn.clone();

        let (value, _expired): (Option<String>, i64) = redis::pipe()
            .get(key)
            .expire(key, ttl.as_secs() as i64)
            .query_async(&mut conn)
            .await
            .map_err(ApiError::RedisError)?;

        match value {
            Some(s) => {
                let deserialized = serde_json::from_str(&s)
                    .map_err(|e| ApiError::InternalError { message: e.to_string() })?;
                Ok(Some(deserialized))
            }
            None => Ok(None),
        }
    }

    /// Deletes a key. Returns `true` if a key was actually removed.
    pub async fn delete(&self, key: &str) -> Result<bool, ApiError> {
        let mut conn = self.conn.clone();
        let deleted: i64 = conn.del(key).await.map_err(ApiError::RedisError)?;
        Ok(deleted > 0)
    }

    /// Checks if a key exists.
    pub async fn exists(&self, key: &str) -> Result<bool, ApiError> {
        let mut conn = self.conn.clone();
        conn.exists(key).await.map_err(ApiError::RedisError)
    }

    /// Sets TTL on an existing key. Returns `false` if the key is absent.
    pub async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, ApiError> {
        let mut conn = self.conn.clone();
        conn.expire(key, ttl.as_secs() as i64)
            .await
            .map_err(ApiError::RedisError)
    }

    /// Health check — verifies Redis is responding.
    pub async fn ping(&self) -> Result<(), ApiError> {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(ApiError::RedisError)?;
        Ok(())
    }

    // =========================================================================
    // Pub/Sub
    // =========================================================================

    /// Publishes a raw payload to `channel`.
    pub async fn publish(&self, channel: &str, payload: &str) -> Result<(), ApiError> {
        let mut conn = self.conn.clone();
        conn.publish::<_, _, ()>(channel, payload)
            .await
            .map_err(ApiError::RedisError)?;
        Ok(())
    }

    /// Opens a dedicated async pub/sub connection subscribed to `channel`.
    ///
    /// Returns the message stream; the caller owns it for the lifetime of
    /// its consumer loop (registry listener, MQ notifier). Each call opens
    /// a fresh connection — pub/sub connections can't be pooled or shared
    /// with request/response commands.
    pub async fn subscribe_channel(
        &self,
        channel: &str,
    ) -> Result<redis::aio::PubSub, ApiError> {
        let mut pubsub = self
            .client
            .get_async_pubsub()
            .await
            .map_err(ApiError::RedisError)?;
        pubsub.subscribe(channel).await.map_err(ApiError::RedisError)?;
        Ok(pubsub)
    }
}

// Hide internal state in Debug output
impl std::fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisClient").finish_non_exhaustive()
    }
}
