//! Pub/sub consumer that feeds [`ServiceRegistry::register`] from the
//! `microservices` channel. Grounded in `handlers/dsd.go`'s
//! `ReceivedService` event shape; the subscribe/consume loop itself is
//! new (the original doesn't extract it as a standalone component), and
//! is built on `shared::redis_client::RedisClient::subscribe_channel`.

use super::registry::ServiceRegistry;
use super::types::ReceivedService;
use futures_util::StreamExt;
use shared::redis_client::RedisClient;
use std::sync::Arc;
use tracing::{error, warn};

pub const MICROSERVICES_CHANNEL: &str = "microservices";

/// Runs forever, registering every well-formed event received on
/// [`MICROSERVICES_CHANNEL`]. Malformed payloads are logged and
/// skipped rather than killing the listener.
pub async fn run(redis: RedisClient, registry: Arc<ServiceRegistry>) {
    loop {
        let mut pubsub = match redis.subscribe_channel(MICROSERVICES_CHANNEL).await {
            Ok(p) => p,
            Err(e) => {
                error!(error = %e, "failed to subscribe to microservices channel, retrying in 5s");
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                continue;
            }
        };

        let mut stream = pubsub.on_message();
        while let Some(msg) = stream.next().await {
            let payload: String = match msg.get_payload() {
                Ok(p) => p,
                Err(e) => {
                    warn!(error = %e, "non-UTF8 registration payload, skipping");
                    continue;
                }
            };

            match serde_json::from_str::<ReceivedService>(&payload) {
                Ok(received) => {
                    if let Err(e) = registry.register(received) {
                        warn!(error = %e, "invalid path pattern in registration event, skipping");
                    }
                }
                Err(e) => {
                    warn!(error = %e, payload = %payload, "malformed registration event, skipping");
                }
            }
        }

        // The subscription stream ended (connection dropped) -- resubscribe.
        warn!("microservices subscription ended, resubscribing");
    }
}
