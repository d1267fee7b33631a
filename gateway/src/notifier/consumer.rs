//! MQ-to-WebSocket bridge: a single consumer loop that reads messages
//! from the broker channel and fans each one out to every live
//! connection. Grounded in SPEC_FULL §4.8's backoff schedule (up to 5
//! attempts, doubling 2s/4s/6s/8s/10s) and the registry listener's use
//! of the same `subscribe_channel` primitive.

use super::connections::ConnectionMap;
use futures_util::StreamExt;
use shared::redis_client::RedisClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

pub const NOTIFICATIONS_CHANNEL: &str = "notifications";
const MAX_CONNECT_ATTEMPTS: u32 = 5;

/// Runs the notifier's consumer loop for the life of the process.
/// Connection failures are retried with the backoff schedule above;
/// after the budget is exhausted the loop waits at the final interval
/// indefinitely rather than giving up (a gateway with no notifier is
/// still useful for everything else it does).
pub async fn run(redis: RedisClient, connections: Arc<ConnectionMap>) {
    loop {
        let pubsub = connect_with_backoff(&redis).await;
        let mut stream = pubsub.into_on_message();

        info!("MQ notifier connected");
        while let Some(msg) = stream.next().await {
            let payload: String = match msg.get_payload() {
                Ok(p) => p,
                Err(e) => {
                    error!(error = %e, "non-UTF8 notification payload, skipping");
                    continue;
                }
            };
            connections.broadcast(&payload).await;
        }

        error!("MQ notifier connection dropped, reconnecting");
    }
}

/// Subscribes to [`NOTIFICATIONS_CHANNEL`], retrying with exponential
/// backoff. Never gives up -- the last attempt's delay is reused for
/// every subsequent retry beyond the budget.
async fn connect_with_backoff(redis: &RedisClient) -> redis::aio::PubSub {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match redis.subscribe_channel(NOTIFICATIONS_CHANNEL).await {
            Ok(pubsub) => return pubsub,
            Err(e) => {
                let delay = backoff_delay(attempt.min(MAX_CONNECT_ATTEMPTS));
                error!(error = %e, attempt, delay_secs = delay.as_secs(), "failed to connect to MQ, retrying");
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// 2s, 4s, 6s, 8s, 10s for attempts 1..=5; stays at 10s thereafter.
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(2 * attempt.min(MAX_CONNECT_ATTEMPTS) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_schedule_matches_spec() {
        assert_eq!(backoff_delay(1), Duration::from_secs(2));
        assert_eq!(backoff_delay(2), Duration::from_secs(4));
        assert_eq!(backoff_delay(3), Duration::from_secs(6));
        assert_eq!(backoff_delay(4), Duration::from_secs(8));
        assert_eq!(backoff_delay(5), Duration::from_secs(10));
        assert_eq!(backoff_delay(9), Duration::from_secs(10));
    }
}
