//! Periodic crash-eviction sweep. Grounded in `handlers/dsd.go`'s
//! `ServiceList.Remove`, run here on a fixed interval rather than ad
//! hoc, which is an extraction decision the original leaves to its
//! caller.

use super::registry::ServiceRegistry;
use std::sync::Arc;
use std::time::Duration;

pub const SWEEP_INTERVAL: Duration = Duration::from_secs(10);

/// Runs forever, sweeping the registry for crashed instances every
/// [`SWEEP_INTERVAL`].
pub async fn run(registry: Arc<ServiceRegistry>) {
    let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
    loop {
        ticker.tick().await;
        registry.reap();
    }
}
