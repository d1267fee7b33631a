//! Registry value types. Grounded in `handlers/dsd.go`'s `service` /
//! `serviceInstance` / `ReceivedService`.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;

/// Grace period added to a service's declared heartbeat interval before
/// an instance is considered crashed.
pub const HEARTBEAT_GRACE_SECONDS: i64 = 10;

/// One instance of a registered service.
#[derive(Debug, Clone)]
pub struct ServiceInstance {
    pub address: String,
    pub last_heartbeat: DateTime<Utc>,
}

impl ServiceInstance {
    pub fn new(address: String) -> Self {
        Self { address, last_heartbeat: Utc::now() }
    }

    /// `true` once `now - last_heartbeat` exceeds `heartbeat_seconds + grace`.
    pub fn is_alive(&self, heartbeat_seconds: i64, now: DateTime<Utc>) -> bool {
        (now - self.last_heartbeat).num_seconds() <= heartbeat_seconds + HEARTBEAT_GRACE_SECONDS
    }
}

/// A registered microservice: a name, a path-matching pattern, and a
/// round-robin pool of instances.
pub struct Service {
    pub name: String,
    pub path_pattern: Regex,
    pub heartbeat_seconds: i64,
    pub instances: HashMap<String, ServiceInstance>,
    /// Round-robin cursor shared across concurrent dispatches for this
    /// service; incremented, never reset.
    pub next_instance: std::sync::atomic::AtomicUsize,
}

impl Service {
    pub fn new(name: String, path_pattern: Regex, heartbeat_seconds: i64, first_instance: ServiceInstance) -> Self {
        let mut instances = HashMap::new();
        instances.insert(first_instance.address.clone(), first_instance);
        Self {
            name,
            path_pattern,
            heartbeat_seconds,
            instances,
            next_instance: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Picks the next instance address in round-robin order. `None` if
    /// the service currently has no instances.
    pub fn next_address(&self) -> Option<String> {
        if self.instances.is_empty() {
            return None;
        }
        // HashMap iteration order isn't stable across inserts/removals,
        // so sort first -- round-robin over a shifting order is still
        // round-robin, just not byte-identical to the original's
        // slice-based one.
        let mut addrs: Vec<&String> = self.instances.keys().collect();
        addrs.sort();
        let i = self.next_instance.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        addrs.get(i % addrs.len()).map(|s| (*s).clone())
    }
}

/// Shape of a registration event published on the `microservices`
/// pub/sub channel.
#[derive(Debug, Clone, Deserialize)]
pub struct ReceivedService {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "PathPattern")]
    pub path_pattern: String,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "Heartbeat")]
    pub heartbeat: i64,
}
