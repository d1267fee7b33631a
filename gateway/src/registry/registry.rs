//! # Service Registry
//!
//! The gateway's view of which backend services exist, where their
//! instances live, and whether they're still breathing. Grounded in
//! `handlers/dsd.go`'s `ServiceList`: an `RwLock`-protected map keyed by
//! service name, first-match-wins regex dispatch (iteration order over
//! a map is not itself meaningful — the original relies on whichever
//! service's pattern matches first), and a 10-second grace period added
//! to each service's declared heartbeat before an instance is reaped.

use super::types::{ReceivedService, Service, ServiceInstance};
use chrono::Utc;
use regex::Regex;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{info, warn};

/// Thread-safe table of registered services.
///
/// Locking is the registry's own responsibility here (unlike the trie,
/// which leaves it to the caller) because the listener and reaper tasks
/// and every dispatching request all touch it independently.
pub struct ServiceRegistry {
    services: RwLock<HashMap<String, Service>>,
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self { services: RwLock::new(HashMap::new()) }
    }

    /// Registers a new service, or a new/refreshed instance of an
    /// already-known one.
    pub fn register(&self, received: ReceivedService) -> Result<(), regex::Error> {
        let mut services = self.services.write().expect("registry lock poisoned");

        if let Some(existing) = services.get_mut(&received.name) {
            match existing.instances.get_mut(&received.address) {
                Some(instance) => {
                    instance.last_heartbeat = Utc::now();
                }
                None => {
                    info!(service = %received.name, address = %received.address, "new instance registered");
                    existing
                        .instances
                        .insert(received.address.clone(), ServiceInstance::new(received.address));
                }
            }
        } else {
            info!(service = %received.name, "new service registered");
            let pattern = Regex::new(&received.path_pattern)?;
            let instance = ServiceInstance::new(received.address);
            services.insert(
                received.name.clone(),
                Service::new(received.name, pattern, received.heartbeat, instance),
            );
        }

        Ok(())
    }

    /// Evicts instances whose heartbeat has lapsed, and any service left
    /// with zero instances.
    pub fn reap(&self) {
        let mut services = self.services.write().expect("registry lock poisoned");
        let now = Utc::now();
        let mut dangling = Vec::new();

        for (name, svc) in services.iter_mut() {
            let dead: Vec<String> = svc
                .instances
                .iter()
                .filter(|(_, inst)| !inst.is_alive(svc.heartbeat_seconds, now))
                .map(|(addr, _)| addr.clone())
                .collect();

            for addr in dead {
                warn!(service = %name, address = %addr, "crashed instance removed");
                svc.instances.remove(&addr);
            }

            if svc.instances.is_empty() {
                dangling.push(name.clone());
            }
        }

        for name in dangling {
            warn!(service = %name, "dangling service removed");
            services.remove(&name);
        }
    }

    /// Finds the first registered service whose path pattern matches
    /// `path`, and returns a round-robin-chosen instance address for it.
    /// First match wins, mirroring the original's unordered-map loop.
    pub fn match_path(&self, path: &str) -> Option<(String, String)> {
        let services = self.services.read().expect("registry lock poisoned");
        for svc in services.values() {
            if svc.path_pattern.is_match(path) {
                if let Some(addr) = svc.next_address() {
                    return Some((svc.name.clone(), addr));
                }
            }
        }
        None
    }

    /// Number of currently registered services (for diagnostics/tests).
    pub fn service_count(&self) -> usize {
        self.services.read().expect("registry lock poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn received(name: &str, pattern: &str, addr: &str, heartbeat: i64) -> ReceivedService {
        ReceivedService {
            name: name.to_string(),
            path_pattern: pattern.to_string(),
            address: addr.to_string(),
            heartbeat,
        }
    }

    #[test]
    fn register_creates_new_service() {
        let registry = ServiceRegistry::new();
        registry.register(received("users", "^/v1/users", "127.0.0.1:4000", 5)).unwrap();
        assert_eq!(registry.service_count(), 1);
    }

    #[test]
    fn register_adds_instance_to_existing_service() {
        let registry = ServiceRegistry::new();
        registry.register(received("users", "^/v1/users", "127.0.0.1:4000", 5)).unwrap();
        registry.register(received("users", "^/v1/users", "127.0.0.1:4001", 5)).unwrap();
        assert_eq!(registry.service_count(), 1);

        let (_, first) = registry.match_path("/v1/users").unwrap();
        let (_, second) = registry.match_path("/v1/users").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn match_path_returns_none_when_no_pattern_matches() {
        let registry = ServiceRegistry::new();
        registry.register(received("users", "^/v1/users", "127.0.0.1:4000", 5)).unwrap();
        assert!(registry.match_path("/v1/courses").is_none());
    }

    #[test]
    fn reap_evicts_stale_instance_and_dangling_service() {
        let registry = ServiceRegistry::new();
        registry.register(received("users", "^/v1/users", "127.0.0.1:4000", 1)).unwrap();

        {
            let mut services = registry.services.write().unwrap();
            let svc = services.get_mut("users").unwrap();
            let inst = svc.instances.get_mut("127.0.0.1:4000").unwrap();
            inst.last_heartbeat = Utc::now() - chrono::Duration::seconds(100);
        }

        registry.reap();
        assert_eq!(registry.service_count(), 0);
    }

    #[test]
    fn reap_keeps_fresh_instances() {
        let registry = ServiceRegistry::new();
        registry.register(received("users", "^/v1/users", "127.0.0.1:4000", 30)).unwrap();
        registry.reap();
        assert_eq!(registry.service_count(), 1);
    }
}
