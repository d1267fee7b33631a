//! Live WebSocket connection registry, keyed by session id. Grounded in
//! SPEC_FULL §4.8/§5's `connections: map<SessionID, websocket>` guarded
//! by a mutex; `actix-ws`'s `Session` handle is the cloneable write-side
//! of a connection, so the map stores those directly.

use actix_ws::Session;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::warn;

/// Fan-out target list: one [`actix_ws::Session`] per live client.
#[derive(Default)]
pub struct ConnectionMap {
    sessions: Mutex<HashMap<String, Session>>,
}

impl ConnectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session_id: String, session: Session) {
        self.sessions.lock().expect("connection map lock poisoned").insert(session_id, session);
    }

    pub fn remove(&self, session_id: &str) {
        self.sessions.lock().expect("connection map lock poisoned").remove(session_id);
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().expect("connection map lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pushes `payload` to every live connection, in no particular
    /// client-to-client order (fan-out only promises per-client
    /// ordering, not a global one). Connections whose write fails are
    /// dropped from the map rather than retried.
    pub async fn broadcast(&self, payload: &str) {
        let sessions: Vec<(String, Session)> = {
            let guard = self.sessions.lock().expect("connection map lock poisoned");
            guard.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
        };

        let mut dead = Vec::new();
        for (session_id, mut session) in sessions {
            if session.text(payload.to_string()).await.is_err() {
                warn!(session_id = %session_id, "write failed, dropping connection");
                dead.push(session_id);
            }
        }

        if !dead.is_empty() {
            let mut guard = self.sessions.lock().expect("connection map lock poisoned");
            for session_id in dead {
                guard.remove(&session_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let map = ConnectionMap::new();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
    }
}
