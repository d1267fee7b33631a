//! Per-session state: who is signed in and since when.

use crate::domain::user::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a [`shared::auth::SessionId`] resolves to in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub begin_time: DateTime<Utc>,
    pub user: User,
}

impl SessionState {
    pub fn new(user: User) -> Self {
        Self { begin_time: Utc::now(), user }
    }
}
