pub mod session;
pub mod state;
pub mod store;

pub use session::{begin_session, end_session, extract_session_id, get_state};
pub use state::SessionState;
pub use store::{RedisSessionStore, SessionStore};
