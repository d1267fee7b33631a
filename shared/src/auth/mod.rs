//! # Authentication Primitives
//!
//! Shared across the gateway (and, historically, the other services in
//! this workspace): password hashing and the signed session id codec.
//!
//! ```text
//! auth/
//! ├── password.rs    - Argon2id password hashing
//! └── session_id.rs  - HMAC-signed opaque bearer tokens
//! ```
//!
//! There is deliberately no JWT module here — the gateway's sessions are
//! opaque capabilities backed by a server-side store (see
//! `gateway::sessions`), not self-contained claims-bearing tokens.

pub mod password;
pub mod session_id;

pub use password::PasswordHasher;
pub use session_id::{SessionId, SessionIdError};
