//! # Route Configuration
//!
//! The gateway's own local routes — everything the dispatch middleware
//! (see [`crate::dispatch`]) falls through to on a registry miss.
//!
//! ```text
//! /
//! ├── health                    GET    → health_check
//! └── v1/
//!     ├── users                 POST   → create_user
//!     ├── users                 GET    → search_users   (?q=)
//!     ├── users/me              GET    → get_me
//!     ├── users/me              PATCH  → update_me
//!     ├── sessions               POST   → create_session
//!     ├── sessions/mine          DELETE → delete_session
//!     ├── resetcodes             POST   → request_reset
//!     ├── passwords              PUT    → consume_reset   (?email=)
//!     ├── ws                     GET    → websocket upgrade
//!     └── summary                GET    → summarize        (?q=)
//! ```
//!
//! Grounded in `auth-service/src/api/routes.rs`'s `configure` shape.

use actix_web::web;

use super::handlers::{health, resetcodes, sessions, summary, users};
use crate::notifier;

/// Configures every route the gateway itself serves.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // ─────────────────────────────────────────────────────────────────
        // Health Check
        // ─────────────────────────────────────────────────────────────────
        .route("/health", web::get().to(health::health_check))
        // ─────────────────────────────────────────────────────────────────
        // Gateway API v1
        // ─────────────────────────────────────────────────────────────────
        .service(
            web::scope("/v1")
                //
                // POST /v1/users — create an account, begin a session
                // GET  /v1/users?q= — prefix search (username/email/name)
                .route("/users", web::post().to(users::create_user))
                .route("/users", web::get().to(users::search_users))
                //
                // GET   /v1/users/me — caller's own profile
                // PATCH /v1/users/me — edit first/last name
                .route("/users/me", web::get().to(users::get_me))
                .route("/users/me", web::patch().to(users::update_me))
                //
                // POST   /v1/sessions — sign in
                // DELETE /v1/sessions/mine — sign out
                .route("/sessions", web::post().to(sessions::create_session))
                .route("/sessions/mine", web::delete().to(sessions::delete_session))
                //
                // POST /v1/resetcodes — request a password reset code
                // PUT  /v1/passwords?email= — consume a reset code
                .route("/resetcodes", web::post().to(resetcodes::request_reset))
                .route("/passwords", web::put().to(resetcodes::consume_reset))
                //
                // GET /v1/ws — notification WebSocket upgrade
                .route("/ws", web::get().to(notifier::ws::upgrade))
                //
                // GET /v1/summary?q= — URL summary stub
                .route("/summary", web::get().to(summary::summarize)),
        );
}
