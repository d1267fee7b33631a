//! # Wire DTOs
//!
//! Request/response shapes for the HTTP surface (§6) that aren't already
//! covered by a `domain` type. `NewUser`/`ProfileUpdates`/`User` (see
//! [`crate::domain::user`]) double as their own request/response bodies
//! since the gateway has no separate persistence-model/wire-model split
//! for those — there's nothing a DTO would add.

use serde::{Deserialize, Serialize};

/// Body of `POST /v1/sessions`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /v1/resetcodes`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetCodeRequest {
    pub email: String,
}

/// Body of `PUT /v1/passwords?email=<e>`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetRequest {
    pub reset_code: String,
    pub password: String,
    pub password_conf: String,
}

/// Query string of `PUT /v1/passwords`.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordResetQuery {
    pub email: String,
}

/// Query string of `GET /v1/users`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

/// Default and maximum result count for the trie prefix search (§6:
/// "Returns up to 20 users").
pub const SEARCH_RESULT_LIMIT: usize = 20;

/// Query string of `GET /v1/summary`.
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryQuery {
    pub q: String,
}

/// `GET /v1/summary?q=<url>` stub response. Not part of the gateway's
/// core per SPEC_FULL §1 — the URL-metadata extractor it would call is
/// an external collaborator this crate doesn't implement.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryResponse {
    pub url: String,
    pub message: String,
}

/// Generic `{"message": "..."}` body for handlers with nothing else to
/// report (e.g. `DELETE /v1/sessions/mine`).
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// `GET /health` liveness probe body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub timestamp: String,
}
