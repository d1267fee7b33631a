//! # `AuthenticatedUser` Extractor
//!
//! An Actix-web `FromRequest` extractor so handlers that require a valid
//! session (`GET /v1/users/me`, `PATCH /v1/users/me`, `DELETE
//! /v1/sessions/mine`) can simply name it as an argument instead of each
//! re-deriving the session by hand. There's no teacher middleware of
//! this shape to adapt — `auth-service`'s equivalent is a JWT
//! `HttpAuthentication` middleware the gateway deliberately doesn't
//! carry over (opaque sessions instead of JWTs, see [`crate::sessions`])
//! — so this follows actix-web's own documented extractor idiom instead.

use crate::domain::user::User;
use crate::sessions;
use crate::AppState;
use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use shared::errors::ApiError;
use std::future::Future;
use std::pin::Pin;

/// The authenticated user carried by the request's session, resolved
/// via `Authorization: Bearer <id>` (or `?auth=<id>`).
pub struct AuthenticatedUser(pub User);

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let state = req
                .app_data::<web::Data<AppState>>()
                .expect("AppState must be registered as app_data")
                .clone();

            let (_, session_state) =
                sessions::get_state(&req, &state.signing_key, state.session_store.as_ref())
                    .await?;

            Ok(AuthenticatedUser(session_state.user))
        })
    }
}
