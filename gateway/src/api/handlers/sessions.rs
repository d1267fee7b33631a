//! `/v1/sessions*` handlers — sign-in (with the attempt lockout from
//! §4.3) and sign-out. Grounded in `auth-service/src/api/handlers.rs`'s
//! `login`/`logout`, adapted from JWT access/refresh tokens to this
//! gateway's opaque bearer sessions.

use crate::api::dto::{MessageResponse, SignInRequest};
use crate::sessions::{self, SessionState};
use crate::AppState;
use actix_web::{web, HttpRequest, HttpResponse};
use shared::errors::ApiError;

const HEADER_AUTHORIZATION: &str = "Authorization";

/// `POST /v1/sessions` — signs in, subject to the per-email lockout.
pub async fn create_session(
    state: web::Data<AppState>,
    body: web::Json<SignInRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = body.into_inner();
    let email = req.email.trim().to_lowercase();

    if state.attempt_store.is_blocked(&email).await? {
        return Err(ApiError::LockedOut);
    }

    let found = state.user_repo.find_by_email(&email).await?;

    let user = match found {
        Some(user) if user.authenticate(&req.password, &state.password_hasher).is_ok() => user,
        _ => {
            let attempt = state.attempt_store.record_failure(&email).await?;
            if attempt.is_blocked {
                return Err(ApiError::LockedOut);
            }
            return Err(ApiError::InvalidCredentials);
        }
    };

    state.attempt_store.clear(&email).await?;

    let session_id = sessions::begin_session(
        &state.signing_key,
        state.session_store.as_ref(),
        SessionState::new(user.clone()),
    )
    .await?;

    Ok(HttpResponse::Created()
        .insert_header((HEADER_AUTHORIZATION, format!("Bearer {}", session_id.as_str())))
        .json(user))
}

/// `DELETE /v1/sessions/mine` — ends the caller's own session.
pub async fn delete_session(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    sessions::end_session(&req, &state.signing_key, state.session_store.as_ref()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse { message: "signed out".to_string() }))
}
