//! `/v1/resetcodes` and `/v1/passwords` handlers — the forgot-password
//! flow. Grounded in `auth-service/src/api/handlers.rs`'s
//! `forgot_password`/`reset_password`, with the mailer and reset-code
//! store swapped for this workspace's own (see [`crate::resetcodes`],
//! [`crate::mailer`]).

use crate::api::dto::{MessageResponse, PasswordResetQuery, PasswordResetRequest, ResetCodeRequest};
use crate::domain::user::{self, NewUser};
use crate::sessions::{self, SessionState};
use crate::AppState;
use actix_web::{web, HttpResponse};
use shared::auth::SessionId;
use shared::errors::ApiError;

const HEADER_AUTHORIZATION: &str = "Authorization";

/// `POST /v1/resetcodes` — issues a reset code and emails it, unless one
/// is already pending for this address.
pub async fn request_reset(
    state: web::Data<AppState>,
    body: web::Json<ResetCodeRequest>,
) -> Result<HttpResponse, ApiError> {
    let email = body.email.trim().to_lowercase();

    if state.user_repo.find_by_email(&email).await?.is_none() {
        return Err(ApiError::UserNotFound);
    }

    // `exists` returning `Ok(())` means a code is still pending; `Err`
    // means the slot is free (see `crate::resetcodes::ResetCodeStore`).
    if state.reset_code_store.exists(&email).await.is_ok() {
        return Err(ApiError::ResetCodeAlreadySent);
    }

    let reset_code = SessionId::mint(&state.signing_key)
        .map_err(|e| ApiError::InternalError { message: e.to_string() })?;

    state.reset_code_store.save(&email, reset_code.as_str()).await?;
    state.mailer.send_reset_code(&email, reset_code.as_str()).await?;

    Ok(HttpResponse::Created().json(MessageResponse { message: "reset code sent".to_string() }))
}

/// `PUT /v1/passwords?email=<e>` — consumes a pending reset code,
/// replacing the account's password and beginning a new session.
///
/// The account row is deleted and recreated rather than patched in
/// place, since `new_user_to_user` is the only place that knows how to
/// turn a plaintext password into a stored hash plus a freshly minted
/// id — recreating keeps this handler from duplicating that logic.
pub async fn consume_reset(
    state: web::Data<AppState>,
    query: web::Query<PasswordResetQuery>,
    body: web::Json<PasswordResetRequest>,
) -> Result<HttpResponse, ApiError> {
    let email = query.email.trim().to_lowercase();
    let req = body.into_inner();

    state.reset_code_store.exists(&email).await?;

    SessionId::verify(&req.reset_code, &state.signing_key)
        .map_err(|_| ApiError::ResetCodeNotFound)?;

    let existing = state.user_repo.find_by_email(&email).await?.ok_or(ApiError::UserNotFound)?;

    let new_user = NewUser {
        email: existing.email.clone(),
        password: req.password,
        password_conf: req.password_conf,
        user_name: existing.user_name.clone(),
        first_name: existing.first_name.clone(),
        last_name: existing.last_name.clone(),
    };
    user::validate_new_user(&new_user)?;
    let replacement = user::new_user_to_user(&new_user, &state.password_hasher)?;

    state.user_repo.delete(existing.id).await?;
    let stored = state.user_repo.create(&replacement).await?;
    state.reset_code_store.delete(&email).await?;

    {
        let mut trie = state.trie.write().expect("trie lock poisoned");
        trie.remove(&existing.user_name, existing.id);
        trie.remove(&existing.email, existing.id);
        trie.remove(&existing.first_name, existing.id);
        trie.remove(&existing.last_name, existing.id);
        trie.insert(&stored.user_name, stored.id);
        trie.insert(&stored.email, stored.id);
        trie.insert(&stored.first_name, stored.id);
        trie.insert(&stored.last_name, stored.id);
    }

    let session_id = sessions::begin_session(
        &state.signing_key,
        state.session_store.as_ref(),
        SessionState::new(stored.clone()),
    )
    .await?;

    Ok(HttpResponse::Created()
        .insert_header((HEADER_AUTHORIZATION, format!("Bearer {}", session_id.as_str())))
        .json(stored))
}
