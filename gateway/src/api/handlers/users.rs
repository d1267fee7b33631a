//! `/v1/users*` handlers — account creation, profile lookup/editing, and
//! the username/name/email prefix search. Grounded in
//! `auth-service/src/api/handlers.rs`'s handler shape (extract, call a
//! domain/repository function, map the result to a status + JSON body).

use crate::api::dto::{SearchQuery, SEARCH_RESULT_LIMIT};
use crate::api::middleware::AuthenticatedUser;
use crate::domain::user::{self, NewUser, ProfileUpdates};
use crate::sessions::{self, SessionState};
use crate::AppState;
use actix_web::{web, HttpRequest, HttpResponse};
use shared::errors::ApiError;

const HEADER_AUTHORIZATION: &str = "Authorization";

/// `POST /v1/users` — creates a new account, indexes it for search, and
/// begins a session for it immediately (signup doubles as sign-in).
pub async fn create_user(
    state: web::Data<AppState>,
    body: web::Json<NewUser>,
) -> Result<HttpResponse, ApiError> {
    let new_user = body.into_inner();
    user::validate_new_user(&new_user)?;

    let created = user::new_user_to_user(&new_user, &state.password_hasher)?;
    let stored = state.user_repo.create(&created).await?;

    index_user(&state, &stored);

    let session_id =
        sessions::begin_session(&state.signing_key, state.session_store.as_ref(), SessionState::new(stored.clone()))
            .await?;

    Ok(HttpResponse::Created()
        .insert_header((HEADER_AUTHORIZATION, format!("Bearer {}", session_id.as_str())))
        .json(stored))
}

/// `GET /v1/users?q=` — prefix search over username/email/full name,
/// resolved through the trie to full user records.
pub async fn search_users(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, ApiError> {
    let ids = {
        let trie = state.trie.read().expect("trie lock poisoned");
        trie.search(SEARCH_RESULT_LIMIT, &query.q)
    };

    let users = state.user_repo.find_by_ids(&ids).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// `GET /v1/users/me` — the caller's own profile.
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(user)
}

/// `PATCH /v1/users/me` — edits first/last name, re-indexing the trie
/// entries and refreshing the caller's stored session state (§6) so a
/// subsequent `GET /v1/users/me` on the same session sees the edit
/// without requiring a fresh sign-in.
pub async fn update_me(
    req: HttpRequest,
    state: web::Data<AppState>,
    AuthenticatedUser(mut current): AuthenticatedUser,
    body: web::Json<ProfileUpdates>,
) -> Result<HttpResponse, ApiError> {
    let updates = body.into_inner();

    deindex_user(&state, &current);
    current.apply_updates(&updates)?;

    let updated = state.user_repo.update_names(current.id, &current.first_name, &current.last_name).await?;
    index_user(&state, &updated);

    let (session_id, mut session_state) =
        sessions::get_state(&req, &state.signing_key, state.session_store.as_ref()).await?;
    session_state.user = updated.clone();
    state.session_store.save(session_id.as_str(), &session_state).await?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Indexes every searchable field of `user` into the trie: username,
/// email, and each name component.
fn index_user(state: &AppState, user: &user::User) {
    let mut trie = state.trie.write().expect("trie lock poisoned");
    trie.insert(&user.user_name, user.id);
    trie.insert(&user.email, user.id);
    trie.insert(&user.first_name, user.id);
    trie.insert(&user.last_name, user.id);
}

/// Removes every searchable field of `user` from the trie, used before
/// re-indexing on a profile edit so stale name keys don't linger.
fn deindex_user(state: &AppState, user: &user::User) {
    let mut trie = state.trie.write().expect("trie lock poisoned");
    trie.remove(&user.first_name, user.id);
    trie.remove(&user.last_name, user.id);
}
