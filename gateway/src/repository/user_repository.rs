//! # User Repository
//!
//! Thin Postgres-backed CRUD over the `users` table — the "external but
//! still needs an interface" user database named in SPEC_FULL §1.
//! Grounded in `auth-service/src/repository/user_repository.rs` (query
//! style, `RETURNING *`, unique-constraint → `Conflict` mapping).

use crate::domain::user::User;
use shared::errors::ApiError;
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for user-related database operations.
///
/// `Send + Sync` because `PgPool` is `Arc`-backed internally; cloning is
/// cheap.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a freshly-validated user. Maps a unique-constraint
    /// violation on `email` or `user_name` to `ApiError::Conflict`.
    pub async fn create(&self, user: &User) -> Result<User, ApiError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, pass_hash, user_name, first_name, last_name, photo_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.pass_hash)
        .bind(&user.user_name)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.photo_url)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(ApiError::DatabaseError)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(ApiError::DatabaseError)
    }

    /// Fetches whichever of `ids` still exist, in no particular order.
    /// Used by the username/name prefix search (§4.5), which resolves
    /// trie hits to full user records.
    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, ApiError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(ApiError::DatabaseError)
    }

    /// Updates the self-editable profile fields (`PATCH /v1/users/me`).
    pub async fn update_names(
        &self,
        id: Uuid,
        first_name: &str,
        last_name: &str,
    ) -> Result<User, ApiError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET first_name = $2, last_name = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(first_name)
        .bind(last_name)
        .fetch_one(&self.pool)
        .await
        .map_err(ApiError::DatabaseError)
    }

    /// Deletes the row for `id`. Used by `ConsumeReset` (§4.4), which
    /// replaces a user's row wholesale rather than patching the password
    /// hash in place.
    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(ApiError::DatabaseError)?;
        Ok(())
    }
}

fn map_insert_error(e: sqlx::Error) -> ApiError {
    if let sqlx::Error::Database(ref db_err) = e {
        match db_err.constraint() {
            Some("users_email_key") => return ApiError::Conflict { resource: "email".to_string() },
            Some("users_user_name_key") => {
                return ApiError::Conflict { resource: "userName".to_string() }
            }
            _ => {}
        }
    }
    ApiError::DatabaseError(e)
}
