//! # User Domain Model
//!
//! The gateway's own notion of a user account — the thing a session
//! resolves to and the thing `POST /v1/users` creates. Grounded in the
//! original `models/users` package, adapted to this workspace's stack:
//! Argon2id instead of bcrypt (see [`shared::auth::password`]), a UUID
//! instead of a `bson.ObjectId` (no Mongo driver anywhere in this stack).

use serde::{Deserialize, Serialize};
use shared::auth::PasswordHasher;
use shared::errors::ApiError;
use uuid::Uuid;

const GRAVATAR_BASE_URL: &str = "https://www.gravatar.com/avatar/";

/// A user account as stored and returned to clients.
///
/// `pass_hash` is never serialized — it exists only to round-trip through
/// the repository layer. Wire field names are camelCase to match the
/// HTTP surface's JSON bodies (§6); `photo_url` is overridden to
/// `photoURL` since `camelCase` alone would produce `photoUrl`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing, skip_deserializing)]
    pub pass_hash: String,
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(rename = "photoURL")]
    pub photo_url: String,
}

/// Body of `POST /v1/users` — a prospective new account.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub password_conf: String,
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
}

/// Body of `PATCH /v1/users/me` — the only fields a user may self-edit.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdates {
    pub first_name: String,
    pub last_name: String,
}

/// Validates a [`NewUser`] against the same rules the original account
/// signup enforces: a parseable email, a password of at least 6
/// characters matching its confirmation, and non-empty names.
///
/// Password *strength* (beyond length) is deliberately not re-litigated
/// here — see `shared::auth::password` for why that's a separate concern.
pub fn validate_new_user(nu: &NewUser) -> Result<(), ApiError> {
    if !looks_like_email(&nu.email) {
        return Err(ApiError::ValidationError {
            message: "email is not a valid address".to_string(),
        });
    }

    if nu.password.len() < 6 {
        return Err(ApiError::ValidationError {
            message: "password must be at least 6 characters".to_string(),
        });
    }

    if nu.password != nu.password_conf {
        return Err(ApiError::ValidationError {
            message: "password must match password confirmation".to_string(),
        });
    }

    if nu.user_name.trim().is_empty() {
        return Err(ApiError::ValidationError {
            message: "username must be non-zero length".to_string(),
        });
    }

    if nu.first_name.trim().is_empty() {
        return Err(ApiError::ValidationError {
            message: "first name must be non-zero length".to_string(),
        });
    }

    if nu.last_name.trim().is_empty() {
        return Err(ApiError::ValidationError {
            message: "last name must be non-zero length".to_string(),
        });
    }

    Ok(())
}

/// Very small RFC-5322-ish sanity check — one `@`, a non-empty local
/// part, and a domain part containing a `.`. The stdlib has no parser
/// for this and pulling in a whole mail-address crate for one check
/// would be overkill for the one rule the original enforces.
fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// Turns a validated [`NewUser`] into a storable [`User`]: normalizes the
/// email, derives the Gravatar URL, mints an id, and hashes the password.
pub fn new_user_to_user(nu: &NewUser, hasher: &PasswordHasher) -> Result<User, ApiError> {
    let email = nu.email.trim().to_lowercase();
    let photo_url = gravatar_url(&email);
    let pass_hash = hasher.hash(&nu.password)?;

    Ok(User {
        id: Uuid::new_v4(),
        email,
        pass_hash,
        user_name: nu.user_name.clone(),
        first_name: nu.first_name.clone(),
        last_name: nu.last_name.clone(),
        photo_url,
    })
}

/// Builds a Gravatar URL from an (already normalized) email address.
pub fn gravatar_url(normalized_email: &str) -> String {
    let digest = md5::compute(normalized_email.as_bytes());
    format!("{GRAVATAR_BASE_URL}{digest:x}")
}

impl User {
    /// `"<FirstName> <LastName>"`, collapsing to just one side if the
    /// other is empty.
    pub fn full_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (true, true) => String::new(),
            (true, false) => self.last_name.clone(),
            (false, true) => self.first_name.clone(),
            (false, false) => format!("{} {}", self.first_name, self.last_name),
        }
    }

    /// Verifies `password` against the stored hash.
    pub fn authenticate(&self, password: &str, hasher: &PasswordHasher) -> Result<(), ApiError> {
        if hasher.verify(password, &self.pass_hash)? {
            Ok(())
        } else {
            Err(ApiError::InvalidCredentials)
        }
    }

    /// Applies a validated set of profile updates in place.
    pub fn apply_updates(&mut self, updates: &ProfileUpdates) -> Result<(), ApiError> {
        if updates.first_name.trim().is_empty() {
            return Err(ApiError::ValidationError {
                message: "first name must be non-zero length".to_string(),
            });
        }
        if updates.last_name.trim().is_empty() {
            return Err(ApiError::ValidationError {
                message: "last name must be non-zero length".to_string(),
            });
        }

        self.first_name = updates.first_name.clone();
        self.last_name = updates.last_name.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_new_user() -> NewUser {
        NewUser {
            email: "  Jane.Doe@Example.COM  ".to_string(),
            password: "hunter22".to_string(),
            password_conf: "hunter22".to_string(),
            user_name: "janedoe".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
        }
    }

    #[test]
    fn validate_new_user_accepts_sample() {
        assert!(validate_new_user(&sample_new_user()).is_ok());
    }

    #[test]
    fn validate_new_user_rejects_bad_email() {
        let mut nu = sample_new_user();
        nu.email = "not-an-email".to_string();
        assert!(validate_new_user(&nu).is_err());
    }

    #[test]
    fn validate_new_user_rejects_short_password() {
        let mut nu = sample_new_user();
        nu.password = "short".to_string();
        nu.password_conf = "short".to_string();
        assert!(validate_new_user(&nu).is_err());
    }

    #[test]
    fn validate_new_user_rejects_mismatched_confirmation() {
        let mut nu = sample_new_user();
        nu.password_conf = "different".to_string();
        assert!(validate_new_user(&nu).is_err());
    }

    #[test]
    fn validate_new_user_rejects_blank_username() {
        let mut nu = sample_new_user();
        nu.user_name = "   ".to_string();
        assert!(validate_new_user(&nu).is_err());
    }

    #[test]
    fn new_user_to_user_normalizes_email_and_sets_gravatar() {
        let nu = sample_new_user();
        let hasher = PasswordHasher::new();
        let user = new_user_to_user(&nu, &hasher).unwrap();

        assert_eq!(user.email, "jane.doe@example.com");
        assert!(user.photo_url.starts_with(GRAVATAR_BASE_URL));
        assert_ne!(user.pass_hash, nu.password);
    }

    #[test]
    fn authenticate_accepts_correct_password_rejects_wrong_one() {
        let nu = sample_new_user();
        let hasher = PasswordHasher::new();
        let user = new_user_to_user(&nu, &hasher).unwrap();

        assert!(user.authenticate("hunter22", &hasher).is_ok());
        assert!(user.authenticate("wrong", &hasher).is_err());
    }

    #[test]
    fn full_name_joins_both_parts() {
        let nu = sample_new_user();
        let hasher = PasswordHasher::new();
        let user = new_user_to_user(&nu, &hasher).unwrap();
        assert_eq!(user.full_name(), "Jane Doe");
    }

    #[test]
    fn apply_updates_rejects_blank_first_name() {
        let nu = sample_new_user();
        let hasher = PasswordHasher::new();
        let mut user = new_user_to_user(&nu, &hasher).unwrap();

        let bad = ProfileUpdates { first_name: String::new(), last_name: "Doe".to_string() };
        assert!(user.apply_updates(&bad).is_err());
    }
}
