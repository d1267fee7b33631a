//! # Application Error Types
//!
//! Unified error handling for the gateway's HTTP surface with automatic
//! conversion to both Actix-web and Axum responses.
//!
//! ## Design Philosophy
//!
//! This module follows the "make illegal states unrepresentable" principle.
//! Each error variant maps to a specific HTTP status code and error code,
//! ensuring consistent API responses.
//!
//! ## Error Categories
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          ApiError Categories                             │
//! ├─────────────────────────┬───────────────────┬────────────────────────────┤
//! │ Bad request (400)       │ Unauthorized (401)│ Server (500, 502)          │
//! ├─────────────────────────┼───────────────────┼────────────────────────────┤
//! │ ValidationError         │ MissingSession    │ DatabaseError              │
//! │ LockedOut               │ InvalidSession    │ RedisError                 │
//! │ UserNotFound            │ InvalidCredentials│ MailError                  │
//! │ Conflict                │                   │ InternalError              │
//! │ ResetCodeNotFound       │                   │ ProxyError (502)           │
//! │ ResetCodeAlreadySent    │                   │                            │
//! └─────────────────────────┴───────────────────┴────────────────────────────┘
//! ```
//!
//! ## HTTP Response Format
//!
//! All errors are serialized to a consistent JSON format:
//!
//! ```json
//! {
//!   "code": "VALIDATION_ERROR",
//!   "message": "email is required",
//!   "request_id": "550e8400-e29b-41d4-a716-446655440000",
//!   "details": { ... },
//!   "timestamp": "2024-01-15T10:30:00Z"
//! }
//! ```
//!
//! ## Framework Integration
//!
//! - **Actix-web**: `impl ResponseError for ApiError`
//! - **Axum**: `impl IntoResponse for ApiError`

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// Type Aliases
// =============================================================================

/// Result type alias for handlers and services.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Main Error Enum
// =============================================================================

/// Application error type with automatic HTTP status mapping.
#[derive(Debug, Error)]
pub enum ApiError {
    // =========================================================================
    // Validation (400 Bad Request)
    // =========================================================================

    /// Request body failed a validation rule (email format, password length,
    /// password/confirmation mismatch, blank required field).
    #[error("{message}")]
    ValidationError {
        /// Human-readable description of what's wrong
        message: String,
    },

    /// Too many failed login attempts for this identifier; further attempts
    /// are rejected until the lockout window expires.
    #[error("account temporarily locked")]
    LockedOut,

    /// Email/username already registered.
    #[error("{resource} already exists")]
    Conflict {
        /// What's conflicting, e.g. "email"
        resource: String,
    },

    /// No user matches the given id/email.
    #[error("user not found")]
    UserNotFound,

    /// No reset code is pending for this identifier, or it has expired.
    #[error("reset code not found or expired")]
    ResetCodeNotFound,

    /// A reset code was already issued for this identifier and is still live.
    #[error("reset code already sent")]
    ResetCodeAlreadySent,

    /// UUID parsing failed.
    #[error("invalid id format")]
    InvalidUuid,

    // =========================================================================
    // Authentication (401 Unauthorized)
    // =========================================================================

    /// Wrong email/password combination.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Request didn't carry a session id (`Authorization: Bearer ...` or
    /// `?auth=`).
    #[error("authentication required")]
    MissingSession,

    /// Session id was present but doesn't resolve to a live session
    /// (expired, revoked, or signature didn't verify).
    #[error("invalid or expired session")]
    InvalidSession,

    // =========================================================================
    // Server Errors (500, 502)
    // =========================================================================

    /// PostgreSQL query failed.
    #[error("database error")]
    DatabaseError(#[from] sqlx::Error),

    /// Redis operation failed.
    #[error("redis error")]
    RedisError(#[from] redis::RedisError),

    /// Sending the reset-code email failed.
    #[error("mail error: {message}")]
    MailError {
        /// Internal message for logging
        message: String,
    },

    /// Unspecified internal error.
    #[error("internal server error")]
    InternalError {
        /// Internal message for logging (not exposed to client)
        message: String,
    },

    /// A registered backend service failed to respond to a proxied request.
    #[error("upstream service {service} unavailable")]
    ProxyError {
        /// Name of the unreachable service
        service: String,
    },
}

// =============================================================================
// Error Methods
// =============================================================================

impl ApiError {
    /// Returns a machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ValidationError { .. } => "VALIDATION_ERROR",
            Self::LockedOut => "LOCKED_OUT",
            Self::Conflict { .. } => "CONFLICT",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::ResetCodeNotFound => "RESET_CODE_NOT_FOUND",
            Self::ResetCodeAlreadySent => "RESET_CODE_ALREADY_SENT",
            Self::InvalidUuid => "INVALID_UUID",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::MissingSession => "MISSING_SESSION",
            Self::InvalidSession => "INVALID_SESSION",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::RedisError(_) => "REDIS_ERROR",
            Self::MailError { .. } => "MAIL_ERROR",
            Self::InternalError { .. } => "INTERNAL_ERROR",
            Self::ProxyError { .. } => "PROXY_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    ///
    /// This is the source of truth for error-to-status mapping. Both
    /// Actix-web and Axum implementations use this method.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError { .. }
            | Self::LockedOut
            | Self::Conflict { .. }
            | Self::UserNotFound
            | Self::ResetCodeNotFound
            | Self::ResetCodeAlreadySent
            | Self::InvalidUuid => StatusCode::BAD_REQUEST,

            Self::InvalidCredentials | Self::MissingSession | Self::InvalidSession => {
                StatusCode::UNAUTHORIZED
            }

            Self::ProxyError { .. } => StatusCode::BAD_GATEWAY,

            Self::DatabaseError(_)
            | Self::RedisError(_)
            | Self::MailError { .. }
            | Self::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns `true` if this is a server-side error (5xx/502).
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError(_)
                | Self::RedisError(_)
                | Self::MailError { .. }
                | Self::InternalError { .. }
                | Self::ProxyError { .. }
        )
    }
}

// =============================================================================
// Response Structure
// =============================================================================

/// Standard error response body for the API.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code for programmatic handling
    pub code: String,

    /// Human-readable message (for debugging, not for user display)
    pub message: String,

    /// Request ID for tracing across services.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// Additional error details (varies by error type).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// When the error occurred (ISO 8601 format)
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ErrorResponse {
    /// Creates a new error response from an `ApiError`.
    pub fn new(error: &ApiError) -> Self {
        let details = match error {
            // Server errors: don't expose internal details
            ApiError::DatabaseError(_)
            | ApiError::RedisError(_)
            | ApiError::MailError { .. }
            | ApiError::InternalError { .. } => None,
            _ => None,
        };

        Self {
            code: error.error_code().to_string(),
            message: error.to_string(),
            request_id: None,
            details,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Adds a request ID for tracing.
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = Some(request_id.to_string());
        self
    }
}

// =============================================================================
// Actix-web Integration
// =============================================================================

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let response = ErrorResponse::new(self);
        HttpResponse::build(self.status_code()).json(response)
    }
}

// =============================================================================
// Axum Integration
// =============================================================================

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.status_code() {
            StatusCode::UNAUTHORIZED => axum::http::StatusCode::UNAUTHORIZED,
            StatusCode::BAD_REQUEST => axum::http::StatusCode::BAD_REQUEST,
            StatusCode::BAD_GATEWAY => axum::http::StatusCode::BAD_GATEWAY,
            _ => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        };

        let response = ErrorResponse::new(&self);
        (status, axum::Json(response)).into_response()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_return_400() {
        assert_eq!(
            ApiError::ValidationError { message: "bad".into() }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::LockedOut.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::UserNotFound.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_authentication_errors_return_401() {
        assert_eq!(ApiError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::MissingSession.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::InvalidSession.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_proxy_error_returns_502() {
        assert_eq!(
            ApiError::ProxyError { service: "messaging".into() }.status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_conflict_is_400_not_409() {
        assert_eq!(
            ApiError::Conflict { resource: "email".to_string() }.status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_server_errors_are_flagged() {
        assert!(ApiError::InternalError { message: "test".to_string() }.is_server_error());
        assert!(ApiError::ProxyError { service: "test".to_string() }.is_server_error());
        assert!(!ApiError::InvalidCredentials.is_server_error());
        assert!(!ApiError::UserNotFound.is_server_error());
    }

    #[test]
    fn test_error_response_includes_timestamp() {
        let error = ApiError::InvalidCredentials;
        let response = ErrorResponse::new(&error);

        let now = chrono::Utc::now();
        let diff = now - response.timestamp;
        assert!(diff.num_seconds() < 60);
    }

    #[test]
    fn test_error_response_with_request_id() {
        let error = ApiError::InvalidCredentials;
        let request_id = Uuid::new_v4();
        let response = ErrorResponse::new(&error).with_request_id(request_id);

        assert_eq!(response.request_id, Some(request_id.to_string()));
    }
}
