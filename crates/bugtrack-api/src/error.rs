//! API error taxonomy
//!
//! One enum covers every failure the HTTP layer can surface. Each variant
//! maps to a status code and the uniform error envelope; authentication
//! failures share the 401 status but keep distinct messages so logs and
//! clients can tell them apart.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use thiserror::Error;
use tracing::{error, warn};

use bugtrack_auth::{JwtError, PasswordError};

use crate::models::ErrorResponse;
use crate::validation::FieldError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// One or more fields failed validation (400)
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// Malformed request outside field validation, e.g. a non-UUID id (400)
    #[error("{0}")]
    BadRequest(String),

    /// Unique constraint violation, e.g. a duplicate email (400)
    #[error("{0}")]
    Duplicate(String),

    /// No credential material on a protected route (401)
    #[error("Not authenticated")]
    Unauthenticated,

    /// Credential present but past its expiry (401)
    #[error("Token expired")]
    TokenExpired,

    /// Credential present but unverifiable or malformed (401)
    #[error("Invalid token")]
    InvalidToken,

    /// Token verified but its subject no longer exists (401)
    #[error("User not found")]
    UserNotFound,

    /// Login failure; the same message covers unknown email and wrong
    /// password so the response does not leak which one it was (401)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Authenticated but the role does not grant access (403)
    #[error("Role '{role}' is not allowed to access {path}")]
    Forbidden { role: String, path: String },

    /// Public registration turned off by configuration (403)
    #[error("Signup is disabled")]
    SignupClosed,

    /// Unknown resource id (404)
    #[error("{0}")]
    NotFound(String),

    /// Store failure (500)
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Anything else unexpected (500)
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) | ApiError::Duplicate(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthenticated
            | ApiError::TokenExpired
            | ApiError::InvalidToken
            | ApiError::UserNotFound
            | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } | ApiError::SignupClosed => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            ApiError::Validation(errors) => ErrorResponse {
                success: false,
                message: "Validation failed".to_string(),
                errors: Some(errors),
                detail: None,
            },
            ApiError::Database(ref e) => {
                error!("Database error: {e}");
                ErrorResponse {
                    success: false,
                    message: "Internal server error".to_string(),
                    errors: None,
                    // Internal detail is only exposed in debug builds
                    detail: cfg!(debug_assertions).then(|| e.to_string()),
                }
            }
            ApiError::Internal(ref detail) => {
                error!("Internal error: {detail}");
                ErrorResponse {
                    success: false,
                    message: "Internal server error".to_string(),
                    errors: None,
                    detail: cfg!(debug_assertions).then(|| detail.clone()),
                }
            }
            other => {
                if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                    warn!("Request rejected: {other}");
                }
                ErrorResponse {
                    success: false,
                    message: other.to_string(),
                    errors: None,
                    detail: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<JwtError> for ApiError {
    fn from(e: JwtError) -> Self {
        match e {
            JwtError::Expired => ApiError::TokenExpired,
            JwtError::InvalidSignature | JwtError::Malformed => ApiError::InvalidToken,
            JwtError::EncodingError(e) => ApiError::Internal(format!("Token encoding: {e}")),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(e: PasswordError) -> Self {
        ApiError::Internal(format!("Password handling: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Validation(vec![]).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::TokenExpired.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden {
                role: "user".to_string(),
                path: "/api/auth/users".to_string()
            }
            .status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("Bug not found".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_auth_failures_have_distinct_messages() {
        let messages = [
            ApiError::Unauthenticated.to_string(),
            ApiError::TokenExpired.to_string(),
            ApiError::InvalidToken.to_string(),
            ApiError::UserNotFound.to_string(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_invalid_credentials_message_is_exact() {
        assert_eq!(ApiError::InvalidCredentials.to_string(), "Invalid credentials");
    }

    #[test]
    fn test_forbidden_names_role_and_route() {
        let msg = ApiError::Forbidden {
            role: "user".to_string(),
            path: "/api/auth/users".to_string(),
        }
        .to_string();
        assert!(msg.contains("user"));
        assert!(msg.contains("/api/auth/users"));
    }
}
