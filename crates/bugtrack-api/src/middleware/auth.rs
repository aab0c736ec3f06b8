//! Authentication and authorization middleware
//!
//! Three guards over inbound credential material:
//! - [`require_auth`]: token must be present, valid, and resolve to a
//!   stored user; attaches [`AuthUser`] to the request extensions.
//! - [`require_role`]: runs after `require_auth`, checks the attached
//!   identity's role against an allowed set.
//! - [`attach_if_present`]: attaches the identity when a valid token is
//!   supplied but never fails the request.
//!
//! Token material is read from an ordered list of extractors: the
//! `Authorization: Bearer` header first, then a cookie named `token`. The
//! first non-empty result wins, so the header takes precedence.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use bugtrack_db::entities::user::{self, UserRole};
use bugtrack_db::entities::User;

use crate::error::ApiError;
use crate::AppState;

/// Cookie that may carry the bearer token
pub const TOKEN_COOKIE: &str = "token";

/// Authenticated user resolved from a verified token. This is the stored
/// user record minus the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<user::Model> for AuthUser {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            role: model.role,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

fn bearer_header_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|cookies| {
            let prefix = format!("{TOKEN_COOKIE}=");
            cookies
                .split(';')
                .map(str::trim)
                .find_map(|c| c.strip_prefix(prefix.as_str()))
                .map(str::to_string)
        })
        .filter(|t| !t.is_empty())
}

/// Try each extractor in order; first non-empty result wins.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let extractors: [fn(&HeaderMap) -> Option<String>; 2] = [bearer_header_token, cookie_token];
    extractors.iter().find_map(|extract| extract(headers))
}

/// Resolve a token to a stored user. Token-level failures keep their
/// distinct error variants; a verified token whose subject no longer
/// exists is `UserNotFound`.
async fn resolve_user(state: &AppState, token: &str) -> Result<AuthUser, ApiError> {
    let claims = state.tokens.verify(token)?;
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| ApiError::InvalidToken)?;

    let user = User::find_by_id(user_id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::UserNotFound)?;

    Ok(AuthUser::from(user))
}

/// Mandatory authentication. Fails 401 with a distinct message for each
/// category: missing credential, expired token, invalid token, and a valid
/// token referencing a deleted account.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers()).ok_or(ApiError::Unauthenticated)?;
    let auth_user = resolve_user(&state, &token).await?;

    debug!(user = %auth_user.email, "Authenticated request");
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Optional authentication. A missing, invalid, or expired token never
/// fails the request; the handler simply sees no identity. Store failures
/// still surface as server errors.
pub async fn attach_if_present(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(token) = extract_token(request.headers()) {
        match resolve_user(&state, &token).await {
            Ok(auth_user) => {
                request.extensions_mut().insert(auth_user);
            }
            Err(ApiError::Database(e)) => return Err(ApiError::Database(e)),
            Err(e) => debug!("Ignoring unusable credential on optional route: {e}"),
        }
    }

    Ok(next.run(request).await)
}

/// Case-sensitive role membership test.
pub fn role_allowed(role: &UserRole, allowed: &[UserRole]) -> bool {
    allowed.contains(role)
}

/// Role-restricted access. Must run after [`require_auth`]; a request with
/// no attached identity is treated as unauthenticated rather than
/// forbidden.
pub fn require_role(
    allowed: &'static [UserRole],
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Result<Response, ApiError>> + Send>> + Clone
{
    move |request: Request, next: Next| {
        Box::pin(async move {
            let auth_user = request
                .extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or(ApiError::Unauthenticated)?;

            if !role_allowed(&auth_user.role, allowed) {
                return Err(ApiError::Forbidden {
                    role: auth_user.role.as_str().to_string(),
                    path: request.uri().path().to_string(),
                });
            }

            Ok(next.run(request).await)
        })
    }
}
