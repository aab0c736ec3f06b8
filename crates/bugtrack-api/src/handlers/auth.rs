//! Authentication and account handlers

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    Extension, Json,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::{info, warn};
use uuid::Uuid;

use bugtrack_auth::{hash_password, verify_password};
use bugtrack_db::entities::{user, User};

use crate::error::ApiError;
use crate::middleware::{AuthUser, TOKEN_COOKIE};
use crate::models::*;
use crate::validation::{
    validate_email, validate_name, validate_password, validate_signup,
};
use crate::AppState;

/// Session cookie mirroring the bearer token, for browser clients.
fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!("{TOKEN_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}")
}

fn cleared_cookie() -> String {
    format!("{TOKEN_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

fn issue_for(state: &AppState, user: &user::Model) -> Result<String, ApiError> {
    let token = state
        .tokens
        .issue(&user.id.to_string(), &user.email, user.role.as_str())?;
    Ok(token)
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Validation failure or duplicate email", body = ErrorResponse),
        (status = 403, description = "Signup disabled", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<AuthResponse>), ApiError> {
    if !state.allow_signup {
        return Err(ApiError::SignupClosed);
    }

    let data = validate_signup(
        request.name.as_deref(),
        request.email.as_deref(),
        request.password.as_deref(),
    )
    .map_err(ApiError::Validation)?;

    let existing = User::find()
        .filter(user::Column::Email.eq(&data.email))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(ApiError::Duplicate("Email already registered".to_string()));
    }

    let now = Utc::now();
    let created = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(data.name),
        email: Set(data.email),
        password_hash: Set(hash_password(&data.password)?),
        role: Set(user::UserRole::User),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(email = %created.email, "New account registered");

    let token = issue_for(&state, &created)?;
    let cookie = session_cookie(&token, state.tokens.lifetime().num_seconds());

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            success: true,
            message: Some("Account created".to_string()),
            data: AuthData {
                token,
                user: created.into(),
            },
        }),
    ))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<([(header::HeaderName, String); 1], Json<AuthResponse>), ApiError> {
    let email = request.email.trim().to_lowercase();

    // Unknown email and wrong password produce the same response so the
    // API does not reveal which one failed
    let user = User::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !verify_password(&request.password, &user.password_hash)? {
        warn!(email = %email, "Login failed: password mismatch");
        return Err(ApiError::InvalidCredentials);
    }

    info!(email = %email, "User logged in");

    let token = issue_for(&state, &user)?;
    let cookie = session_cookie(&token, state.tokens.lifetime().num_seconds());

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            success: true,
            message: None,
            data: AuthData {
                token,
                user: user.into(),
            },
        }),
    ))
}

/// Log out, clearing the session cookie
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_token" = [])),
    tag = "auth"
)]
pub async fn logout(
    Extension(auth_user): Extension<AuthUser>,
) -> ([(header::HeaderName, String); 1], Json<MessageResponse>) {
    info!(email = %auth_user.email, "User logged out");

    (
        [(header::SET_COOKIE, cleared_cookie())],
        Json(MessageResponse {
            success: true,
            message: "Logged out".to_string(),
        }),
    )
}

/// Current authenticated user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_token" = [])),
    tag = "auth"
)]
pub async fn me(Extension(auth_user): Extension<AuthUser>) -> Json<UserResponse> {
    Json(UserResponse {
        success: true,
        data: UserDto {
            id: auth_user.id,
            name: auth_user.name,
            email: auth_user.email,
            role: auth_user.role.into(),
            created_at: auth_user.created_at,
            updated_at: auth_user.updated_at,
        },
    })
}

/// Update name, email, or password. Only supplied fields change, and the
/// password is re-hashed only when a new one is supplied. Returns a fresh
/// token since the email claim may have changed.
#[utoipa::path(
    put,
    path = "/api/auth/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = AuthResponse),
        (status = 400, description = "Validation failure or duplicate email", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_token" = [])),
    tag = "auth"
)]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<([(header::HeaderName, String); 1], Json<AuthResponse>), ApiError> {
    let mut errors = Vec::new();

    let name = match request.name.as_deref() {
        Some(value) => validate_name(Some(value)).map_err(|e| errors.push(e)).ok(),
        None => None,
    };
    let email = match request.email.as_deref() {
        Some(value) => validate_email(Some(value)).map_err(|e| errors.push(e)).ok(),
        None => None,
    };
    let password = match request.password.as_deref() {
        Some(value) => validate_password(Some(value))
            .map_err(|e| errors.push(e))
            .ok(),
        None => None,
    };

    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    if let Some(ref new_email) = email {
        let taken = User::find()
            .filter(user::Column::Email.eq(new_email))
            .filter(user::Column::Id.ne(auth_user.id))
            .one(&state.db)
            .await?;
        if taken.is_some() {
            return Err(ApiError::Duplicate("Email already registered".to_string()));
        }
    }

    let current = User::find_by_id(auth_user.id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::UserNotFound)?;

    let mut active: user::ActiveModel = current.into();
    if let Some(name) = name {
        active.name = Set(name);
    }
    if let Some(email) = email {
        active.email = Set(email);
    }
    // Explicit password-changed path: hashing happens exactly once, and
    // only when a new plaintext was supplied
    if let Some(password) = password {
        active.password_hash = Set(hash_password(&password)?);
    }
    active.updated_at = Set(Utc::now());

    let updated = active.update(&state.db).await?;

    info!(email = %updated.email, "Profile updated");

    let token = issue_for(&state, &updated)?;
    let cookie = session_cookie(&token, state.tokens.lifetime().num_seconds());

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            success: true,
            message: Some("Profile updated".to_string()),
            data: AuthData {
                token,
                user: updated.into(),
            },
        }),
    ))
}

/// List all accounts (admin only)
#[utoipa::path(
    get,
    path = "/api/auth/users",
    responses(
        (status = 200, description = "All users", body = UserListResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Requires the admin role", body = ErrorResponse)
    ),
    security(("bearer_token" = [])),
    tag = "auth"
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UserListResponse>, ApiError> {
    let users = User::find()
        .order_by_desc(user::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(UserListResponse {
        success: true,
        data: users.into_iter().map(UserDto::from).collect(),
    }))
}
