//! Integration tests for authentication endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use bugtrack_api::{ApiServer, ApiServerConfig};
use chrono::Duration;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, ModelTrait, Set};
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};
use tower::ServiceExt; // For `oneshot` method

const TEST_SECRET: &str = "test-secret";

/// In-memory database with migrations applied
async fn create_test_db() -> DatabaseConnection {
    let db = sea_orm::Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    bugtrack_db::migrator::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

fn create_test_server(db: DatabaseConnection) -> ApiServer {
    let config = ApiServerConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        enable_cors: true,
        jwt_secret: TEST_SECRET.to_string(),
        token_lifetime_days: 7,
        allow_signup: true,
    };

    ApiServer::new(config, db)
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .method(method)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn get_with_auth(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri).method("GET");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn signup(app: &Router, name: &str, email: &str, password: &str) -> (StatusCode, Value) {
    send_json(
        app,
        "POST",
        "/api/auth/signup",
        json!({"name": name, "email": email, "password": password}),
    )
    .await
}

#[tokio::test]
async fn test_signup_success_returns_token_and_user() {
    let db = create_test_db().await;
    let app = create_test_server(db).build_router();

    let (status, body) = signup(&app, "Test User", "test@example.com", "SecurePassword1").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert!(!body["data"]["token"].as_str().unwrap().is_empty());
    assert_eq!(body["data"]["user"]["email"], "test@example.com");
    assert_eq!(body["data"]["user"]["role"], "user");
}

#[tokio::test]
async fn test_signup_never_leaks_password_material() {
    let db = create_test_db().await;
    let app = create_test_server(db.clone()).build_router();

    let (status, body) = signup(&app, "Leak Check", "leak@example.com", "PlaintextPass1").await;
    assert_eq!(status, StatusCode::CREATED);

    // No password-like key anywhere in the response
    let user = &body["data"]["user"];
    assert!(user.get("password").is_none());
    assert!(user.get("passwordHash").is_none());

    // Stored hash is not the plaintext
    let stored = bugtrack_db::entities::User::find()
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_ne!(stored.password_hash, "PlaintextPass1");
    assert!(stored.password_hash.starts_with("$argon2id$"));
}

#[tokio::test]
async fn test_signup_duplicate_email_rejected() {
    let db = create_test_db().await;
    let app = create_test_server(db).build_router();

    let (status, _) = signup(&app, "First", "dup@example.com", "SecurePassword1").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = signup(&app, "Second", "dup@example.com", "OtherPassword1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Email already registered");
}

#[tokio::test]
async fn test_signup_validation_collects_field_errors() {
    let db = create_test_db().await;
    let app = create_test_server(db).build_router();

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/auth/signup",
        json!({"name": "  ", "email": "not-an-email", "password": "short"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_login_success() {
    let db = create_test_db().await;
    let app = create_test_server(db).build_router();

    signup(&app, "Login Test", "login@example.com", "SecurePassword1").await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/auth/login",
        json!({"email": "login@example.com", "password": "SecurePassword1"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["token"].as_str().unwrap().starts_with("eyJ"));
    assert_eq!(body["data"]["user"]["email"], "login@example.com");
}

#[tokio::test]
async fn test_login_failures_do_not_reveal_which_part_was_wrong() {
    let db = create_test_db().await;
    let app = create_test_server(db).build_router();

    signup(&app, "Known User", "known@example.com", "SecurePassword1").await;

    let (status_unknown, body_unknown) = send_json(
        &app,
        "POST",
        "/api/auth/login",
        json!({"email": "nobody@example.com", "password": "SecurePassword1"}),
    )
    .await;

    let (status_wrong, body_wrong) = send_json(
        &app,
        "POST",
        "/api/auth/login",
        json!({"email": "known@example.com", "password": "WrongPassword1"}),
    )
    .await;

    assert_eq!(status_unknown, StatusCode::UNAUTHORIZED);
    assert_eq!(status_wrong, StatusCode::UNAUTHORIZED);
    assert_eq!(body_unknown["message"], "Invalid credentials");
    assert_eq!(body_wrong["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_me_requires_and_resolves_token() {
    let db = create_test_db().await;
    let app = create_test_server(db).build_router();

    let (_, body) = signup(&app, "Me Test", "me@example.com", "SecurePassword1").await;
    let token = body["data"]["token"].as_str().unwrap().to_string();

    // No credential
    let (status, body) = get_with_auth(&app, "/api/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authenticated");

    // Garbage credential
    let (status, body) = get_with_auth(&app, "/api/auth/me", Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");

    // Valid credential
    let (status, body) = get_with_auth(&app, "/api/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "me@example.com");
    assert!(body["data"].get("password").is_none());
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_invalid() {
    let db = create_test_db().await;
    let app = create_test_server(db).build_router();

    signup(&app, "Victim", "victim@example.com", "SecurePassword1").await;

    let forged = bugtrack_auth::TokenService::new(b"attacker-secret", Duration::days(7))
        .issue("00000000-0000-0000-0000-000000000000", "victim@example.com", "admin")
        .unwrap();

    let (status, body) = get_with_auth(&app, "/api/auth/me", Some(&forged)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn test_expired_token_has_distinct_message() {
    let db = create_test_db().await;
    let app = create_test_server(db).build_router();

    let (_, body) = signup(&app, "Expiry", "expiry@example.com", "SecurePassword1").await;
    let user_id = body["data"]["user"]["id"].as_str().unwrap().to_string();

    // Signed with the right secret but already past expiry
    let expired = bugtrack_auth::TokenService::new(TEST_SECRET.as_bytes(), Duration::seconds(-10))
        .issue(&user_id, "expiry@example.com", "user")
        .unwrap();

    let (status, body) = get_with_auth(&app, "/api/auth/me", Some(&expired)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token expired");
}

#[tokio::test]
async fn test_valid_token_for_deleted_user() {
    let db = create_test_db().await;
    let app = create_test_server(db.clone()).build_router();

    let (_, body) = signup(&app, "Ghost", "ghost@example.com", "SecurePassword1").await;
    let token = body["data"]["token"].as_str().unwrap().to_string();

    // Delete the account out from under the token
    let user = bugtrack_db::entities::User::find()
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    user.delete(&db).await.unwrap();

    let (status, body) = get_with_auth(&app, "/api/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn test_cookie_carried_token_is_accepted() {
    let db = create_test_db().await;
    let app = create_test_server(db).build_router();

    let (_, body) = signup(&app, "Cookie", "cookie@example.com", "SecurePassword1").await;
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header("Cookie", format!("token={token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_profile_update_rehashes_only_on_password_change() {
    let db = create_test_db().await;
    let app = create_test_server(db.clone()).build_router();

    let (_, body) = signup(&app, "Profile", "profile@example.com", "SecurePassword1").await;
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let before = bugtrack_db::entities::User::find()
        .one(&db)
        .await
        .unwrap()
        .unwrap();

    // Name-only update must not touch the stored hash
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/profile")
                .method("PUT")
                .header("content-type", "application/json")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::from(json!({"name": "Renamed"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let after = bugtrack_db::entities::User::find()
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.name, "Renamed");
    assert_eq!(after.password_hash, before.password_hash);

    // Password update changes the hash
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/profile")
                .method("PUT")
                .header("content-type", "application/json")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::from(json!({"password": "NewPassword12"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let rehashed = bugtrack_db::entities::User::find()
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_ne!(rehashed.password_hash, before.password_hash);
}

#[tokio::test]
async fn test_profile_update_rejects_short_password() {
    let db = create_test_db().await;
    let app = create_test_server(db).build_router();

    let (_, body) = signup(&app, "Shorty", "shorty@example.com", "SecurePassword1").await;
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/profile")
                .method("PUT")
                .header("content-type", "application/json")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::from(json!({"password": "short"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_user_listing_requires_admin_role() {
    let db = create_test_db().await;
    let app = create_test_server(db.clone()).build_router();

    let (_, body) = signup(&app, "Plain", "plain@example.com", "SecurePassword1").await;
    let token = body["data"]["token"].as_str().unwrap().to_string();

    // Regular user is forbidden; the response names the role and route
    let (status, body) = get_with_auth(&app, "/api/auth/users", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("user"));
    assert!(message.contains("/api/auth/users"));

    // Promote the account and try again
    let user = bugtrack_db::entities::User::find()
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    let mut active: bugtrack_db::entities::user::ActiveModel = user.into();
    active.role = Set(bugtrack_db::entities::user::UserRole::Admin);
    active.update(&db).await.unwrap();

    let (status, body) = get_with_auth(&app, "/api/auth/users", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let db = create_test_db().await;
    let app = create_test_server(db).build_router();

    let (_, body) = signup(&app, "Out", "out@example.com", "SecurePassword1").await;
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/logout")
                .method("POST")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get("set-cookie")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("token=;"));
    assert!(set_cookie.contains("Max-Age=0"));
}
