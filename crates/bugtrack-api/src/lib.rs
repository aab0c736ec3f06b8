//! HTTP API layer: routing, middleware wiring, and server assembly

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod validation;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use chrono::Duration;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use bugtrack_auth::TokenService;
use bugtrack_db::entities::user::UserRole;
use sea_orm::DatabaseConnection;

/// Application state shared across handlers
pub struct AppState {
    pub db: DatabaseConnection,
    pub tokens: TokenService,
    pub allow_signup: bool,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bugtrack API",
        version = "0.1.0",
        description = "REST API for tracking bugs: authentication, CRUD, filtering, and statistics",
        contact(
            name = "Bugtrack Team",
            email = "team@bugtrack.dev"
        )
    ),
    modifiers(&SecurityAddon),
    paths(
        handlers::health_check,
        handlers::auth::signup,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::me,
        handlers::auth::update_profile,
        handlers::auth::list_users,
        handlers::bugs::create_bug,
        handlers::bugs::list_bugs,
        handlers::bugs::get_bug,
        handlers::bugs::update_bug,
        handlers::bugs::patch_bug_status,
        handlers::bugs::delete_bug,
        handlers::bugs::bug_stats,
    ),
    components(
        schemas(
            models::UserRole,
            models::BugStatus,
            models::BugPriority,
            models::BugSeverity,
            models::UserDto,
            models::BugDto,
            models::SignupRequest,
            models::LoginRequest,
            models::UpdateProfileRequest,
            models::BugPayload,
            models::BugListQuery,
            models::PaginationMeta,
            models::AuthData,
            models::AuthResponse,
            models::UserResponse,
            models::UserListResponse,
            models::BugResponse,
            models::BugListResponse,
            models::BugStatsData,
            models::StatsResponse,
            models::MessageResponse,
            models::ErrorResponse,
            models::HealthResponse,
            validation::FieldError,
        )
    ),
    tags(
        (name = "auth", description = "Authentication and account endpoints"),
        (name = "bugs", description = "Bug tracking endpoints"),
        (name = "system", description = "System health and info endpoints")
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// API server configuration
pub struct ApiServerConfig {
    /// Address to bind the API server
    pub bind_addr: SocketAddr,
    /// Enable CORS (for development)
    pub enable_cors: bool,
    /// Secret for signing bearer tokens
    pub jwt_secret: String,
    /// Token lifetime in days
    pub token_lifetime_days: i64,
    /// Whether public signup is allowed
    pub allow_signup: bool,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".parse().expect("static socket address"),
            enable_cors: true,
            jwt_secret: "change-me-in-production".to_string(),
            token_lifetime_days: 7,
            allow_signup: true,
        }
    }
}

/// API Server
pub struct ApiServer {
    config: ApiServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(config: ApiServerConfig, db: DatabaseConnection) -> Self {
        let tokens = TokenService::new(
            config.jwt_secret.as_bytes(),
            Duration::days(config.token_lifetime_days),
        );

        let state = Arc::new(AppState {
            db,
            tokens,
            allow_signup: config.allow_signup,
        });

        Self { config, state }
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let api_doc = ApiDoc::openapi();
        let state = self.state.clone();

        // PUBLIC routes (no credential handling at all)
        let public_router = Router::new()
            .route("/api/health", get(handlers::health_check))
            .route("/api/auth/signup", post(handlers::auth::signup))
            .route("/api/auth/login", post(handlers::auth::login))
            .with_state(state.clone());

        // READ routes: anonymous access allowed, identity attached when a
        // valid token is supplied
        let read_router = Router::new()
            .route("/api/bugs", get(handlers::bugs::list_bugs))
            .route("/api/bugs/stats", get(handlers::bugs::bug_stats))
            .route("/api/bugs/{id}", get(handlers::bugs::get_bug))
            .with_state(state.clone())
            .layer(axum_middleware::from_fn_with_state(
                state.clone(),
                middleware::attach_if_present,
            ));

        // PROTECTED routes (mandatory authentication)
        let protected_router = Router::new()
            .route("/api/auth/logout", post(handlers::auth::logout))
            .route("/api/auth/me", get(handlers::auth::me))
            .route("/api/auth/profile", put(handlers::auth::update_profile))
            .route("/api/bugs", post(handlers::bugs::create_bug))
            .route(
                "/api/bugs/{id}",
                put(handlers::bugs::update_bug)
                    .patch(handlers::bugs::patch_bug_status)
                    .delete(handlers::bugs::delete_bug),
            )
            .with_state(state.clone())
            .layer(axum_middleware::from_fn_with_state(
                state.clone(),
                middleware::require_auth,
            ));

        // ADMIN routes: authentication, then role restriction.
        // require_auth is added last so it runs first.
        let admin_router = Router::new()
            .route("/api/auth/users", get(handlers::auth::list_users))
            .with_state(state.clone())
            .layer(axum_middleware::from_fn(middleware::require_role(&[
                UserRole::Admin,
            ])))
            .layer(axum_middleware::from_fn_with_state(
                state.clone(),
                middleware::require_auth,
            ));

        let api_router = public_router
            .merge(read_router)
            .merge(protected_router)
            .merge(admin_router);

        let router = Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", api_doc))
            .merge(api_router);

        // Configure CORS. Credentials are allowed for cookie-carried
        // tokens, which rules out a wildcard origin.
        let cors = self.config.enable_cors.then(|| {
            use tower_http::cors::AllowOrigin;

            CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::PATCH,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
                .allow_credentials(true)
                .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
                    let origin_str = origin.to_str().unwrap_or("");
                    origin_str.starts_with("http://localhost:")
                        || origin_str.starts_with("http://127.0.0.1:")
                        || origin_str.starts_with("https://localhost:")
                        || origin_str.starts_with("https://127.0.0.1:")
                }))
        });

        let mut router = router.layer(TraceLayer::new_for_http());

        if let Some(cors) = cors {
            router = router.layer(cors);
        }

        router
    }

    /// Start the API server
    pub async fn start(self) -> Result<(), anyhow::Error> {
        let router = self.build_router();

        info!("Starting API server on {}", self.config.bind_addr);
        info!(
            "OpenAPI spec: http://{}/api/openapi.json",
            self.config.bind_addr
        );
        info!("Swagger UI: http://{}/swagger-ui", self.config.bind_addr);

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        axum::serve(listener, router)
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        // Ensure the OpenAPI spec can be generated without panics
        let _api_doc = ApiDoc::openapi();
    }
}
