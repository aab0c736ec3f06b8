//! API request/response models
//!
//! Every response body is wrapped in the uniform envelope
//! `{success, message?, data?, errors?, pagination?}`. The enums here are
//! the wire-level vocabulary; they convert to and from the persistence
//! enums in `bugtrack_db::entities`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use bugtrack_db::entities::{bug, user};

use crate::validation::FieldError;

// ============================================================================
// Wire-level enums
// ============================================================================

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Administrator with access to management endpoints
    Admin,
    /// Regular user
    User,
}

impl From<user::UserRole> for UserRole {
    fn from(role: user::UserRole) -> Self {
        match role {
            user::UserRole::Admin => UserRole::Admin,
            user::UserRole::User => UserRole::User,
        }
    }
}

/// Bug workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum BugStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl From<bug::BugStatus> for BugStatus {
    fn from(status: bug::BugStatus) -> Self {
        match status {
            bug::BugStatus::Open => BugStatus::Open,
            bug::BugStatus::InProgress => BugStatus::InProgress,
            bug::BugStatus::Resolved => BugStatus::Resolved,
            bug::BugStatus::Closed => BugStatus::Closed,
        }
    }
}

/// Bug scheduling priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BugPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl From<bug::BugPriority> for BugPriority {
    fn from(priority: bug::BugPriority) -> Self {
        match priority {
            bug::BugPriority::Low => BugPriority::Low,
            bug::BugPriority::Medium => BugPriority::Medium,
            bug::BugPriority::High => BugPriority::High,
            bug::BugPriority::Critical => BugPriority::Critical,
        }
    }
}

/// Bug impact severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BugSeverity {
    Minor,
    Major,
    Critical,
}

impl From<bug::BugSeverity> for BugSeverity {
    fn from(severity: bug::BugSeverity) -> Self {
        match severity {
            bug::BugSeverity::Minor => BugSeverity::Minor,
            bug::BugSeverity::Major => BugSeverity::Major,
            bug::BugSeverity::Critical => BugSeverity::Critical,
        }
    }
}

// ============================================================================
// Resource DTOs
// ============================================================================

/// User information. The password hash never appears here.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    /// User UUID
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Role
    pub role: UserRole,
    /// When the account was created
    pub created_at: DateTime<Utc>,
    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

impl From<user::Model> for UserDto {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            role: model.role.into(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Bug information
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BugDto {
    /// Bug UUID
    pub id: Uuid,
    /// Short summary
    pub title: String,
    /// Full description
    pub description: String,
    /// Workflow status
    pub status: BugStatus,
    /// Scheduling priority
    pub priority: BugPriority,
    /// Impact severity
    pub severity: BugSeverity,
    /// Reporter name
    pub created_by: String,
    /// When the bug was filed
    pub created_at: DateTime<Utc>,
    /// When the bug was last modified
    pub updated_at: DateTime<Utc>,
}

impl From<bug::Model> for BugDto {
    fn from(model: bug::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            status: model.status.into(),
            priority: model.priority.into(),
            severity: model.severity.into(),
            created_by: model.created_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Signup request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignupRequest {
    /// Display name
    pub name: Option<String>,
    /// Email address (must be unique)
    pub email: Option<String>,
    /// Password (minimum 8 characters)
    pub password: Option<String>,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Email address
    #[serde(default)]
    pub email: String,
    /// Password
    #[serde(default)]
    pub password: String,
}

/// Profile update request. Only the supplied fields change; the password is
/// re-hashed only when a new one is provided.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    /// New display name
    pub name: Option<String>,
    /// New email address
    pub email: Option<String>,
    /// New password (minimum 8 characters)
    pub password: Option<String>,
}

/// Raw bug payload as submitted by clients, before sanitization and
/// validation. Shared by create (POST), full update (PUT) and status patch
/// (PATCH); each path enforces its own required field set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BugPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub severity: Option<String>,
    pub created_by: Option<String>,
}

/// Query parameters for the bug listing
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BugListQuery {
    /// Exact-match status filter
    pub status: Option<String>,
    /// Exact-match priority filter
    pub priority: Option<String>,
    /// Exact-match severity filter
    pub severity: Option<String>,
    /// Exact-match reporter filter
    pub created_by: Option<String>,
    /// 1-indexed page (default 1)
    pub page: Option<u64>,
    /// Page size (default 10, capped at 100)
    pub limit: Option<u64>,
    /// Sort column: createdAt, updatedAt, title, status, priority, severity
    pub sort_by: Option<String>,
    /// Sort direction: asc or desc (default desc)
    pub order: Option<String>,
}

// ============================================================================
// Response envelopes
// ============================================================================

/// Pagination metadata for list responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    /// 1-indexed page that was returned
    pub current_page: u64,
    /// Page size used for the query
    pub items_per_page: u64,
    /// Total matching items across all pages
    pub total_items: u64,
    /// ceil(totalItems / itemsPerPage); 0 when there are no items
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl PaginationMeta {
    /// Pure pagination math over a 1-indexed page.
    pub fn compute(page: u64, limit: u64, total: u64) -> Self {
        let total_pages = if total == 0 || limit == 0 {
            0
        } else {
            total.div_ceil(limit)
        };

        Self {
            current_page: page,
            items_per_page: limit,
            total_items: total,
            total_pages,
            has_next_page: page < total_pages,
            has_previous_page: page > 1,
        }
    }
}

/// Token plus the authenticated user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthData {
    /// Signed bearer token
    pub token: String,
    /// The authenticated user
    pub user: UserDto,
}

/// Envelope for signup/login/profile responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: AuthData,
}

/// Envelope for a single user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub success: bool,
    pub data: UserDto,
}

/// Envelope for the admin user listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    pub success: bool,
    pub data: Vec<UserDto>,
}

/// Envelope for a single bug
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BugResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: BugDto,
}

/// Envelope for the paginated bug listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BugListResponse {
    pub success: bool,
    pub data: Vec<BugDto>,
    pub pagination: PaginationMeta,
}

/// Aggregate bug statistics. Values with zero occurrences are omitted from
/// their breakdown map.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BugStatsData {
    /// Total number of bugs
    pub total: u64,
    /// Count per status value
    pub by_status: std::collections::BTreeMap<String, u64>,
    /// Count per priority value
    pub by_priority: std::collections::BTreeMap<String, u64>,
    /// Count per severity value
    pub by_severity: std::collections::BTreeMap<String, u64>,
}

/// Envelope for the stats endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub success: bool,
    pub data: BugStatsData,
}

/// Envelope for responses that carry no resource (logout, delete)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Error envelope. `errors` carries per-field detail for validation
/// failures; `detail` carries internal error text in debug builds only.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
}
