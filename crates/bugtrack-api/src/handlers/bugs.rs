//! Bug resource handlers: CRUD, filtered listing, and statistics

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::{debug, info};
use uuid::Uuid;

use bugtrack_db::entities::{bug, Bug};

use crate::error::ApiError;
use crate::models::*;
use crate::validation::{sanitize_bug_data, validate_bug_data, validate_status_patch};
use crate::AppState;

const DEFAULT_PAGE_SIZE: u64 = 10;
const MAX_PAGE_SIZE: u64 = 100;

fn parse_bug_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid bug id '{raw}'")))
}

async fn find_bug(db: &DatabaseConnection, id: Uuid) -> Result<bug::Model, ApiError> {
    Bug::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Bug not found".to_string()))
}

/// File a new bug
#[utoipa::path(
    post,
    path = "/api/bugs",
    request_body = BugPayload,
    responses(
        (status = 201, description = "Bug created", body = BugResponse),
        (status = 400, description = "Validation failure", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_token" = [])),
    tag = "bugs"
)]
pub async fn create_bug(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BugPayload>,
) -> Result<(StatusCode, Json<BugResponse>), ApiError> {
    let clean = sanitize_bug_data(payload);
    let data = validate_bug_data(&clean).map_err(ApiError::Validation)?;

    let now = Utc::now();
    let created = bug::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(data.title),
        description: Set(data.description),
        status: Set(data.status),
        priority: Set(data.priority),
        severity: Set(data.severity),
        created_by: Set(data.created_by),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(bug = %created.id, "Bug created");

    Ok((
        StatusCode::CREATED,
        Json(BugResponse {
            success: true,
            message: Some("Bug created".to_string()),
            data: created.into(),
        }),
    ))
}

fn sort_column(key: Option<&str>) -> bug::Column {
    match key {
        Some("updatedAt") => bug::Column::UpdatedAt,
        Some("title") => bug::Column::Title,
        Some("status") => bug::Column::Status,
        Some("priority") => bug::Column::Priority,
        Some("severity") => bug::Column::Severity,
        // createdAt is the default sort
        _ => bug::Column::CreatedAt,
    }
}

fn sort_order(key: Option<&str>) -> Order {
    match key {
        Some("asc") => Order::Asc,
        _ => Order::Desc,
    }
}

/// List bugs with exact-match filters, sorting, and 1-indexed pagination
#[utoipa::path(
    get,
    path = "/api/bugs",
    params(
        ("status" = Option<String>, Query, description = "Exact-match status filter"),
        ("priority" = Option<String>, Query, description = "Exact-match priority filter"),
        ("severity" = Option<String>, Query, description = "Exact-match severity filter"),
        ("createdBy" = Option<String>, Query, description = "Exact-match reporter filter"),
        ("page" = Option<u64>, Query, description = "1-indexed page (default 1)"),
        ("limit" = Option<u64>, Query, description = "Page size (default 10, max 100)"),
        ("sortBy" = Option<String>, Query, description = "createdAt, updatedAt, title, status, priority, severity"),
        ("order" = Option<String>, Query, description = "asc or desc (default desc)")
    ),
    responses(
        (status = 200, description = "Paginated bug list", body = BugListResponse)
    ),
    tag = "bugs"
)]
pub async fn list_bugs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BugListQuery>,
) -> Result<Json<BugListResponse>, ApiError> {
    debug!(?query, "Listing bugs");

    let mut condition = Condition::all();

    // Filter values get the same normalization as writes, so ?status=OPEN
    // matches bugs stored as "open"
    if let Some(status) = &query.status {
        condition = condition.add(bug::Column::Status.eq(status.trim().to_lowercase()));
    }
    if let Some(priority) = &query.priority {
        condition = condition.add(bug::Column::Priority.eq(priority.trim().to_lowercase()));
    }
    if let Some(severity) = &query.severity {
        condition = condition.add(bug::Column::Severity.eq(severity.trim().to_lowercase()));
    }
    if let Some(created_by) = &query.created_by {
        condition = condition.add(bug::Column::CreatedBy.eq(created_by.trim()));
    }

    let page = query.page.unwrap_or(1).max(1);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let paginator = Bug::find()
        .filter(condition)
        .order_by(sort_column(query.sort_by.as_deref()), sort_order(query.order.as_deref()))
        .paginate(&state.db, limit);

    let total = paginator.num_items().await?;
    let bugs = paginator.fetch_page(page - 1).await?;

    Ok(Json(BugListResponse {
        success: true,
        data: bugs.into_iter().map(BugDto::from).collect(),
        pagination: PaginationMeta::compute(page, limit, total),
    }))
}

/// Get a single bug
#[utoipa::path(
    get,
    path = "/api/bugs/{id}",
    params(
        ("id" = String, Path, description = "Bug UUID")
    ),
    responses(
        (status = 200, description = "Bug", body = BugResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Unknown id", body = ErrorResponse)
    ),
    tag = "bugs"
)]
pub async fn get_bug(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BugResponse>, ApiError> {
    let id = parse_bug_id(&id)?;
    let found = find_bug(&state.db, id).await?;

    Ok(Json(BugResponse {
        success: true,
        message: None,
        data: found.into(),
    }))
}

/// Full update (replace). The complete required field set must validate,
/// even for fields unchanged from the stored bug; a `{status}`-only body
/// fails here and belongs on PATCH.
#[utoipa::path(
    put,
    path = "/api/bugs/{id}",
    params(
        ("id" = String, Path, description = "Bug UUID")
    ),
    request_body = BugPayload,
    responses(
        (status = 200, description = "Bug replaced", body = BugResponse),
        (status = 400, description = "Malformed id or validation failure", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Unknown id", body = ErrorResponse)
    ),
    security(("bearer_token" = [])),
    tag = "bugs"
)]
pub async fn update_bug(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<BugPayload>,
) -> Result<Json<BugResponse>, ApiError> {
    let id = parse_bug_id(&id)?;

    let clean = sanitize_bug_data(payload);
    let data = validate_bug_data(&clean).map_err(ApiError::Validation)?;

    let existing = find_bug(&state.db, id).await?;

    let mut active: bug::ActiveModel = existing.into();
    active.title = Set(data.title);
    active.description = Set(data.description);
    active.status = Set(data.status);
    active.priority = Set(data.priority);
    active.severity = Set(data.severity);
    active.created_by = Set(data.created_by);
    active.updated_at = Set(Utc::now());

    let updated = active.update(&state.db).await?;

    info!(bug = %updated.id, "Bug replaced");

    Ok(Json(BugResponse {
        success: true,
        message: Some("Bug updated".to_string()),
        data: updated.into(),
    }))
}

/// Partial status patch. Only `status` is accepted and required; every
/// other field keeps its stored value.
#[utoipa::path(
    patch,
    path = "/api/bugs/{id}",
    params(
        ("id" = String, Path, description = "Bug UUID")
    ),
    request_body = BugPayload,
    responses(
        (status = 200, description = "Status updated", body = BugResponse),
        (status = 400, description = "Malformed id or missing/invalid status", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Unknown id", body = ErrorResponse)
    ),
    security(("bearer_token" = [])),
    tag = "bugs"
)]
pub async fn patch_bug_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<BugPayload>,
) -> Result<Json<BugResponse>, ApiError> {
    let id = parse_bug_id(&id)?;

    let clean = sanitize_bug_data(payload);
    let status =
        validate_status_patch(&clean).map_err(|e| ApiError::Validation(vec![e]))?;

    let existing = find_bug(&state.db, id).await?;

    let mut active: bug::ActiveModel = existing.into();
    active.status = Set(status);
    active.updated_at = Set(Utc::now());

    let updated = active.update(&state.db).await?;

    info!(bug = %updated.id, status = %updated.status.as_str(), "Bug status changed");

    Ok(Json(BugResponse {
        success: true,
        message: Some("Bug status updated".to_string()),
        data: updated.into(),
    }))
}

/// Delete a bug
#[utoipa::path(
    delete,
    path = "/api/bugs/{id}",
    params(
        ("id" = String, Path, description = "Bug UUID")
    ),
    responses(
        (status = 200, description = "Bug deleted", body = MessageResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Unknown id", body = ErrorResponse)
    ),
    security(("bearer_token" = [])),
    tag = "bugs"
)]
pub async fn delete_bug(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_bug_id(&id)?;
    let existing = find_bug(&state.db, id).await?;

    Bug::delete_by_id(existing.id).exec(&state.db).await?;

    info!(bug = %id, "Bug deleted");

    Ok(Json(MessageResponse {
        success: true,
        message: "Bug deleted".to_string(),
    }))
}

/// Count of rows per distinct value of one enum column. Values with no
/// rows simply do not appear.
async fn breakdown<C>(db: &DatabaseConnection, column: C) -> Result<BTreeMap<String, u64>, ApiError>
where
    C: ColumnTrait,
{
    let rows: Vec<(String, i64)> = Bug::find()
        .select_only()
        .column(column)
        .column_as(bug::Column::Id.count(), "count")
        .group_by(column)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(value, count)| (value, count.max(0) as u64))
        .collect())
}

/// Aggregate statistics: total plus per-status, per-priority, and
/// per-severity counts
#[utoipa::path(
    get,
    path = "/api/bugs/stats",
    responses(
        (status = 200, description = "Aggregate counts", body = StatsResponse)
    ),
    tag = "bugs"
)]
pub async fn bug_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatsResponse>, ApiError> {
    let total = Bug::find().count(&state.db).await?;
    let by_status = breakdown(&state.db, bug::Column::Status).await?;
    let by_priority = breakdown(&state.db, bug::Column::Priority).await?;
    let by_severity = breakdown(&state.db, bug::Column::Severity).await?;

    Ok(Json(StatsResponse {
        success: true,
        data: BugStatsData {
            total,
            by_status,
            by_priority,
            by_severity,
        },
    }))
}
