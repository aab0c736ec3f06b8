//! Field validation and sanitization for the bug resource
//!
//! Validators are pure functions. The aggregate validator runs every field
//! validator and collects all failures instead of stopping at the first, so
//! a single response can report every problem in the payload.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use bugtrack_db::entities::bug::{BugPriority, BugSeverity, BugStatus};

use crate::models::BugPayload;

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    /// Name of the offending field
    pub field: String,
    /// Human-readable reason
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// A bug payload that passed full validation. Enum fields are typed; string
/// fields are trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidBugData {
    pub title: String,
    pub description: String,
    pub status: BugStatus,
    pub priority: BugPriority,
    pub severity: BugSeverity,
    pub created_by: String,
}

/// Trim every string field and lower-case the three enumerated fields, so
/// case-insensitive input (`"OPEN"`, `" HIGH "`) normalizes to the canonical
/// lowercase vocabulary before validation.
pub fn sanitize_bug_data(payload: BugPayload) -> BugPayload {
    BugPayload {
        title: payload.title.map(|v| v.trim().to_string()),
        description: payload.description.map(|v| v.trim().to_string()),
        status: payload.status.map(|v| v.trim().to_lowercase()),
        priority: payload.priority.map(|v| v.trim().to_lowercase()),
        severity: payload.severity.map(|v| v.trim().to_lowercase()),
        created_by: payload.created_by.map(|v| v.trim().to_string()),
    }
}

fn validate_bounded_string(
    field: &str,
    value: Option<&str>,
    min: usize,
    max: usize,
) -> Result<String, FieldError> {
    let value = match value {
        Some(v) if !v.is_empty() => v,
        _ => return Err(FieldError::new(field, format!("{field} is required"))),
    };

    let len = value.chars().count();
    if len < min || len > max {
        return Err(FieldError::new(
            field,
            format!("{field} must be between {min} and {max} characters"),
        ));
    }

    Ok(value.to_string())
}

pub fn validate_title(value: Option<&str>) -> Result<String, FieldError> {
    validate_bounded_string("title", value, 3, 100)
}

pub fn validate_description(value: Option<&str>) -> Result<String, FieldError> {
    validate_bounded_string("description", value, 10, 1000)
}

pub fn validate_created_by(value: Option<&str>) -> Result<String, FieldError> {
    validate_bounded_string("createdBy", value, 2, 50)
}

/// Status is optional on create and full update; absent means `open`.
pub fn validate_status(value: Option<&str>) -> Result<BugStatus, FieldError> {
    match value {
        None | Some("") => Ok(BugStatus::Open),
        Some(v) => BugStatus::parse(v).ok_or_else(|| {
            FieldError::new(
                "status",
                "status must be one of: open, in-progress, resolved, closed",
            )
        }),
    }
}

pub fn validate_priority(value: Option<&str>) -> Result<BugPriority, FieldError> {
    match value {
        None | Some("") => Err(FieldError::new("priority", "priority is required")),
        Some(v) => BugPriority::parse(v).ok_or_else(|| {
            FieldError::new(
                "priority",
                "priority must be one of: low, medium, high, critical",
            )
        }),
    }
}

pub fn validate_severity(value: Option<&str>) -> Result<BugSeverity, FieldError> {
    match value {
        None | Some("") => Err(FieldError::new("severity", "severity is required")),
        Some(v) => BugSeverity::parse(v).ok_or_else(|| {
            FieldError::new(
                "severity",
                "severity must be one of: minor, major, critical",
            )
        }),
    }
}

/// Full validation for create and full update (PUT). Runs every field
/// validator and returns all failures together; an omitted required field
/// fails even when the stored document already has a value for it, which is
/// what full-replace semantics mean.
pub fn validate_bug_data(payload: &BugPayload) -> Result<ValidBugData, Vec<FieldError>> {
    let mut errors = Vec::new();

    let title = validate_title(payload.title.as_deref())
        .map_err(|e| errors.push(e))
        .ok();
    let description = validate_description(payload.description.as_deref())
        .map_err(|e| errors.push(e))
        .ok();
    let status = validate_status(payload.status.as_deref())
        .map_err(|e| errors.push(e))
        .ok();
    let priority = validate_priority(payload.priority.as_deref())
        .map_err(|e| errors.push(e))
        .ok();
    let severity = validate_severity(payload.severity.as_deref())
        .map_err(|e| errors.push(e))
        .ok();
    let created_by = validate_created_by(payload.created_by.as_deref())
        .map_err(|e| errors.push(e))
        .ok();

    match (title, description, status, priority, severity, created_by) {
        (Some(title), Some(description), Some(status), Some(priority), Some(severity), Some(created_by)) => {
            Ok(ValidBugData {
                title,
                description,
                status,
                priority,
                severity,
                created_by,
            })
        }
        _ => Err(errors),
    }
}

// ============================================================================
// Account fields
// ============================================================================

/// A signup payload that passed validation. Email is trimmed and
/// lower-cased; the password is still plaintext and must be hashed before
/// storage.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUserData {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub fn validate_name(value: Option<&str>) -> Result<String, FieldError> {
    let trimmed = value.map(str::trim);
    validate_bounded_string("name", trimmed, 1, 100)
}

/// Shape check only: one `@`, a non-empty local part, and a dot in the
/// domain. Returns the trimmed, lower-cased address.
pub fn validate_email(value: Option<&str>) -> Result<String, FieldError> {
    let email = match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_lowercase(),
        _ => return Err(FieldError::new("email", "email is required")),
    };

    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();

    let shaped = !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace);

    if !shaped {
        return Err(FieldError::new("email", "email must be a valid address"));
    }

    Ok(email)
}

pub fn validate_password(value: Option<&str>) -> Result<String, FieldError> {
    match value {
        Some(v) if v.chars().count() >= 8 => Ok(v.to_string()),
        Some(_) => Err(FieldError::new(
            "password",
            "password must be at least 8 characters",
        )),
        None => Err(FieldError::new("password", "password is required")),
    }
}

/// Aggregate signup validation; collects every failure like
/// [`validate_bug_data`].
pub fn validate_signup(
    name: Option<&str>,
    email: Option<&str>,
    password: Option<&str>,
) -> Result<NewUserData, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = validate_name(name).map_err(|e| errors.push(e)).ok();
    let email = validate_email(email).map_err(|e| errors.push(e)).ok();
    let password = validate_password(password).map_err(|e| errors.push(e)).ok();

    match (name, email, password) {
        (Some(name), Some(email), Some(password)) => Ok(NewUserData {
            name,
            email,
            password,
        }),
        _ => Err(errors),
    }
}

/// Validation for the partial status patch (PATCH). Only `status` is
/// required and inspected; unlike create, absence is an error here.
pub fn validate_status_patch(payload: &BugPayload) -> Result<BugStatus, FieldError> {
    match payload.status.as_deref() {
        None | Some("") => Err(FieldError::new("status", "status is required")),
        Some(v) => BugStatus::parse(v).ok_or_else(|| {
            FieldError::new(
                "status",
                "status must be one of: open, in-progress, resolved, closed",
            )
        }),
    }
}
