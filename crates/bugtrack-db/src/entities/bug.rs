//! Bug entity: the tracked work item

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Workflow status of a bug. There is no enforced transition graph: any
/// status may follow any other, the only constraint is membership in this
/// set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "kebab-case")]
pub enum BugStatus {
    #[sea_orm(string_value = "open")]
    Open,

    #[sea_orm(string_value = "in-progress")]
    InProgress,

    #[sea_orm(string_value = "resolved")]
    Resolved,

    #[sea_orm(string_value = "closed")]
    Closed,
}

/// Scheduling priority
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "lowercase")]
pub enum BugPriority {
    #[sea_orm(string_value = "low")]
    Low,

    #[sea_orm(string_value = "medium")]
    Medium,

    #[sea_orm(string_value = "high")]
    High,

    #[sea_orm(string_value = "critical")]
    Critical,
}

/// Impact severity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "lowercase")]
pub enum BugSeverity {
    #[sea_orm(string_value = "minor")]
    Minor,

    #[sea_orm(string_value = "major")]
    Major,

    #[sea_orm(string_value = "critical")]
    Critical,
}

impl BugStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BugStatus::Open => "open",
            BugStatus::InProgress => "in-progress",
            BugStatus::Resolved => "resolved",
            BugStatus::Closed => "closed",
        }
    }

    /// Parse a canonical (already lower-cased) wire value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(BugStatus::Open),
            "in-progress" => Some(BugStatus::InProgress),
            "resolved" => Some(BugStatus::Resolved),
            "closed" => Some(BugStatus::Closed),
            _ => None,
        }
    }
}

impl BugPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            BugPriority::Low => "low",
            BugPriority::Medium => "medium",
            BugPriority::High => "high",
            BugPriority::Critical => "critical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(BugPriority::Low),
            "medium" => Some(BugPriority::Medium),
            "high" => Some(BugPriority::High),
            "critical" => Some(BugPriority::Critical),
            _ => None,
        }
    }
}

impl BugSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            BugSeverity::Minor => "minor",
            BugSeverity::Major => "major",
            BugSeverity::Critical => "critical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "minor" => Some(BugSeverity::Minor),
            "major" => Some(BugSeverity::Major),
            "critical" => Some(BugSeverity::Critical),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bugs")]
pub struct Model {
    /// Bug UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Short summary, 3-100 chars (stored trimmed)
    pub title: String,

    /// Full description, 10-1000 chars (stored trimmed)
    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Workflow status
    pub status: BugStatus,

    /// Scheduling priority
    pub priority: BugPriority,

    /// Impact severity
    pub severity: BugSeverity,

    /// Reporter name, 2-50 chars. Free-form: not a foreign key into users.
    pub created_by: String,

    /// When the bug was filed
    pub created_at: ChronoDateTimeUtc,

    /// When the bug was last modified
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_vocabulary() {
        for value in ["open", "in-progress", "resolved", "closed"] {
            let parsed = BugStatus::parse(value).unwrap();
            assert_eq!(parsed.as_str(), value);
        }
        assert_eq!(BugStatus::parse("reopened"), None);
        assert_eq!(BugStatus::parse("OPEN"), None);
    }

    #[test]
    fn test_priority_vocabulary() {
        for value in ["low", "medium", "high", "critical"] {
            let parsed = BugPriority::parse(value).unwrap();
            assert_eq!(parsed.as_str(), value);
        }
        assert_eq!(BugPriority::parse("urgent"), None);
    }

    #[test]
    fn test_severity_vocabulary() {
        for value in ["minor", "major", "critical"] {
            let parsed = BugSeverity::parse(value).unwrap();
            assert_eq!(parsed.as_str(), value);
        }
        assert_eq!(BugSeverity::parse("blocker"), None);
    }

    #[test]
    fn test_status_json_uses_kebab_case() {
        let json = serde_json::to_string(&BugStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
    }
}
