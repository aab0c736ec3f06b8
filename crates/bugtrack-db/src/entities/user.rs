//! User entity for authentication and account management

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User role in the system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Administrator with access to management endpoints
    #[sea_orm(string_value = "admin")]
    Admin,

    /// Regular user
    #[sea_orm(string_value = "user")]
    User,
}

impl UserRole {
    /// Canonical lowercase wire value. Role comparison is case sensitive.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(UserRole::Admin),
            "user" => Some(UserRole::User),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// User UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Display name (stored trimmed)
    pub name: String,

    /// User email (stored trimmed and lower-cased, unique)
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2id password hash. Never leaves the persistence layer in API
    /// responses.
    pub password_hash: String,

    /// User role (admin or user)
    pub role: UserRole,

    /// When the account was created
    pub created_at: ChronoDateTimeUtc,

    /// When the account was last updated
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        assert_eq!(UserRole::parse("admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::parse("user"), Some(UserRole::User));
        assert_eq!(UserRole::Admin.as_str(), "admin");
        assert_eq!(UserRole::User.as_str(), "user");
    }

    #[test]
    fn test_role_parse_is_case_sensitive() {
        assert_eq!(UserRole::parse("Admin"), None);
        assert_eq!(UserRole::parse("ADMIN"), None);
        assert_eq!(UserRole::parse("moderator"), None);
    }
}
