//! Request middleware

pub mod auth;

pub use auth::{
    attach_if_present, require_auth, require_role, role_allowed, AuthUser, TOKEN_COOKIE,
};
