//! Authentication primitives for the bugtrack API
//!
//! Two concerns live here: signed bearer tokens (`jwt`) and password
//! hashing (`password`). Both are pure libraries with no knowledge of
//! HTTP or the database schema.

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtError, TokenService};
pub use password::{hash_password, verify_password, PasswordError};
