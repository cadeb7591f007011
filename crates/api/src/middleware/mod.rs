//! Request middleware and extractors tied to it.

pub mod auth;

pub use auth::{AuthUser, auth_middleware};
