//! Shared types, errors, and configuration for Reg-Router.
//!
//! This crate provides common types used across all other crates:
//! - Money types with decimal precision
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - Configuration management
//! - JWT claims and validation
//! - Best-effort email notification

pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod jwt;
pub mod types;


pub use auth::{Claims, Role};
pub use config::{
    AppConfig, ComplianceConfig, DatabaseConfig, EmailConfig, JwtSettings, PaymentConfig,
    RefundPolicy, ServerConfig,
};
pub use email::{EmailError, EmailService, Notifier};
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
