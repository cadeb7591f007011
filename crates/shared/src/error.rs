//! Application-wide error types.
//!
//! Domain modules carry their own error enums. `AppError` covers what sits
//! around them at the HTTP edge: credentials, roles and request shape.

use thiserror::Error;

use crate::jwt::JwtError;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Errors raised outside the domain modules.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppError {
    /// No bearer token on a protected route.
    #[error("Authorization header with Bearer token is required")]
    MissingToken,

    /// Bearer token past its expiry.
    #[error("Token has expired")]
    TokenExpired,

    /// Bearer token that does not decode or verify.
    #[error("Invalid or malformed token")]
    InvalidToken,

    /// Caller lacks the role the operation needs.
    #[error("{0}")]
    Forbidden(String),

    /// Request body, path or query is malformed.
    #[error("{0}")]
    Validation(String),

    /// Ledger status string outside the known set.
    #[error("Unknown status: {0}")]
    InvalidStatus(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::MissingToken | Self::TokenExpired | Self::InvalidToken => 401,
            Self::Forbidden(_) => 403,
            Self::Validation(_) | Self::InvalidStatus(_) => 400,
            Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MissingToken => "MISSING_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidStatus(_) => "INVALID_STATUS",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<JwtError> for AppError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => Self::TokenExpired,
            JwtError::DecodingError(_) => Self::InvalidToken,
            JwtError::EncodingError(e) => Self::Internal(e),
        }
    }
}
