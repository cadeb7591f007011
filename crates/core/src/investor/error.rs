//! Investor management errors.

use thiserror::Error;

use crate::compliance::AccreditationError;
use crate::store::StoreError;

/// Errors raised by investor profile and accreditation operations.
#[derive(Debug, Error)]
pub enum InvestorError {
    /// No investor with the given ID.
    #[error("User not found")]
    NotFound,

    /// Registration input rejected.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Accreditation lifecycle violation.
    #[error(transparent)]
    Accreditation(#[from] AccreditationError),

    /// Persistence failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl InvestorError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::InvalidInput(_) => "VALIDATION_ERROR",
            Self::Accreditation(e) => e.error_code(),
            Self::Store(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::InvalidInput(_) => 400,
            Self::Accreditation(e) => e.http_status_code(),
            Self::Store(e) => e.http_status_code(),
        }
    }
}
