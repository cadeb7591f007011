//! Campaign errors.

use thiserror::Error;

use crate::store::StoreError;

/// Errors raised by campaign operations.
#[derive(Debug, Error)]
pub enum CampaignError {
    /// No campaign with the given ID.
    #[error("Campaign not found")]
    NotFound,

    /// Creation input rejected.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Persistence failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CampaignError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::InvalidInput(_) => "VALIDATION_ERROR",
            Self::Store(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::InvalidInput(_) => 400,
            Self::Store(e) => e.http_status_code(),
        }
    }
}
