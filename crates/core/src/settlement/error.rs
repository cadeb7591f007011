//! Settlement error types.

use thiserror::Error;

use crate::payment::PaymentError;
use crate::store::StoreError;

/// Errors raised while ingesting settlement signals.
///
/// Unmatched or already-terminal entries are not errors; they are logged and
/// acknowledged.
#[derive(Debug, Error)]
pub enum SettlementError {
    /// Webhook failed verification or parsing.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Store failure while applying the event.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SettlementError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Payment(e) => e.error_code(),
            Self::Store(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Payment(e) => e.http_status_code(),
            Self::Store(e) => e.http_status_code(),
        }
    }
}
