//! Investment orchestration errors.

use thiserror::Error;

use crate::compliance::ComplianceError;
use crate::ledger::LedgerError;
use crate::payment::PaymentError;
use crate::store::StoreError;

/// Errors raised while investing, cancelling or trading.
#[derive(Debug, Error)]
pub enum InvestmentError {
    /// Investor, campaign or ledger entry missing.
    #[error("{0}")]
    NotFound(String),

    /// Amount not positive or not representable in cents.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Compliance denial or unknown lane.
    #[error(transparent)]
    Compliance(#[from] ComplianceError),

    /// Ownership, window, lockup or transition failure.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Hold creation failed; the billing event stays.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Refund during cancellation failed.
    #[error("Stripe Refund Failed: {0}")]
    Refund(PaymentError),

    /// Persistence failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl InvestmentError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::Compliance(e) => e.error_code(),
            Self::Ledger(e) => e.error_code(),
            Self::Payment(e) => e.error_code(),
            Self::Refund(_) => "REFUND_FAILED",
            Self::Store(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::InvalidAmount(_) => 400,
            Self::Compliance(e) => e.http_status_code(),
            Self::Ledger(e) => e.http_status_code(),
            Self::Payment(e) | Self::Refund(e) => e.http_status_code(),
            Self::Store(e) => e.http_status_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refund_message_wraps_provider_message() {
        let err = InvestmentError::Refund(PaymentError::Provider("charge already refunded".into()));
        assert_eq!(
            err.to_string(),
            "Stripe Refund Failed: Stripe Error: charge already refunded"
        );
        assert_eq!(err.error_code(), "REFUND_FAILED");
        assert_eq!(err.http_status_code(), 502);
    }

    #[test]
    fn test_delegated_codes() {
        let err: InvestmentError = LedgerError::WindowClosed.into();
        assert_eq!(err.error_code(), "WINDOW_CLOSED");
        assert_eq!(err.http_status_code(), 403);

        let err = InvestmentError::NotFound("Campaign not found".into());
        assert_eq!(err.to_string(), "Campaign not found");
        assert_eq!(err.http_status_code(), 404);
    }
}
