//! Payment provider error types.

use thiserror::Error;

/// Errors from the payment provider or its webhooks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// Provider rejected the call or could not be reached.
    #[error("Stripe Error: {0}")]
    Provider(String),

    /// Provider call exceeded its time budget.
    #[error("Payment provider timed out")]
    Timeout,

    /// Webhook signature missing, stale or wrong.
    #[error("Invalid Stripe Signature")]
    InvalidSignature,

    /// Webhook payload or provider response could not be read.
    #[error("Malformed provider payload: {0}")]
    Malformed(String),
}

impl PaymentError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Provider(_) => "PAYMENT_PROVIDER_ERROR",
            Self::Timeout => "PAYMENT_PROVIDER_TIMEOUT",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::Malformed(_) => "MALFORMED_PAYLOAD",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Provider(_) | Self::Timeout => 502,
            Self::InvalidSignature | Self::Malformed(_) => 400,
        }
    }
}
