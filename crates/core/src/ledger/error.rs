//! Ledger error types for ownership, window and state errors.

use thiserror::Error;
use uuid::Uuid;

use crate::ledger::types::{LedgerStatus, TransactionKind};

/// Errors that can occur during ledger operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Caller does not own the entry.
    #[error("Not authorized")]
    Unauthorized {
        /// Entry owner.
        owner: Uuid,
        /// Caller.
        requester: Uuid,
    },

    /// Only investments can be cancelled.
    #[error("Only investments can be cancelled, entry is a {0}")]
    NotCancellable(TransactionKind),

    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: LedgerStatus,
        /// The attempted target status.
        to: LedgerStatus,
    },

    /// Cancellation requested within 48 hours of the deadline.
    #[error("Cancellation window closed (within 48 hours of deadline)")]
    WindowClosed,

    /// Trade attempted before the 1-year lockup elapsed.
    #[error("Asset is under 1-year lockup period (SEC Rule 501)")]
    LockupActive,
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "UNAUTHORIZED",
            Self::NotCancellable(_) => "NOT_CANCELLABLE",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::WindowClosed => "WINDOW_CLOSED",
            Self::LockupActive => "LOCKUP_ACTIVE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Unauthorized { .. } | Self::WindowClosed | Self::LockupActive => 403,
            Self::NotCancellable(_) | Self::InvalidTransition { .. } => 409,
        }
    }
}
