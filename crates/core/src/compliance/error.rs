//! Compliance error types.
//!
//! Denials are terminal for the request and carry the lane and the rule
//! that failed.

use thiserror::Error;

use crate::compliance::types::{AccreditationStatus, ComplianceCheck, RegulationLane};

/// Errors raised by the compliance router.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComplianceError {
    /// A lane rule failed.
    #[error("{}", rule.denial_message())]
    Denied {
        /// Lane that was evaluated.
        lane: RegulationLane,
        /// First rule that failed.
        rule: ComplianceCheck,
    },

    /// Campaign regulation type is not a known lane.
    #[error("Unknown Regulation Type: {0}")]
    UnknownLane(String),
}

impl ComplianceError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Denied { .. } => "COMPLIANCE_DENIED",
            Self::UnknownLane(_) => "UNKNOWN_LANE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Denied { .. } => 403,
            Self::UnknownLane(_) => 400,
        }
    }
}

/// Errors raised by accreditation lifecycle changes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccreditationError {
    /// Attempted to move the status backwards.
    #[error("Accreditation cannot move from {from} back to {to}")]
    BackwardTransition {
        /// Current status.
        from: AccreditationStatus,
        /// Requested status.
        to: AccreditationStatus,
    },

    /// Uploaded proof is not a PDF.
    #[error("Only PDF files are accepted.")]
    InvalidDocument,

    /// Verification window would end before it starts.
    #[error("Accreditation validity must not be negative")]
    InvalidValidity,
}

impl AccreditationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BackwardTransition { .. } => "ACCREDITATION_BACKWARD_TRANSITION",
            Self::InvalidDocument => "INVALID_DOCUMENT",
            Self::InvalidValidity => "INVALID_VALIDITY",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::BackwardTransition { .. } => 409,
            Self::InvalidDocument => 400,
            Self::InvalidValidity => 500,
        }
    }
}
