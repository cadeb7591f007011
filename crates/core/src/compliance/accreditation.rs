//! Accreditation lifecycle.
//!
//! Status moves forward only:
//! `NONE → SELF_CERTIFIED → PENDING_REVIEW → VERIFIED_DOCS`.
//! Repeating the current step is allowed; admin verification of an already
//! verified investor renews the expiry.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::compliance::error::AccreditationError;
use crate::compliance::types::{AccreditationStatus, InvestorProfile};

/// Only this content type is accepted as accreditation proof.
pub const ACCEPTED_DOCUMENT_TYPE: &str = "application/pdf";

/// Result of an admin verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccreditationGrant {
    /// Admin who verified.
    pub verified_by: Uuid,
    /// Verification time.
    pub verified_at: DateTime<Utc>,
    /// End of validity, never before `verified_at`.
    pub expiry: DateTime<Utc>,
}

/// Stateless accreditation transitions.
pub struct AccreditationService;

impl AccreditationService {
    /// Validates a move from `from` to `to`.
    pub fn transition(
        from: AccreditationStatus,
        to: AccreditationStatus,
    ) -> Result<AccreditationStatus, AccreditationError> {
        if to.rank() < from.rank() {
            return Err(AccreditationError::BackwardTransition { from, to });
        }
        Ok(to)
    }

    /// Investor claims accredited status on the honor system.
    pub fn self_certify(investor: &mut InvestorProfile) -> Result<(), AccreditationError> {
        investor.accreditation_status = Self::transition(
            investor.accreditation_status,
            AccreditationStatus::SelfCertified,
        )?;
        Ok(())
    }

    /// Investor uploaded proof; it waits for admin review.
    ///
    /// The document content is not retained, only its type is checked.
    pub fn submit_documents(
        investor: &mut InvestorProfile,
        content_type: &str,
    ) -> Result<(), AccreditationError> {
        if content_type != ACCEPTED_DOCUMENT_TYPE {
            return Err(AccreditationError::InvalidDocument);
        }
        investor.accreditation_status = Self::transition(
            investor.accreditation_status,
            AccreditationStatus::PendingReview,
        )?;
        Ok(())
    }

    /// Admin verifies the investor's documents.
    pub fn verify(
        investor: &mut InvestorProfile,
        verified_by: Uuid,
        now: DateTime<Utc>,
        validity: Duration,
    ) -> Result<AccreditationGrant, AccreditationError> {
        if validity < Duration::zero() {
            return Err(AccreditationError::InvalidValidity);
        }
        investor.accreditation_status = Self::transition(
            investor.accreditation_status,
            AccreditationStatus::VerifiedDocs,
        )?;

        let grant = AccreditationGrant {
            verified_by,
            verified_at: now,
            expiry: now + validity,
        };
        investor.accreditation_verified_by = Some(grant.verified_by);
        investor.accreditation_verified_at = Some(grant.verified_at);
        investor.accreditation_expiry = Some(grant.expiry);
        Ok(grant)
    }
}
