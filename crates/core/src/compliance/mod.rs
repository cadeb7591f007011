//! Compliance routing.
//!
//! # Modules
//!
//! - `types` - Investor, campaign and lane types
//! - `rules` - Stateless eligibility predicates
//! - `router` - Lane dispatch producing an [`Authorization`]
//! - `accreditation` - Forward-only accreditation lifecycle
//! - `error` - Compliance and accreditation errors

pub mod accreditation;
pub mod error;
pub mod router;
pub mod rules;
pub mod types;

#[cfg(test)]
mod rules_props;

pub use accreditation::{ACCEPTED_DOCUMENT_TYPE, AccreditationGrant, AccreditationService};
pub use error::{AccreditationError, ComplianceError};
pub use router::{Authorization, ComplianceRequest, ComplianceRouter};
pub use rules::{RuleContext, RuleEngine};
pub use types::{
    AccreditationStatus, Campaign, ComplianceCheck, FundingStatus, InvestorProfile, KycStatus,
    RegulationLane,
};
