//! Compliance domain types: investors, campaigns and regulatory lanes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::compliance::error::ComplianceError;

/// Identity verification status of an investor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KycStatus {
    /// No verification started.
    #[default]
    Unverified,
    /// Verification submitted to the provider.
    Pending,
    /// Identity verified.
    Verified,
}

impl KycStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unverified => "unverified",
            Self::Pending => "pending",
            Self::Verified => "verified",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "unverified" => Some(Self::Unverified),
            "pending" => Some(Self::Pending),
            "verified" => Some(Self::Verified),
            _ => None,
        }
    }
}

impl fmt::Display for KycStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accreditation lifecycle status.
///
/// Ordered: `None < SelfCertified < PendingReview < VerifiedDocs`.
/// Moves are forward-only (see [`crate::compliance::AccreditationService`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccreditationStatus {
    /// Nothing claimed.
    #[default]
    None,
    /// Investor self-certified (honor system).
    SelfCertified,
    /// Documents uploaded, awaiting admin review.
    PendingReview,
    /// Documents verified by an admin.
    VerifiedDocs,
}

impl AccreditationStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::SelfCertified => "SELF_CERTIFIED",
            Self::PendingReview => "PENDING_REVIEW",
            Self::VerifiedDocs => "VERIFIED_DOCS",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "NONE" => Some(Self::None),
            "SELF_CERTIFIED" => Some(Self::SelfCertified),
            "PENDING_REVIEW" => Some(Self::PendingReview),
            "VERIFIED_DOCS" => Some(Self::VerifiedDocs),
            _ => None,
        }
    }

    /// Position in the forward-only lifecycle.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::None => 0,
            Self::SelfCertified => 1,
            Self::PendingReview => 2,
            Self::VerifiedDocs => 3,
        }
    }
}

impl fmt::Display for AccreditationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single eligibility predicate evaluated by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceCheck {
    /// KYC status is `verified`.
    Kyc,
    /// Rolling 12-month investment cap.
    InvestmentLimit,
    /// Account older than 30 days.
    CoolOff,
    /// Self-certified or document-verified accreditation.
    SelfCertified,
    /// Admin-verified accreditation documents.
    VerifiedDocs,
    /// Verified accreditation not expired.
    AccreditationCurrent,
}

impl ComplianceCheck {
    /// Stable identifier of the rule, used in error payloads and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kyc => "KYC",
            Self::InvestmentLimit => "LIMIT_EXCEEDED",
            Self::CoolOff => "COOL_OFF",
            Self::SelfCertified => "NOT_SELF_CERTIFIED",
            Self::VerifiedDocs => "NOT_VERIFIED",
            Self::AccreditationCurrent => "EXPIRED",
        }
    }

    /// Investor-facing reason shown when this check fails.
    #[must_use]
    pub const fn denial_message(self) -> &'static str {
        match self {
            Self::Kyc => "User is not KYC verified",
            Self::InvestmentLimit => {
                "Investment exceeds SEC § 227.100 limits for non-accredited investors"
            }
            Self::CoolOff | Self::SelfCertified => {
                "Reg D 506(b) Requirements Failed: User must be known >30 days and Self-Certified."
            }
            Self::VerifiedDocs => {
                "Reg D 506(c) Requirements Failed: User must be Verified by Admin."
            }
            Self::AccreditationCurrent => {
                "Reg D 506(c) Requirements Failed: Accreditation verification has expired."
            }
        }
    }
}

impl fmt::Display for ComplianceCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Regulatory pathway a campaign raises under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegulationLane {
    /// Regulation Crowdfunding.
    #[serde(rename = "REG_CF")]
    RegCf,
    /// Reg D Rule 506(b), the private lane.
    #[serde(rename = "506_B")]
    RegD506b,
    /// Reg D Rule 506(c), the public lane.
    #[serde(rename = "506_C")]
    RegD506c,
}

impl RegulationLane {
    /// Every lane, in dispatch order.
    pub const ALL: [Self; 3] = [Self::RegCf, Self::RegD506b, Self::RegD506c];

    /// Returns the wire representation of the lane.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RegCf => "REG_CF",
            Self::RegD506b => "506_B",
            Self::RegD506c => "506_C",
        }
    }

    /// Checks required by this lane, evaluated in order.
    #[must_use]
    pub const fn checks(self) -> &'static [ComplianceCheck] {
        match self {
            Self::RegCf => &[ComplianceCheck::Kyc, ComplianceCheck::InvestmentLimit],
            Self::RegD506b => &[ComplianceCheck::CoolOff, ComplianceCheck::SelfCertified],
            Self::RegD506c => &[
                ComplianceCheck::VerifiedDocs,
                ComplianceCheck::AccreditationCurrent,
            ],
        }
    }
}

impl fmt::Display for RegulationLane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegulationLane {
    type Err = ComplianceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|lane| lane.as_str() == s)
            .ok_or_else(|| ComplianceError::UnknownLane(s.to_string()))
    }
}

/// Investor attributes consulted by the rule engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestorProfile {
    /// Investor ID.
    pub id: Uuid,
    /// Contact email, unique per investor.
    pub email: String,
    /// KYC status.
    pub kyc_status: KycStatus,
    /// Accredited-investor flag (lifts the Reg CF cap).
    pub is_accredited: bool,
    /// Declared net worth.
    pub net_worth: Option<Decimal>,
    /// Declared annual income.
    pub annual_income: Option<Decimal>,
    /// Accreditation lifecycle status.
    pub accreditation_status: AccreditationStatus,
    /// When an admin verified the accreditation.
    pub accreditation_verified_at: Option<DateTime<Utc>>,
    /// Admin who verified the accreditation.
    pub accreditation_verified_by: Option<Uuid>,
    /// When the verified accreditation lapses.
    pub accreditation_expiry: Option<DateTime<Utc>>,
    /// Account creation time.
    pub created_at: DateTime<Utc>,
}

/// Funding status of a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FundingStatus {
    /// Accepting investments.
    #[default]
    Active,
    /// Target reached and closed.
    Funded,
    /// Deadline passed without reaching the target.
    Failed,
}

impl FundingStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Funded => "funded",
            Self::Failed => "failed",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "funded" => Some(Self::Funded),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// A capital raise.
///
/// `regulation_type` is kept as the raw stored string; the router resolves it
/// to a [`RegulationLane`] and rejects anything it does not recognize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    /// Campaign ID.
    pub id: Uuid,
    /// Issuer that created the campaign.
    pub issuer_id: Uuid,
    /// Display name.
    pub name: String,
    /// Target raise amount.
    pub target_amount: Decimal,
    /// Funding deadline.
    pub deadline: DateTime<Utc>,
    /// Regulation lane code (`REG_CF`, `506_B`, `506_C`).
    pub regulation_type: String,
    /// Funding status.
    pub funding_status: FundingStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_round_trip() {
        for lane in RegulationLane::ALL {
            assert_eq!(lane.as_str().parse::<RegulationLane>().unwrap(), lane);
        }
    }

    #[test]
    fn test_unknown_lane() {
        let err = "REG_A".parse::<RegulationLane>().unwrap_err();
        assert!(matches!(err, ComplianceError::UnknownLane(ref s) if s == "REG_A"));
        assert!("reg_cf".parse::<RegulationLane>().is_err());
    }

    #[test]
    fn test_lane_serde_codes() {
        let json = serde_json::to_string(&RegulationLane::RegD506b).unwrap();
        assert_eq!(json, "\"506_B\"");
    }

    #[test]
    fn test_accreditation_rank_is_forward_ordered() {
        assert!(AccreditationStatus::None.rank() < AccreditationStatus::SelfCertified.rank());
        assert!(
            AccreditationStatus::SelfCertified.rank() < AccreditationStatus::PendingReview.rank()
        );
        assert!(
            AccreditationStatus::PendingReview.rank() < AccreditationStatus::VerifiedDocs.rank()
        );
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(KycStatus::parse("VERIFIED"), Some(KycStatus::Verified));
        assert_eq!(KycStatus::parse("done"), None);
        assert_eq!(
            AccreditationStatus::parse("verified_docs"),
            Some(AccreditationStatus::VerifiedDocs)
        );
        assert_eq!(FundingStatus::parse("funded"), Some(FundingStatus::Funded));
    }
}
