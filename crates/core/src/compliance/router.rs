//! Compliance router: resolves the lane and runs its checks.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::compliance::error::ComplianceError;
use crate::compliance::rules::{RuleContext, RuleEngine};
use crate::compliance::types::{InvestorProfile, RegulationLane};

/// Inputs for an authorization decision.
#[derive(Debug, Clone, Copy)]
pub struct ComplianceRequest<'a> {
    /// Raw regulation type of the campaign.
    pub regulation: &'a str,
    /// Investor requesting the investment.
    pub investor: &'a InvestorProfile,
    /// Target campaign.
    pub campaign_id: Uuid,
    /// Requested amount.
    pub amount: Decimal,
    /// Trailing 12-month sum, computed by the caller under the investor lock.
    pub trailing_12mo_sum: Decimal,
}

/// Proof that an investment passed its lane checks.
///
/// Only [`ComplianceRouter::authorize`] constructs this, so holding one is
/// the precondition for opening an investment ledger entry and billing the
/// validation fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Authorization {
    lane: RegulationLane,
    investor_id: Uuid,
    campaign_id: Uuid,
    amount: Decimal,
    description: String,
    authorized_at: DateTime<Utc>,
}

impl Authorization {
    /// Lane the investment was authorized under.
    #[must_use]
    pub const fn lane(&self) -> RegulationLane {
        self.lane
    }

    /// Authorized investor.
    #[must_use]
    pub const fn investor_id(&self) -> Uuid {
        self.investor_id
    }

    /// Authorized campaign.
    #[must_use]
    pub const fn campaign_id(&self) -> Uuid {
        self.campaign_id
    }

    /// Authorized amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// Description of the check performed, used for billing.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// When the decision was made.
    #[must_use]
    pub const fn authorized_at(&self) -> DateTime<Utc> {
        self.authorized_at
    }
}

/// Stateless lane dispatcher.
pub struct ComplianceRouter;

impl ComplianceRouter {
    /// Authorizes an investment or returns the first failing rule.
    ///
    /// Checks run in the lane's order and stop at the first failure.
    pub fn authorize(
        request: &ComplianceRequest<'_>,
        now: DateTime<Utc>,
    ) -> Result<Authorization, ComplianceError> {
        let lane: RegulationLane = request.regulation.parse()?;
        let ctx = RuleContext {
            investor: request.investor,
            amount: request.amount,
            trailing_12mo_sum: request.trailing_12mo_sum,
            now,
        };

        if let Some(rule) = lane
            .checks()
            .iter()
            .copied()
            .find(|check| !RuleEngine::evaluate(*check, &ctx))
        {
            tracing::info!(
                investor_id = %request.investor.id,
                campaign_id = %request.campaign_id,
                lane = %lane,
                rule = %rule,
                "compliance denied"
            );
            return Err(ComplianceError::Denied { lane, rule });
        }

        Ok(Authorization {
            lane,
            investor_id: request.investor.id,
            campaign_id: request.campaign_id,
            amount: request.amount,
            description: format!("Validation Check: {lane}"),
            authorized_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::types::{AccreditationStatus, ComplianceCheck, KycStatus};
    use crate::test_support::investor;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn request<'a>(
        regulation: &'a str,
        inv: &'a InvestorProfile,
        amount: Decimal,
    ) -> ComplianceRequest<'a> {
        ComplianceRequest {
            regulation,
            investor: inv,
            campaign_id: Uuid::nil(),
            amount,
            trailing_12mo_sum: Decimal::ZERO,
        }
    }

    #[test]
    fn test_reg_cf_limit_exceeded() {
        let inv = investor(now());
        let err = ComplianceRouter::authorize(&request("REG_CF", &inv, dec!(3000)), now())
            .unwrap_err();
        assert_eq!(
            err,
            ComplianceError::Denied {
                lane: RegulationLane::RegCf,
                rule: ComplianceCheck::InvestmentLimit,
            }
        );
    }

    #[test]
    fn test_reg_cf_passes_with_description() {
        let inv = investor(now());
        let auth =
            ComplianceRouter::authorize(&request("REG_CF", &inv, dec!(1000)), now()).unwrap();
        assert_eq!(auth.lane(), RegulationLane::RegCf);
        assert_eq!(auth.description(), "Validation Check: REG_CF");
        assert_eq!(auth.amount(), dec!(1000));
        assert_eq!(auth.investor_id(), inv.id);
        assert_eq!(auth.authorized_at(), now());
    }

    #[test]
    fn test_reg_cf_short_circuits_on_kyc() {
        let mut inv = investor(now());
        inv.kyc_status = KycStatus::Pending;
        // Would also fail the limit, but KYC is reported first.
        let err = ComplianceRouter::authorize(&request("REG_CF", &inv, dec!(100000)), now())
            .unwrap_err();
        assert!(matches!(
            err,
            ComplianceError::Denied {
                rule: ComplianceCheck::Kyc,
                ..
            }
        ));
    }

    #[test]
    fn test_506b_ignores_kyc_and_limit() {
        let mut inv = investor(now() - Duration::days(45));
        inv.kyc_status = KycStatus::Unverified;
        inv.accreditation_status = AccreditationStatus::SelfCertified;
        let auth =
            ComplianceRouter::authorize(&request("506_B", &inv, dec!(1000000)), now()).unwrap();
        assert_eq!(auth.description(), "Validation Check: 506_B");
    }

    #[test]
    fn test_506b_cool_off_reported_first() {
        let inv = investor(now());
        let err =
            ComplianceRouter::authorize(&request("506_B", &inv, dec!(10)), now()).unwrap_err();
        assert!(matches!(
            err,
            ComplianceError::Denied {
                lane: RegulationLane::RegD506b,
                rule: ComplianceCheck::CoolOff,
            }
        ));
    }

    #[test]
    fn test_506c_requires_admin_verification() {
        let inv = investor(now());
        let err =
            ComplianceRouter::authorize(&request("506_C", &inv, dec!(10)), now()).unwrap_err();
        assert!(err.to_string().contains("Verified by Admin"));
    }

    #[test]
    fn test_506c_expired() {
        let mut inv = investor(now());
        inv.accreditation_status = AccreditationStatus::VerifiedDocs;
        inv.accreditation_verified_at = Some(now() - Duration::days(91));
        inv.accreditation_expiry = Some(now() - Duration::days(1));
        let err =
            ComplianceRouter::authorize(&request("506_C", &inv, dec!(10)), now()).unwrap_err();
        assert!(matches!(
            err,
            ComplianceError::Denied {
                rule: ComplianceCheck::AccreditationCurrent,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_lane() {
        let inv = investor(now());
        let err =
            ComplianceRouter::authorize(&request("REG_A_PLUS", &inv, dec!(10)), now()).unwrap_err();
        assert_eq!(err, ComplianceError::UnknownLane("REG_A_PLUS".into()));
    }
}
