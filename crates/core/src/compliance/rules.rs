//! Rule engine: stateless eligibility predicates.
//!
//! Every predicate is pure. Time-dependent rules take `now` explicitly so
//! boundaries can be tested exactly.

use chrono::{DateTime, Duration, Months, Utc};
use rust_decimal::Decimal;

use crate::compliance::types::{
    AccreditationStatus, Campaign, ComplianceCheck, InvestorProfile, KycStatus,
};

/// Minimum 12-month cap for non-accredited investors (SEC § 227.100).
pub const REG_CF_CAP_FLOOR: Decimal = Decimal::from_parts(2500, 0, 0, false, 0);

/// Share of the lesser of income and net worth allowed per 12 months.
pub const REG_CF_CAP_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Minimum account age for the 506(b) lane, in days.
pub const COOL_OFF_DAYS: i64 = 30;

/// Cancellation closes this many hours before the campaign deadline.
pub const CANCELLATION_WINDOW_HOURS: i64 = 48;

/// Lookback for the rolling investment sum, in days.
pub const TRAILING_WINDOW_DAYS: i64 = 365;

/// Inputs for evaluating a single [`ComplianceCheck`].
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Investor under evaluation.
    pub investor: &'a InvestorProfile,
    /// Requested amount.
    pub amount: Decimal,
    /// Sum of the investor's counted investments over the trailing window.
    pub trailing_12mo_sum: Decimal,
    /// Evaluation instant.
    pub now: DateTime<Utc>,
}

/// Stateless rule engine.
pub struct RuleEngine;

impl RuleEngine {
    /// True iff KYC status is `verified`.
    #[must_use]
    pub fn check_kyc(investor: &InvestorProfile) -> bool {
        investor.kyc_status == KycStatus::Verified
    }

    /// Reg CF 12-month cap for a non-accredited investor.
    ///
    /// `max(2500, min(income, net_worth) * 0.05)`, with missing values
    /// counted as zero.
    #[must_use]
    pub fn investment_cap(investor: &InvestorProfile) -> Decimal {
        let income = investor.annual_income.unwrap_or(Decimal::ZERO);
        let net_worth = investor.net_worth.unwrap_or(Decimal::ZERO);
        let base = income.min(net_worth);
        (base * REG_CF_CAP_RATE).max(REG_CF_CAP_FLOOR)
    }

    /// Accredited investors always pass; others pass iff
    /// `trailing_12mo_sum + amount <= cap`.
    #[must_use]
    pub fn check_investment_limit(
        investor: &InvestorProfile,
        amount: Decimal,
        trailing_12mo_sum: Decimal,
    ) -> bool {
        if investor.is_accredited {
            return true;
        }
        trailing_12mo_sum + amount <= Self::investment_cap(investor)
    }

    /// Account strictly older than 30 days.
    #[must_use]
    pub fn check_cool_off(investor: &InvestorProfile, now: DateTime<Utc>) -> bool {
        investor.created_at < now - Duration::days(COOL_OFF_DAYS)
    }

    /// Self-certified, or better, verified by documents.
    #[must_use]
    pub fn check_self_certified(investor: &InvestorProfile) -> bool {
        matches!(
            investor.accreditation_status,
            AccreditationStatus::SelfCertified | AccreditationStatus::VerifiedDocs
        )
    }

    /// Reg D 506(b): cool-off elapsed and self-certified.
    #[must_use]
    pub fn check_reg_d_506b(investor: &InvestorProfile, now: DateTime<Utc>) -> bool {
        Self::check_cool_off(investor, now) && Self::check_self_certified(investor)
    }

    /// Accreditation verified by an admin.
    #[must_use]
    pub fn check_verified_docs(investor: &InvestorProfile) -> bool {
        investor.accreditation_status == AccreditationStatus::VerifiedDocs
    }

    /// Verified accreditation has an expiry and it has not passed.
    #[must_use]
    pub fn check_accreditation_current(investor: &InvestorProfile, now: DateTime<Utc>) -> bool {
        investor
            .accreditation_expiry
            .is_some_and(|expiry| expiry >= now)
    }

    /// Reg D 506(c): verified documents that have not expired.
    #[must_use]
    pub fn check_reg_d_506c(investor: &InvestorProfile, now: DateTime<Utc>) -> bool {
        Self::check_verified_docs(investor) && Self::check_accreditation_current(investor, now)
    }

    /// True iff more than 48 hours remain before the deadline.
    #[must_use]
    pub fn check_cancellation_window(deadline: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        deadline - now > Duration::hours(CANCELLATION_WINDOW_HOURS)
    }

    /// True iff one calendar year has passed since the original purchase.
    ///
    /// Uses month arithmetic, so 29 February rolls to 28 February.
    #[must_use]
    pub fn check_lockup_period(original: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        original
            .checked_add_months(Months::new(12))
            .is_some_and(|unlocked_at| now >= unlocked_at)
    }

    /// True iff the pledged total reached the campaign target.
    #[must_use]
    pub fn check_escrow_threshold(campaign: &Campaign, pledged_total: Decimal) -> bool {
        pledged_total >= campaign.target_amount
    }

    /// Start of the rolling window used for the trailing sum.
    #[must_use]
    pub fn trailing_window_start(now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(TRAILING_WINDOW_DAYS)
    }

    /// Evaluates one lane check.
    #[must_use]
    pub fn evaluate(check: ComplianceCheck, ctx: &RuleContext<'_>) -> bool {
        match check {
            ComplianceCheck::Kyc => Self::check_kyc(ctx.investor),
            ComplianceCheck::InvestmentLimit => {
                Self::check_investment_limit(ctx.investor, ctx.amount, ctx.trailing_12mo_sum)
            }
            ComplianceCheck::CoolOff => Self::check_cool_off(ctx.investor, ctx.now),
            ComplianceCheck::SelfCertified => Self::check_self_certified(ctx.investor),
            ComplianceCheck::VerifiedDocs => Self::check_verified_docs(ctx.investor),
            ComplianceCheck::AccreditationCurrent => {
                Self::check_accreditation_current(ctx.investor, ctx.now)
            }
        }
    }
}
