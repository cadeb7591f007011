//! Core business logic for Reg-Router.
//!
//! This crate contains the compliance and ledger logic with ZERO web or
//! database dependencies. Persistence is reached through the
//! [`store::ComplianceStore`] port.
//!
//! # Modules
//!
//! - `compliance` - Rule engine, lane router and accreditation lifecycle
//! - `ledger` - Ledger entry state machine
//! - `billing` - Validation fee records
//! - `payment` - Payment provider contract, Stripe client and webhooks
//! - `settlement` - Webhook and delayed settlement reconciliation
//! - `investment` - Invest, cancel and trade orchestration
//! - `investor` - Investor profiles and accreditation
//! - `campaign` - Campaign management
//! - `store` - Persistence port and in-memory implementation

pub mod billing;
pub mod campaign;
pub mod compliance;
pub mod investment;
pub mod investor;
pub mod ledger;
pub mod payment;
pub mod settlement;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, Utc};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::compliance::{
        AccreditationStatus, Campaign, FundingStatus, InvestorProfile, KycStatus,
    };

    /// KYC-verified, non-accredited investor with $50,000 income and net worth.
    pub fn investor(created_at: DateTime<Utc>) -> InvestorProfile {
        let id = Uuid::new_v4();
        InvestorProfile {
            id,
            email: format!("{}@example.com", id.simple()),
            kyc_status: KycStatus::Verified,
            is_accredited: false,
            net_worth: Some(dec!(50000)),
            annual_income: Some(dec!(50000)),
            accreditation_status: AccreditationStatus::None,
            accreditation_verified_at: None,
            accreditation_verified_by: None,
            accreditation_expiry: None,
            created_at,
        }
    }

    /// Active campaign with a $10,000 target.
    pub fn campaign(regulation: &str, deadline: DateTime<Utc>) -> Campaign {
        Campaign {
            id: Uuid::new_v4(),
            issuer_id: Uuid::new_v4(),
            name: "Test Campaign".to_string(),
            target_amount: dec!(10000),
            deadline,
            regulation_type: regulation.to_string(),
            funding_status: FundingStatus::Active,
            created_at: deadline - chrono::Duration::days(60),
        }
    }
}
