//! Billing event construction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::compliance::Authorization;

/// Immutable record of a charged validation fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingEvent {
    /// Event ID.
    pub id: Uuid,
    /// Billed investor.
    pub investor_id: Uuid,
    /// Reference of the check, `val_{investor}_{campaign}_{unix}`.
    pub reference: String,
    /// What was checked, e.g. `Validation Check: 506_C`.
    pub description: String,
    /// Fee charged.
    pub fee_amount: Decimal,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Stateless billing recorder.
pub struct BillingService;

impl BillingService {
    /// Builds the billing event for an authorization.
    #[must_use]
    pub fn charge(authorization: &Authorization, fee: Decimal, now: DateTime<Utc>) -> BillingEvent {
        BillingEvent {
            id: Uuid::now_v7(),
            investor_id: authorization.investor_id(),
            reference: format!(
                "val_{}_{}_{}",
                authorization.investor_id(),
                authorization.campaign_id(),
                now.timestamp()
            ),
            description: authorization.description().to_string(),
            fee_amount: fee,
            created_at: now,
        }
    }
}
