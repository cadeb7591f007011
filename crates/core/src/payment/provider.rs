//! Payment provider contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::TransactionKind;
use crate::payment::error::PaymentError;

/// Metadata attached to a hold for reconciliation on the provider side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HoldMetadata {
    /// Investor funding the hold.
    pub investor_id: Uuid,
    /// Campaign receiving the funds.
    pub campaign_id: Uuid,
    /// Kind of movement.
    pub transaction_kind: TransactionKind,
}

/// Funds authorized and held, not captured.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentHold {
    /// Provider reference bound to the ledger entry.
    #[serde(rename = "id")]
    pub reference: String,
    /// One-time secret the client uses to complete payment. Never stored.
    pub client_secret: String,
}

/// Result of a refund request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefundOutcome {
    /// Provider refund reference.
    #[serde(rename = "id")]
    pub reference: String,
    /// Provider-reported refund status.
    pub status: String,
}

/// Outbound calls to the payment provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Places a hold of `amount_cents` minor units.
    async fn create_hold(
        &self,
        amount_cents: i64,
        metadata: HoldMetadata,
    ) -> Result<PaymentHold, PaymentError>;

    /// Refunds the payment behind `reference`.
    async fn refund(&self, reference: &str) -> Result<RefundOutcome, PaymentError>;
}
