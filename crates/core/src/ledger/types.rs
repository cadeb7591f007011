//! Ledger domain types.
//!
//! Valid status transitions:
//! - `pending_payment` → `settled` | `failed` | `cancelled`
//! - `pending_settlement` → `settled` | `failed` | `cancelled`
//!
//! `settled`, `failed` and `cancelled` are terminal. Nothing re-enters
//! `pending_payment`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Status of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerStatus {
    /// Hold created, waiting for the provider to confirm.
    PendingPayment,
    /// Funds moving, waiting for settlement.
    PendingSettlement,
    /// Funds settled (terminal).
    Settled,
    /// Payment failed (terminal).
    Failed,
    /// Cancelled by the investor (terminal).
    Cancelled,
}

impl LedgerStatus {
    /// Statuses that may still change.
    pub const NON_TERMINAL: [Self; 2] = [Self::PendingPayment, Self::PendingSettlement];

    /// Statuses counted toward investment caps and pledged totals.
    pub const COMMITTED: [Self; 3] = [Self::PendingPayment, Self::PendingSettlement, Self::Settled];

    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingPayment => "pending_payment",
            Self::PendingSettlement => "pending_settlement",
            Self::Settled => "settled",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending_payment" => Some(Self::PendingPayment),
            "pending_settlement" => Some(Self::PendingSettlement),
            "settled" => Some(Self::Settled),
            "failed" => Some(Self::Failed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if no further transition is allowed.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Settled | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for LedgerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of money movement recorded by an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Primary investment into a campaign.
    Investment,
    /// Secondary market trade.
    Trade,
    /// Payout to an investor.
    Payout,
    /// Refund to an investor.
    Refund,
}

impl TransactionKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Investment => "investment",
            Self::Trade => "trade",
            Self::Payout => "payout",
            Self::Refund => "refund",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "investment" => Some(Self::Investment),
            "trade" => Some(Self::Trade),
            "payout" => Some(Self::Payout),
            "refund" => Some(Self::Refund),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome reported by the payment provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementOutcome {
    /// Payment cleared.
    Succeeded,
    /// Payment failed.
    Failed,
}

impl SettlementOutcome {
    /// Terminal status this outcome settles an entry into.
    #[must_use]
    pub const fn target_status(self) -> LedgerStatus {
        match self {
            Self::Succeeded => LedgerStatus::Settled,
            Self::Failed => LedgerStatus::Failed,
        }
    }
}

/// A recorded money movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Entry ID.
    pub id: Uuid,
    /// Owning investor.
    pub investor_id: Uuid,
    /// Campaign the money relates to.
    pub campaign_id: Uuid,
    /// Amount in major units.
    pub amount: Decimal,
    /// Kind of movement.
    pub kind: TransactionKind,
    /// Current status.
    pub status: LedgerStatus,
    /// Provider payment reference, if a hold was created.
    pub payment_reference: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Secondary-market trade request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRequest {
    /// Campaign whose interest is traded.
    pub campaign_id: Uuid,
    /// Trade amount.
    pub amount: Decimal,
    /// Purchase date of the interest being sold.
    pub original_transaction_date: DateTime<Utc>,
    /// Status recorded as-is on the new entry.
    pub status: LedgerStatus,
}
