//! Persistence port.
//!
//! The core never talks to a database directly. Services depend on
//! [`ComplianceStore`]; `regrouter-db` implements it for Postgres and
//! [`InMemoryStore`] implements it for tests and local runs.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use regrouter_shared::types::PageRequest;

use crate::billing::BillingEvent;
use crate::compliance::{Campaign, InvestorProfile};
use crate::ledger::{LedgerEntry, LedgerStatus};

pub use memory::InMemoryStore;

/// Errors raised by a store implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Unique constraint violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Stored row could not be mapped to a domain value.
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// Underlying database failure.
    #[error("Database error: {0}")]
    Database(String),
}

impl StoreError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Conflict(_) => "CONFLICT",
            Self::Corrupt(_) => "CORRUPT_RECORD",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Conflict(_) => 409,
            Self::Corrupt(_) | Self::Database(_) => 500,
        }
    }
}

/// Unit of work for one investment, serialized per investor.
///
/// Holding a scope excludes every other scope for the same investor until it
/// is committed or dropped. Dropping without [`InvestmentScope::commit`]
/// discards the staged ledger entry.
#[async_trait]
pub trait InvestmentScope: Send {
    /// Investor as read under the lock.
    fn investor(&self) -> &InvestorProfile;

    /// Sum of the investor's investment entries counted toward the cap
    /// (`pending_payment`, `pending_settlement`, `settled`) created at or
    /// after `since`.
    async fn trailing_investment_sum(&mut self, since: DateTime<Utc>)
    -> Result<Decimal, StoreError>;

    /// Appends the billing event and makes it durable at once, independent
    /// of [`InvestmentScope::commit`]. At most once per scope.
    async fn record_billing_event(&mut self, event: BillingEvent)
    -> Result<BillingEvent, StoreError>;

    /// Stages a ledger entry.
    async fn insert_entry(&mut self, entry: LedgerEntry) -> Result<LedgerEntry, StoreError>;

    /// Makes the staged writes durable and releases the lock.
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

/// Persistence for investors, campaigns, ledger entries and billing events.
#[async_trait]
pub trait ComplianceStore: Send + Sync {
    /// Inserts an investor. Duplicate email is a conflict.
    async fn insert_investor(&self, investor: InvestorProfile)
    -> Result<InvestorProfile, StoreError>;

    /// Finds an investor by ID.
    async fn find_investor(&self, id: Uuid) -> Result<Option<InvestorProfile>, StoreError>;

    /// Saves KYC and accreditation fields of an existing investor.
    async fn update_investor(
        &self,
        investor: &InvestorProfile,
    ) -> Result<Option<InvestorProfile>, StoreError>;

    /// Inserts a campaign.
    async fn insert_campaign(&self, campaign: Campaign) -> Result<Campaign, StoreError>;

    /// Finds a campaign by ID.
    async fn find_campaign(&self, id: Uuid) -> Result<Option<Campaign>, StoreError>;

    /// Lists campaigns, oldest first, with the total count.
    async fn list_campaigns(&self, page: &PageRequest) -> Result<(Vec<Campaign>, u64), StoreError>;

    /// Opens a serialized investment scope. `None` if the investor does not exist.
    async fn begin_investment(
        &self,
        investor_id: Uuid,
    ) -> Result<Option<Box<dyn InvestmentScope>>, StoreError>;

    /// Appends a billing event in its own durable write.
    async fn record_billing_event(&self, event: BillingEvent) -> Result<BillingEvent, StoreError>;

    /// Billing events of an investor, oldest first.
    async fn billing_events_for(&self, investor_id: Uuid) -> Result<Vec<BillingEvent>, StoreError>;

    /// Inserts a ledger entry outside any investment scope.
    async fn insert_entry(&self, entry: LedgerEntry) -> Result<LedgerEntry, StoreError>;

    /// Finds a ledger entry by ID.
    async fn find_entry(&self, id: Uuid) -> Result<Option<LedgerEntry>, StoreError>;

    /// Finds the ledger entry bound to a provider payment reference.
    async fn find_entry_by_payment_ref(
        &self,
        reference: &str,
    ) -> Result<Option<LedgerEntry>, StoreError>;

    /// Sets `to` only if the current status is one of `from`.
    ///
    /// Returns the updated entry, or `None` if the entry is missing or its
    /// status did not match.
    async fn transition_status(
        &self,
        id: Uuid,
        from: &[LedgerStatus],
        to: LedgerStatus,
    ) -> Result<Option<LedgerEntry>, StoreError>;

    /// Sum of investment entries in a committed status for a campaign.
    async fn pledged_total(&self, campaign_id: Uuid) -> Result<Decimal, StoreError>;

    /// Lists an investor's entries, newest first, with the total count.
    async fn list_entries(
        &self,
        investor_id: Uuid,
        page: &PageRequest,
    ) -> Result<(Vec<LedgerEntry>, u64), StoreError>;
}
