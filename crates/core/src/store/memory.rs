//! In-memory [`ComplianceStore`].
//!
//! Backed by `DashMap`s. Per-investor serialization uses one async mutex per
//! investor, so the trailing-sum read and the ledger insert of concurrent
//! investments never interleave.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use regrouter_shared::types::PageRequest;

use crate::billing::BillingEvent;
use crate::compliance::{Campaign, InvestorProfile};
use crate::ledger::{LedgerEntry, LedgerStatus, TransactionKind};
use crate::store::{ComplianceStore, InvestmentScope, StoreError};

#[derive(Default)]
struct Tables {
    investors: DashMap<Uuid, InvestorProfile>,
    emails: DashMap<String, Uuid>,
    campaigns: DashMap<Uuid, Campaign>,
    entries: DashMap<Uuid, LedgerEntry>,
    billing_events: DashMap<Uuid, BillingEvent>,
    investor_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl Tables {
    fn append_billing_event(&self, event: BillingEvent) -> Result<BillingEvent, StoreError> {
        match self.billing_events.entry(event.id) {
            Entry::Occupied(_) => Err(StoreError::Conflict(format!(
                "billing event {} already recorded",
                event.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(event.clone());
                Ok(event)
            }
        }
    }

    /// Payment references are unique across the ledger.
    fn ensure_reference_unused(&self, entry: &LedgerEntry) -> Result<(), StoreError> {
        let Some(reference) = entry.payment_reference.as_deref() else {
            return Ok(());
        };
        if self
            .entries
            .iter()
            .any(|e| e.payment_reference.as_deref() == Some(reference))
        {
            return Err(StoreError::Conflict(format!(
                "payment reference {reference} already recorded"
            )));
        }
        Ok(())
    }

    fn committed_investment_sum(&self, filter: impl Fn(&LedgerEntry) -> bool) -> Decimal {
        self.entries
            .iter()
            .filter(|e| {
                e.kind == TransactionKind::Investment
                    && LedgerStatus::COMMITTED.contains(&e.status)
                    && filter(e.value())
            })
            .map(|e| e.amount)
            .sum()
    }
}

/// Thread-safe in-memory store. Clones share the same tables.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Tables>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn page_bounds(page: &PageRequest) -> (usize, usize) {
    let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let take = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    (skip, take)
}

struct MemoryScope {
    tables: Arc<Tables>,
    investor: InvestorProfile,
    staged: Vec<LedgerEntry>,
    _guard: OwnedMutexGuard<()>,
}

#[async_trait]
impl InvestmentScope for MemoryScope {
    fn investor(&self) -> &InvestorProfile {
        &self.investor
    }

    async fn trailing_investment_sum(
        &mut self,
        since: DateTime<Utc>,
    ) -> Result<Decimal, StoreError> {
        let investor_id = self.investor.id;
        Ok(self
            .tables
            .committed_investment_sum(|e| e.investor_id == investor_id && e.created_at >= since))
    }

    async fn record_billing_event(
        &mut self,
        event: BillingEvent,
    ) -> Result<BillingEvent, StoreError> {
        self.tables.append_billing_event(event)
    }

    async fn insert_entry(&mut self, entry: LedgerEntry) -> Result<LedgerEntry, StoreError> {
        self.staged.push(entry.clone());
        Ok(entry)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let this = *self;
        for entry in &this.staged {
            this.tables.ensure_reference_unused(entry)?;
        }
        for entry in this.staged {
            this.tables.entries.insert(entry.id, entry);
        }
        Ok(())
    }
}

#[async_trait]
impl ComplianceStore for InMemoryStore {
    async fn insert_investor(
        &self,
        investor: InvestorProfile,
    ) -> Result<InvestorProfile, StoreError> {
        match self.tables.emails.entry(investor.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict(format!(
                "investor with email {} already exists",
                investor.email
            ))),
            Entry::Vacant(slot) => {
                slot.insert(investor.id);
                self.tables.investors.insert(investor.id, investor.clone());
                Ok(investor)
            }
        }
    }

    async fn find_investor(&self, id: Uuid) -> Result<Option<InvestorProfile>, StoreError> {
        Ok(self.tables.investors.get(&id).map(|r| r.clone()))
    }

    async fn update_investor(
        &self,
        investor: &InvestorProfile,
    ) -> Result<Option<InvestorProfile>, StoreError> {
        Ok(self.tables.investors.get_mut(&investor.id).map(|mut stored| {
            stored.kyc_status = investor.kyc_status;
            stored.is_accredited = investor.is_accredited;
            stored.accreditation_status = investor.accreditation_status;
            stored.accreditation_verified_at = investor.accreditation_verified_at;
            stored.accreditation_verified_by = investor.accreditation_verified_by;
            stored.accreditation_expiry = investor.accreditation_expiry;
            stored.clone()
        }))
    }

    async fn insert_campaign(&self, campaign: Campaign) -> Result<Campaign, StoreError> {
        self.tables.campaigns.insert(campaign.id, campaign.clone());
        Ok(campaign)
    }

    async fn find_campaign(&self, id: Uuid) -> Result<Option<Campaign>, StoreError> {
        Ok(self.tables.campaigns.get(&id).map(|r| r.clone()))
    }

    async fn list_campaigns(
        &self,
        page: &PageRequest,
    ) -> Result<(Vec<Campaign>, u64), StoreError> {
        let mut all: Vec<Campaign> = self.tables.campaigns.iter().map(|r| r.clone()).collect();
        all.sort_by_key(|c| (c.created_at, c.id));
        let total = all.len() as u64;
        let (skip, take) = page_bounds(page);
        Ok((all.into_iter().skip(skip).take(take).collect(), total))
    }

    async fn begin_investment(
        &self,
        investor_id: Uuid,
    ) -> Result<Option<Box<dyn InvestmentScope>>, StoreError> {
        let lock = self
            .tables
            .investor_locks
            .entry(investor_id)
            .or_default()
            .clone();
        let guard = lock.lock_owned().await;

        let Some(investor) = self.tables.investors.get(&investor_id).map(|r| r.clone()) else {
            return Ok(None);
        };

        Ok(Some(Box::new(MemoryScope {
            tables: Arc::clone(&self.tables),
            investor,
            staged: Vec::new(),
            _guard: guard,
        })))
    }

    async fn record_billing_event(&self, event: BillingEvent) -> Result<BillingEvent, StoreError> {
        self.tables.append_billing_event(event)
    }

    async fn billing_events_for(&self, investor_id: Uuid) -> Result<Vec<BillingEvent>, StoreError> {
        let mut events: Vec<BillingEvent> = self
            .tables
            .billing_events
            .iter()
            .filter(|e| e.investor_id == investor_id)
            .map(|e| e.clone())
            .collect();
        events.sort_by_key(|e| (e.created_at, e.id));
        Ok(events)
    }

    async fn insert_entry(&self, entry: LedgerEntry) -> Result<LedgerEntry, StoreError> {
        self.tables.entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn find_entry(&self, id: Uuid) -> Result<Option<LedgerEntry>, StoreError> {
        Ok(self.tables.entries.get(&id).map(|r| r.clone()))
    }

    async fn find_entry_by_payment_ref(
        &self,
        reference: &str,
    ) -> Result<Option<LedgerEntry>, StoreError> {
        Ok(self
            .tables
            .entries
            .iter()
            .find(|e| e.payment_reference.as_deref() == Some(reference))
            .map(|e| e.clone()))
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: &[LedgerStatus],
        to: LedgerStatus,
    ) -> Result<Option<LedgerEntry>, StoreError> {
        let Some(mut entry) = self.tables.entries.get_mut(&id) else {
            return Ok(None);
        };
        if !from.contains(&entry.status) {
            return Ok(None);
        }
        entry.status = to;
        Ok(Some(entry.clone()))
    }

    async fn pledged_total(&self, campaign_id: Uuid) -> Result<Decimal, StoreError> {
        Ok(self
            .tables
            .committed_investment_sum(|e| e.campaign_id == campaign_id))
    }

    async fn list_entries(
        &self,
        investor_id: Uuid,
        page: &PageRequest,
    ) -> Result<(Vec<LedgerEntry>, u64), StoreError> {
        let mut entries: Vec<LedgerEntry> = self
            .tables
            .entries
            .iter()
            .filter(|e| e.investor_id == investor_id)
            .map(|e| e.clone())
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = entries.len() as u64;
        let (skip, take) = page_bounds(page);
        Ok((entries.into_iter().skip(skip).take(take).collect(), total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{campaign, investor};
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn entry(investor_id: Uuid, campaign_id: Uuid, amount: Decimal, status: LedgerStatus) -> LedgerEntry {
        LedgerEntry {
            id: Uuid::now_v7(),
            investor_id,
            campaign_id,
            amount,
            kind: TransactionKind::Investment,
            status,
            payment_reference: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = InMemoryStore::new();
        let first = investor(Utc::now());
        let mut second = investor(Utc::now());
        second.email.clone_from(&first.email);

        store.insert_investor(first).await.unwrap();
        let err = store.insert_investor(second).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_transition_is_compare_and_set() {
        let store = InMemoryStore::new();
        let e = entry(Uuid::new_v4(), Uuid::new_v4(), dec!(10), LedgerStatus::PendingPayment);
        store.insert_entry(e.clone()).await.unwrap();

        let moved = store
            .transition_status(e.id, &[LedgerStatus::PendingPayment], LedgerStatus::Settled)
            .await
            .unwrap();
        assert_eq!(moved.unwrap().status, LedgerStatus::Settled);

        let again = store
            .transition_status(e.id, &[LedgerStatus::PendingPayment], LedgerStatus::Failed)
            .await
            .unwrap();
        assert!(again.is_none());
        assert_eq!(
            store.find_entry(e.id).await.unwrap().unwrap().status,
            LedgerStatus::Settled
        );
    }

    #[tokio::test]
    async fn test_trailing_sum_counts_committed_investments_in_window() {
        let store = InMemoryStore::new();
        let inv = investor(Utc::now());
        store.insert_investor(inv.clone()).await.unwrap();
        let c = Uuid::new_v4();

        store
            .insert_entry(entry(inv.id, c, dec!(100), LedgerStatus::PendingPayment))
            .await
            .unwrap();
        store
            .insert_entry(entry(inv.id, c, dec!(200), LedgerStatus::Settled))
            .await
            .unwrap();
        store
            .insert_entry(entry(inv.id, c, dec!(400), LedgerStatus::Cancelled))
            .await
            .unwrap();
        let mut old = entry(inv.id, c, dec!(800), LedgerStatus::Settled);
        old.created_at = Utc::now() - Duration::days(400);
        store.insert_entry(old).await.unwrap();
        let mut trade = entry(inv.id, c, dec!(1600), LedgerStatus::Settled);
        trade.kind = TransactionKind::Trade;
        store.insert_entry(trade).await.unwrap();

        let mut scope = store.begin_investment(inv.id).await.unwrap().unwrap();
        let sum = scope
            .trailing_investment_sum(Utc::now() - Duration::days(365))
            .await
            .unwrap();
        assert_eq!(sum, dec!(300));
    }

    #[tokio::test]
    async fn test_scope_drop_discards_staged_entry() {
        let store = InMemoryStore::new();
        let inv = investor(Utc::now());
        store.insert_investor(inv.clone()).await.unwrap();
        let e = entry(inv.id, Uuid::new_v4(), dec!(5), LedgerStatus::PendingPayment);

        {
            let mut scope = store.begin_investment(inv.id).await.unwrap().unwrap();
            scope.insert_entry(e.clone()).await.unwrap();
        }
        assert!(store.find_entry(e.id).await.unwrap().is_none());

        let mut scope = store.begin_investment(inv.id).await.unwrap().unwrap();
        scope.insert_entry(e.clone()).await.unwrap();
        scope.commit().await.unwrap();
        assert!(store.find_entry(e.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_scope_billing_event_survives_dropped_scope() {
        let store = InMemoryStore::new();
        let inv = investor(Utc::now());
        store.insert_investor(inv.clone()).await.unwrap();
        let event = BillingEvent {
            id: Uuid::now_v7(),
            investor_id: inv.id,
            reference: "val_scope".to_string(),
            description: "Validation Check: REG_CF".to_string(),
            fee_amount: dec!(2.00),
            created_at: Utc::now(),
        };

        {
            let mut scope = store.begin_investment(inv.id).await.unwrap().unwrap();
            scope.record_billing_event(event.clone()).await.unwrap();
        }

        assert_eq!(store.billing_events_for(inv.id).await.unwrap(), vec![event]);
    }

    #[tokio::test]
    async fn test_begin_investment_unknown_investor() {
        let store = InMemoryStore::new();
        assert!(store.begin_investment(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_pledged_total_and_listing() {
        let store = InMemoryStore::new();
        let c = campaign("REG_CF", Utc::now() + Duration::days(30));
        store.insert_campaign(c.clone()).await.unwrap();
        let investor_id = Uuid::new_v4();
        for amount in [dec!(100), dec!(250.50)] {
            store
                .insert_entry(entry(investor_id, c.id, amount, LedgerStatus::PendingPayment))
                .await
                .unwrap();
        }
        store
            .insert_entry(entry(investor_id, c.id, dec!(999), LedgerStatus::Failed))
            .await
            .unwrap();

        assert_eq!(store.pledged_total(c.id).await.unwrap(), dec!(350.50));

        let page = PageRequest {
            page: 1,
            per_page: 2,
        };
        let (entries, total) = store.list_entries(investor_id, &page).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(entries.len(), 2);
    }
}
