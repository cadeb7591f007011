//! Postgres implementation of the core persistence port.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, Set, SqlErr, TransactionTrait};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use uuid::Uuid;

use regrouter_core::billing::BillingEvent;
use regrouter_core::compliance::{
    AccreditationStatus, Campaign, FundingStatus, InvestorProfile, KycStatus,
};
use regrouter_core::ledger::{LedgerEntry, LedgerStatus, TransactionKind};
use regrouter_core::store::{ComplianceStore, InvestmentScope, StoreError};
use regrouter_shared::types::PageRequest;

use crate::entities::{billing_events, campaigns, investors, ledger_entries};
use crate::lock::InvestorLock;
use crate::repositories::{
    BillingRepository, CampaignRepository, InvestorRepository, LedgerRepository,
};

/// [`ComplianceStore`] backed by Postgres through `SeaORM`.
///
/// An open investment scope pins two pool connections: the billing
/// transaction and the locked investment transaction. Scopes are admitted
/// through a semaphore sized to half the pool, so every admitted scope
/// already owns both connections before it waits on the advisory lock.
#[derive(Debug, Clone)]
pub struct PgComplianceStore {
    db: DatabaseConnection,
    investors: InvestorRepository,
    campaigns: CampaignRepository,
    ledger: LedgerRepository,
    billing: BillingRepository,
    scope_permits: Arc<Semaphore>,
}

impl PgComplianceStore {
    /// Creates the store over a pool of `max_connections` connections.
    ///
    /// The pool needs at least two connections for an investment to run.
    #[must_use]
    pub fn new(db: DatabaseConnection, max_connections: u32) -> Self {
        let scopes = usize::try_from(max_connections / 2).unwrap_or(usize::MAX).max(1);
        Self {
            investors: InvestorRepository::new(db.clone()),
            campaigns: CampaignRepository::new(db.clone()),
            ledger: LedgerRepository::new(db.clone()),
            billing: BillingRepository::new(db.clone()),
            scope_permits: Arc::new(Semaphore::new(scopes)),
            db,
        }
    }
}

/// Investment unit of work: one transaction under the investor's advisory
/// lock, plus a second transaction reserved for the billing event. Dropping
/// it rolls back whatever was not committed.
struct PgInvestmentScope {
    lock: InvestorLock,
    billing: Option<DatabaseTransaction>,
    investor: InvestorProfile,
    _permit: OwnedSemaphorePermit,
}

#[async_trait]
impl InvestmentScope for PgInvestmentScope {
    fn investor(&self) -> &InvestorProfile {
        &self.investor
    }

    async fn trailing_investment_sum(
        &mut self,
        since: DateTime<Utc>,
    ) -> Result<Decimal, StoreError> {
        LedgerRepository::trailing_investment_sum(self.lock.transaction(), self.investor.id, since)
            .await
            .map_err(store_err)
    }

    async fn record_billing_event(
        &mut self,
        event: BillingEvent,
    ) -> Result<BillingEvent, StoreError> {
        let txn = self.billing.take().ok_or_else(|| {
            StoreError::Conflict("billing event already recorded in this scope".to_string())
        })?;
        let model = BillingRepository::append_with(&txn, billing_active_model(event))
            .await
            .map_err(store_err)?;
        txn.commit().await.map_err(store_err)?;
        Ok(billing_from_model(model))
    }

    async fn insert_entry(&mut self, entry: LedgerEntry) -> Result<LedgerEntry, StoreError> {
        let model = LedgerRepository::insert_with(self.lock.transaction(), entry_active_model(&entry))
            .await
            .map_err(store_err)?;
        entry_from_model(model)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.lock.commit().await.map_err(store_err)
    }
}

#[async_trait]
impl ComplianceStore for PgComplianceStore {
    async fn insert_investor(
        &self,
        investor: InvestorProfile,
    ) -> Result<InvestorProfile, StoreError> {
        let model = self
            .investors
            .create(investor_active_model(&investor))
            .await
            .map_err(store_err)?;
        investor_from_model(model)
    }

    async fn find_investor(&self, id: Uuid) -> Result<Option<InvestorProfile>, StoreError> {
        self.investors
            .find_by_id(id)
            .await
            .map_err(store_err)?
            .map(investor_from_model)
            .transpose()
    }

    async fn update_investor(
        &self,
        investor: &InvestorProfile,
    ) -> Result<Option<InvestorProfile>, StoreError> {
        self.investors
            .update_compliance(&investor_model(investor))
            .await
            .map_err(store_err)?
            .map(investor_from_model)
            .transpose()
    }

    async fn insert_campaign(&self, campaign: Campaign) -> Result<Campaign, StoreError> {
        let model = self
            .campaigns
            .create(campaigns::ActiveModel {
                id: Set(campaign.id),
                issuer_id: Set(campaign.issuer_id),
                name: Set(campaign.name),
                target_amount: Set(campaign.target_amount),
                deadline: Set(campaign.deadline.into()),
                regulation_type: Set(campaign.regulation_type),
                funding_status: Set(campaign.funding_status.as_str().to_string()),
                created_at: Set(campaign.created_at.into()),
            })
            .await
            .map_err(store_err)?;
        campaign_from_model(model)
    }

    async fn find_campaign(&self, id: Uuid) -> Result<Option<Campaign>, StoreError> {
        self.campaigns
            .find_by_id(id)
            .await
            .map_err(store_err)?
            .map(campaign_from_model)
            .transpose()
    }

    async fn list_campaigns(&self, page: &PageRequest) -> Result<(Vec<Campaign>, u64), StoreError> {
        let (rows, total) = self
            .campaigns
            .list(page.offset(), page.limit())
            .await
            .map_err(store_err)?;
        let campaigns = rows
            .into_iter()
            .map(campaign_from_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((campaigns, total))
    }

    async fn begin_investment(
        &self,
        investor_id: Uuid,
    ) -> Result<Option<Box<dyn InvestmentScope>>, StoreError> {
        let permit = Arc::clone(&self.scope_permits)
            .acquire_owned()
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let billing = self.db.begin().await.map_err(store_err)?;
        let lock = InvestorLock::acquire(&self.db, investor_id)
            .await
            .map_err(store_err)?;

        let Some(model) = InvestorRepository::find_with(lock.transaction(), investor_id)
            .await
            .map_err(store_err)?
        else {
            lock.rollback().await.map_err(store_err)?;
            billing.rollback().await.map_err(store_err)?;
            return Ok(None);
        };

        let investor = investor_from_model(model)?;
        Ok(Some(Box::new(PgInvestmentScope {
            lock,
            billing: Some(billing),
            investor,
            _permit: permit,
        })))
    }

    async fn record_billing_event(&self, event: BillingEvent) -> Result<BillingEvent, StoreError> {
        let model = self
            .billing
            .append(billing_active_model(event))
            .await
            .map_err(store_err)?;
        Ok(billing_from_model(model))
    }

    async fn billing_events_for(&self, investor_id: Uuid) -> Result<Vec<BillingEvent>, StoreError> {
        let rows = self
            .billing
            .for_investor(investor_id)
            .await
            .map_err(store_err)?;
        Ok(rows.into_iter().map(billing_from_model).collect())
    }

    async fn insert_entry(&self, entry: LedgerEntry) -> Result<LedgerEntry, StoreError> {
        let model = self
            .ledger
            .insert(entry_active_model(&entry))
            .await
            .map_err(store_err)?;
        entry_from_model(model)
    }

    async fn find_entry(&self, id: Uuid) -> Result<Option<LedgerEntry>, StoreError> {
        self.ledger
            .find_by_id(id)
            .await
            .map_err(store_err)?
            .map(entry_from_model)
            .transpose()
    }

    async fn find_entry_by_payment_ref(
        &self,
        reference: &str,
    ) -> Result<Option<LedgerEntry>, StoreError> {
        self.ledger
            .find_by_payment_ref(reference)
            .await
            .map_err(store_err)?
            .map(entry_from_model)
            .transpose()
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: &[LedgerStatus],
        to: LedgerStatus,
    ) -> Result<Option<LedgerEntry>, StoreError> {
        let from: Vec<&str> = from.iter().map(LedgerStatus::as_str).collect();
        self.ledger
            .transition_status(id, &from, to.as_str())
            .await
            .map_err(store_err)?
            .map(entry_from_model)
            .transpose()
    }

    async fn pledged_total(&self, campaign_id: Uuid) -> Result<Decimal, StoreError> {
        self.ledger
            .pledged_total(campaign_id)
            .await
            .map_err(store_err)
    }

    async fn list_entries(
        &self,
        investor_id: Uuid,
        page: &PageRequest,
    ) -> Result<(Vec<LedgerEntry>, u64), StoreError> {
        let (rows, total) = self
            .ledger
            .list_for_investor(investor_id, page.offset(), page.limit())
            .await
            .map_err(store_err)?;
        let entries = rows
            .into_iter()
            .map(entry_from_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((entries, total))
    }
}

fn store_err(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => StoreError::Conflict(detail),
        _ => {
            tracing::error!(error = %err, "database error");
            StoreError::Database(err.to_string())
        }
    }
}

fn billing_active_model(event: BillingEvent) -> billing_events::ActiveModel {
    billing_events::ActiveModel {
        id: Set(event.id),
        investor_id: Set(event.investor_id),
        reference: Set(event.reference),
        description: Set(event.description),
        fee_amount: Set(event.fee_amount),
        created_at: Set(event.created_at.into()),
    }
}

fn corrupt(column: &str, value: &str) -> StoreError {
    StoreError::Corrupt(format!("unexpected {column} value '{value}'"))
}

fn investor_model(investor: &InvestorProfile) -> investors::Model {
    investors::Model {
        id: investor.id,
        email: investor.email.clone(),
        kyc_status: investor.kyc_status.as_str().to_string(),
        is_accredited: investor.is_accredited,
        net_worth: investor.net_worth,
        annual_income: investor.annual_income,
        accreditation_status: investor.accreditation_status.as_str().to_string(),
        accreditation_verified_at: investor.accreditation_verified_at.map(Into::into),
        accreditation_verified_by: investor.accreditation_verified_by,
        accreditation_expiry: investor.accreditation_expiry.map(Into::into),
        created_at: investor.created_at.into(),
    }
}

fn investor_active_model(investor: &InvestorProfile) -> investors::ActiveModel {
    let m = investor_model(investor);
    investors::ActiveModel {
        id: Set(m.id),
        email: Set(m.email),
        kyc_status: Set(m.kyc_status),
        is_accredited: Set(m.is_accredited),
        net_worth: Set(m.net_worth),
        annual_income: Set(m.annual_income),
        accreditation_status: Set(m.accreditation_status),
        accreditation_verified_at: Set(m.accreditation_verified_at),
        accreditation_verified_by: Set(m.accreditation_verified_by),
        accreditation_expiry: Set(m.accreditation_expiry),
        created_at: Set(m.created_at),
    }
}

fn investor_from_model(m: investors::Model) -> Result<InvestorProfile, StoreError> {
    Ok(InvestorProfile {
        kyc_status: KycStatus::parse(&m.kyc_status)
            .ok_or_else(|| corrupt("kyc_status", &m.kyc_status))?,
        accreditation_status: AccreditationStatus::parse(&m.accreditation_status)
            .ok_or_else(|| corrupt("accreditation_status", &m.accreditation_status))?,
        id: m.id,
        email: m.email,
        is_accredited: m.is_accredited,
        net_worth: m.net_worth,
        annual_income: m.annual_income,
        accreditation_verified_at: m.accreditation_verified_at.map(|t| t.with_timezone(&Utc)),
        accreditation_verified_by: m.accreditation_verified_by,
        accreditation_expiry: m.accreditation_expiry.map(|t| t.with_timezone(&Utc)),
        created_at: m.created_at.with_timezone(&Utc),
    })
}

fn campaign_from_model(m: campaigns::Model) -> Result<Campaign, StoreError> {
    Ok(Campaign {
        funding_status: FundingStatus::parse(&m.funding_status)
            .ok_or_else(|| corrupt("funding_status", &m.funding_status))?,
        id: m.id,
        issuer_id: m.issuer_id,
        name: m.name,
        target_amount: m.target_amount,
        deadline: m.deadline.with_timezone(&Utc),
        regulation_type: m.regulation_type,
        created_at: m.created_at.with_timezone(&Utc),
    })
}

fn entry_active_model(entry: &LedgerEntry) -> ledger_entries::ActiveModel {
    ledger_entries::ActiveModel {
        id: Set(entry.id),
        investor_id: Set(entry.investor_id),
        campaign_id: Set(entry.campaign_id),
        amount: Set(entry.amount),
        transaction_type: Set(entry.kind.as_str().to_string()),
        status: Set(entry.status.as_str().to_string()),
        payment_reference: Set(entry.payment_reference.clone()),
        created_at: Set(entry.created_at.into()),
    }
}

fn entry_from_model(m: ledger_entries::Model) -> Result<LedgerEntry, StoreError> {
    Ok(LedgerEntry {
        kind: TransactionKind::parse(&m.transaction_type)
            .ok_or_else(|| corrupt("transaction_type", &m.transaction_type))?,
        status: LedgerStatus::parse(&m.status).ok_or_else(|| corrupt("status", &m.status))?,
        id: m.id,
        investor_id: m.investor_id,
        campaign_id: m.campaign_id,
        amount: m.amount,
        payment_reference: m.payment_reference,
        created_at: m.created_at.with_timezone(&Utc),
    })
}

fn billing_from_model(m: billing_events::Model) -> BillingEvent {
    BillingEvent {
        id: m.id,
        investor_id: m.investor_id,
        reference: m.reference,
        description: m.description,
        fee_amount: m.fee_amount,
        created_at: m.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_entry_mapping_round_trips_enums() {
        let now = Utc::now();
        let model = ledger_entries::Model {
            id: Uuid::new_v4(),
            investor_id: Uuid::new_v4(),
            campaign_id: Uuid::new_v4(),
            amount: dec!(1000.00),
            transaction_type: "investment".to_string(),
            status: "pending_settlement".to_string(),
            payment_reference: Some("pi_1".to_string()),
            created_at: now.into(),
        };
        let entry = entry_from_model(model).unwrap();
        assert_eq!(entry.kind, TransactionKind::Investment);
        assert_eq!(entry.status, LedgerStatus::PendingSettlement);
        assert_eq!(entry.created_at, now);
    }

    #[test]
    fn test_unknown_status_is_corrupt() {
        let model = ledger_entries::Model {
            id: Uuid::new_v4(),
            investor_id: Uuid::new_v4(),
            campaign_id: Uuid::new_v4(),
            amount: dec!(1),
            transaction_type: "investment".to_string(),
            status: "refunded".to_string(),
            payment_reference: None,
            created_at: Utc::now().into(),
        };
        assert!(matches!(
            entry_from_model(model),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn test_investor_mapping() {
        let now = Utc::now();
        let profile = InvestorProfile {
            id: Uuid::new_v4(),
            email: "a@example.com".to_string(),
            kyc_status: KycStatus::Verified,
            is_accredited: true,
            net_worth: Some(dec!(1000000)),
            annual_income: None,
            accreditation_status: AccreditationStatus::VerifiedDocs,
            accreditation_verified_at: Some(now),
            accreditation_verified_by: Some(Uuid::new_v4()),
            accreditation_expiry: Some(now + chrono::Duration::days(90)),
            created_at: now,
        };
        let back = investor_from_model(investor_model(&profile)).unwrap();
        assert_eq!(back, profile);
    }
}
