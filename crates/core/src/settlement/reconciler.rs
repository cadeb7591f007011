//! Settlement reconciler.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::ledger::{LedgerEntry, LedgerStateMachine, LedgerStatus, SettlementOutcome};
use crate::payment::WebhookVerifier;
use crate::settlement::error::SettlementError;
use crate::store::{ComplianceStore, StoreError};

/// Fixed webhook acknowledgement, identical whether or not an entry matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WebhookAck {
    /// Always `"success"`.
    pub status: &'static str,
}

impl WebhookAck {
    /// The only acknowledgement ever returned.
    pub const SUCCESS: Self = Self { status: "success" };
}

/// Drives ledger entries to terminal statuses from settlement signals.
pub struct SettlementReconciler {
    store: Arc<dyn ComplianceStore>,
    verifier: WebhookVerifier,
    settlement_delay: Duration,
}

impl SettlementReconciler {
    /// Creates a reconciler.
    #[must_use]
    pub fn new(
        store: Arc<dyn ComplianceStore>,
        verifier: WebhookVerifier,
        settlement_delay: Duration,
    ) -> Self {
        Self {
            store,
            verifier,
            settlement_delay,
        }
    }

    /// Verifies and applies a webhook delivery.
    pub async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookAck, SettlementError> {
        self.handle_webhook_at(payload, signature, Utc::now()).await
    }

    /// [`Self::handle_webhook`] with an explicit clock.
    pub async fn handle_webhook_at(
        &self,
        payload: &[u8],
        signature: &str,
        now: DateTime<Utc>,
    ) -> Result<WebhookAck, SettlementError> {
        let event = self
            .verifier
            .verify_and_parse(payload, signature, now)
            .inspect_err(|e| tracing::warn!(error = %e, "webhook rejected"))?;

        match (event.reference.as_deref(), event.outcome) {
            (Some(reference), Some(outcome)) => {
                self.apply_settlement_event(reference, outcome).await?;
            }
            _ => {
                tracing::debug!(event_type = %event.event_type, "webhook event ignored");
            }
        }

        Ok(WebhookAck::SUCCESS)
    }

    /// Applies a provider outcome to the entry bound to `reference`.
    ///
    /// Idempotent: unmatched references and already-terminal entries are
    /// logged and ignored.
    pub async fn apply_settlement_event(
        &self,
        reference: &str,
        outcome: SettlementOutcome,
    ) -> Result<Option<LedgerEntry>, StoreError> {
        let Some(entry) = self.store.find_entry_by_payment_ref(reference).await? else {
            tracing::info!(reference, ?outcome, "no ledger entry for payment reference");
            return Ok(None);
        };

        let Some(target) = LedgerStateMachine::settlement_target(entry.status, outcome) else {
            tracing::info!(
                entry_id = %entry.id,
                status = %entry.status,
                ?outcome,
                "entry already terminal, duplicate settlement event ignored"
            );
            return Ok(None);
        };

        let updated = self
            .store
            .transition_status(entry.id, &[entry.status], target)
            .await?;
        match &updated {
            Some(e) => tracing::info!(entry_id = %e.id, status = %e.status, "entry settled"),
            None => tracing::info!(
                entry_id = %entry.id,
                "entry changed concurrently, settlement event ignored"
            ),
        }
        Ok(updated)
    }

    /// Moves `pending_settlement → settled` if the entry is still in that
    /// exact status.
    pub async fn settle_if_pending(
        &self,
        entry_id: Uuid,
    ) -> Result<Option<LedgerEntry>, StoreError> {
        let Some(entry) = self.store.find_entry(entry_id).await? else {
            tracing::warn!(%entry_id, "delayed settlement: entry not found");
            return Ok(None);
        };

        let Some(target) = LedgerStateMachine::delayed_settlement_target(entry.status) else {
            tracing::debug!(%entry_id, status = %entry.status, "delayed settlement: nothing to do");
            return Ok(None);
        };

        let updated = self
            .store
            .transition_status(entry_id, &[LedgerStatus::PendingSettlement], target)
            .await?;
        if updated.is_some() {
            tracing::info!(%entry_id, "investment settled successfully");
        } else {
            tracing::warn!(%entry_id, "delayed settlement: entry already processed");
        }
        Ok(updated)
    }

    /// Spawns the delayed settlement task for an entry.
    pub fn schedule_delayed_settlement(self: &Arc<Self>, entry_id: Uuid) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(this.settlement_delay).await;
            if let Err(e) = this.settle_if_pending(entry_id).await {
                tracing::error!(%entry_id, error = %e, "delayed settlement failed");
            }
        })
    }
}
