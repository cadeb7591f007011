//! Investment orchestration.
//!
//! Ties the compliance router, billing recorder, payment provider and ledger
//! state machine together. Per investor, the trailing-sum read, the limit
//! check and the ledger insert happen inside one [`InvestmentScope`], so two
//! concurrent investments cannot both pass the cap on a stale sum.
//!
//! [`InvestmentScope`]: crate::store::InvestmentScope

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use regrouter_shared::types::{Currency, Money, PageRequest, PageResponse};
use regrouter_shared::{ComplianceConfig, Notifier, PaymentConfig, RefundPolicy};

use crate::billing::{BillingEvent, BillingService};
use crate::compliance::{ComplianceRequest, ComplianceRouter, RuleEngine};
use crate::investment::error::InvestmentError;
use crate::ledger::{
    LedgerEntry, LedgerError, LedgerStateMachine, LedgerStatus, TradeRequest, TransactionKind,
};
use crate::payment::{HoldMetadata, PaymentError, PaymentProvider};
use crate::settlement::SettlementReconciler;
use crate::store::{ComplianceStore, InvestmentScope, StoreError};

/// Result of a successful investment.
#[derive(Debug, Clone, Serialize)]
pub struct InvestmentReceipt {
    /// The new `pending_payment` entry.
    pub entry: LedgerEntry,
    /// One-time secret for completing payment. Not persisted.
    pub client_secret: String,
    /// Fee charged for the compliance validation.
    pub billing_event: BillingEvent,
}

/// Pledged total of a campaign against its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EscrowStatus {
    /// Campaign ID.
    pub campaign_id: Uuid,
    /// Funding target.
    pub target_amount: Decimal,
    /// Sum of committed investments.
    pub pledged_total: Decimal,
    /// Whether the pledged total reached the target.
    pub threshold_met: bool,
}

/// Orchestrates investment creation, cancellation and trades.
pub struct InvestmentService {
    store: Arc<dyn ComplianceStore>,
    payments: Arc<dyn PaymentProvider>,
    notifier: Arc<dyn Notifier>,
    reconciler: Arc<SettlementReconciler>,
    compliance: ComplianceConfig,
    currency: Currency,
    payment_timeout: Duration,
}

impl InvestmentService {
    /// Creates the service from its collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn ComplianceStore>,
        payments: Arc<dyn PaymentProvider>,
        notifier: Arc<dyn Notifier>,
        reconciler: Arc<SettlementReconciler>,
        compliance: ComplianceConfig,
        payment: &PaymentConfig,
    ) -> Self {
        Self {
            store,
            payments,
            notifier,
            reconciler,
            compliance,
            currency: payment.currency,
            payment_timeout: payment.request_timeout(),
        }
    }

    /// Routes, bills, holds funds and records a `pending_payment` entry.
    ///
    /// The billing event is committed before the payment call and survives
    /// a payment failure. A payment failure leaves no ledger entry. If the
    /// ledger write fails after the hold, the hold is refunded.
    pub async fn invest(
        &self,
        investor_id: Uuid,
        campaign_id: Uuid,
        amount: Decimal,
    ) -> Result<InvestmentReceipt, InvestmentError> {
        let amount_cents = self.amount_in_cents(amount)?;

        let campaign = self
            .store
            .find_campaign(campaign_id)
            .await?
            .ok_or_else(|| InvestmentError::NotFound("Campaign not found".to_string()))?;

        let mut scope = self
            .store
            .begin_investment(investor_id)
            .await?
            .ok_or_else(|| InvestmentError::NotFound("User not found".to_string()))?;

        let now = Utc::now();
        let trailing_12mo_sum = scope
            .trailing_investment_sum(RuleEngine::trailing_window_start(now))
            .await?;

        let authorization = ComplianceRouter::authorize(
            &ComplianceRequest {
                regulation: &campaign.regulation_type,
                investor: scope.investor(),
                campaign_id,
                amount,
                trailing_12mo_sum,
            },
            now,
        )?;
        let investor_email = scope.investor().email.clone();

        let billing_event = scope
            .record_billing_event(BillingService::charge(
                &authorization,
                self.compliance.validation_fee,
                now,
            ))
            .await?;

        let hold = with_timeout(
            self.payment_timeout,
            self.payments.create_hold(
                amount_cents,
                HoldMetadata {
                    investor_id,
                    campaign_id,
                    transaction_kind: TransactionKind::Investment,
                },
            ),
        )
        .await
        .inspect_err(|e| {
            tracing::warn!(
                %investor_id,
                %campaign_id,
                billing_event_id = %billing_event.id,
                error = %e,
                "payment hold failed, billing event kept"
            );
        })?;

        let reference = hold.reference.clone();
        let staged = LedgerStateMachine::open_investment(&authorization, hold.reference, now);
        let entry = match persist_entry(scope, staged).await {
            Ok(entry) => entry,
            Err(e) => {
                self.release_orphaned_hold(&reference, &e).await;
                return Err(e.into());
            }
        };

        tracing::info!(
            entry_id = %entry.id,
            %investor_id,
            %campaign_id,
            lane = %authorization.lane(),
            "investment initiated"
        );

        self.reconciler.schedule_delayed_settlement(entry.id);
        self.notify_in_background(
            investor_email,
            "Investment Initiated",
            format!(
                "You have initiated an investment of ${amount} in {}.",
                campaign.name
            ),
        );

        Ok(InvestmentReceipt {
            entry,
            client_secret: hold.client_secret,
            billing_event,
        })
    }

    /// Cancels an investment and refunds its payment.
    ///
    /// With [`RefundPolicy::RequireRefund`] a failed refund leaves the entry
    /// untouched. With [`RefundPolicy::CancelRegardless`] the entry is
    /// cancelled first and the refund error is returned afterwards.
    pub async fn cancel(
        &self,
        requester: Uuid,
        entry_id: Uuid,
    ) -> Result<LedgerEntry, InvestmentError> {
        let entry = self
            .store
            .find_entry(entry_id)
            .await?
            .ok_or_else(|| InvestmentError::NotFound("Investment not found".to_string()))?;

        let campaign = self
            .store
            .find_campaign(entry.campaign_id)
            .await?
            .ok_or_else(|| InvestmentError::NotFound("Campaign not found".to_string()))?;

        LedgerStateMachine::authorize_cancel(&entry, requester, campaign.deadline, Utc::now())?;

        let refund_error = match entry.payment_reference.as_deref() {
            Some(reference) => {
                match with_timeout(self.compliance.refund_timeout(), self.payments.refund(reference))
                    .await
                {
                    Ok(refund) => {
                        tracing::info!(%entry_id, refund = %refund.reference, status = %refund.status, "refund issued");
                        None
                    }
                    Err(e) => {
                        tracing::warn!(%entry_id, error = %e, policy = ?self.compliance.refund_policy, "refund failed");
                        if self.compliance.refund_policy == RefundPolicy::RequireRefund {
                            return Err(InvestmentError::Refund(e));
                        }
                        Some(e)
                    }
                }
            }
            None => None,
        };

        let Some(cancelled) = self
            .store
            .transition_status(entry_id, &LedgerStatus::NON_TERMINAL, LedgerStatus::Cancelled)
            .await?
        else {
            if let (Some(reference), None) = (entry.payment_reference.as_deref(), &refund_error) {
                tracing::error!(
                    %entry_id,
                    payment_reference = reference,
                    "refund issued but entry changed concurrently, not cancelled"
                );
            }
            return Err(LedgerError::InvalidTransition {
                from: entry.status,
                to: LedgerStatus::Cancelled,
            }
            .into());
        };

        tracing::info!(%entry_id, "investment cancelled");

        if let Some(investor) = self.store.find_investor(requester).await? {
            self.notify_in_background(
                investor.email,
                "Investment Cancelled",
                format!(
                    "Your investment of ${} has been successfully cancelled.",
                    cancelled.amount
                ),
            );
        }

        match refund_error {
            Some(e) => Err(InvestmentError::Refund(e)),
            None => Ok(cancelled),
        }
    }

    /// Records a secondary-market trade once the lockup has elapsed.
    pub async fn trade(
        &self,
        investor_id: Uuid,
        request: TradeRequest,
    ) -> Result<LedgerEntry, InvestmentError> {
        self.amount_in_cents(request.amount)?;

        if self.store.find_investor(investor_id).await?.is_none() {
            return Err(InvestmentError::NotFound("User not found".to_string()));
        }
        if self.store.find_campaign(request.campaign_id).await?.is_none() {
            return Err(InvestmentError::NotFound("Campaign not found".to_string()));
        }

        let entry = LedgerStateMachine::open_trade(investor_id, &request, Utc::now())?;
        let entry = self.store.insert_entry(entry).await?;

        tracing::info!(entry_id = %entry.id, %investor_id, status = %entry.status, "trade recorded");
        self.reconciler.schedule_delayed_settlement(entry.id);
        Ok(entry)
    }

    /// Pledged total of a campaign compared with its target.
    pub async fn escrow_status(&self, campaign_id: Uuid) -> Result<EscrowStatus, InvestmentError> {
        let campaign = self
            .store
            .find_campaign(campaign_id)
            .await?
            .ok_or_else(|| InvestmentError::NotFound("Campaign not found".to_string()))?;
        let pledged_total = self.store.pledged_total(campaign_id).await?;

        Ok(EscrowStatus {
            campaign_id,
            target_amount: campaign.target_amount,
            pledged_total,
            threshold_met: RuleEngine::check_escrow_threshold(&campaign, pledged_total),
        })
    }

    /// Lists an investor's entries. Only the investor may list them.
    pub async fn list_entries(
        &self,
        requester: Uuid,
        investor_id: Uuid,
        page: &PageRequest,
    ) -> Result<PageResponse<LedgerEntry>, InvestmentError> {
        LedgerStateMachine::ensure_owner(investor_id, requester)?;
        let (entries, total) = self.store.list_entries(investor_id, page).await?;
        Ok(PageResponse::new(entries, page.page, page.per_page, total))
    }

    fn amount_in_cents(&self, amount: Decimal) -> Result<i64, InvestmentError> {
        if amount <= Decimal::ZERO {
            return Err(InvestmentError::InvalidAmount(
                "amount must be positive".to_string(),
            ));
        }
        Money::new(amount, self.currency)
            .to_minor_units()
            .ok_or_else(|| {
                InvestmentError::InvalidAmount(
                    "amount must have at most 2 decimal places".to_string(),
                )
            })
    }

    /// Refunds a hold whose ledger entry could not be written.
    async fn release_orphaned_hold(&self, reference: &str, cause: &StoreError) {
        tracing::error!(
            payment_reference = reference,
            error = %cause,
            "ledger write failed after payment hold, releasing hold"
        );
        match with_timeout(self.compliance.refund_timeout(), self.payments.refund(reference)).await
        {
            Ok(refund) => tracing::info!(
                payment_reference = reference,
                refund = %refund.reference,
                "orphaned hold released"
            ),
            Err(e) => tracing::error!(
                payment_reference = reference,
                error = %e,
                "orphaned hold could not be released"
            ),
        }
    }

    fn notify_in_background(&self, to: String, subject: &'static str, body: String) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            notifier.notify(&to, subject, &body).await;
        });
    }
}

async fn persist_entry(
    mut scope: Box<dyn InvestmentScope>,
    entry: LedgerEntry,
) -> Result<LedgerEntry, StoreError> {
    let entry = scope.insert_entry(entry).await?;
    scope.commit().await?;
    Ok(entry)
}

async fn with_timeout<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, PaymentError>>,
) -> Result<T, PaymentError> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| PaymentError::Timeout)?
}
