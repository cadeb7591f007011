//! Ledger state machine.
//!
//! Owns creation and status changes of ledger entries. Persistence applies
//! the returned targets with a compare-and-set on the current status, so
//! concurrent writers cannot double-transition an entry.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::compliance::{Authorization, RuleEngine};
use crate::ledger::error::LedgerError;
use crate::ledger::types::{
    LedgerEntry, LedgerStatus, SettlementOutcome, TradeRequest, TransactionKind,
};

/// Stateless service for ledger entry lifecycle decisions.
pub struct LedgerStateMachine;

impl LedgerStateMachine {
    /// Returns true if `from → to` is a legal transition.
    #[must_use]
    pub fn is_valid_transition(from: LedgerStatus, to: LedgerStatus) -> bool {
        !from.is_terminal()
            && matches!(
                to,
                LedgerStatus::Settled | LedgerStatus::Failed | LedgerStatus::Cancelled
            )
    }

    /// Opens an investment entry in `pending_payment`.
    ///
    /// Requires an [`Authorization`], which only the compliance router issues.
    #[must_use]
    pub fn open_investment(
        authorization: &Authorization,
        payment_reference: String,
        now: DateTime<Utc>,
    ) -> LedgerEntry {
        LedgerEntry {
            id: Uuid::now_v7(),
            investor_id: authorization.investor_id(),
            campaign_id: authorization.campaign_id(),
            amount: authorization.amount(),
            kind: TransactionKind::Investment,
            status: LedgerStatus::PendingPayment,
            payment_reference: Some(payment_reference),
            created_at: now,
        }
    }

    /// Opens a secondary-market trade entry.
    ///
    /// The status comes from the caller unchanged; trades do not go through
    /// the pending-payment step.
    pub fn open_trade(
        investor_id: Uuid,
        request: &TradeRequest,
        now: DateTime<Utc>,
    ) -> Result<LedgerEntry, LedgerError> {
        if !RuleEngine::check_lockup_period(request.original_transaction_date, now) {
            return Err(LedgerError::LockupActive);
        }

        Ok(LedgerEntry {
            id: Uuid::now_v7(),
            investor_id,
            campaign_id: request.campaign_id,
            amount: request.amount,
            kind: TransactionKind::Trade,
            status: request.status,
            payment_reference: None,
            created_at: now,
        })
    }

    /// Rejects callers other than the entry owner.
    pub fn ensure_owner(owner: Uuid, requester: Uuid) -> Result<(), LedgerError> {
        if owner == requester {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized { owner, requester })
        }
    }

    /// Checks that `requester` may cancel `entry` now.
    ///
    /// Order: ownership, kind, terminal status, then the 48-hour window.
    pub fn authorize_cancel(
        entry: &LedgerEntry,
        requester: Uuid,
        deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        Self::ensure_owner(entry.investor_id, requester)?;

        if entry.kind != TransactionKind::Investment {
            return Err(LedgerError::NotCancellable(entry.kind));
        }

        if !Self::is_valid_transition(entry.status, LedgerStatus::Cancelled) {
            return Err(LedgerError::InvalidTransition {
                from: entry.status,
                to: LedgerStatus::Cancelled,
            });
        }

        if !RuleEngine::check_cancellation_window(deadline, now) {
            return Err(LedgerError::WindowClosed);
        }

        Ok(())
    }

    /// Target status for a provider outcome, or `None` if the entry is
    /// already terminal and the event must be ignored.
    #[must_use]
    pub fn settlement_target(
        current: LedgerStatus,
        outcome: SettlementOutcome,
    ) -> Option<LedgerStatus> {
        let target = outcome.target_status();
        Self::is_valid_transition(current, target).then_some(target)
    }

    /// Target for the delayed settlement task: only `pending_settlement`
    /// moves, to `settled`.
    #[must_use]
    pub fn delayed_settlement_target(current: LedgerStatus) -> Option<LedgerStatus> {
        (current == LedgerStatus::PendingSettlement).then_some(LedgerStatus::Settled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::{ComplianceRequest, ComplianceRouter};
    use crate::test_support::investor;
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn entry(status: LedgerStatus, kind: TransactionKind, owner: Uuid) -> LedgerEntry {
        LedgerEntry {
            id: Uuid::new_v4(),
            investor_id: owner,
            campaign_id: Uuid::new_v4(),
            amount: dec!(100),
            kind,
            status,
            payment_reference: Some("pi_123".into()),
            created_at: now(),
        }
    }

    #[test]
    fn test_open_investment_is_pending_payment() {
        let inv = investor(now());
        let campaign_id = Uuid::new_v4();
        let auth = ComplianceRouter::authorize(
            &ComplianceRequest {
                regulation: "REG_CF",
                investor: &inv,
                campaign_id,
                amount: dec!(1000),
                trailing_12mo_sum: Decimal::ZERO,
            },
            now(),
        )
        .unwrap();

        let entry = LedgerStateMachine::open_investment(&auth, "pi_abc".into(), now());
        assert_eq!(entry.status, LedgerStatus::PendingPayment);
        assert_eq!(entry.kind, TransactionKind::Investment);
        assert_eq!(entry.payment_reference.as_deref(), Some("pi_abc"));
        assert_eq!(entry.investor_id, inv.id);
        assert_eq!(entry.campaign_id, campaign_id);
        assert_eq!(entry.amount, dec!(1000));
    }

    #[test]
    fn test_open_trade_keeps_caller_status() {
        let request = TradeRequest {
            campaign_id: Uuid::new_v4(),
            amount: dec!(500),
            original_transaction_date: now() - Duration::days(400),
            status: LedgerStatus::Settled,
        };
        let entry = LedgerStateMachine::open_trade(Uuid::new_v4(), &request, now()).unwrap();
        assert_eq!(entry.status, LedgerStatus::Settled);
        assert_eq!(entry.kind, TransactionKind::Trade);
        assert!(entry.payment_reference.is_none());
    }

    #[test]
    fn test_open_trade_under_lockup() {
        let request = TradeRequest {
            campaign_id: Uuid::new_v4(),
            amount: dec!(500),
            original_transaction_date: now() - Duration::days(100),
            status: LedgerStatus::PendingSettlement,
        };
        assert_eq!(
            LedgerStateMachine::open_trade(Uuid::new_v4(), &request, now()).unwrap_err(),
            LedgerError::LockupActive
        );
    }

    #[test]
    fn test_cancel_requires_owner() {
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let e = entry(LedgerStatus::PendingPayment, TransactionKind::Investment, owner);
        let err = LedgerStateMachine::authorize_cancel(&e, other, now() + Duration::days(10), now())
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::Unauthorized {
                owner,
                requester: other
            }
        );
    }

    #[test]
    fn test_cancel_ownership_checked_before_window() {
        let e = entry(
            LedgerStatus::PendingPayment,
            TransactionKind::Investment,
            Uuid::new_v4(),
        );
        let err = LedgerStateMachine::authorize_cancel(&e, Uuid::new_v4(), now(), now())
            .unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized { .. }));
    }

    #[test]
    fn test_cancel_window_closed() {
        let owner = Uuid::new_v4();
        let e = entry(LedgerStatus::PendingPayment, TransactionKind::Investment, owner);
        let err =
            LedgerStateMachine::authorize_cancel(&e, owner, now() + Duration::hours(48), now())
                .unwrap_err();
        assert_eq!(err, LedgerError::WindowClosed);
    }

    #[test]
    fn test_cancel_terminal_entry_rejected() {
        let owner = Uuid::new_v4();
        let e = entry(LedgerStatus::Settled, TransactionKind::Investment, owner);
        let err =
            LedgerStateMachine::authorize_cancel(&e, owner, now() + Duration::days(10), now())
                .unwrap_err();
        assert_eq!(
            err,
            LedgerError::InvalidTransition {
                from: LedgerStatus::Settled,
                to: LedgerStatus::Cancelled,
            }
        );
    }

    #[test]
    fn test_cancel_trade_rejected() {
        let owner = Uuid::new_v4();
        let e = entry(LedgerStatus::PendingSettlement, TransactionKind::Trade, owner);
        let err =
            LedgerStateMachine::authorize_cancel(&e, owner, now() + Duration::days(10), now())
                .unwrap_err();
        assert_eq!(err, LedgerError::NotCancellable(TransactionKind::Trade));
    }

    #[test]
    fn test_cancel_allowed() {
        let owner = Uuid::new_v4();
        let e = entry(LedgerStatus::PendingPayment, TransactionKind::Investment, owner);
        assert!(
            LedgerStateMachine::authorize_cancel(&e, owner, now() + Duration::days(10), now())
                .is_ok()
        );
    }

    #[test]
    fn test_settlement_target() {
        assert_eq!(
            LedgerStateMachine::settlement_target(
                LedgerStatus::PendingPayment,
                SettlementOutcome::Succeeded
            ),
            Some(LedgerStatus::Settled)
        );
        assert_eq!(
            LedgerStateMachine::settlement_target(
                LedgerStatus::PendingSettlement,
                SettlementOutcome::Failed
            ),
            Some(LedgerStatus::Failed)
        );
        assert_eq!(
            LedgerStateMachine::settlement_target(
                LedgerStatus::Cancelled,
                SettlementOutcome::Succeeded
            ),
            None
        );
    }

    #[test]
    fn test_delayed_settlement_only_moves_pending_settlement() {
        assert_eq!(
            LedgerStateMachine::delayed_settlement_target(LedgerStatus::PendingSettlement),
            Some(LedgerStatus::Settled)
        );
        assert_eq!(
            LedgerStateMachine::delayed_settlement_target(LedgerStatus::PendingPayment),
            None
        );
        assert_eq!(
            LedgerStateMachine::delayed_settlement_target(LedgerStatus::Failed),
            None
        );
    }
}
