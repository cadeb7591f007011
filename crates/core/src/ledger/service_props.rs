//! Property-based tests for the ledger state machine.

use proptest::prelude::*;

use super::service::LedgerStateMachine;
use super::types::{LedgerStatus, SettlementOutcome};

fn arb_status() -> impl Strategy<Value = LedgerStatus> {
    prop_oneof![
        Just(LedgerStatus::PendingPayment),
        Just(LedgerStatus::PendingSettlement),
        Just(LedgerStatus::Settled),
        Just(LedgerStatus::Failed),
        Just(LedgerStatus::Cancelled),
    ]
}

fn arb_outcome() -> impl Strategy<Value = SettlementOutcome> {
    prop_oneof![
        Just(SettlementOutcome::Succeeded),
        Just(SettlementOutcome::Failed)
    ]
}

/// Applies an outcome the way the reconciler does.
fn apply(status: LedgerStatus, outcome: SettlementOutcome) -> LedgerStatus {
    LedgerStateMachine::settlement_target(status, outcome).unwrap_or(status)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Terminal statuses never move.
    #[test]
    fn prop_terminal_is_absorbing(from in arb_status(), to in arb_status()) {
        if from.is_terminal() {
            prop_assert!(!LedgerStateMachine::is_valid_transition(from, to));
        }
    }

    /// No transition ever targets `pending_payment`.
    #[test]
    fn prop_never_reenters_pending_payment(from in arb_status()) {
        prop_assert!(!LedgerStateMachine::is_valid_transition(from, LedgerStatus::PendingPayment));
    }

    /// Replaying any sequence of outcomes changes the status at most once.
    #[test]
    fn prop_settlement_events_idempotent(
        start in arb_status(),
        events in proptest::collection::vec(arb_outcome(), 1..10),
    ) {
        let mut status = start;
        let mut changes = 0;
        for outcome in &events {
            let next = apply(status, *outcome);
            if next != status {
                changes += 1;
            }
            status = next;
        }
        prop_assert!(changes <= 1);
        if !start.is_terminal() {
            prop_assert_eq!(status, events[0].target_status());
        } else {
            prop_assert_eq!(status, start);
        }
    }

    /// The delayed task and a webhook converge to a terminal status in any order.
    #[test]
    fn prop_delayed_and_webhook_converge(outcome in arb_outcome(), webhook_first in any::<bool>()) {
        let start = LedgerStatus::PendingSettlement;
        let delayed = |s: LedgerStatus| LedgerStateMachine::delayed_settlement_target(s).unwrap_or(s);

        let end = if webhook_first {
            delayed(apply(start, outcome))
        } else {
            apply(delayed(start), outcome)
        };
        prop_assert!(end.is_terminal());
        if webhook_first {
            prop_assert_eq!(end, outcome.target_status());
        } else {
            prop_assert_eq!(end, LedgerStatus::Settled);
        }
    }
}
