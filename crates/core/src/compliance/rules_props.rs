//! Property-based tests for the rule engine.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::compliance::rules::{REG_CF_CAP_FLOOR, RuleEngine};
use crate::compliance::types::AccreditationStatus;
use crate::test_support::investor;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
}

/// Whole-cent amounts up to 10 million.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_optional_amount() -> impl Strategy<Value = Option<Decimal>> {
    prop_oneof![Just(None), arb_amount().prop_map(Some)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Non-accredited: pass iff trailing + amount <= max(2500, min(income, nw) * 0.05).
    #[test]
    fn prop_limit_matches_formula(
        income in arb_optional_amount(),
        net_worth in arb_optional_amount(),
        amount in arb_amount(),
        trailing in arb_amount(),
    ) {
        let mut inv = investor(now());
        inv.annual_income = income;
        inv.net_worth = net_worth;

        let base = income.unwrap_or_default().min(net_worth.unwrap_or_default());
        let cap = (base * Decimal::new(5, 2)).max(Decimal::new(2500, 0));

        prop_assert_eq!(
            RuleEngine::check_investment_limit(&inv, amount, trailing),
            trailing + amount <= cap
        );
    }

    /// The cap never drops below the floor.
    #[test]
    fn prop_cap_at_least_floor(income in arb_optional_amount(), net_worth in arb_optional_amount()) {
        let mut inv = investor(now());
        inv.annual_income = income;
        inv.net_worth = net_worth;
        prop_assert!(RuleEngine::investment_cap(&inv) >= REG_CF_CAP_FLOOR);
    }

    /// Accredited investors are never capped.
    #[test]
    fn prop_accredited_always_pass(amount in arb_amount(), trailing in arb_amount()) {
        let mut inv = investor(now());
        inv.is_accredited = true;
        prop_assert!(RuleEngine::check_investment_limit(&inv, amount, trailing));
    }

    /// Cancellation is open iff strictly more than 48 hours remain.
    #[test]
    fn prop_cancellation_window(offset_secs in -1_000_000i64..1_000_000) {
        let deadline = now() + Duration::seconds(offset_secs);
        prop_assert_eq!(
            RuleEngine::check_cancellation_window(deadline, now()),
            offset_secs > 48 * 3600
        );
    }

    /// 506(c) passes iff verified and expiry is not in the past.
    #[test]
    fn prop_506c_expiry(offset_secs in -1_000_000i64..1_000_000) {
        let mut inv = investor(now());
        inv.accreditation_status = AccreditationStatus::VerifiedDocs;
        inv.accreditation_expiry = Some(now() + Duration::seconds(offset_secs));
        prop_assert_eq!(RuleEngine::check_reg_d_506c(&inv, now()), offset_secs >= 0);
    }

    /// Lockup never lifts before 365 days and always lifts after 366.
    #[test]
    fn prop_lockup_bounds(days_ago in 0i64..2000, secs in 0i64..86_400) {
        let original = now() - Duration::days(days_ago) - Duration::seconds(secs);
        let elapsed = now() - original;
        let allowed = RuleEngine::check_lockup_period(original, now());
        if elapsed < Duration::days(365) {
            prop_assert!(!allowed);
        }
        if elapsed >= Duration::days(366) {
            prop_assert!(allowed);
        }
    }
}
