//! Property-based tests for the leave state machine.

use hrm_shared::types::UserId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::leave::state_machine::{BalanceEffect, LeaveStateMachine, is_refunded};
use crate::leave::types::LeaveStatus;

/// Strategy for generating random LeaveStatus values.
fn arb_status() -> impl Strategy<Value = LeaveStatus> {
    prop_oneof![
        Just(LeaveStatus::Pending),
        Just(LeaveStatus::Processing),
        Just(LeaveStatus::Approved),
        Just(LeaveStatus::Denied),
    ]
}

/// Day counts with up to two decimal places, 0.01..=60.00.
fn arb_days() -> impl Strategy<Value = Decimal> {
    (1i64..=6000).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Moves that keep the refunded bit never touch the ledger.
    #[test]
    fn prop_same_refundedness_is_unchanged(from in arb_status(), to in arb_status(), days in arb_days()) {
        let t = LeaveStateMachine::review(from, to, days, UserId::new(), None);
        if is_refunded(Some(from)) == is_refunded(Some(to)) {
            prop_assert_eq!(t.effect, BalanceEffect::Unchanged);
        } else {
            prop_assert_eq!(t.effect.delta().abs(), days);
        }
    }

    /// The net ledger effect of a submission followed by any review path
    /// depends only on where the path ends.
    #[test]
    fn prop_net_effect_depends_only_on_final_status(
        path in prop::collection::vec(arb_status(), 0..12),
        days in arb_days(),
    ) {
        let mut net = LeaveStateMachine::submit(days).effect.delta();
        let mut current = LeaveStatus::Pending;
        for next in path {
            net += LeaveStateMachine::review(current, next, days, UserId::new(), None).effect.delta();
            // Never refunded twice, never charged twice.
            prop_assert!(net == Decimal::ZERO || net == -days);
            current = next;
        }
        if current == LeaveStatus::Denied {
            prop_assert_eq!(net, Decimal::ZERO);
        } else {
            prop_assert_eq!(net, -days);
        }
    }

    /// The amount moved is always exactly the frozen day count.
    #[test]
    fn prop_effect_amount_is_total_days(from in arb_status(), to in arb_status(), days in arb_days()) {
        match LeaveStateMachine::review(from, to, days, UserId::new(), None).effect {
            BalanceEffect::Credit(d) | BalanceEffect::Debit(d) => prop_assert_eq!(d, days),
            BalanceEffect::Unchanged => {}
        }
    }
}
