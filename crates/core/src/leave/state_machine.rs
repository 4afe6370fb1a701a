//! Leave request state machine.
//!
//! The transition graph is fully connected: a reviewer may move a request
//! from any status to any status, including its current one. What the
//! machine decides is the ledger effect of each move.
//!
//! The rule depends on one bit per side of the move. A request is
//! *refunded* when it is `DENIED`, and "no request yet" counts as refunded
//! too. Crossing from refunded to held debits the request's days, crossing
//! back credits them, and staying on the same side touches nothing.

use chrono::{DateTime, Utc};
use hrm_shared::types::UserId;
use rust_decimal::Decimal;

use super::types::{LeaveRequest, LeaveStatus};

/// Returns true when a request in `status` holds none of its days.
///
/// `None` stands for a request that does not exist yet.
#[must_use]
pub const fn is_refunded(status: Option<LeaveStatus>) -> bool {
    matches!(status, None | Some(LeaveStatus::Denied))
}

/// Ledger effect of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceEffect {
    /// No ledger mutation.
    Unchanged,
    /// Days returned to the balance.
    Credit(Decimal),
    /// Days taken from the balance.
    Debit(Decimal),
}

impl BalanceEffect {
    /// Computes the effect of moving from `before` to `after` for a request
    /// worth `total_days`.
    #[must_use]
    pub const fn between(before: Option<LeaveStatus>, after: LeaveStatus, total_days: Decimal) -> Self {
        match (is_refunded(before), is_refunded(Some(after))) {
            (false, true) => Self::Credit(total_days),
            (true, false) => Self::Debit(total_days),
            _ => Self::Unchanged,
        }
    }

    /// Signed delta to apply to the balance.
    #[must_use]
    pub fn delta(&self) -> Decimal {
        match self {
            Self::Unchanged => Decimal::ZERO,
            Self::Credit(days) => *days,
            Self::Debit(days) => -*days,
        }
    }

    /// Returns true when the ledger is not touched.
    #[must_use]
    pub const fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }
}

/// A decided transition, ready to be applied inside a unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveTransition {
    /// Status before the move; `None` for a submission.
    pub from: Option<LeaveStatus>,
    /// Status after the move.
    pub to: LeaveStatus,
    /// Ledger effect.
    pub effect: BalanceEffect,
    /// Reviewer, for review transitions.
    pub reviewed_by: Option<UserId>,
    /// When the transition was decided.
    pub at: DateTime<Utc>,
    /// Reviewer note.
    pub note: Option<String>,
}

impl LeaveTransition {
    /// Writes status and audit fields onto the request.
    ///
    /// The requester's own note is left alone.
    pub fn apply_to(&self, request: &mut LeaveRequest) {
        request.status = self.to;
        request.updated_at = self.at;
        if self.reviewed_by.is_some() {
            request.reviewed_by = self.reviewed_by;
            request.reviewed_at = Some(self.at);
            request.review_note.clone_from(&self.note);
        }
    }
}

/// Stateless decision logic for request transitions.
pub struct LeaveStateMachine;

impl LeaveStateMachine {
    /// Decides the creation of a new request. Always lands on `PENDING`
    /// and always debits.
    #[must_use]
    pub fn submit(total_days: Decimal) -> LeaveTransition {
        LeaveTransition {
            from: None,
            to: LeaveStatus::Pending,
            effect: BalanceEffect::between(None, LeaveStatus::Pending, total_days),
            reviewed_by: None,
            at: Utc::now(),
            note: None,
        }
    }

    /// Decides a reviewer move from `current` to `target`.
    #[must_use]
    pub fn review(
        current: LeaveStatus,
        target: LeaveStatus,
        total_days: Decimal,
        reviewer: UserId,
        note: Option<String>,
    ) -> LeaveTransition {
        LeaveTransition {
            from: Some(current),
            to: target,
            effect: BalanceEffect::between(Some(current), target, total_days),
            reviewed_by: Some(reviewer),
            at: Utc::now(),
            note,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(None, true)]
    #[case(Some(LeaveStatus::Denied), true)]
    #[case(Some(LeaveStatus::Pending), false)]
    #[case(Some(LeaveStatus::Processing), false)]
    #[case(Some(LeaveStatus::Approved), false)]
    fn test_is_refunded(#[case] status: Option<LeaveStatus>, #[case] expected: bool) {
        assert_eq!(is_refunded(status), expected);
    }

    #[rstest]
    #[case(LeaveStatus::Pending, LeaveStatus::Denied, BalanceEffect::Credit(dec!(3)))]
    #[case(LeaveStatus::Approved, LeaveStatus::Denied, BalanceEffect::Credit(dec!(3)))]
    #[case(LeaveStatus::Denied, LeaveStatus::Approved, BalanceEffect::Debit(dec!(3)))]
    #[case(LeaveStatus::Denied, LeaveStatus::Pending, BalanceEffect::Debit(dec!(3)))]
    #[case(LeaveStatus::Denied, LeaveStatus::Denied, BalanceEffect::Unchanged)]
    #[case(LeaveStatus::Pending, LeaveStatus::Approved, BalanceEffect::Unchanged)]
    #[case(LeaveStatus::Processing, LeaveStatus::Pending, BalanceEffect::Unchanged)]
    fn test_review_effect(#[case] from: LeaveStatus, #[case] to: LeaveStatus, #[case] expected: BalanceEffect) {
        let t = LeaveStateMachine::review(from, to, dec!(3), UserId::new(), None);
        assert_eq!(t.effect, expected);
    }

    #[test]
    fn test_submit_debits_and_lands_on_pending() {
        let t = LeaveStateMachine::submit(dec!(2.5));
        assert_eq!(t.from, None);
        assert_eq!(t.to, LeaveStatus::Pending);
        assert_eq!(t.effect, BalanceEffect::Debit(dec!(2.5)));
        assert_eq!(t.effect.delta(), dec!(-2.5));
        assert!(t.reviewed_by.is_none());
    }

    #[test]
    fn test_delta_sign() {
        assert_eq!(BalanceEffect::Credit(dec!(4)).delta(), dec!(4));
        assert_eq!(BalanceEffect::Debit(dec!(4)).delta(), dec!(-4));
        assert_eq!(BalanceEffect::Unchanged.delta(), Decimal::ZERO);
        assert!(BalanceEffect::Unchanged.is_unchanged());
    }
}
