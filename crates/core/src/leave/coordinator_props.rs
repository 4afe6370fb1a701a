//! Property-based tests for ledger effects driven through the coordinator.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use hrm_shared::types::{EmployeeId, OrganizationId, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::leave::coordinator::LeaveCoordinator;
use crate::leave::error::LeaveError;
use crate::leave::ledger::LeaveBalances;
use crate::leave::memory::MemoryLeaveStore;
use crate::leave::types::{
    ChangeStatusInput, LeaveCategory, LeaveStatus, OpenAccountInput, SubmitLeaveInput,
};

fn arb_status() -> impl Strategy<Value = LeaveStatus> {
    prop_oneof![
        Just(LeaveStatus::Pending),
        Just(LeaveStatus::Processing),
        Just(LeaveStatus::Approved),
        Just(LeaveStatus::Denied),
    ]
}

fn arb_category() -> impl Strategy<Value = LeaveCategory> {
    prop_oneof![
        Just(LeaveCategory::Casual),
        Just(LeaveCategory::Sick),
        Just(LeaveCategory::Annual),
        Just(LeaveCategory::Parental),
    ]
}

/// Balances with two decimal places, 0.00..=40.00.
fn arb_balance() -> impl Strategy<Value = Decimal> {
    (0i64..=4000).prop_map(|cents| Decimal::new(cents, 2))
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

async fn open(opening: Decimal, category: LeaveCategory) -> (LeaveCoordinator, OrganizationId, EmployeeId) {
    let coordinator = LeaveCoordinator::new(Arc::new(MemoryLeaveStore::new()));
    let org = OrganizationId::new();
    let employee = EmployeeId::new();
    let mut balances = LeaveBalances::default();
    balances.set(category, opening);
    coordinator
        .open_account(OpenAccountInput {
            organization_id: org,
            employee_id: employee,
            employee_name: "Rafiq Islam".into(),
            employee_code: "FIN-9".into(),
            opening: balances,
        })
        .await
        .unwrap();
    (coordinator, org, employee)
}

fn submission(org: OrganizationId, employee: EmployeeId, category: LeaveCategory, days: i64) -> SubmitLeaveInput {
    let start = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
    SubmitLeaveInput {
        organization_id: org,
        employee_id: employee,
        request_id: None,
        category,
        start_date: start,
        end_date: start + Duration::days(days - 1),
        reason: "Scheduled personal leave".into(),
        note: None,
        attachments: vec![],
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A submission succeeds exactly when the balance covers it and then
    /// debits exactly the charged days.
    #[test]
    fn prop_submission_debits_exactly(
        opening in arb_balance(),
        category in arb_category(),
        days in 1i64..=15,
    ) {
        runtime().block_on(async {
            let (coordinator, org, employee) = open(opening, category).await;
            let result = coordinator.submit(submission(org, employee, category, days)).await;
            let after = coordinator.get_balance(org, employee, category).await.unwrap();
            let cost = Decimal::from(days);
            if opening >= cost {
                let request = result.unwrap();
                assert_eq!(request.total_days, cost);
                assert_eq!(after, opening - cost);
            } else {
                assert!(matches!(result, Err(LeaveError::InsufficientBalance { .. })));
                assert_eq!(after, opening);
            }
        });
    }

    /// With no competing requests, any review path ending at DENIED
    /// restores the opening balance, and any other ending leaves the
    /// request's days debited.
    #[test]
    fn prop_review_path_settles_on_final_status(
        days in 1i64..=10,
        path in prop::collection::vec(arb_status(), 1..10),
    ) {
        runtime().block_on(async {
            let opening = Decimal::from(10);
            let (coordinator, org, employee) = open(opening, LeaveCategory::Annual).await;
            let request = coordinator
                .submit(submission(org, employee, LeaveCategory::Annual, days))
                .await
                .unwrap();

            for status in &path {
                coordinator
                    .change_status(ChangeStatusInput {
                        organization_id: org,
                        request_id: request.id,
                        reviewer_id: UserId::new(),
                        new_status: *status,
                        note: None,
                    })
                    .await
                    .unwrap();
            }

            let balance = coordinator
                .get_balance(org, employee, LeaveCategory::Annual)
                .await
                .unwrap();
            if path.last() == Some(&LeaveStatus::Denied) {
                assert_eq!(balance, opening);
            } else {
                assert_eq!(balance, opening - Decimal::from(days));
            }
            assert!(balance >= Decimal::ZERO);
        });
    }
}
