//! Property-based tests for ApplicationWorkflow.
//!
//! Pending is the only status with outgoing transitions, and approval fixes
//! the total from the loan terms.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;

use microloan_shared::types::{LoanId, UserId};

use crate::ledger::{LoanApplication, total_with_interest};
use crate::workflow::error::WorkflowError;
use crate::workflow::service::ApplicationWorkflow;
use crate::workflow::types::ApplicationStatus;

/// Strategy for generating random ApplicationStatus values.
fn arb_status() -> impl Strategy<Value = ApplicationStatus> {
    prop_oneof![
        Just(ApplicationStatus::Pending),
        Just(ApplicationStatus::Approved),
        Just(ApplicationStatus::Rejected),
        Just(ApplicationStatus::Cancelled),
    ]
}

/// Strategy for generating loan amounts (0.01 to 100,000.00).
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for generating interest rates (0.000 to 99.999 percent).
fn arb_rate() -> impl Strategy<Value = Decimal> {
    (0i64..100_000i64).prop_map(|v| Decimal::new(v, 3))
}

fn application(status: ApplicationStatus, amount: Decimal, rate: Decimal) -> LoanApplication {
    let mut app = LoanApplication::new(UserId::new(), LoanId::new(), amount, Some(rate), Utc::now());
    app.status = status;
    app
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Only Pending accepts approve, reject and cancel.
    #[test]
    fn prop_transitions_only_from_pending(
        status in arb_status(),
        amount in arb_amount(),
        rate in arb_rate(),
    ) {
        let app = application(status, amount, rate);
        let actor = UserId::new();
        let now = Utc::now();

        let results = [
            ApplicationWorkflow::approve(&app, actor, now).map(|(a, _)| a.status),
            ApplicationWorkflow::reject(&app, actor, now).map(|(a, _)| a.status),
            ApplicationWorkflow::cancel(&app, actor, now).map(|(a, _)| a.status),
        ];
        let targets = [
            ApplicationStatus::Approved,
            ApplicationStatus::Rejected,
            ApplicationStatus::Cancelled,
        ];

        for (result, to) in results.into_iter().zip(targets) {
            if status == ApplicationStatus::Pending {
                prop_assert_eq!(result, Ok(to));
            } else {
                prop_assert_eq!(result, Err(WorkflowError::InvalidTransition { from: status, to }));
            }
        }
    }

    /// Approval sets the total to principal plus interest.
    #[test]
    fn prop_approve_sets_total(amount in arb_amount(), rate in arb_rate()) {
        let app = application(ApplicationStatus::Pending, amount, rate);
        let (approved, _) = ApplicationWorkflow::approve(&app, UserId::new(), Utc::now()).unwrap();
        let expected = total_with_interest(amount, Some(rate)).unwrap();
        prop_assert_eq!(approved.total_amount, Some(expected));
        prop_assert_eq!(approved.remaining_amount, Some(expected));
        prop_assert!(expected >= amount);
    }

    /// A failed transition leaves the input untouched.
    #[test]
    fn prop_failed_transition_is_pure(status in arb_status(), amount in arb_amount()) {
        prop_assume!(status != ApplicationStatus::Pending);
        let app = application(status, amount, Decimal::ZERO);
        let before = app.clone();
        let _ = ApplicationWorkflow::approve(&app, UserId::new(), Utc::now());
        prop_assert_eq!(app, before);
    }
}
