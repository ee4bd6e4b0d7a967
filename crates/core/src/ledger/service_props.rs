//! Property-based tests for the repayment ledger and reconciler.
//!
//! - Property 1: paid amount equals the sum of the entries
//! - Property 2: remaining amount equals max(0, total - paid)
//! - Property 3: reconciliation is idempotent
//! - Property 4: rejected repayments leave the application unchanged
//! - Property 5: repayment status never regresses

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;

use microloan_shared::types::{LoanId, UserId};

use super::balance::{RepaymentStatus, remaining_balance};
use super::entry::{PAYMENT_METHOD_MANUAL, RepaymentInput, total_repaid};
use super::error::LedgerError;
use super::reconcile::AmountReconciler;
use super::service::RepaymentLedger;
use super::types::LoanApplication;
use crate::workflow::ApplicationStatus;

/// Strategy to generate principal amounts (1.00 to 100,000.00).
fn principal() -> impl Strategy<Value = Decimal> {
    (100i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate interest rates (0.00 to 50.00 percent).
fn rate() -> impl Strategy<Value = Option<Decimal>> {
    prop_oneof![
        Just(None),
        (0i64..5_000i64).prop_map(|v| Some(Decimal::new(v, 2))),
    ]
}

/// Strategy to generate repayment amounts (0.01 to 20,000.00).
fn payment() -> impl Strategy<Value = Decimal> {
    (1i64..2_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate any application status.
fn status() -> impl Strategy<Value = ApplicationStatus> {
    prop_oneof![
        Just(ApplicationStatus::Pending),
        Just(ApplicationStatus::Approved),
        Just(ApplicationStatus::Rejected),
        Just(ApplicationStatus::Cancelled),
    ]
}

/// Helper to create an approved application with its total fixed.
fn approved(loan: Decimal, rate: Option<Decimal>) -> LoanApplication {
    let mut app = LoanApplication::new(UserId::new(), LoanId::new(), loan, rate, Utc::now());
    app.status = ApplicationStatus::Approved;
    AmountReconciler::reconcile(&app)
}

/// Helper to build a legacy record with unset derived fields.
fn legacy(
    loan: Decimal,
    rate: Option<Decimal>,
    status: ApplicationStatus,
    remaining: Option<Decimal>,
) -> LoanApplication {
    let mut app = LoanApplication::new(UserId::new(), LoanId::new(), loan, rate, Utc::now());
    app.status = status;
    app.total_amount = None;
    app.remaining_amount = remaining;
    app
}

/// Applies a sequence of payments, skipping the rejected ones.
fn apply_all(
    mut app: LoanApplication,
    payments: &[Decimal],
) -> (LoanApplication, Vec<RepaymentStatus>) {
    let mut statuses = vec![app.repayment_status];
    for (i, amount) in payments.iter().enumerate() {
        let input = RepaymentInput::new(*amount, format!("txn-{i}"), PAYMENT_METHOD_MANUAL);
        if let Ok(next) = RepaymentLedger::record_repayment(&app, input, Utc::now()) {
            app = next;
        }
        statuses.push(app.repayment_status);
    }
    (app, statuses)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property 1 and 2: balance invariants hold after any payment sequence.
    #[test]
    fn prop_balance_invariants(
        loan in principal(),
        rate in rate(),
        payments in prop::collection::vec(payment(), 0..12),
    ) {
        let (app, _) = apply_all(approved(loan, rate), &payments);

        prop_assert_eq!(app.paid_amount, total_repaid(&app.repayments));
        prop_assert_eq!(
            app.remaining_amount,
            Some(remaining_balance(app.total(), app.paid_amount))
        );
        prop_assert!(app.paid_amount <= app.total());
        prop_assert_eq!(
            app.repayment_status,
            RepaymentStatus::derive(app.paid_amount, app.total())
        );
    }

    /// Property 3: reconcile(reconcile(x)) == reconcile(x).
    #[test]
    fn prop_reconcile_idempotent(
        loan in principal(),
        rate in rate(),
        status in status(),
        remaining in prop_oneof![
            Just(None),
            (-100_000i64..100_000i64).prop_map(|c| Some(Decimal::new(c, 2))),
        ],
    ) {
        let app = legacy(loan, rate, status, remaining);
        let once = AmountReconciler::reconcile(&app);
        let twice = AmountReconciler::reconcile(&once);
        prop_assert_eq!(&once, &twice);
        prop_assert!(!AmountReconciler::needs_backfill(&once));
        prop_assert!(once.remaining_amount.is_some_and(|r| r >= Decimal::ZERO));
    }

    /// Property 3: the total is fixed once and survives later reconciles.
    #[test]
    fn prop_total_fixed_after_approval(
        loan in principal(),
        rate in rate(),
        payments in prop::collection::vec(payment(), 0..6),
    ) {
        let app = approved(loan, rate);
        let total = app.total_amount;
        let (app, _) = apply_all(app, &payments);
        prop_assert_eq!(app.total_amount, total);
        prop_assert_eq!(AmountReconciler::reconcile(&app).total_amount, total);
    }

    /// Property 4: overpayment is rejected and the input is untouched.
    #[test]
    fn prop_overpayment_rejected(loan in principal(), rate in rate(), extra in payment()) {
        let app = approved(loan, rate);
        let before = app.clone();
        let amount = app.total() + extra;
        let result = RepaymentLedger::record_repayment(
            &app,
            RepaymentInput::new(amount, "over", PAYMENT_METHOD_MANUAL),
            Utc::now(),
        );
        let is_exceeds = matches!(result, Err(LedgerError::ExceedsRemaining { .. }));
        prop_assert!(is_exceeds);
        prop_assert_eq!(app, before);
    }

    /// Property 4: non-approved applications never accept repayments.
    #[test]
    fn prop_non_approved_rejected(loan in principal(), rate in rate(), amount in payment()) {
        for status in [
            ApplicationStatus::Pending,
            ApplicationStatus::Rejected,
            ApplicationStatus::Cancelled,
        ] {
            let app = legacy(loan, rate, status, None);
            let result = RepaymentLedger::record_repayment(
                &app,
                RepaymentInput::new(amount, "t", PAYMENT_METHOD_MANUAL),
                Utc::now(),
            );
            prop_assert_eq!(result, Err(LedgerError::NotApproved { status }));
        }
    }

    /// Property 5: repayment status is monotonically non-decreasing.
    #[test]
    fn prop_status_monotonic(
        loan in principal(),
        rate in rate(),
        payments in prop::collection::vec(payment(), 1..12),
    ) {
        let (_, statuses) = apply_all(approved(loan, rate), &payments);
        for pair in statuses.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
    }
}
