//! Amount reconciliation.
//!
//! Records written before the balance fields existed have `total_amount` and
//! `remaining_amount` unset, and older writers did not always keep
//! `paid_amount` in step with the entries. `AmountReconciler` rebuilds every
//! derived field from the authoritative ones: loan terms, status and the
//! repayment entries.

use rust_decimal::Decimal;

use super::balance::{RepaymentStatus, remaining_balance, total_with_interest};
use super::entry::total_repaid;
use super::types::LoanApplication;
use crate::workflow::ApplicationStatus;

/// Derives and repairs the balance fields of an application.
pub struct AmountReconciler;

impl AmountReconciler {
    /// Returns the application with every derived field brought in line.
    ///
    /// - Approved with `total_amount` unset or zero: the total is computed
    ///   from the loan terms. Terms whose total overflows leave it unset, so
    ///   nothing can be repaid against them.
    /// - Not approved with `total_amount` unset: the total stays zero and
    ///   `remaining_amount` shows the principal. That figure is for display
    ///   only; the ledger never checks against it.
    /// - `paid_amount` is the sum of the entries.
    /// - `remaining_amount` is `max(0, total - paid)`.
    /// - `repayment_status` is derived from paid and total.
    ///
    /// Reconciling twice gives the same result as reconciling once.
    #[must_use]
    pub fn reconcile(app: &LoanApplication) -> LoanApplication {
        let mut out = app.clone();
        out.paid_amount = total_repaid(&out.repayments);

        let total_unset = out.total_amount.is_none_or(|t| t.is_zero());

        if out.status == ApplicationStatus::Approved {
            if total_unset
                && let Some(total) = total_with_interest(out.loan_amount, out.interest_rate)
            {
                out.total_amount = Some(total);
            }
            out.remaining_amount = Some(remaining_balance(out.total(), out.paid_amount));
        } else if out.total_amount.is_none() {
            out.total_amount = Some(Decimal::ZERO);
            out.remaining_amount = Some(out.loan_amount);
        } else if out.remaining_amount.is_none_or(|r| r.is_sign_negative()) {
            out.remaining_amount = Some(remaining_balance(out.total(), out.paid_amount));
        }

        out.repayment_status = RepaymentStatus::derive(out.paid_amount, out.total());
        out
    }

    /// Returns true if reconciling would change a stored field of an
    /// approved application.
    ///
    /// Read paths use this to persist a backfill only when one is due. The
    /// display fallback of unapproved records is never persisted.
    #[must_use]
    pub fn needs_backfill(app: &LoanApplication) -> bool {
        if app.status != ApplicationStatus::Approved {
            return false;
        }
        let reconciled = Self::reconcile(app);
        reconciled.total_amount != app.total_amount
            || reconciled.remaining_amount != app.remaining_amount
            || reconciled.paid_amount != app.paid_amount
            || reconciled.repayment_status != app.repayment_status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use microloan_shared::types::{LoanId, UserId};
    use rust_decimal_macros::dec;

    use crate::ledger::entry::{PAYMENT_METHOD_MANUAL, Repayment};

    fn legacy(status: ApplicationStatus) -> LoanApplication {
        let mut app = LoanApplication::new(
            UserId::new(),
            LoanId::new(),
            dec!(1000),
            Some(dec!(10)),
            Utc::now(),
        );
        app.status = status;
        app.total_amount = None;
        app.remaining_amount = None;
        app
    }

    #[test]
    fn test_backfills_approved_total() {
        let app = legacy(ApplicationStatus::Approved);
        assert!(AmountReconciler::needs_backfill(&app));

        let out = AmountReconciler::reconcile(&app);
        assert_eq!(out.total_amount, Some(dec!(1100)));
        assert_eq!(out.remaining_amount, Some(dec!(1100)));
        assert_eq!(out.repayment_status, RepaymentStatus::Pending);
        assert!(!AmountReconciler::needs_backfill(&out));
    }

    #[test]
    fn test_zero_total_on_approved_is_recomputed() {
        let mut app = legacy(ApplicationStatus::Approved);
        app.total_amount = Some(Decimal::ZERO);
        app.remaining_amount = Some(Decimal::ZERO);

        let out = AmountReconciler::reconcile(&app);
        assert_eq!(out.total_amount, Some(dec!(1100)));
        assert_eq!(out.remaining_amount, Some(dec!(1100)));
    }

    #[test]
    fn test_pending_legacy_shows_principal_as_remaining() {
        let app = legacy(ApplicationStatus::Pending);
        assert!(!AmountReconciler::needs_backfill(&app));
        let out = AmountReconciler::reconcile(&app);
        assert_eq!(out.total_amount, Some(Decimal::ZERO));
        assert_eq!(out.remaining_amount, Some(dec!(1000)));
        assert_eq!(out.outstanding(), Decimal::ZERO);
    }

    #[test]
    fn test_negative_remaining_is_recomputed() {
        let mut app = legacy(ApplicationStatus::Rejected);
        app.total_amount = Some(Decimal::ZERO);
        app.remaining_amount = Some(dec!(-5));

        let out = AmountReconciler::reconcile(&app);
        assert_eq!(out.remaining_amount, Some(Decimal::ZERO));
    }

    #[test]
    fn test_paid_amount_rederived_from_entries() {
        let mut app = legacy(ApplicationStatus::Approved);
        app.repayments.push(Repayment {
            amount: dec!(250),
            paid_at: Utc::now(),
            transaction_id: "m-1".into(),
            payment_method: PAYMENT_METHOD_MANUAL.into(),
        });
        app.paid_amount = Decimal::ZERO;

        let out = AmountReconciler::reconcile(&app);
        assert_eq!(out.paid_amount, dec!(250));
        assert_eq!(out.remaining_amount, Some(dec!(850)));
        assert_eq!(out.repayment_status, RepaymentStatus::InProgress);
    }

    #[test]
    fn test_fixed_total_is_never_recomputed() {
        let mut app = legacy(ApplicationStatus::Approved);
        app.total_amount = Some(dec!(1234.56));
        app.interest_rate = Some(dec!(50));

        let out = AmountReconciler::reconcile(&app);
        assert_eq!(out.total_amount, Some(dec!(1234.56)));
    }
}
