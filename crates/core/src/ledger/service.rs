//! Repayment ledger.
//!
//! This module holds the single write path for repayments. It validates a
//! repayment against a reconciled copy of the application and returns the
//! updated application as a new value, so a failed call leaves the caller's
//! record untouched.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::balance::{RepaymentStatus, remaining_balance};
use super::entry::{MAX_PAYMENT_METHOD_LEN, MAX_TRANSACTION_ID_LEN, Repayment, RepaymentInput};
use super::error::LedgerError;
use super::reconcile::AmountReconciler;
use super::types::LoanApplication;
use crate::workflow::ApplicationStatus;

/// Smallest currency unit the ledger accepts: two decimal places.
const MONEY_SCALE: u32 = 2;

/// Repayment ledger over a single application.
///
/// Stateless: the application is passed in and a new one is returned.
pub struct RepaymentLedger;

impl RepaymentLedger {
    /// Records one repayment.
    ///
    /// Checks run in this order and the first failure wins:
    /// 1. The application is approved.
    /// 2. The amount is positive and has at most two decimal places, and the
    ///    transaction id and payment method fit their columns.
    /// 3. The application is reconciled.
    /// 4. The amount does not exceed the remaining balance.
    /// 5. The transaction id is not already in the ledger.
    ///
    /// On success the entry is appended and `paid_amount`,
    /// `remaining_amount` and `repayment_status` are recomputed.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if any check fails.
    pub fn record_repayment(
        app: &LoanApplication,
        input: RepaymentInput,
        now: DateTime<Utc>,
    ) -> Result<LoanApplication, LedgerError> {
        if app.status != ApplicationStatus::Approved {
            return Err(LedgerError::NotApproved { status: app.status });
        }

        Self::validate_amount(input.amount)?;
        check_len("transactionId", &input.transaction_id, MAX_TRANSACTION_ID_LEN)?;
        check_len("paymentMethod", &input.payment_method, MAX_PAYMENT_METHOD_LEN)?;

        let mut next = AmountReconciler::reconcile(app);

        let remaining = next.outstanding();
        if input.amount > remaining {
            return Err(LedgerError::ExceedsRemaining {
                amount: input.amount,
                remaining,
            });
        }

        if next.has_transaction(&input.transaction_id) {
            return Err(LedgerError::DuplicateTransaction(input.transaction_id));
        }

        next.repayments.push(Repayment {
            amount: input.amount,
            paid_at: now,
            transaction_id: input.transaction_id,
            payment_method: input.payment_method,
        });
        next.paid_amount += input.amount;
        next.remaining_amount = Some(remaining_balance(next.total(), next.paid_amount));
        next.repayment_status = RepaymentStatus::derive(next.paid_amount, next.total());
        next.updated_at = now;

        tracing::debug!(
            application_id = %next.id,
            amount = %input.amount,
            paid = %next.paid_amount,
            status = %next.repayment_status,
            "repayment recorded"
        );

        Ok(next)
    }

    /// Validates a repayment amount on its own.
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveAmount` or `SubCentAmount`.
    pub fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount);
        }
        if amount.normalize().scale() > MONEY_SCALE {
            return Err(LedgerError::SubCentAmount(amount));
        }
        Ok(())
    }
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), LedgerError> {
    if value.chars().count() > max {
        return Err(LedgerError::FieldTooLong { field, max });
    }
    Ok(())
}
