//! Workflow service for application state transitions.
//!
//! This module implements the state machine that moves a loan application
//! from review to a final status.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use microloan_shared::types::{LoanId, MAX_AMOUNT, UserId};

use crate::ledger::{AmountReconciler, LoanApplication, total_with_interest};
use crate::workflow::error::WorkflowError;
use crate::workflow::types::{ApplicationStatus, StatusChange};

/// Decimal places allowed in a principal.
const LOAN_AMOUNT_SCALE: u32 = 2;

/// Decimal places allowed in an interest rate (`NUMERIC(9, 4)`).
const INTEREST_RATE_SCALE: u32 = 4;

/// Largest interest rate in percent: 99,999.9999.
const MAX_INTEREST_RATE: Decimal = Decimal::from_parts(999_999_999, 0, 0, false, 4);

/// Stateless service for application lifecycle transitions.
///
/// Every transition takes the current application and returns the updated
/// one together with an audit record, leaving the input untouched.
pub struct ApplicationWorkflow;

impl ApplicationWorkflow {
    /// Creates a new pending application.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the principal is not positive, has
    /// more than two decimal places or exceeds `MAX_AMOUNT`, if the rate is
    /// negative, above 99999.9999 or has more than four decimal places, or
    /// if the total with interest would exceed `MAX_AMOUNT`.
    pub fn submit(
        user_id: UserId,
        loan_id: LoanId,
        loan_amount: Decimal,
        interest_rate: Option<Decimal>,
        now: DateTime<Utc>,
    ) -> Result<LoanApplication, WorkflowError> {
        Self::validate_terms(loan_amount, interest_rate)?;
        Ok(LoanApplication::new(
            user_id,
            loan_id,
            loan_amount,
            interest_rate,
            now,
        ))
    }

    /// Approves a pending application and fixes its total.
    ///
    /// The reconciler computes `total_amount` here; it is never recomputed
    /// after this point.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if the application is not pending and
    /// `TotalTooLarge` if the total with interest cannot be represented.
    pub fn approve(
        app: &LoanApplication,
        approved_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<(LoanApplication, StatusChange), WorkflowError> {
        Self::checked_total(app.loan_amount, app.interest_rate)?;
        let (mut next, change) =
            Self::transition(app, ApplicationStatus::Approved, approved_by, now)?;
        next.total_amount = None;
        next.remaining_amount = None;
        Ok((AmountReconciler::reconcile(&next), change))
    }

    /// Rejects a pending application.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if the application is not pending.
    pub fn reject(
        app: &LoanApplication,
        rejected_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<(LoanApplication, StatusChange), WorkflowError> {
        Self::transition(app, ApplicationStatus::Rejected, rejected_by, now)
    }

    /// Cancels a pending application on behalf of its owner.
    ///
    /// Ownership is checked by `AuthorizationGuard`, not here.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if the application is not pending.
    pub fn cancel(
        app: &LoanApplication,
        cancelled_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<(LoanApplication, StatusChange), WorkflowError> {
        Self::transition(app, ApplicationStatus::Cancelled, cancelled_by, now)
    }

    /// Checks loan terms against the storable ranges.
    ///
    /// # Errors
    ///
    /// Returns the first violated bound as a `WorkflowError`.
    pub fn validate_terms(
        loan_amount: Decimal,
        interest_rate: Option<Decimal>,
    ) -> Result<(), WorkflowError> {
        if loan_amount <= Decimal::ZERO {
            return Err(WorkflowError::InvalidLoanAmount);
        }
        if loan_amount > MAX_AMOUNT {
            return Err(WorkflowError::LoanAmountTooLarge(loan_amount));
        }
        if loan_amount.normalize().scale() > LOAN_AMOUNT_SCALE {
            return Err(WorkflowError::LoanAmountPrecision(loan_amount));
        }
        if let Some(rate) = interest_rate {
            if rate < Decimal::ZERO {
                return Err(WorkflowError::NegativeInterestRate);
            }
            if rate > MAX_INTEREST_RATE || rate.normalize().scale() > INTEREST_RATE_SCALE {
                return Err(WorkflowError::InterestRateOutOfRange(rate));
            }
        }
        Self::checked_total(loan_amount, interest_rate).map(|_| ())
    }

    fn checked_total(
        loan_amount: Decimal,
        interest_rate: Option<Decimal>,
    ) -> Result<Decimal, WorkflowError> {
        total_with_interest(loan_amount, interest_rate)
            .filter(|total| *total <= MAX_AMOUNT)
            .ok_or(WorkflowError::TotalTooLarge)
    }

    fn transition(
        app: &LoanApplication,
        to: ApplicationStatus,
        changed_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<(LoanApplication, StatusChange), WorkflowError> {
        if app.status != ApplicationStatus::Pending {
            return Err(WorkflowError::InvalidTransition {
                from: app.status,
                to,
            });
        }

        let mut next = app.clone();
        next.status = to;
        next.updated_at = now;

        let change = StatusChange {
            from: app.status,
            to,
            changed_by,
            changed_at: now,
        };
        Ok((next, change))
    }
}
