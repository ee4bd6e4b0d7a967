//! Workflow error types for the application lifecycle.

use rust_decimal::Decimal;
use thiserror::Error;

use microloan_shared::AppError;
use microloan_shared::types::MAX_AMOUNT;

use crate::workflow::types::ApplicationStatus;

/// Errors that can occur during workflow operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: ApplicationStatus,
        /// The attempted target status.
        to: ApplicationStatus,
    },

    /// Loan amount is zero or negative.
    #[error("Loan amount must be greater than zero")]
    InvalidLoanAmount,

    /// Interest rate is negative.
    #[error("Interest rate cannot be negative")]
    NegativeInterestRate,

    /// Loan amount is above the largest storable amount.
    #[error("Loan amount {0} exceeds the maximum of {MAX_AMOUNT}")]
    LoanAmountTooLarge(Decimal),

    /// Loan amount has more precision than the currency's minor unit.
    #[error("Loan amount {0} has more than two decimal places")]
    LoanAmountPrecision(Decimal),

    /// Interest rate is above the limit or too precise.
    #[error("Interest rate {0} must be at most 99999.9999 with at most four decimal places")]
    InterestRateOutOfRange(Decimal),

    /// Principal plus interest does not fit a balance.
    #[error("Loan amount with interest exceeds the maximum of {MAX_AMOUNT}")]
    TotalTooLarge,
}

impl WorkflowError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_STATE",
            Self::InvalidLoanAmount
            | Self::NegativeInterestRate
            | Self::LoanAmountTooLarge(_)
            | Self::LoanAmountPrecision(_)
            | Self::InterestRateOutOfRange(_)
            | Self::TotalTooLarge => "VALIDATION_ERROR",
        }
    }
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::InvalidTransition { .. } => Self::InvalidState(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}
