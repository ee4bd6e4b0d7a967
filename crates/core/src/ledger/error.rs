//! Ledger error types.
//!
//! Every failure of `RepaymentLedger::record_repayment` is one of these.
//! All of them are raised before the application is touched.

use rust_decimal::Decimal;
use thiserror::Error;

use microloan_shared::AppError;

use crate::workflow::ApplicationStatus;

/// Errors that can occur while recording a repayment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Repayments are only accepted on approved applications.
    #[error("Repayments are only accepted on approved applications (status is {status})")]
    NotApproved {
        /// Current application status.
        status: ApplicationStatus,
    },

    /// Amount is zero or negative.
    #[error("Repayment amount must be greater than zero")]
    NonPositiveAmount,

    /// Amount has more precision than the currency's minor unit.
    #[error("Repayment amount {0} has more than two decimal places")]
    SubCentAmount(Decimal),

    /// Amount is above the outstanding balance.
    #[error("Repayment amount {amount} exceeds the remaining balance; the maximum is {remaining}")]
    ExceedsRemaining {
        /// Requested amount.
        amount: Decimal,
        /// Outstanding balance at the time of the request.
        remaining: Decimal,
    },

    /// A text field is longer than the ledger stores.
    #[error("{field} must be at most {max} characters")]
    FieldTooLong {
        /// Request field name.
        field: &'static str,
        /// Maximum length in characters.
        max: usize,
    },

    /// Transaction id is already in the ledger.
    #[error("Transaction {0} has already been recorded")]
    DuplicateTransaction(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotApproved { .. } => "INVALID_STATE",
            Self::NonPositiveAmount | Self::SubCentAmount(_) | Self::ExceedsRemaining { .. } => {
                "INVALID_AMOUNT"
            }
            Self::FieldTooLong { .. } => "VALIDATION_ERROR",
            Self::DuplicateTransaction(_) => "DUPLICATE_TRANSACTION",
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::NotApproved { .. } => Self::InvalidState(message),
            LedgerError::NonPositiveAmount
            | LedgerError::SubCentAmount(_)
            | LedgerError::ExceedsRemaining { .. } => Self::InvalidAmount(message),
            LedgerError::FieldTooLong { .. } => Self::Validation(message),
            LedgerError::DuplicateTransaction(_) => Self::DuplicateTransaction(message),
        }
    }
}
