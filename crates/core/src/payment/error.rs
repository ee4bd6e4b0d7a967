//! Payment error types.

use thiserror::Error;

use microloan_shared::AppError;
use microloan_shared::types::{MinorUnits, MoneyError};

use crate::ledger::LedgerError;
use crate::workflow::ApplicationStatus;

/// Errors from payment intent creation and confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// No gateway configured for this deployment.
    #[error("payment gateway is not configured")]
    Unavailable,

    /// The gateway rejected the request; carries its message.
    #[error("{0}")]
    Rejected(String),

    /// The gateway did not answer in time.
    #[error("payment gateway timed out")]
    Timeout,

    /// Network or decoding failure talking to the gateway.
    #[error("payment gateway request failed: {0}")]
    Transport(String),

    /// The application fee was already collected.
    #[error("application fee has already been paid")]
    FeeAlreadyPaid,

    /// Gateway payments for repayments need an approved application.
    #[error("payments are only accepted on approved applications (status is {0})")]
    NotApproved(ApplicationStatus),

    /// The intent has not been paid.
    #[error("payment {transaction_id} has not succeeded")]
    NotSucceeded {
        /// Gateway intent id.
        transaction_id: String,
    },

    /// The intent was opened for another application or kind.
    #[error("payment {0} does not belong to this application")]
    IntentMismatch(String),

    /// The confirmed amount differs from what the gateway captured.
    #[error("confirmed amount {confirmed} does not match the captured amount {captured}")]
    AmountMismatch {
        /// Amount in the confirmation, minor units.
        confirmed: MinorUnits,
        /// Amount on the intent, minor units.
        captured: MinorUnits,
    },

    /// Amount is zero or negative.
    #[error("payment amount must be greater than zero")]
    NonPositiveAmount,

    /// Transaction id is not a gateway intent id.
    #[error("transaction id {0} is not a valid payment id")]
    InvalidTransactionId(String),

    /// Amount cannot be expressed in minor units.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// The ledger refused the repayment.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl PaymentError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable => "GATEWAY_UNAVAILABLE",
            Self::Rejected(_)
            | Self::Timeout
            | Self::Transport(_)
            | Self::NotSucceeded { .. }
            | Self::IntentMismatch(_) => "GATEWAY_ERROR",
            Self::FeeAlreadyPaid | Self::NotApproved(_) => "INVALID_STATE",
            Self::AmountMismatch { .. } | Self::NonPositiveAmount | Self::Money(_) => {
                "INVALID_AMOUNT"
            }
            Self::InvalidTransactionId(_) => "VALIDATION_ERROR",
            Self::Ledger(err) => err.error_code(),
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Unavailable => Self::GatewayUnavailable,
            PaymentError::Ledger(inner) => inner.into(),
            PaymentError::Rejected(_)
            | PaymentError::Timeout
            | PaymentError::Transport(_)
            | PaymentError::NotSucceeded { .. }
            | PaymentError::IntentMismatch(_) => Self::GatewayError(err.to_string()),
            PaymentError::FeeAlreadyPaid | PaymentError::NotApproved(_) => {
                Self::InvalidState(err.to_string())
            }
            PaymentError::InvalidTransactionId(_) => Self::Validation(err.to_string()),
            PaymentError::AmountMismatch { .. }
            | PaymentError::NonPositiveAmount
            | PaymentError::Money(_) => Self::InvalidAmount(err.to_string()),
        }
    }
}
