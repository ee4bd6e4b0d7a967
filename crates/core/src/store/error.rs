//! Store error types.

use thiserror::Error;

use microloan_shared::AppError;
use microloan_shared::types::ApplicationId;

/// Application store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No application with this id.
    #[error("application {0} not found")]
    NotFound(ApplicationId),

    /// The stored version moved on since the record was read.
    #[error("application {id} was modified concurrently (expected version {expected})")]
    Conflict {
        /// Application id.
        id: ApplicationId,
        /// Version the writer read.
        expected: i64,
    },

    /// A repayment with this transaction id is already stored.
    #[error("transaction {0} is already recorded")]
    DuplicateTransaction(String),

    /// Backend unreachable or failing.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Create an unavailable error.
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(format!("Application {id} not found")),
            StoreError::Conflict { .. } => Self::Conflict(err.to_string()),
            StoreError::DuplicateTransaction(ref txn) => {
                Self::DuplicateTransaction(format!("Transaction {txn} has already been recorded"))
            }
            StoreError::Unavailable(msg) => Self::PersistenceUnavailable(msg),
        }
    }
}
