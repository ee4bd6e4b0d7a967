//! Repayment ledger and amount reconciliation.
//!
//! This module implements the financial side of a loan application:
//! - Repayment entries (append-only)
//! - Balance arithmetic and repayment progress
//! - The application account record
//! - Reconciliation of legacy records
//! - The repayment write path

pub mod balance;
pub mod entry;
pub mod error;
pub mod reconcile;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use balance::{RepaymentStatus, remaining_balance, total_with_interest};
pub use entry::{
    MAX_PAYMENT_METHOD_LEN, MAX_TRANSACTION_ID_LEN, PAYMENT_METHOD_CARD, PAYMENT_METHOD_MANUAL,
    Repayment, RepaymentInput, total_repaid,
};
pub use error::LedgerError;
pub use reconcile::AmountReconciler;
pub use service::RepaymentLedger;
pub use types::{FeeStatus, LoanApplication, PaymentDetails};
