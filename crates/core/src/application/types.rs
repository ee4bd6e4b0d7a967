//! Inputs and views of the application service.

use rust_decimal::Decimal;
use serde::Serialize;

use microloan_shared::types::{ApplicationId, LoanId};

use crate::ledger::{LoanApplication, Repayment, RepaymentStatus};

/// Terms for a new application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
    /// Loan product.
    pub loan_id: LoanId,
    /// Principal in major units.
    pub loan_amount: Decimal,
    /// Interest rate in percent.
    pub interest_rate: Option<Decimal>,
}

/// A repayment recorded by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualRepayment {
    /// Amount in major units.
    pub amount: Decimal,
    /// External reference; generated when absent.
    pub transaction_id: Option<String>,
    /// Payment method tag; `manual` when absent.
    pub payment_method: Option<String>,
}

/// Balances and entries of one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerView {
    /// Application id.
    pub application_id: ApplicationId,
    /// Principal plus interest.
    pub total_amount: Decimal,
    /// Sum of the entries.
    pub paid_amount: Decimal,
    /// Outstanding balance (principal for unapproved records).
    pub remaining_amount: Decimal,
    /// Payment progress.
    pub repayment_status: RepaymentStatus,
    /// Entries in ledger order.
    pub repayments: Vec<Repayment>,
}

impl From<&LoanApplication> for LedgerView {
    fn from(app: &LoanApplication) -> Self {
        Self {
            application_id: app.id,
            total_amount: app.total(),
            paid_amount: app.paid_amount,
            remaining_amount: app.remaining_amount.unwrap_or(Decimal::ZERO),
            repayment_status: app.repayment_status,
            repayments: app.repayments.clone(),
        }
    }
}

/// Result of a payment confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmOutcome {
    /// Application after the confirmation.
    pub application: LoanApplication,
    /// False when the transaction id had already been applied.
    pub applied: bool,
}
