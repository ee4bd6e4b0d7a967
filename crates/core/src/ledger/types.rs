//! Loan application account record.
//!
//! The application is the unit of the repayment ledger: it carries the loan
//! terms, the lifecycle status, the derived balance fields and the
//! append-only list of repayments.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use microloan_shared::types::{ApplicationId, LoanId, UserId};

use super::balance::{RepaymentStatus, remaining_balance};
use super::entry::Repayment;
use crate::workflow::ApplicationStatus;

/// Status of the one-time intake fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeStatus {
    /// Fee not yet collected.
    Unpaid,
    /// Fee collected.
    Paid,
}

/// Record of the application fee payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    /// Gateway transaction id.
    pub transaction_id: String,
    /// Amount collected, in major units.
    pub amount: Decimal,
    /// When the fee was confirmed.
    pub paid_at: DateTime<Utc>,
    /// Payment method tag.
    pub payment_method: String,
}

/// A loan application together with its repayment ledger.
///
/// `total_amount` and `remaining_amount` are `None` on records created before
/// those fields existed; `AmountReconciler` fills them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplication {
    /// Application ID.
    pub id: ApplicationId,
    /// Loan product applied for.
    pub loan_id: LoanId,
    /// Borrower who owns the application.
    pub user_id: UserId,
    /// Principal, in major units.
    pub loan_amount: Decimal,
    /// Interest rate in percent; `None` is treated as zero.
    pub interest_rate: Option<Decimal>,
    /// Lifecycle status.
    pub status: ApplicationStatus,
    /// Principal plus interest, fixed at approval.
    pub total_amount: Option<Decimal>,
    /// Sum of all repayment amounts.
    pub paid_amount: Decimal,
    /// `max(0, total_amount - paid_amount)`.
    pub remaining_amount: Option<Decimal>,
    /// Derived payment progress.
    pub repayment_status: RepaymentStatus,
    /// Repayments in the order they were accepted.
    pub repayments: Vec<Repayment>,
    /// Intake fee status.
    pub application_fee_status: FeeStatus,
    /// Intake fee payment record.
    pub payment_details: Option<PaymentDetails>,
    /// Optimistic concurrency counter, bumped by the store on every write.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl LoanApplication {
    /// Creates a freshly submitted application with zeroed financial fields.
    #[must_use]
    pub fn new(
        user_id: UserId,
        loan_id: LoanId,
        loan_amount: Decimal,
        interest_rate: Option<Decimal>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ApplicationId::new(),
            loan_id,
            user_id,
            loan_amount,
            interest_rate,
            status: ApplicationStatus::Pending,
            total_amount: Some(Decimal::ZERO),
            paid_amount: Decimal::ZERO,
            remaining_amount: Some(Decimal::ZERO),
            repayment_status: RepaymentStatus::Pending,
            repayments: Vec::new(),
            application_fee_status: FeeStatus::Unpaid,
            payment_details: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Total amount owed, zero when not yet fixed.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.total_amount.unwrap_or(Decimal::ZERO)
    }

    /// Remaining balance computed from the authoritative fields.
    ///
    /// Unlike `remaining_amount`, this never reflects the display-only
    /// fallback used for unapproved records.
    #[must_use]
    pub fn outstanding(&self) -> Decimal {
        remaining_balance(self.total(), self.paid_amount)
    }

    /// Returns true if the owner is `user_id`.
    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }

    /// Returns true if a repayment with this transaction id is in the ledger.
    #[must_use]
    pub fn has_transaction(&self, transaction_id: &str) -> bool {
        self.repayments
            .iter()
            .any(|r| r.transaction_id == transaction_id)
    }
}
