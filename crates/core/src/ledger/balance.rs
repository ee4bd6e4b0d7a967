//! Balance arithmetic and repayment progress derivation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payment progress of an approved application.
///
/// Ordered: `Pending < InProgress < Complete`. Because repayments only ever
/// increase `paid_amount`, the derived status never moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepaymentStatus {
    /// Nothing repaid yet.
    Pending,
    /// Partially repaid.
    InProgress,
    /// Fully repaid; no further repayments are accepted.
    Complete,
}

impl RepaymentStatus {
    /// Derives the status from the paid and total amounts.
    ///
    /// - `Complete` iff the remaining balance is zero and `total > 0`
    /// - `InProgress` iff `0 < paid < total`
    /// - otherwise `Pending`
    #[must_use]
    pub fn derive(paid: Decimal, total: Decimal) -> Self {
        if total > Decimal::ZERO && remaining_balance(total, paid).is_zero() {
            Self::Complete
        } else if paid > Decimal::ZERO && paid < total {
            Self::InProgress
        } else {
            Self::Pending
        }
    }

    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Complete => "complete",
        }
    }

}

impl fmt::Display for RepaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// `max(0, total - paid)`.
#[must_use]
pub fn remaining_balance(total: Decimal, paid: Decimal) -> Decimal {
    (total - paid).max(Decimal::ZERO)
}

/// Principal plus simple interest, rounded to cents with banker's rounding.
///
/// A missing rate counts as zero. Returns `None` if the arithmetic
/// overflows.
#[must_use]
pub fn total_with_interest(loan_amount: Decimal, interest_rate: Option<Decimal>) -> Option<Decimal> {
    let rate = interest_rate.unwrap_or(Decimal::ZERO);
    let interest = loan_amount
        .checked_mul(rate)?
        .checked_div(Decimal::ONE_HUNDRED)?;
    Some(loan_amount.checked_add(interest)?.round_dp(2))
}
