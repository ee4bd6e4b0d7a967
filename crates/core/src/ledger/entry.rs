//! Repayment ledger entries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment method tag for card payments captured through the gateway.
pub const PAYMENT_METHOD_CARD: &str = "card";

/// Payment method tag used when a repayment is recorded by hand.
pub const PAYMENT_METHOD_MANUAL: &str = "manual";

/// Longest transaction id a ledger entry can hold, in characters.
pub const MAX_TRANSACTION_ID_LEN: usize = 255;

/// Longest payment method tag a ledger entry can hold, in characters.
pub const MAX_PAYMENT_METHOD_LEN: usize = 50;

/// A single repayment against an application's balance.
///
/// Entries are append-only: once recorded they are never edited or removed,
/// and their order in the ledger is the order they were accepted in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repayment {
    /// Amount repaid, in major units (always positive).
    pub amount: Decimal,
    /// Server-assigned time the repayment was recorded.
    pub paid_at: DateTime<Utc>,
    /// Opaque id from the payment gateway or manual entry.
    pub transaction_id: String,
    /// How the money was collected (`card`, `manual`, ...).
    pub payment_method: String,
}

/// Request to record one repayment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepaymentInput {
    /// Amount in major units.
    pub amount: Decimal,
    /// External transaction id.
    pub transaction_id: String,
    /// Payment method tag.
    pub payment_method: String,
}

impl RepaymentInput {
    /// Creates a repayment input.
    #[must_use]
    pub fn new(
        amount: Decimal,
        transaction_id: impl Into<String>,
        payment_method: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            transaction_id: transaction_id.into(),
            payment_method: payment_method.into(),
        }
    }
}

/// Sums the amounts of a sequence of repayments.
#[must_use]
pub fn total_repaid(repayments: &[Repayment]) -> Decimal {
    repayments.iter().map(|r| r.amount).sum()
}
