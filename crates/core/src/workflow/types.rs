//! Workflow domain types for the loan application lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use microloan_shared::types::UserId;

/// Application status in the review workflow.
///
/// The valid transitions are:
/// - Pending → Approved (approve)
/// - Pending → Rejected (reject)
/// - Pending → Cancelled (cancel, by the owner)
///
/// Approved, Rejected and Cancelled have no outgoing transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    /// Submitted and awaiting review.
    Pending,
    /// Approved; the balance is fixed and repayments are accepted.
    Approved,
    /// Rejected by a reviewer (terminal).
    Rejected,
    /// Withdrawn by the borrower before review (terminal).
    Cancelled,
}

impl ApplicationStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns true if no further status transition is possible.
    #[must_use]
    pub fn is_final(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Audit record of a status transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    /// Status before the transition.
    pub from: ApplicationStatus,
    /// Status after the transition.
    pub to: ApplicationStatus,
    /// Who made the change.
    pub changed_by: UserId,
    /// When the change was made.
    pub changed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_as_display() {
        for status in [
            ApplicationStatus::Pending,
            ApplicationStatus::Approved,
            ApplicationStatus::Rejected,
            ApplicationStatus::Cancelled,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }

    #[test]
    fn test_status_is_final() {
        assert!(!ApplicationStatus::Pending.is_final());
        assert!(ApplicationStatus::Approved.is_final());
        assert!(ApplicationStatus::Rejected.is_final());
        assert!(ApplicationStatus::Cancelled.is_final());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(format!("{}", ApplicationStatus::Cancelled), "cancelled");
    }
}
