//! Capability check for application operations.

use microloan_shared::AppError;

use super::{Actor, Role};
use crate::ledger::LoanApplication;
use crate::workflow::ApplicationStatus;

/// Operations that can be attempted on an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// View the application or its ledger.
    Read,
    /// Record a repayment by hand.
    Repay,
    /// Submit a new application.
    Create,
    /// Approve a pending application.
    Approve,
    /// Reject a pending application.
    Reject,
    /// Withdraw a pending application.
    Cancel,
    /// Create or confirm a gateway payment.
    Pay,
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The actor may perform the action.
    Allow,
    /// The actor may not perform the action.
    Deny,
}

impl Decision {
    fn from_bool(allowed: bool) -> Self {
        if allowed { Self::Allow } else { Self::Deny }
    }
}

/// Pure capability check. Holds no state.
pub struct AuthorizationGuard;

impl AuthorizationGuard {
    /// Decides whether `actor` may perform `action`.
    ///
    /// `application` is `None` only for `Create`; every other action on a
    /// missing application is denied.
    #[must_use]
    pub fn authorize(
        actor: &Actor,
        application: Option<&LoanApplication>,
        action: Action,
    ) -> Decision {
        let owner = application.is_some_and(|app| app.is_owned_by(actor.user_id));

        let allowed = match action {
            Action::Create => actor.role == Role::Borrower,
            Action::Read | Action::Repay => {
                application.is_some() && (owner || actor.role.is_staff())
            }
            Action::Approve | Action::Reject => application.is_some() && actor.role.is_staff(),
            Action::Cancel => {
                owner && application.is_some_and(|app| app.status == ApplicationStatus::Pending)
            }
            Action::Pay => owner,
        };

        Decision::from_bool(allowed)
    }

    /// Like `authorize`, but returns `Forbidden` on deny.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` if the decision is `Deny`.
    pub fn require(
        actor: &Actor,
        application: Option<&LoanApplication>,
        action: Action,
    ) -> Result<(), AppError> {
        match Self::authorize(actor, application, action) {
            Decision::Allow => Ok(()),
            Decision::Deny => {
                tracing::debug!(user_id = %actor.user_id, role = %actor.role, ?action, "access denied");
                Err(AppError::Forbidden(format!(
                    "Not allowed to {} this application",
                    action.verb()
                )))
            }
        }
    }
}

impl Action {
    fn verb(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Repay => "repay",
            Self::Create => "create",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Cancel => "cancel",
            Self::Pay => "pay for",
        }
    }
}
