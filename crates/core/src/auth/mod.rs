//! Authorization for loan applications.
//!
//! This module provides:
//! - User role definitions
//! - The authenticated actor
//! - The capability check run before every read or mutation

mod guard;

pub use guard::{Action, AuthorizationGuard, Decision};

use serde::{Deserialize, Serialize};

use microloan_shared::types::UserId;

/// User roles carried in the access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Applies for loans and repays them.
    Borrower,
    /// Reviews applications.
    Manager,
    /// Full access.
    Admin,
}

impl Role {
    /// Parses a role from the token claim.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "borrower" => Some(Self::Borrower),
            "manager" => Some(Self::Manager),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Returns true if this role can read and review any application.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Borrower => write!(f, "borrower"),
            Self::Manager => write!(f, "manager"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// User id from the token subject.
    pub user_id: UserId,
    /// Role from the token.
    pub role: Role,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_and_staff() {
        assert_eq!(Role::parse("Manager"), Some(Role::Manager));
        assert_eq!(Role::parse("auditor"), None);
        assert!(Role::Admin.is_staff());
        assert!(Role::Manager.is_staff());
        assert!(!Role::Borrower.is_staff());
        assert_eq!(Role::Borrower.to_string(), "borrower");
    }
}
