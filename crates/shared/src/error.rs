//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Domain errors from the core crate convert into one of these before they
/// reach the HTTP layer.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing, invalid or expired credentials.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Authenticated but lacking the capability.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed request payload.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Action not valid for the current status.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Non-positive amount or amount above the remaining balance.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// A transaction id that was already applied.
    #[error("Duplicate transaction: {0}")]
    DuplicateTransaction(String),

    /// Concurrent modification that could not be resolved.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Payment capability is not configured.
    #[error("Payment gateway unavailable")]
    GatewayUnavailable,

    /// The payment processor rejected the request or timed out.
    #[error("Payment gateway error: {0}")]
    GatewayError(String),

    /// Storage unreachable.
    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Validation(_) | Self::InvalidAmount(_) => 400,
            Self::InvalidState(_) | Self::DuplicateTransaction(_) | Self::Conflict(_) => 409,
            Self::GatewayError(_) => 502,
            Self::GatewayUnavailable | Self::PersistenceUnavailable(_) => 503,
            Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::DuplicateTransaction(_) => "DUPLICATE_TRANSACTION",
            Self::Conflict(_) => "CONFLICT",
            Self::GatewayUnavailable => "GATEWAY_UNAVAILABLE",
            Self::GatewayError(_) => "GATEWAY_ERROR",
            Self::PersistenceUnavailable(_) => "PERSISTENCE_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the message safe to show to API clients.
    ///
    /// Infrastructure failures are reduced to a generic sentence; the cause
    /// only goes to the logs.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::PersistenceUnavailable(_) => "Storage is temporarily unavailable".to_string(),
            Self::Internal(_) => "An error occurred".to_string(),
            Self::GatewayUnavailable => "Payment processing is not configured".to_string(),
            Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::Validation(msg)
            | Self::InvalidState(msg)
            | Self::InvalidAmount(msg)
            | Self::DuplicateTransaction(msg)
            | Self::Conflict(msg)
            | Self::GatewayError(msg) => msg.clone(),
        }
    }

    /// Returns true for failures of a collaborator rather than of the request.
    #[must_use]
    pub const fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::PersistenceUnavailable(_)
                | Self::Internal(_)
                | Self::GatewayUnavailable
                | Self::GatewayError(_)
        )
    }
}
