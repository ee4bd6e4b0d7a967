//! Loan application workflow.
//!
//! This module implements the application lifecycle state machine.
//!
//! # Modules
//!
//! - `types` - Workflow domain types (ApplicationStatus, StatusChange)
//! - `error` - Workflow-specific error types
//! - `service` - State transition logic

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::WorkflowError;
pub use service::ApplicationWorkflow;
pub use types::{ApplicationStatus, StatusChange};
