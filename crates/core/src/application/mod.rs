//! Request-level orchestration of applications, repayments and payments.

mod service;
mod types;


pub use service::ApplicationService;
pub use types::{ConfirmOutcome, LedgerView, ManualRepayment, NewApplication};
