//! Persistence boundary for loan applications.
//!
//! The store holds one record per application, repayments included. Writes
//! are compare-and-swap on `version`: `save` succeeds only if the stored
//! version still equals the version the caller read, and bumps it.
//!
//! The db crate provides the PostgreSQL implementation; `InMemoryApplicationStore`
//! has the same semantics for tests and local runs.

mod error;
mod memory;

pub use error::StoreError;
pub use memory::InMemoryApplicationStore;

use async_trait::async_trait;

use microloan_shared::types::ApplicationId;

use crate::ledger::LoanApplication;

/// Repository trait for application persistence.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Inserts a new application. The stored version starts at 1.
    async fn insert(&self, app: &LoanApplication) -> Result<LoanApplication, StoreError>;

    /// Loads an application with its repayments in ledger order.
    async fn load(&self, id: ApplicationId) -> Result<LoanApplication, StoreError>;

    /// Writes `app` if the stored version equals `app.version`.
    ///
    /// Returns the stored record with its new version. Repayments already
    /// stored are never rewritten; only entries past the stored count are
    /// appended.
    async fn save(&self, app: &LoanApplication) -> Result<LoanApplication, StoreError>;
}
