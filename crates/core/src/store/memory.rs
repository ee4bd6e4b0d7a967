//! In-memory application store.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use microloan_shared::types::ApplicationId;

use super::{ApplicationStore, StoreError};
use crate::ledger::LoanApplication;

/// `ApplicationStore` backed by a concurrent hash map.
///
/// The compare-and-swap runs under the map's shard lock for the key, so two
/// writers holding the same version cannot both succeed.
#[derive(Debug, Default)]
pub struct InMemoryApplicationStore {
    records: DashMap<ApplicationId, LoanApplication>,
}

impl InMemoryApplicationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored applications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Stores a record as-is, bypassing version checks.
    ///
    /// Used to seed legacy records whose derived fields were never written.
    pub fn put_raw(&self, app: LoanApplication) {
        self.records.insert(app.id, app);
    }
}

#[async_trait]
impl ApplicationStore for InMemoryApplicationStore {
    async fn insert(&self, app: &LoanApplication) -> Result<LoanApplication, StoreError> {
        match self.records.entry(app.id) {
            Entry::Occupied(_) => Err(StoreError::Conflict {
                id: app.id,
                expected: app.version,
            }),
            Entry::Vacant(slot) => {
                let mut stored = app.clone();
                stored.version = 1;
                slot.insert(stored.clone());
                Ok(stored)
            }
        }
    }

    async fn load(&self, id: ApplicationId) -> Result<LoanApplication, StoreError> {
        self.records
            .get(&id)
            .map(|r| r.value().clone())
            .ok_or(StoreError::NotFound(id))
    }

    async fn save(&self, app: &LoanApplication) -> Result<LoanApplication, StoreError> {
        let mut current = self.records.get_mut(&app.id).ok_or(StoreError::NotFound(app.id))?;

        if current.version != app.version {
            return Err(StoreError::Conflict {
                id: app.id,
                expected: app.version,
            });
        }

        let stored_count = current.repayments.len();
        if let Some(dup) = app.repayments[stored_count.min(app.repayments.len())..]
            .iter()
            .find(|new| current.has_transaction(&new.transaction_id))
        {
            return Err(StoreError::DuplicateTransaction(dup.transaction_id.clone()));
        }

        let mut stored = app.clone();
        stored.version = app.version + 1;
        *current = stored.clone();
        Ok(stored)
    }
}
