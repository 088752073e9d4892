//! # Policy Store
//!
//! Load-then-save persistence with an optimistic version check. A save
//! succeeds only if the stored version still equals the version the caller
//! loaded; the store then bumps the version.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use plc_core::PolicyId;

use crate::record::PolicyRecord;

/// Store failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No record with this identifier.
    #[error("policy {id} not found")]
    NotFound {
        /// The missing policy.
        id: PolicyId,
    },

    /// The record changed since it was loaded.
    #[error("policy {id} was modified concurrently (expected version {expected}, found {found})")]
    ConcurrentModification {
        /// The contended policy.
        id: PolicyId,
        /// Version the writer loaded.
        expected: u64,
        /// Version currently stored.
        found: u64,
    },

    /// A record with this identifier already exists.
    #[error("policy {id} already exists")]
    AlreadyExists {
        /// The duplicated policy.
        id: PolicyId,
    },
}

/// Persistence boundary for policy records.
pub trait PolicyStore: Send + Sync {
    /// Fetch a record.
    fn load(&self, id: &PolicyId) -> Result<PolicyRecord, StoreError>;

    /// Persist a record loaded at `record.version`. Returns the stored
    /// record with its bumped version.
    fn save(&self, record: PolicyRecord) -> Result<PolicyRecord, StoreError>;

    /// Add a new record.
    fn insert(&self, record: PolicyRecord) -> Result<PolicyRecord, StoreError>;

    /// Every record, oldest first.
    fn list(&self) -> Vec<PolicyRecord>;
}

/// In-memory [`PolicyStore`].
///
/// Cloning yields another handle to the same records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPolicyStore {
    data: Arc<RwLock<HashMap<PolicyId, PolicyRecord>>>,
}

impl InMemoryPolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl PolicyStore for InMemoryPolicyStore {
    fn load(&self, id: &PolicyId) -> Result<PolicyRecord, StoreError> {
        self.data
            .read()
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound { id: *id })
    }

    fn save(&self, mut record: PolicyRecord) -> Result<PolicyRecord, StoreError> {
        let mut guard = self.data.write();
        let stored = guard
            .get_mut(&record.id)
            .ok_or(StoreError::NotFound { id: record.id })?;
        if stored.version != record.version {
            return Err(StoreError::ConcurrentModification {
                id: record.id,
                expected: record.version,
                found: stored.version,
            });
        }
        record.version += 1;
        *stored = record.clone();
        Ok(record)
    }

    fn insert(&self, record: PolicyRecord) -> Result<PolicyRecord, StoreError> {
        let mut guard = self.data.write();
        if guard.contains_key(&record.id) {
            return Err(StoreError::AlreadyExists { id: record.id });
        }
        guard.insert(record.id, record.clone());
        Ok(record)
    }

    fn list(&self) -> Vec<PolicyRecord> {
        let mut records: Vec<_> = self.data.read().values().cloned().collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        records
    }
}
