//! Log storage trait and implementations.
//!
//! Provides the `LogStore` trait for abstracting the document store that holds
//! normalized entries, and an `InMemoryLogStore` implementation for development
//! and testing. Every read and write is scoped to a single tenant.

use crate::models::{LogEntry, LogEntryPatch, NewLogEntry, TenantId};
use std::sync::{Arc, RwLock};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during log store operations.
#[derive(Debug, Error)]
pub enum LogStoreError {
    /// Failed to acquire lock on the store.
    #[error("Failed to acquire lock on log store")]
    LockError,

    /// Generic storage error.
    #[error("Storage error: {0}")]
    StorageError(String),
}

/// Trait for log storage implementations.
///
/// Implementations must be thread-safe (Send + Sync). A tenant can never see
/// or modify another tenant's entries through this interface.
pub trait LogStore: Send + Sync {
    /// Inserts a batch of entries, assigning each an identifier.
    ///
    /// The batch is all-or-nothing: on error nothing has been stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn insert_many(&self, entries: Vec<NewLogEntry>) -> Result<Vec<LogEntry>, LogStoreError>;

    /// Inserts a single entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn insert(&self, entry: NewLogEntry) -> Result<LogEntry, LogStoreError> {
        self.insert_many(vec![entry])?
            .pop()
            .ok_or_else(|| LogStoreError::StorageError("insert returned no entry".to_string()))
    }

    /// Returns every entry of `tenant_id` accepted by `predicate`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn find(
        &self,
        tenant_id: &TenantId,
        predicate: &dyn Fn(&LogEntry) -> bool,
    ) -> Result<Vec<LogEntry>, LogStoreError>;

    /// Looks up one entry by identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn get(&self, tenant_id: &TenantId, id: Uuid) -> Result<Option<LogEntry>, LogStoreError>;

    /// Applies a partial update, returning the updated entry if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn update(
        &self,
        tenant_id: &TenantId,
        id: Uuid,
        patch: LogEntryPatch,
    ) -> Result<Option<LogEntry>, LogStoreError>;

    /// Deletes an entry, returning whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn delete(&self, tenant_id: &TenantId, id: Uuid) -> Result<bool, LogStoreError>;

    /// Returns the number of entries owned by `tenant_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the count operation fails.
    fn count(&self, tenant_id: &TenantId) -> Result<usize, LogStoreError>;
}

/// In-memory log store implementation.
///
/// This implementation stores logs in a `Vec` protected by a `RwLock`.
/// It is suitable for development, testing, and single-node deployments
/// with limited data volumes.
///
/// **Note:** Data is not persisted across restarts.
///
/// # Example
///
/// ```
/// use shared::models::{LogFormat, NewLogEntry, TenantId};
/// use shared::storage::{InMemoryLogStore, LogStore};
///
/// let store = InMemoryLogStore::new();
/// let tenant = TenantId::new("acme");
///
/// let stored = store
///     .insert(NewLogEntry::new(tenant.clone(), LogFormat::JsonLines, "Test message", "svc"))
///     .unwrap();
///
/// let found = store.find(&tenant, &|_| true).unwrap();
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].id, stored.id);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryLogStore {
    logs: Arc<RwLock<Vec<LogEntry>>>,
}

impl InMemoryLogStore {
    /// Creates a new empty in-memory log store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            logs: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Creates a new in-memory log store wrapped in an Arc.
    ///
    /// This is useful when sharing the store across multiple handlers.
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl LogStore for InMemoryLogStore {
    fn insert_many(&self, entries: Vec<NewLogEntry>) -> Result<Vec<LogEntry>, LogStoreError> {
        let stored: Vec<LogEntry> = entries
            .into_iter()
            .map(|entry| entry.into_entry(Uuid::new_v4()))
            .collect();

        let mut logs = self.logs.write().map_err(|_| LogStoreError::LockError)?;
        logs.extend(stored.iter().cloned());
        Ok(stored)
    }

    fn find(
        &self,
        tenant_id: &TenantId,
        predicate: &dyn Fn(&LogEntry) -> bool,
    ) -> Result<Vec<LogEntry>, LogStoreError> {
        let logs = self.logs.read().map_err(|_| LogStoreError::LockError)?;
        Ok(logs
            .iter()
            .filter(|log| &log.tenant_id == tenant_id && predicate(*log))
            .cloned()
            .collect())
    }

    fn get(&self, tenant_id: &TenantId, id: Uuid) -> Result<Option<LogEntry>, LogStoreError> {
        let logs = self.logs.read().map_err(|_| LogStoreError::LockError)?;
        Ok(logs
            .iter()
            .find(|log| log.id == id && &log.tenant_id == tenant_id)
            .cloned())
    }

    fn update(
        &self,
        tenant_id: &TenantId,
        id: Uuid,
        patch: LogEntryPatch,
    ) -> Result<Option<LogEntry>, LogStoreError> {
        let mut logs = self.logs.write().map_err(|_| LogStoreError::LockError)?;
        Ok(logs
            .iter_mut()
            .find(|log| log.id == id && &log.tenant_id == tenant_id)
            .map(|log| {
                log.apply(patch);
                log.clone()
            }))
    }

    fn delete(&self, tenant_id: &TenantId, id: Uuid) -> Result<bool, LogStoreError> {
        let mut logs = self.logs.write().map_err(|_| LogStoreError::LockError)?;
        let before = logs.len();
        logs.retain(|log| !(log.id == id && &log.tenant_id == tenant_id));
        Ok(logs.len() < before)
    }

    fn count(&self, tenant_id: &TenantId) -> Result<usize, LogStoreError> {
        let logs = self.logs.read().map_err(|_| LogStoreError::LockError)?;
        Ok(logs.iter().filter(|log| &log.tenant_id == tenant_id).count())
    }
}
