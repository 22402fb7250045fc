//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers.

use crate::config::DEFAULT_MAX_UPLOAD_BYTES;
use shared::storage::{InMemoryLogStore, LogStore};
use std::sync::Arc;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The log storage backend.
    log_store: Arc<dyn LogStore>,
    /// Largest accepted upload, in bytes.
    max_upload_bytes: usize,
}

impl AppState {
    /// Creates a new application state with the given store.
    pub fn new(log_store: Arc<dyn LogStore>) -> Self {
        Self {
            log_store,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Creates a new application state with an in-memory store.
    ///
    /// This is useful for development and testing.
    #[must_use]
    pub fn with_in_memory_store() -> Self {
        Self::new(Arc::new(InMemoryLogStore::new()))
    }

    /// Sets the upload size cap.
    #[must_use]
    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    /// Returns a reference to the log store.
    #[must_use]
    pub fn log_store(&self) -> &dyn LogStore {
        self.log_store.as_ref()
    }

    /// Returns a shared handle to the log store.
    #[must_use]
    pub fn shared_log_store(&self) -> Arc<dyn LogStore> {
        Arc::clone(&self.log_store)
    }

    /// Returns the upload size cap.
    #[must_use]
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_in_memory_store()
    }
}
