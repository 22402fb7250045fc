//! Storage traits and implementations.
//!
//! This module abstracts the document store holding normalized log entries.
//! The `LogStore` trait defines the interface for log storage, allowing different
//! implementations (in-memory, database-backed, etc.).

pub mod log_store;

pub use log_store::{InMemoryLogStore, LogStore, LogStoreError};
