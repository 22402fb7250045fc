//! Filtering, search and pagination over stored log entries.
//!
//! Raw query-string parameters are collected into [`FilterParams`], validated
//! into a tenant-scoped [`FilterSpec`], and evaluated by [`execute`].
//!
//! # Example
//!
//! ```
//! use shared::models::TenantId;
//! use shared::query::{execute, FilterParams};
//! use shared::storage::InMemoryLogStore;
//!
//! let params = FilterParams::from_pairs([
//!     ("level".to_string(), "error".to_string()),
//!     ("tag".to_string(), "nginx".to_string()),
//! ]);
//! let spec = params.into_spec(TenantId::new("acme")).unwrap();
//!
//! let page = execute(&InMemoryLogStore::new(), &spec).unwrap();
//! assert_eq!(page.total_count, 0);
//! assert_eq!(page.pagination.total_pages, 0);
//! ```

mod executor;
mod filter;

pub use executor::{execute, Pagination, QueryPage};
pub use filter::{FieldError, FilterParams, FilterSpec, DEFAULT_LIMIT, MAX_LIMIT};

use crate::storage::LogStoreError;
use thiserror::Error;

/// Errors that can occur while building or running a query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// One or more query parameters were invalid.
    #[error("invalid query parameters: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    /// Storage error during execution.
    #[error("Storage error: {0}")]
    Storage(#[from] LogStoreError),
}

impl From<Vec<FieldError>> for QueryError {
    fn from(errors: Vec<FieldError>) -> Self {
        Self::Validation(errors)
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
