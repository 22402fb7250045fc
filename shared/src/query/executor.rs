//! Query execution engine.
//!
//! Evaluates a [`FilterSpec`] against the log store and returns one page of
//! results, newest first.

use super::filter::FilterSpec;
use super::QueryError;
use crate::models::{LogEntry, Metadata};
use crate::storage::LogStore;
use serde::{Deserialize, Serialize};

/// Page window returned alongside query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Offset actually applied, after any reset.
    pub offset: usize,
    /// Page size actually applied, after clamping.
    pub limit: usize,
    /// `ceil(total_count / limit)`, or 0 when nothing matched.
    pub total_pages: usize,
}

/// One page of matching log entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPage {
    /// Matching entries on this page, newest first.
    pub logs: Vec<LogEntry>,
    /// Number of entries matching the filter across all pages.
    pub total_count: usize,
    /// Effective window.
    pub pagination: Pagination,
}

/// Executes a filter against a log store.
///
/// An `offset` at or beyond the number of matches is reset to 0 so the caller
/// gets the first page instead of an empty one.
///
/// # Errors
///
/// Returns [`QueryError::Storage`] if the store cannot be read.
///
/// # Example
///
/// ```
/// use shared::models::{LogFormat, NewLogEntry, TenantId};
/// use shared::query::{execute, FilterSpec};
/// use shared::storage::{InMemoryLogStore, LogStore};
///
/// let store = InMemoryLogStore::new();
/// let tenant = TenantId::new("acme");
/// store
///     .insert(NewLogEntry::new(tenant.clone(), LogFormat::Syslog, "disk full", "kernel"))
///     .unwrap();
///
/// let page = execute(&store, &FilterSpec::new(tenant).with_search("DISK")).unwrap();
/// assert_eq!(page.total_count, 1);
/// assert_eq!(page.pagination.total_pages, 1);
/// ```
pub fn execute(store: &dyn LogStore, spec: &FilterSpec) -> Result<QueryPage, QueryError> {
    let search = spec.search_text.as_ref().map(|s| s.to_lowercase());

    let mut matches = store.find(&spec.tenant_id, &|log| {
        matches_filter(spec, search.as_deref(), log)
    })?;

    let total_count = matches.len();
    let limit = spec.effective_limit();
    let offset = if total_count > 0 && spec.offset >= total_count {
        0
    } else {
        spec.offset
    };

    // Stable sort keeps insertion order among equal timestamps.
    matches.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let logs: Vec<LogEntry> = matches.into_iter().skip(offset).take(limit).collect();

    tracing::debug!(
        tenant = %spec.tenant_id,
        total_count,
        offset,
        limit,
        returned = logs.len(),
        "Executed log query"
    );

    Ok(QueryPage {
        logs,
        total_count,
        pagination: Pagination {
            offset,
            limit,
            total_pages: total_count.div_ceil(limit),
        },
    })
}

fn matches_filter(spec: &FilterSpec, search: Option<&str>, log: &LogEntry) -> bool {
    if let Some(level) = &spec.level {
        if log.level.as_str() != level.as_str() {
            return false;
        }
    }

    if spec.format.is_some_and(|format| format != log.format) {
        return false;
    }

    if spec.start_date.is_some_and(|start| log.timestamp < start) {
        return false;
    }

    if spec.end_date.is_some_and(|end| log.timestamp > end) {
        return false;
    }

    if let Some(needle) = search {
        if !matches_search(needle, log) {
            return false;
        }
    }

    spec.tags.iter().all(|tag| matches_tag(tag, &log.meta))
}

/// `needle` is already lower-cased.
fn matches_search(needle: &str, log: &LogEntry) -> bool {
    if log.message.to_lowercase().contains(needle) || log.format.as_str().contains(needle) {
        return true;
    }

    serde_json::to_string(&log.meta)
        .map(|rendered| rendered.to_lowercase().contains(needle))
        .unwrap_or(false)
}

fn matches_tag(tag: &str, meta: &Metadata) -> bool {
    meta.iter()
        .any(|(key, value)| key == tag || value.to_string() == tag)
}
