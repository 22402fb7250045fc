//! Filter definitions and query-parameter validation.

use crate::models::{LogFormat, TenantId};
use crate::parser::parse_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Page size used when none is requested.
pub const DEFAULT_LIMIT: usize = 10;

/// Largest page size a caller can request.
pub const MAX_LIMIT: usize = 100;

/// A validated, tenant-scoped filter over stored log entries.
///
/// # Example
///
/// ```
/// use shared::models::{LogFormat, TenantId};
/// use shared::query::FilterSpec;
///
/// let spec = FilterSpec::new(TenantId::new("acme"))
///     .with_level("ERROR")
///     .with_format(LogFormat::NginxError)
///     .with_tag("nginx")
///     .with_limit(500);
///
/// assert_eq!(spec.level.as_deref(), Some("error"));
/// assert_eq!(spec.effective_limit(), 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    /// Tenant whose entries are searched.
    pub tenant_id: TenantId,
    /// Exact level, lower-cased.
    pub level: Option<String>,
    /// Exact format.
    pub format: Option<LogFormat>,
    /// Every tag must match a metadata key or rendered value.
    pub tags: BTreeSet<String>,
    /// Inclusive lower bound on the timestamp.
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the timestamp.
    pub end_date: Option<DateTime<Utc>>,
    /// Case-insensitive substring searched in message, format and metadata.
    pub search_text: Option<String>,
    /// Requested page size; clamped by [`FilterSpec::effective_limit`].
    pub limit: usize,
    /// Requested number of entries to skip.
    pub offset: usize,
}

impl FilterSpec {
    /// Creates a filter matching every entry of `tenant_id`.
    #[must_use]
    pub fn new(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            level: None,
            format: None,
            tags: BTreeSet::new(),
            start_date: None,
            end_date: None,
            search_text: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }

    /// Sets the level filter.
    #[must_use]
    pub fn with_level(mut self, level: impl AsRef<str>) -> Self {
        self.level = Some(level.as_ref().trim().to_lowercase());
        self
    }

    /// Sets the format filter.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Sets the inclusive start of the time range.
    #[must_use]
    pub fn with_start_date(mut self, start: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self
    }

    /// Sets the inclusive end of the time range.
    #[must_use]
    pub fn with_end_date(mut self, end: DateTime<Utc>) -> Self {
        self.end_date = Some(end);
        self
    }

    /// Sets the search text.
    #[must_use]
    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    /// Sets the page size.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the number of entries to skip.
    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Page size clamped to `1..=MAX_LIMIT`.
    #[must_use]
    pub fn effective_limit(&self) -> usize {
        self.limit.clamp(1, MAX_LIMIT)
    }
}

/// A query parameter that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Parameter name.
    pub field: String,
    /// Why it was rejected.
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Raw, unvalidated filter parameters as they arrive on a query string.
///
/// Empty values are treated as absent. `tag` may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterParams {
    /// `level`
    pub level: Option<String>,
    /// `format`
    pub format: Option<String>,
    /// `tag` (repeatable)
    pub tags: Vec<String>,
    /// `start_date`
    pub start_date: Option<String>,
    /// `end_date`
    pub end_date: Option<String>,
    /// `search`
    pub search: Option<String>,
    /// `limit`
    pub limit: Option<String>,
    /// `offset`
    pub offset: Option<String>,
}

impl FilterParams {
    /// Collects parameters from decoded key/value pairs. Unknown keys are ignored.
    ///
    /// ```
    /// use shared::query::FilterParams;
    ///
    /// let params = FilterParams::from_pairs([
    ///     ("tag".to_string(), "env".to_string()),
    ///     ("tag".to_string(), "prod".to_string()),
    ///     ("limit".to_string(), "5".to_string()),
    /// ]);
    /// assert_eq!(params.tags, vec!["env", "prod"]);
    /// assert_eq!(params.limit.as_deref(), Some("5"));
    /// ```
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            if value.trim().is_empty() {
                continue;
            }
            match key.as_str() {
                "level" => params.level = Some(value),
                "format" => params.format = Some(value),
                "tag" => params.tags.push(value),
                "start_date" => params.start_date = Some(value),
                "end_date" => params.end_date = Some(value),
                "search" => params.search = Some(value),
                "limit" => params.limit = Some(value),
                "offset" => params.offset = Some(value),
                _ => {}
            }
        }
        params
    }

    /// Validates the parameters into a [`FilterSpec`] for `tenant_id`.
    ///
    /// # Errors
    ///
    /// Returns every invalid field at once: an unknown `format`, a
    /// `start_date`/`end_date` that is not ISO-8601, a non-integer `limit`, or
    /// an `offset` that is not a non-negative integer.
    pub fn into_spec(self, tenant_id: TenantId) -> Result<FilterSpec, Vec<FieldError>> {
        let mut errors = Vec::new();
        let mut spec = FilterSpec::new(tenant_id);

        if let Some(level) = self.level {
            spec = spec.with_level(level);
        }

        if let Some(format) = self.format {
            match format.trim().parse::<LogFormat>() {
                Ok(format) => spec.format = Some(format),
                Err(e) => errors.push(FieldError::new("format", e.to_string())),
            }
        }

        spec.tags = self.tags.into_iter().collect();

        for (field, raw, slot) in [
            ("start_date", self.start_date, &mut spec.start_date),
            ("end_date", self.end_date, &mut spec.end_date),
        ] {
            if let Some(raw) = raw {
                match parse_timestamp(&raw) {
                    Some(ts) => *slot = Some(ts),
                    None => errors.push(FieldError::new(
                        field,
                        format!("'{raw}' is not an ISO-8601 date"),
                    )),
                }
            }
        }

        spec.search_text = self.search;

        if let Some(limit) = self.limit {
            match limit.trim().parse::<i64>() {
                // Out-of-range values are clamped when the query runs.
                Ok(value) => spec.limit = usize::try_from(value.max(0)).unwrap_or(MAX_LIMIT),
                Err(_) => errors.push(FieldError::new("limit", "must be an integer")),
            }
        }

        if let Some(offset) = self.offset {
            match offset.trim().parse::<usize>() {
                Ok(value) => spec.offset = value,
                Err(_) => errors.push(FieldError::new(
                    "offset",
                    "must be a non-negative integer",
                )),
            }
        }

        if errors.is_empty() {
            Ok(spec)
        } else {
            Err(errors)
        }
    }
}
