//! Log query and management endpoints.
//!
//! Every handler is scoped to the tenant named in the request; an entry owned
//! by another tenant is indistinguishable from one that does not exist.

use super::error::{
    api_error, invalid_entry, log_not_found, query_error, storage_error, ApiResult,
};
use super::tenant::Tenant;
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shared::ingest::flatten;
use shared::models::{LogEntry, LogEntryPatch, LogFormat, LogLevel, NewLogEntry};
use shared::query::{execute, FilterParams, QueryPage};
use uuid::Uuid;

/// A log entry as submitted through the manual-create endpoint.
#[derive(Debug, Deserialize)]
pub struct CreateLogRequest {
    /// Timestamp (optional, defaults to current time).
    #[serde(default = "chrono::Utc::now")]
    pub timestamp: DateTime<Utc>,

    /// Level as written by the caller (optional, defaults to info).
    #[serde(default)]
    pub level: Option<String>,

    /// Log message (required; a missing value is reported as blank).
    #[serde(default)]
    pub message: String,

    /// Service name (required; a missing value is reported as blank).
    #[serde(default)]
    pub service: String,

    /// Source format (optional, defaults to `json_lines`).
    #[serde(default)]
    pub format: Option<LogFormat>,

    /// Metadata; nested objects are flattened.
    #[serde(default)]
    pub meta: Map<String, Value>,
}

/// A partial update. Absent fields are left unchanged; fields outside the
/// mutable set, such as `timestamp` or `tenant_id`, are rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateLogRequest {
    /// New level.
    pub level: Option<String>,
    /// New original level string. Defaults to `level` when only that is given.
    pub original_level: Option<String>,
    /// New service name.
    pub service: Option<String>,
    /// New message.
    pub message: Option<String>,
    /// New format.
    pub format: Option<LogFormat>,
    /// Replacement metadata; nested objects are flattened.
    pub meta: Option<Map<String, Value>>,
}

impl From<UpdateLogRequest> for LogEntryPatch {
    fn from(req: UpdateLogRequest) -> Self {
        Self {
            level: req.level.as_deref().map(LogLevel::from_alias),
            original_level: req.original_level.or(req.level),
            service: req.service,
            message: req.message,
            format: req.format,
            meta: req.meta.map(flatten),
        }
    }
}

/// Response body of a successful delete.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteLogResponse {
    /// Identifier of the removed entry.
    pub deleted: Uuid,
}

/// Creates the log routes with application state.
pub fn logs_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/logs", get(list_logs).post(create_log))
        .route(
            "/api/v1/logs/{id}",
            get(get_log).patch(update_log).delete(delete_log),
        )
        .with_state(state)
}

/// Handler for filtered, paginated log listing.
async fn list_logs(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Json<QueryPage>> {
    let spec = FilterParams::from_pairs(pairs)
        .into_spec(tenant)
        .map_err(|details| query_error(details.into()))?;

    let page = execute(state.log_store(), &spec).map_err(query_error)?;
    Ok(Json(page))
}

/// Handler for manual log creation.
async fn create_log(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    payload: Result<Json<CreateLogRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<LogEntry>)> {
    let Json(request) = payload.map_err(|rejection| {
        api_error(StatusCode::BAD_REQUEST, "invalid_json", rejection.body_text())
    })?;

    let mut entry = NewLogEntry::new(
        tenant,
        request.format.unwrap_or(LogFormat::JsonLines),
        request.message,
        request.service,
    )
    .with_timestamp(request.timestamp)
    .with_metadata(flatten(request.meta));

    if let Some(level) = request.level {
        entry = entry
            .with_level(LogLevel::from_alias(&level))
            .with_original_level(level);
    }

    entry.validate_manual().map_err(invalid_entry)?;

    let stored = state.log_store().insert(entry).map_err(|e| storage_error(&e))?;

    tracing::debug!(id = %stored.id, tenant = %stored.tenant_id, "Created log entry");
    Ok((StatusCode::CREATED, Json(stored)))
}

/// Handler for fetching a single entry.
async fn get_log(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<LogEntry>> {
    let id = log_id(id)?;
    state
        .log_store()
        .get(&tenant, id)
        .map_err(|e| storage_error(&e))?
        .map(Json)
        .ok_or_else(|| log_not_found(id))
}

/// Handler for partial updates.
async fn update_log(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateLogRequest>, JsonRejection>,
) -> ApiResult<Json<LogEntry>> {
    let id = log_id(id)?;
    let Json(request) = payload.map_err(|rejection| {
        api_error(StatusCode::BAD_REQUEST, "invalid_json", rejection.body_text())
    })?;

    let patch = LogEntryPatch::from(request);
    if patch.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "empty_update",
            "At least one field must be provided",
        ));
    }
    patch.validate_patch().map_err(invalid_entry)?;

    let updated = state
        .log_store()
        .update(&tenant, id, patch)
        .map_err(|e| storage_error(&e))?
        .ok_or_else(|| log_not_found(id))?;

    tracing::debug!(%id, tenant = %tenant, "Updated log entry");
    Ok(Json(updated))
}

/// Handler for deleting an entry.
async fn delete_log(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<DeleteLogResponse>> {
    let id = log_id(id)?;

    let deleted = state
        .log_store()
        .delete(&tenant, id)
        .map_err(|e| storage_error(&e))?;

    if !deleted {
        return Err(log_not_found(id));
    }

    tracing::debug!(%id, tenant = %tenant, "Deleted log entry");
    Ok(Json(DeleteLogResponse { deleted: id }))
}

fn log_id(id: Result<Path<Uuid>, PathRejection>) -> ApiResult<Uuid> {
    id.map(|Path(id)| id).map_err(|rejection| {
        api_error(StatusCode::BAD_REQUEST, "invalid_id", rejection.body_text())
    })
}
