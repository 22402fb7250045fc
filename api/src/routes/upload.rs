//! Log file upload endpoint.
//!
//! Accepts a multipart form with a single `file` field, runs every line
//! through the ingestion pipeline and stores the result for the caller's
//! tenant.

use super::error::{api_error, storage_error, ApiError, ApiResult};
use super::tenant::Tenant;
use crate::state::AppState;
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shared::ingest::{IngestStats, IngestionPipeline};
use std::path::Path;
use tower_http::limit::RequestBodyLimitLayer;

/// File extensions accepted for upload.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["log", "txt", "json", "jsonl"];

/// Allowance for multipart boundaries and part headers on top of the file cap.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Statistics for one uploaded file.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadStats {
    /// Pipeline counters.
    #[serde(flatten)]
    pub ingest: IngestStats,
    /// Name of the uploaded file.
    pub file_name: String,
    /// Size of the uploaded file in bytes.
    pub file_size: usize,
}

/// Response for a successful upload.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Upload statistics.
    pub stats: UploadStats,
}

/// Creates the upload routes with application state.
pub fn upload_routes(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes().saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/api/v1/logs/upload", post(upload_logs))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state)
}

struct UploadedFile {
    name: String,
    bytes: Vec<u8>,
}

/// Handler for log file uploads.
///
/// Returns 201 Created with ingestion statistics. Unparseable lines are stored
/// as synthetic error entries and counted, they do not fail the upload.
async fn upload_logs(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }

        let name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?.to_vec();
        file = Some(UploadedFile { name, bytes });
    }

    let UploadedFile { name, bytes } = file.ok_or_else(|| {
        api_error(
            StatusCode::BAD_REQUEST,
            "missing_file",
            "Missing 'file' field in multipart form",
        )
    })?;

    if !has_allowed_extension(&name) {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "unsupported_file_type",
            format!(
                "'{name}' is not an accepted log file; allowed extensions: .{}",
                ALLOWED_EXTENSIONS.join(", .")
            ),
        ));
    }

    let file_size = bytes.len();
    if file_size > state.max_upload_bytes() {
        return Err(api_error(
            StatusCode::PAYLOAD_TOO_LARGE,
            "file_too_large",
            format!(
                "File is {file_size} bytes; the limit is {} bytes",
                state.max_upload_bytes()
            ),
        ));
    }

    let text = String::from_utf8(bytes).map_err(|_| {
        api_error(
            StatusCode::BAD_REQUEST,
            "invalid_encoding",
            "File content must be UTF-8 text",
        )
    })?;

    tracing::info!(tenant = %tenant, file = %name, file_size, "Received log upload");

    // Parsing is CPU-bound; keep it off the async workers.
    let pipeline = IngestionPipeline::new(tenant, name.clone());
    let store = state.shared_log_store();
    let ingest = tokio::task::spawn_blocking(move || {
        pipeline.ingest_and_store(store.as_ref(), text.lines())
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Ingestion task failed");
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "Ingestion did not complete",
        )
    })?
    .map_err(|e| storage_error(&e))?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            stats: UploadStats {
                ingest,
                file_name: name,
                file_size,
            },
        }),
    ))
}

fn has_allowed_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

fn multipart_error(e: MultipartError) -> ApiError {
    let status = e.status();
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        api_error(status, "file_too_large", e.body_text())
    } else {
        api_error(
            StatusCode::BAD_REQUEST,
            "invalid_multipart",
            format!("Multipart error: {}", e.body_text()),
        )
    }
}
