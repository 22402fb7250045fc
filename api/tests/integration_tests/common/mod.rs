//! Common test utilities and helpers for integration tests.
//!
//! This module provides shared functionality used across all integration tests,
//! including test app setup, HTTP request helpers and a multipart body builder.

use api::{create_router, AppState, TENANT_HEADER};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use shared::models::{LogEntry, LogEntryPatch, NewLogEntry, TenantId};
use shared::storage::{LogStore, LogStoreError};
use std::sync::Arc;
use uuid::Uuid;

/// Tenant used by most tests.
pub const TENANT: &str = "acme";

/// A second tenant for isolation checks.
pub const OTHER_TENANT: &str = "globex";

const BOUNDARY: &str = "loglens-test-boundary";

/// Creates a test router with a fresh in-memory store.
pub fn test_app() -> (Router, AppState) {
    test_app_with(AppState::with_in_memory_store())
}

/// Creates a test router around the given state.
pub fn test_app_with(state: AppState) -> (Router, AppState) {
    let router = create_router(state.clone());
    (router, state)
}

/// Sends a request and returns the status and parsed JSON body.
///
/// Non-JSON bodies come back as `Value::Null`.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();

    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    (status, json)
}

/// Helper to make a GET request as `tenant`.
pub async fn get(app: Router, uri: &str, tenant: &str) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("GET")
            .uri(uri)
            .header(TENANT_HEADER, tenant)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

/// Helper to make a request with a JSON body as `tenant`.
pub async fn send_json(
    app: Router,
    method: &str,
    uri: &str,
    tenant: &str,
    body: &Value,
) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method(method)
            .uri(uri)
            .header(TENANT_HEADER, tenant)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(body).unwrap()))
            .unwrap(),
    )
    .await
}

/// Helper to make a DELETE request as `tenant`.
pub async fn delete(app: Router, uri: &str, tenant: &str) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .header(TENANT_HEADER, tenant)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

/// Builds a `multipart/form-data` body holding a single part.
pub fn multipart_body(field: &str, file_name: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: text/plain\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Builds an upload request for the `file` field.
pub fn upload_request(tenant: Option<&str>, file_name: &str, content: &[u8]) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/v1/logs/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(tenant) = tenant {
        builder = builder.header(TENANT_HEADER, tenant);
    }
    builder
        .body(Body::from(multipart_body("file", file_name, content)))
        .unwrap()
}

/// Uploads `content` as `file_name` for `tenant`.
pub async fn upload(
    app: Router,
    tenant: &str,
    file_name: &str,
    content: &str,
) -> (StatusCode, Value) {
    send(app, upload_request(Some(tenant), file_name, content.as_bytes())).await
}

/// A store whose every operation fails.
pub struct FailingStore;

impl FailingStore {
    fn fail<T>() -> Result<T, LogStoreError> {
        Err(LogStoreError::StorageError("connection refused".to_string()))
    }

    /// Application state backed by a failing store.
    pub fn state() -> AppState {
        AppState::new(Arc::new(Self))
    }
}

impl LogStore for FailingStore {
    fn insert_many(&self, _entries: Vec<NewLogEntry>) -> Result<Vec<LogEntry>, LogStoreError> {
        Self::fail()
    }

    fn find(
        &self,
        _tenant_id: &TenantId,
        _predicate: &dyn Fn(&LogEntry) -> bool,
    ) -> Result<Vec<LogEntry>, LogStoreError> {
        Self::fail()
    }

    fn get(&self, _tenant_id: &TenantId, _id: Uuid) -> Result<Option<LogEntry>, LogStoreError> {
        Self::fail()
    }

    fn update(
        &self,
        _tenant_id: &TenantId,
        _id: Uuid,
        _patch: LogEntryPatch,
    ) -> Result<Option<LogEntry>, LogStoreError> {
        Self::fail()
    }

    fn delete(&self, _tenant_id: &TenantId, _id: Uuid) -> Result<bool, LogStoreError> {
        Self::fail()
    }

    fn count(&self, _tenant_id: &TenantId) -> Result<usize, LogStoreError> {
        Self::fail()
    }
}
