//! Integration tests for manual log management.
//!
//! Tests cover:
//! - Creating entries directly
//! - Fetching, updating and deleting by id

use axum::http::StatusCode;
use serde_json::json;

use super::common::{delete, get, send_json, test_app, OTHER_TENANT, TENANT};

#[tokio::test]
async fn test_create_and_fetch() {
    let (app, _state) = test_app();

    let (status, created) = send_json(
        app.clone(),
        "POST",
        "/api/v1/logs",
        TENANT,
        &json!({
            "timestamp": "2024-03-15T12:00:00Z",
            "level": "fatal",
            "service": "payments",
            "message": "card processor unreachable",
            "format": "syslog",
            "meta": {"region": "eu", "upstream": {"host": "pp-1"}}
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["level"], "critical");
    assert_eq!(created["original_level"], "fatal");
    assert_eq!(created["format"], "syslog");
    assert_eq!(created["tenant_id"], TENANT);
    assert_eq!(created["meta"], json!({"region": "eu", "host": "pp-1"}));

    let id = created["id"].as_str().unwrap();
    let (status, fetched) = get(app, &format!("/api/v1/logs/{id}"), TENANT).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_create_defaults() {
    let (app, _state) = test_app();

    let (status, created) = send_json(
        app,
        "POST",
        "/api/v1/logs",
        TENANT,
        &json!({"service": "web", "message": "hi"}),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["level"], "info");
    assert_eq!(created["format"], "json_lines");
    assert_eq!(created["meta"], json!({}));
}

#[tokio::test]
async fn test_create_requires_service() {
    let (app, _state) = test_app();

    let (status, body) = send_json(
        app,
        "POST",
        "/api/v1/logs",
        TENANT,
        &json!({"service": "", "message": "orphan"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "service");
}

#[tokio::test]
async fn test_create_missing_message_is_named() {
    let (app, _state) = test_app();

    let (status, body) = send_json(
        app,
        "POST",
        "/api/v1/logs",
        TENANT,
        &json!({"service": "web"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_failed");
    assert_eq!(body["details"][0]["field"], "message");
}

#[tokio::test]
async fn test_update_cannot_move_tenant_or_timestamp() {
    let (app, _state) = test_app();

    let (_, created) = send_json(
        app.clone(),
        "POST",
        "/api/v1/logs",
        TENANT,
        &json!({"service": "web", "message": "pinned"}),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, _) = send_json(
        app.clone(),
        "PATCH",
        &format!("/api/v1/logs/{id}"),
        TENANT,
        &json!({"message": "moved", "tenant_id": OTHER_TENANT}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, fetched) = get(app, &format!("/api/v1/logs/{id}"), TENANT).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_update_then_query() {
    let (app, _state) = test_app();

    let (_, created) = send_json(
        app.clone(),
        "POST",
        "/api/v1/logs",
        TENANT,
        &json!({"service": "web", "message": "flaky"}),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = send_json(
        app.clone(),
        "PATCH",
        &format!("/api/v1/logs/{id}"),
        TENANT,
        &json!({"level": "error", "meta": {"ticket": "OPS-7"}}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["level"], "error");
    assert_eq!(updated["message"], "flaky");
    assert_eq!(updated["timestamp"], created["timestamp"]);

    let (_, page) = get(app, "/api/v1/logs?level=error&tag=OPS-7", TENANT).await;
    assert_eq!(page["total_count"], 1);
}

#[tokio::test]
async fn test_update_rejects_blank_message() {
    let (app, _state) = test_app();

    let (_, created) = send_json(
        app.clone(),
        "POST",
        "/api/v1/logs",
        TENANT,
        &json!({"service": "web", "message": "keep me"}),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send_json(
        app,
        "PATCH",
        &format!("/api/v1/logs/{id}"),
        TENANT,
        &json!({"message": ""}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "message");
}

#[tokio::test]
async fn test_delete() {
    let (app, _state) = test_app();

    let (_, created) = send_json(
        app.clone(),
        "POST",
        "/api/v1/logs",
        TENANT,
        &json!({"service": "web", "message": "short-lived"}),
    )
    .await;
    let id = created["id"].as_str().unwrap();
    let uri = format!("/api/v1/logs/{id}");

    let (status, body) = delete(app.clone(), &uri, TENANT).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], id);

    let (status, _) = get(app, &uri, TENANT).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_id_is_404() {
    let (app, _state) = test_app();

    let (status, body) = get(
        app,
        "/api/v1/logs/00000000-0000-4000-8000-000000000000",
        TENANT,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}
