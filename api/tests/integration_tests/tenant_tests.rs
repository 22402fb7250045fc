//! Integration tests for tenant isolation.
//!
//! A tenant can never read, modify or delete another tenant's entries, and an
//! entry owned by someone else looks exactly like one that does not exist.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;

use super::common::{delete, get, send, send_json, test_app, upload, OTHER_TENANT, TENANT};

#[tokio::test]
async fn test_uploads_are_tenant_scoped() {
    let (app, _state) = test_app();

    upload(app.clone(), TENANT, "a.log", r#"{"message":"ours"}"#).await;
    upload(app.clone(), OTHER_TENANT, "b.log", r#"{"message":"theirs"}"#).await;

    let (_, page) = get(app.clone(), "/api/v1/logs", TENANT).await;
    assert_eq!(page["total_count"], 1);
    assert_eq!(page["logs"][0]["message"], "ours");

    let (_, page) = get(app, "/api/v1/logs?search=ours", OTHER_TENANT).await;
    assert_eq!(page["total_count"], 0);
}

#[tokio::test]
async fn test_foreign_entry_is_invisible() {
    let (app, _state) = test_app();

    let (_, created) = send_json(
        app.clone(),
        "POST",
        "/api/v1/logs",
        OTHER_TENANT,
        &json!({"service": "vault", "message": "secret"}),
    )
    .await;
    let uri = format!("/api/v1/logs/{}", created["id"].as_str().unwrap());

    let (status, _) = get(app.clone(), &uri, TENANT).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_json(app.clone(), "PATCH", &uri, TENANT, &json!({"message": "pwned"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = delete(app.clone(), &uri, TENANT).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, entry) = get(app, &uri, OTHER_TENANT).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["message"], "secret");
}

#[tokio::test]
async fn test_missing_tenant_header() {
    let (app, _state) = test_app();

    let (status, body) = send(
        app,
        Request::builder()
            .uri("/api/v1/logs")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "missing_tenant");
}
