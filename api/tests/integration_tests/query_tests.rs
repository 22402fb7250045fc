//! Integration tests for log querying.
//!
//! Tests cover:
//! - Level, format, tag, date and text filters
//! - Pagination and offset clamping
//! - Parameter validation

use axum::http::StatusCode;
use serde_json::Value;

use super::common::{get, test_app, test_app_with, upload, FailingStore, TENANT};

fn messages(page: &Value) -> Vec<String> {
    page["logs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|log| log["message"].as_str().unwrap().to_string())
        .collect()
}

async fn seeded_app() -> axum::Router {
    let (app, _state) = test_app();
    let content = [
        r#"{"timestamp":"2024-03-15T10:00:00Z","level":"error","service":"edge","message":"upstream reset","source":"nginx"}"#,
        r#"{"timestamp":"2024-03-15T11:00:00Z","level":"error","service":"edge","message":"worker exited","source":"nginx"}"#,
        r#"{"timestamp":"2024-03-15T12:00:00Z","level":"error","service":"db","message":"deadlock detected"}"#,
        r#"{"timestamp":"2024-03-16T09:00:00Z","level":"info","service":"edge","message":"reloaded","source":"nginx"}"#,
        r#"{"timestamp":"2024-03-17T09:00:00Z","level":"warn","service":"db","message":"slow query","env":"prod","retries":3}"#,
    ]
    .join("\n");

    let (status, _) = upload(app.clone(), TENANT, "seed.jsonl", &content).await;
    assert_eq!(status, StatusCode::CREATED);
    app
}

#[tokio::test]
async fn test_level_and_tag_scenario() {
    let app = seeded_app().await;

    let (status, page) = get(
        app,
        "/api/v1/logs?level=error&tag=nginx&limit=10&offset=0",
        TENANT,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total_count"], 2);
    assert_eq!(messages(&page), vec!["worker exited", "upstream reset"]);
    assert_eq!(page["pagination"]["offset"], 0);
    assert_eq!(page["pagination"]["limit"], 10);
    assert_eq!(page["pagination"]["total_pages"], 1);
}

#[tokio::test]
async fn test_results_newest_first() {
    let app = seeded_app().await;

    let (_, page) = get(app, "/api/v1/logs", TENANT).await;

    assert_eq!(
        messages(&page),
        vec![
            "slow query",
            "reloaded",
            "deadlock detected",
            "worker exited",
            "upstream reset"
        ]
    );
}

#[tokio::test]
async fn test_repeated_tags_are_anded() {
    let app = seeded_app().await;

    let (_, page) = get(app.clone(), "/api/v1/logs?tag=prod&tag=3", TENANT).await;
    assert_eq!(messages(&page), vec!["slow query"]);

    let (_, page) = get(app, "/api/v1/logs?tag=prod&tag=nginx", TENANT).await;
    assert_eq!(page["total_count"], 0);
    assert_eq!(page["pagination"]["total_pages"], 0);
}

#[tokio::test]
async fn test_tag_matches_key() {
    let app = seeded_app().await;

    let (_, page) = get(app, "/api/v1/logs?tag=retries", TENANT).await;
    assert_eq!(messages(&page), vec!["slow query"]);
}

#[tokio::test]
async fn test_date_range() {
    let app = seeded_app().await;

    let uri = format!(
        "/api/v1/logs?start_date={}&end_date={}",
        urlencoding::encode("2024-03-15T11:00:00+00:00"),
        urlencoding::encode("2024-03-16T09:00:00Z"),
    );
    let (status, page) = get(app.clone(), &uri, TENANT).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        messages(&page),
        vec!["reloaded", "deadlock detected", "worker exited"]
    );

    let (_, page) = get(app, "/api/v1/logs?start_date=2024-03-16", TENANT).await;
    assert_eq!(messages(&page), vec!["slow query", "reloaded"]);
}

#[tokio::test]
async fn test_search_is_case_insensitive() {
    let app = seeded_app().await;

    let (_, page) = get(app.clone(), "/api/v1/logs?search=DEADLOCK", TENANT).await;
    assert_eq!(messages(&page), vec!["deadlock detected"]);

    let (_, page) = get(app, "/api/v1/logs?search=Nginx", TENANT).await;
    assert_eq!(page["total_count"], 3);
}

#[tokio::test]
async fn test_offset_past_end_resets() {
    let (app, _state) = test_app();
    let content = (0..3)
        .map(|i| format!(r#"{{"message":"entry {i}"}}"#))
        .collect::<Vec<_>>()
        .join("\n");
    upload(app.clone(), TENANT, "three.log", &content).await;

    let (status, page) = get(app, "/api/v1/logs?offset=10&limit=10", TENANT).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["logs"].as_array().unwrap().len(), 3);
    assert_eq!(page["total_count"], 3);
    assert_eq!(page["pagination"]["offset"], 0);
    assert_eq!(page["pagination"]["total_pages"], 1);
}

#[tokio::test]
async fn test_pagination_pages() {
    let app = seeded_app().await;

    let (_, first) = get(app.clone(), "/api/v1/logs?limit=2", TENANT).await;
    let (_, second) = get(app.clone(), "/api/v1/logs?limit=2&offset=2", TENANT).await;
    let (_, third) = get(app, "/api/v1/logs?limit=2&offset=4", TENANT).await;

    assert_eq!(first["pagination"]["total_pages"], 3);
    assert_eq!(messages(&first), vec!["slow query", "reloaded"]);
    assert_eq!(messages(&second), vec!["deadlock detected", "worker exited"]);
    assert_eq!(messages(&third), vec!["upstream reset"]);
}

#[tokio::test]
async fn test_limit_is_clamped() {
    let app = seeded_app().await;

    let (status, page) = get(app, "/api/v1/logs?limit=5000", TENANT).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["pagination"]["limit"], 100);
}

#[tokio::test]
async fn test_invalid_parameters() {
    let (app, _state) = test_app();

    let (status, body) = get(
        app,
        "/api/v1/logs?format=apache&start_date=yesterday&offset=-5",
        TENANT,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_failed");

    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["format", "start_date", "offset"]);
}

#[tokio::test]
async fn test_query_storage_failure_is_500() {
    let (app, _state) = test_app_with(FailingStore::state());

    let (status, body) = get(app, "/api/v1/logs", TENANT).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "storage_error");
}
