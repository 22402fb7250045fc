//! Integration tests for the health endpoint.

use axum::body::Body;
use axum::http::{Request, StatusCode};

use super::common::{send, test_app};

#[tokio::test]
async fn test_health_needs_no_tenant() {
    let (app, _state) = test_app();

    let (status, body) = send(
        app,
        Request::builder()
            .uri("/api/v1/health")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}
