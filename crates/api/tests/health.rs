//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app};

#[tokio::test]
async fn health_check_returns_ok_without_database() {
    let app = build_test_app().await;
    let response = app.get("/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert!(json["db_healthy"].is_null());
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = build_test_app().await;
    let response = app.get("/this-route-does-not-exist", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let app = build_test_app().await;
    let response = app.get("/health", None).await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}
