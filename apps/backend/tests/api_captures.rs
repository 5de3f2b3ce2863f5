//! Quick capture API tests.
//!
//! These tests require a running PostgreSQL database.
//! Set DATABASE_URL environment variable before running.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use lumi_core::QuickCapture;

use common::fixtures;
use common::TestContext;

/// Test that captures list newest first with their type.
#[tokio::test]
#[ignore = "requires database"]
async fn test_create_and_list_captures() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let user_id = ctx.create_test_user().await;
    let (name, value) = TestContext::user_header(user_id);

    server
        .post("/api/captures")
        .add_header(name.clone(), value.clone())
        .json(&fixtures::create_capture_request("buy stamps", "text"))
        .await
        .assert_status_ok();
    let voice: QuickCapture = server
        .post("/api/captures")
        .add_header(name.clone(), value.clone())
        .json(&fixtures::create_capture_request("voice memo", "audio"))
        .await
        .json();
    assert_eq!(voice.capture_type.as_str(), "audio");

    let body: serde_json::Value = server
        .get("/api/captures")
        .add_header(name.clone(), value.clone())
        .await
        .json();
    let captures = body["captures"].as_array().unwrap();
    assert_eq!(captures.len(), 2);
    assert_eq!(captures[0]["content"], "voice memo");
    assert_eq!(captures[0]["type"], "audio");

    ctx.cleanup_user(user_id).await;
}

/// Test that blank content is rejected.
#[tokio::test]
#[ignore = "requires database"]
async fn test_blank_capture_rejected() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let user_id = ctx.create_test_user().await;
    let (name, value) = TestContext::user_header(user_id);

    server
        .post("/api/captures")
        .add_header(name, value)
        .json(&fixtures::create_capture_request("  ", "text"))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup_user(user_id).await;
}

/// Test deleting a capture.
#[tokio::test]
#[ignore = "requires database"]
async fn test_delete_capture() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let user_id = ctx.create_test_user().await;
    let (name, value) = TestContext::user_header(user_id);

    let capture: QuickCapture = server
        .post("/api/captures")
        .add_header(name.clone(), value.clone())
        .json(&fixtures::create_capture_request("photo of receipt", "photo"))
        .await
        .json();

    let body: serde_json::Value = server
        .delete(&format!("/api/captures/{}", capture.id))
        .add_header(name.clone(), value.clone())
        .await
        .json();
    assert_eq!(body["deleted"], true);

    let listed: serde_json::Value = server
        .get("/api/captures")
        .add_header(name, value)
        .await
        .json();
    assert!(listed["captures"].as_array().unwrap().is_empty());

    ctx.cleanup_user(user_id).await;
}
