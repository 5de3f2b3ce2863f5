//! Achievement API tests.
//!
//! These tests require a running PostgreSQL database.
//! Set DATABASE_URL environment variable before running.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use lumi_core::AchievementProgress;

use common::fixtures;
use common::TestContext;

/// Test that missing rows are created at zero progress, once.
#[tokio::test]
#[ignore = "requires database"]
async fn test_create_missing_rows_is_idempotent() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let user_id = ctx.create_test_user().await;
    let (name, value) = TestContext::user_header(user_id);
    let ids = ["1", "2", "3", "4", "5", "6"];

    for _ in 0..2 {
        server
            .post("/api/achievements")
            .add_header(name.clone(), value.clone())
            .json(&fixtures::create_achievements_request(&ids))
            .await
            .assert_status_ok();
    }

    let body: serde_json::Value = server
        .get("/api/achievements")
        .add_header(name.clone(), value.clone())
        .await
        .json();
    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 6);
    assert!(rows.iter().all(|r| r["progress"] == 0 && r["unlocked"] == false));

    ctx.cleanup_user(user_id).await;
}

/// Test that ids outside the catalogue are rejected.
#[tokio::test]
#[ignore = "requires database"]
async fn test_unknown_achievement_rejected() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let user_id = ctx.create_test_user().await;
    let (name, value) = TestContext::user_header(user_id);

    server
        .post("/api/achievements")
        .add_header(name.clone(), value.clone())
        .json(&fixtures::create_achievements_request(&["1", "99"]))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    server
        .put("/api/achievements/99")
        .add_header(name, value)
        .json(&fixtures::update_achievement_request(1))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    ctx.cleanup_user(user_id).await;
}

/// Test unlocking at the target and keeping the first unlock time.
#[tokio::test]
#[ignore = "requires database"]
async fn test_progress_unlocks_at_total() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let user_id = ctx.create_test_user().await;
    let (name, value) = TestContext::user_header(user_id);

    // "2" needs five completed tasks
    let partial: AchievementProgress = server
        .put("/api/achievements/2")
        .add_header(name.clone(), value.clone())
        .json(&fixtures::update_achievement_request(4))
        .await
        .json();
    assert!(!partial.unlocked);
    assert!(partial.unlocked_at.is_none());

    let unlocked: AchievementProgress = server
        .put("/api/achievements/2")
        .add_header(name.clone(), value.clone())
        .json(&fixtures::update_achievement_request(5))
        .await
        .json();
    assert!(unlocked.unlocked);
    let first_unlock = unlocked.unlocked_at.unwrap();

    let again: AchievementProgress = server
        .put("/api/achievements/2")
        .add_header(name.clone(), value.clone())
        .json(&fixtures::update_achievement_request(6))
        .await
        .json();
    assert!(again.unlocked);
    assert_eq!(again.unlocked_at, Some(first_unlock));

    ctx.cleanup_user(user_id).await;
}
