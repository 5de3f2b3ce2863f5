//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext for setting up test environment with database
//! - Helper functions for creating test users
//! - Header helpers
//!
//! # Requirements
//! Integration tests require a PostgreSQL database (set DATABASE_URL env var).

pub mod fixtures;

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use uuid::Uuid;

use lumi_backend::db::Database;
use lumi_backend::{router, AppState};

/// Test context containing database connection and test router.
///
/// Requires DATABASE_URL environment variable to be set.
pub struct TestContext {
    pub db: Arc<Database>,
    pub state: AppState,
    app: Router,
}

impl TestContext {
    /// Create a new test context.
    ///
    /// # Panics
    /// Panics if DATABASE_URL is not set or database connection fails.
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

        let db = Database::connect(&database_url, 5)
            .await
            .expect("Failed to connect to test database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        let state = AppState::new(db);
        let app = router(state.clone());

        Self {
            db: state.db.clone(),
            state,
            app,
        }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Create a fresh user and return its id.
    pub async fn create_test_user(&self) -> Uuid {
        let user_id = Uuid::new_v4();
        self.db
            .ensure_user(user_id)
            .await
            .expect("Failed to create test user");
        user_id
    }

    /// Header pair identifying `user_id`.
    pub fn user_header(user_id: Uuid) -> (HeaderName, HeaderValue) {
        (
            HeaderName::from_static("x-user-id"),
            HeaderValue::from_str(&user_id.to_string()).expect("uuid is a valid header value"),
        )
    }

    /// Clean up test data for a user.
    ///
    /// Every table cascades from users, so one delete suffices.
    pub async fn cleanup_user(&self, user_id: Uuid) {
        let _ = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;
    }
}
