//! Connectivity endpoints

use axum::{extract::State, Json};

use crate::models::ConnectionResponse;
use crate::AppState;

/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}

/// GET /api/connection
/// Reports whether the database answers; never fails the request
pub async fn check(State(state): State<AppState>) -> Json<ConnectionResponse> {
    let connected = match state.db.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database connectivity check failed");
            false
        }
    };

    Json(ConnectionResponse { connected })
}
