//! Quick capture endpoints

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::identity::CurrentUser;
use crate::AppState;

/// GET /api/captures
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<CaptureListResponse>> {
    let captures = state.db.list_captures(user.user_id).await?;
    Ok(Json(CaptureListResponse {
        captures: captures.iter().map(DbQuickCapture::to_api_capture).collect(),
    }))
}

/// POST /api/captures
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateCaptureRequest>,
) -> Result<Json<QuickCapture>> {
    let content = payload.content.trim();
    if content.is_empty() {
        return Err(ApiError::BadRequest("Capture content is empty".to_string()));
    }

    let capture = state
        .db
        .insert_capture(user.user_id, content, payload.capture_type, Utc::now())
        .await?;

    Ok(Json(capture.to_api_capture()))
}

/// DELETE /api/captures/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(capture_id): Path<Uuid>,
) -> Result<Json<DeleteResponse>> {
    let deleted = state.db.delete_capture(user.user_id, capture_id).await?;
    Ok(Json(DeleteResponse { deleted }))
}
