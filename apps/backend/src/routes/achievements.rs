//! Achievement progress endpoints

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use lumi_core::achievements::definition;

use crate::error::Result;
use crate::models::*;
use crate::routes::identity::CurrentUser;
use crate::AppState;

/// GET /api/achievements
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<AchievementListResponse>> {
    let rows = state.db.list_achievements(user.user_id).await?;
    Ok(Json(AchievementListResponse {
        rows: rows.iter().map(DbAchievement::to_progress).collect(),
    }))
}

/// POST /api/achievements
/// Creates zero-progress rows for catalogue ids the user has no row for
pub async fn create_missing(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateAchievementsRequest>,
) -> Result<Json<AchievementListResponse>> {
    for id in &payload.achievement_ids {
        definition(id)?;
    }

    let inserted = state
        .db
        .insert_achievements(user.user_id, &payload.achievement_ids)
        .await?;
    tracing::debug!(user_id = %user.user_id, inserted, "Achievement rows created");

    let rows = state.db.list_achievements(user.user_id).await?;
    Ok(Json(AchievementListResponse {
        rows: rows.iter().map(DbAchievement::to_progress).collect(),
    }))
}

/// PUT /api/achievements/:achievement_id
pub async fn update_progress(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(achievement_id): Path<String>,
    Json(payload): Json<UpdateAchievementRequest>,
) -> Result<Json<AchievementProgress>> {
    let def = definition(&achievement_id)?;

    let mut progress = state
        .db
        .get_achievement(user.user_id, &achievement_id)
        .await?
        .map(|row| row.to_progress())
        .unwrap_or_else(|| AchievementProgress::empty(&achievement_id));

    let was_unlocked = progress.unlocked;
    progress.record(payload.progress, def.total, Utc::now());

    let row = state.db.upsert_achievement(user.user_id, &progress).await?;

    if progress.unlocked && !was_unlocked {
        tracing::info!(user_id = %user.user_id, achievement = def.title, "Achievement unlocked");
    }

    Ok(Json(row.to_progress()))
}
