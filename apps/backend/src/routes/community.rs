//! Community feed endpoints

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::identity::CurrentUser;
use crate::AppState;

const DEFAULT_FEED_LIMIT: i64 = 50;
const MAX_FEED_LIMIT: i64 = 200;

/// GET /api/community/posts
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PostListQuery>,
) -> Result<Json<PostListResponse>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_FEED_LIMIT)
        .clamp(1, MAX_FEED_LIMIT);
    let posts = state.db.list_posts(limit).await?;
    Ok(Json(PostListResponse {
        posts: posts.iter().map(DbCommunityPost::to_api_post).collect(),
    }))
}

/// POST /api/community/posts
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<Json<CommunityPost>> {
    if payload.content.trim().is_empty() {
        return Err(ApiError::BadRequest("Post content is empty".to_string()));
    }

    let post = state.db.insert_post(user.user_id, &payload).await?;
    Ok(Json(post.to_api_post()))
}

/// POST /api/community/posts/:id/like
pub async fn like(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<CommunityPost>> {
    let post = state
        .db
        .like_post(post_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Post {}", post_id)))?;

    Ok(Json(post.to_api_post()))
}
