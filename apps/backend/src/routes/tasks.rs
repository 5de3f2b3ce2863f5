//! Task endpoints

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::identity::CurrentUser;
use crate::AppState;

/// GET /api/tasks
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<TaskListResponse>> {
    let tasks = state.db.list_tasks(user.user_id).await?;
    Ok(Json(TaskListResponse {
        tasks: tasks.iter().map(DbTask::to_api_task).collect(),
    }))
}

/// POST /api/tasks
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<Json<Task>> {
    let title = payload.title.trim();
    if title.is_empty() {
        return Err(ApiError::BadRequest("Task title is empty".to_string()));
    }

    let task = state
        .db
        .insert_task(user.user_id, title, payload.priority, payload.steps.as_deref())
        .await?;

    tracing::debug!(task_id = %task.id, user_id = %user.user_id, "Task created");

    Ok(Json(task.to_api_task()))
}

/// PATCH /api/tasks/:id
pub async fn set_completed(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<UpdateTaskRequest>,
) -> Result<Json<Task>> {
    let task = state
        .db
        .set_task_completed(user.user_id, task_id, payload.completed)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Task {}", task_id)))?;

    Ok(Json(task.to_api_task()))
}

/// POST /api/tasks/:id/step
pub async fn advance_step(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<Task>> {
    let mut task = state
        .db
        .get_task(user.user_id, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Task {}", task_id)))?
        .to_api_task();

    let next = task
        .advance_step()
        .ok_or_else(|| ApiError::BadRequest("Task has no remaining steps".to_string()))?;

    let updated = state
        .db
        .set_task_step(user.user_id, task_id, next as i32)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Task {}", task_id)))?;

    Ok(Json(updated.to_api_task()))
}

/// DELETE /api/tasks/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<DeleteResponse>> {
    let deleted = state.db.delete_task(user.user_id, task_id).await?;
    Ok(Json(DeleteResponse { deleted }))
}
