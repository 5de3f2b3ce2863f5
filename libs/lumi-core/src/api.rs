//! Request and response bodies exchanged between the backend and clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::gamification::StatsTrigger;
use crate::types::{CaptureType, Priority, Stats};

/// Header carrying the caller's user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Aggregate stats row as stored, with its owner and version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub stats: Stats,
    /// Bumped by every applied increment. Higher means newer, whatever
    /// `updated_at` says.
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

impl StatsSnapshot {
    /// Whether this row may replace `held`: same owner, not an older version.
    pub fn supersedes(&self, held: &StatsSnapshot) -> bool {
        self.user_id == held.user_id && self.version >= held.version
    }
}

// Tasks

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTaskRequest {
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

// Stats

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StatsEventRequest {
    pub trigger: StatsTrigger,
    /// Deduplication key; a repeated id is applied once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StatsEventResponse {
    pub snapshot: StatsSnapshot,
    /// False when `event_id` had already been recorded.
    pub applied: bool,
}

// Achievements

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAchievementsRequest {
    pub achievement_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UpdateAchievementRequest {
    pub progress: i32,
}

// Captures

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCaptureRequest {
    pub content: String,
    #[serde(rename = "type", default)]
    pub capture_type: CaptureType,
}

// Community

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub user_name: String,
    pub user_avatar: String,
    pub content: String,
}

// Connectivity

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConnectionResponse {
    pub connected: bool,
}

/// JSON error body returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}
