//! Database models and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Re-export shared types from lumi-core
pub use lumi_core::api::{
    ConnectionResponse, CreateAchievementsRequest, CreateCaptureRequest, CreatePostRequest,
    CreateTaskRequest, DeleteResponse, StatsEventRequest, StatsEventResponse, StatsSnapshot,
    UpdateAchievementRequest, UpdateTaskRequest,
};
pub use lumi_core::types::{
    CaptureType, CommunityPost, Priority, QuickCapture, Stats, Task,
};
pub use lumi_core::{Achievement, AchievementProgress, StatsTrigger};

// === Database Entity Types ===

/// Task stored in PostgreSQL
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbTask {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub completed: bool,
    pub priority: String,
    pub steps: Option<Vec<String>>,
    pub current_step: Option<i32>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbTask {
    /// Convert to API task type
    pub fn to_api_task(&self) -> Task {
        Task {
            id: self.id,
            title: self.title.clone(),
            completed: self.completed,
            // The column is constrained to the four known values.
            priority: self.priority.parse().unwrap_or_default(),
            steps: self.steps.clone(),
            current_step: self.current_step.map(|s| s.max(0) as u32),
            completed_at: self.completed_at,
        }
    }
}

/// Aggregate stats row in PostgreSQL
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUserStats {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tasks_completed: i32,
    pub focus_sessions: i32,
    pub current_streak: i32,
    pub total_points: i32,
    pub level: i32,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbUserStats {
    pub fn to_stats(&self) -> Stats {
        Stats {
            tasks_completed: self.tasks_completed,
            focus_sessions: self.focus_sessions,
            current_streak: self.current_streak,
            total_points: self.total_points,
            level: self.level,
        }
    }

    pub fn to_snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            user_id: self.user_id,
            stats: self.to_stats(),
            version: self.version,
            updated_at: self.updated_at,
        }
    }
}

/// Per-user achievement progress row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAchievement {
    pub id: Uuid,
    pub user_id: Uuid,
    pub achievement_id: String,
    pub unlocked: bool,
    pub progress: Option<i32>,
    pub unlocked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbAchievement {
    pub fn to_progress(&self) -> AchievementProgress {
        AchievementProgress {
            achievement_id: self.achievement_id.clone(),
            progress: self.progress.unwrap_or(0),
            unlocked: self.unlocked,
            unlocked_at: self.unlocked_at,
        }
    }
}

/// Quick capture row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbQuickCapture {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    #[sqlx(rename = "type")]
    pub capture_type: String,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl DbQuickCapture {
    pub fn to_api_capture(&self) -> QuickCapture {
        QuickCapture {
            id: self.id,
            content: self.content.clone(),
            capture_type: self.capture_type.parse().unwrap_or_default(),
            timestamp: self.timestamp,
        }
    }
}

/// Community feed post row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbCommunityPost {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_avatar: String,
    pub content: String,
    pub likes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbCommunityPost {
    pub fn to_api_post(&self) -> CommunityPost {
        CommunityPost {
            id: self.id,
            user_id: self.user_id,
            user_name: self.user_name.clone(),
            user_avatar: self.user_avatar.clone(),
            content: self.content.clone(),
            likes: self.likes,
            created_at: self.created_at,
        }
    }
}

// === API Response Types ===

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AchievementListResponse {
    pub rows: Vec<AchievementProgress>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CaptureListResponse {
    pub captures: Vec<QuickCapture>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostListResponse {
    pub posts: Vec<CommunityPost>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostListQuery {
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn db_task(priority: &str) -> DbTask {
        DbTask {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Water plants".to_string(),
            completed: false,
            priority: priority.to_string(),
            steps: Some(vec!["Fill can".to_string()]),
            current_step: Some(0),
            completed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn task_conversion_keeps_priority_and_steps() {
        let task = db_task("urgent").to_api_task();
        assert_eq!(task.priority, Priority::Urgent);
        assert_eq!(task.steps.as_deref(), Some(&["Fill can".to_string()][..]));
        assert_eq!(task.current_step, Some(0));
    }

    #[test]
    fn stats_snapshot_carries_owner_and_version() {
        let row = DbUserStats {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            tasks_completed: 3,
            focus_sessions: 2,
            current_streak: 1,
            total_points: 160,
            level: 2,
            version: 4,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let snapshot = row.to_snapshot();
        assert_eq!(snapshot.user_id, row.user_id);
        assert_eq!(snapshot.version, 4);
        assert_eq!(snapshot.updated_at, row.updated_at);
        assert_eq!(snapshot.stats.total_points, 160);
        assert!(snapshot.stats.is_consistent());
    }

    #[test]
    fn achievement_without_progress_reads_as_zero() {
        let row = DbAchievement {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            achievement_id: "3".to_string(),
            unlocked: false,
            progress: None,
            unlocked_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(row.to_progress().progress, 0);
    }
}
