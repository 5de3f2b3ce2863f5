//! Remote data store seam.
//!
//! Hooks talk to storage only through [`RemoteStore`]. [`HttpStore`] reaches
//! the backend API; [`MemoryStore`] keeps everything in process for
//! local-only operation and tests. Both are scoped to one user.

mod http;
mod memory;

pub use http::HttpStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use lumi_core::api::{
    CreateCaptureRequest, CreatePostRequest, CreateTaskRequest, StatsEventRequest,
    StatsEventResponse, StatsSnapshot,
};
use lumi_core::{AchievementProgress, CommunityPost, QuickCapture, Task};

use crate::error::Result;

/// Buffered stats changes held for a slow subscriber.
pub const STATS_FEED_BUFFER: usize = 64;

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Round trip to the store; `false` when it answers but is unhealthy.
    async fn check_connection(&self) -> Result<bool>;

    // Tasks
    async fn list_tasks(&self) -> Result<Vec<Task>>;
    async fn create_task(&self, request: &CreateTaskRequest) -> Result<Task>;
    async fn set_task_completed(&self, task_id: Uuid, completed: bool) -> Result<Task>;
    async fn advance_task_step(&self, task_id: Uuid) -> Result<Task>;
    async fn delete_task(&self, task_id: Uuid) -> Result<bool>;

    // Stats
    async fn get_stats(&self) -> Result<StatsSnapshot>;
    async fn record_stats_event(&self, request: StatsEventRequest) -> Result<StatsEventResponse>;
    /// Stream of row changes for the user's stats; ends when the feed closes.
    async fn subscribe_stats(&self) -> Result<mpsc::Receiver<StatsSnapshot>>;

    // Achievements
    async fn list_achievements(&self) -> Result<Vec<AchievementProgress>>;
    async fn create_achievements(&self, achievement_ids: &[String]) -> Result<Vec<AchievementProgress>>;
    async fn update_achievement(&self, achievement_id: &str, progress: i32) -> Result<AchievementProgress>;

    // Captures
    async fn list_captures(&self) -> Result<Vec<QuickCapture>>;
    async fn create_capture(&self, request: &CreateCaptureRequest) -> Result<QuickCapture>;
    async fn delete_capture(&self, capture_id: Uuid) -> Result<bool>;

    // Community
    async fn list_posts(&self, limit: Option<i64>) -> Result<Vec<CommunityPost>>;
    async fn create_post(&self, request: &CreatePostRequest) -> Result<CommunityPost>;
    async fn like_post(&self, post_id: Uuid) -> Result<CommunityPost>;
}
