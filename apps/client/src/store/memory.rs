//! In-process store for local-only operation and tests.
//!
//! Mirrors the backend's rules: newest-first listings, atomic stats
//! increments deduplicated by event id, catalogue-checked achievements.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use lumi_core::achievements::definition;
use lumi_core::api::{
    CreateCaptureRequest, CreatePostRequest, CreateTaskRequest, StatsEventRequest,
    StatsEventResponse, StatsSnapshot,
};
use lumi_core::{AchievementProgress, CommunityPost, QuickCapture, Stats, Task};

use super::{RemoteStore, STATS_FEED_BUFFER};
use crate::error::{ClientError, Result};

#[derive(Default)]
struct MemoryState {
    tasks: Vec<Task>,
    stats: Option<StatsSnapshot>,
    seen_events: HashSet<Uuid>,
    achievements: Vec<AchievementProgress>,
    captures: Vec<QuickCapture>,
    posts: Vec<CommunityPost>,
    subscribers: Vec<mpsc::Sender<StatsSnapshot>>,
}

impl MemoryState {
    fn task_mut(&mut self, task_id: Uuid) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| ClientError::NotFound(format!("Task {}", task_id)))
    }

    fn publish(&mut self, snapshot: StatsSnapshot) {
        self.subscribers
            .retain(|tx| !matches!(tx.try_send(snapshot), Err(mpsc::error::TrySendError::Closed(_))));
    }
}

/// Store that keeps one user's data in memory.
#[derive(Clone)]
pub struct MemoryStore {
    user_id: Uuid,
    state: Arc<Mutex<MemoryState>>,
    offline: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            state: Arc::new(Mutex::new(MemoryState::default())),
            offline: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Make every call fail with a network error until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Apply a trigger on behalf of another device, as the feed would see it.
    pub async fn push_external_event(&self, request: StatsEventRequest) -> StatsEventResponse {
        let mut state = self.state.lock().await;
        self.increment(&mut state, request)
    }

    fn ensure_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ClientError::Network("store offline".to_string()));
        }
        Ok(())
    }

    fn zero_snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            user_id: self.user_id,
            stats: Stats::default(),
            version: 0,
            updated_at: Utc::now(),
        }
    }

    fn increment(&self, state: &mut MemoryState, request: StatsEventRequest) -> StatsEventResponse {
        if let Some(event_id) = request.event_id {
            if !state.seen_events.insert(event_id) {
                let snapshot = state.stats.unwrap_or_else(|| self.zero_snapshot());
                return StatsEventResponse {
                    snapshot,
                    applied: false,
                };
            }
        }

        let (stats, version) = match state.stats {
            Some(current) => (current.stats.applied(request.trigger), current.version + 1),
            None => (Stats::first_for(request.trigger), 1),
        };
        let snapshot = StatsSnapshot {
            user_id: self.user_id,
            stats,
            version,
            updated_at: Utc::now(),
        };
        state.stats = Some(snapshot);
        state.publish(snapshot);

        StatsEventResponse {
            snapshot,
            applied: true,
        }
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn check_connection(&self) -> Result<bool> {
        self.ensure_online()?;
        Ok(true)
    }

    async fn list_tasks(&self) -> Result<Vec<Task>> {
        self.ensure_online()?;
        Ok(self.state.lock().await.tasks.clone())
    }

    async fn create_task(&self, request: &CreateTaskRequest) -> Result<Task> {
        self.ensure_online()?;
        let mut task = Task::new(request.title.trim(), request.priority);
        if let Some(steps) = &request.steps {
            task.steps = Some(steps.clone());
            task.current_step = Some(0);
        }
        self.state.lock().await.tasks.insert(0, task.clone());
        Ok(task)
    }

    async fn set_task_completed(&self, task_id: Uuid, completed: bool) -> Result<Task> {
        self.ensure_online()?;
        let mut state = self.state.lock().await;
        let task = state.task_mut(task_id)?;
        task.completed = completed;
        task.completed_at = completed.then(Utc::now);
        Ok(task.clone())
    }

    async fn advance_task_step(&self, task_id: Uuid) -> Result<Task> {
        self.ensure_online()?;
        let mut state = self.state.lock().await;
        let task = state.task_mut(task_id)?;
        if task.advance_step().is_none() {
            return Err(ClientError::Backend {
                status: 400,
                message: "Task has no remaining steps".to_string(),
            });
        }
        Ok(task.clone())
    }

    async fn delete_task(&self, task_id: Uuid) -> Result<bool> {
        self.ensure_online()?;
        let mut state = self.state.lock().await;
        let before = state.tasks.len();
        state.tasks.retain(|t| t.id != task_id);
        Ok(state.tasks.len() < before)
    }

    async fn get_stats(&self) -> Result<StatsSnapshot> {
        self.ensure_online()?;
        let mut state = self.state.lock().await;
        let snapshot = *state.stats.get_or_insert_with(|| self.zero_snapshot());
        Ok(snapshot)
    }

    async fn record_stats_event(&self, request: StatsEventRequest) -> Result<StatsEventResponse> {
        self.ensure_online()?;
        let mut state = self.state.lock().await;
        Ok(self.increment(&mut state, request))
    }

    async fn subscribe_stats(&self) -> Result<mpsc::Receiver<StatsSnapshot>> {
        self.ensure_online()?;
        let (tx, rx) = mpsc::channel(STATS_FEED_BUFFER);
        let mut state = self.state.lock().await;
        if let Some(current) = state.stats {
            let _ = tx.try_send(current);
        }
        state.subscribers.push(tx);
        Ok(rx)
    }

    async fn list_achievements(&self) -> Result<Vec<AchievementProgress>> {
        self.ensure_online()?;
        Ok(self.state.lock().await.achievements.clone())
    }

    async fn create_achievements(&self, achievement_ids: &[String]) -> Result<Vec<AchievementProgress>> {
        self.ensure_online()?;
        for id in achievement_ids {
            definition(id)?;
        }
        let mut state = self.state.lock().await;
        for id in achievement_ids {
            if !state.achievements.iter().any(|a| &a.achievement_id == id) {
                state.achievements.push(AchievementProgress::empty(id));
            }
        }
        Ok(state.achievements.clone())
    }

    async fn update_achievement(&self, achievement_id: &str, progress: i32) -> Result<AchievementProgress> {
        self.ensure_online()?;
        let def = definition(achievement_id)?;
        let mut state = self.state.lock().await;
        let index = match state
            .achievements
            .iter()
            .position(|a| a.achievement_id == achievement_id)
        {
            Some(index) => index,
            None => {
                state.achievements.push(AchievementProgress::empty(achievement_id));
                state.achievements.len() - 1
            }
        };
        let row = &mut state.achievements[index];
        row.record(progress, def.total, Utc::now());
        Ok(row.clone())
    }

    async fn list_captures(&self) -> Result<Vec<QuickCapture>> {
        self.ensure_online()?;
        let mut captures = self.state.lock().await.captures.clone();
        captures.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(captures)
    }

    async fn create_capture(&self, request: &CreateCaptureRequest) -> Result<QuickCapture> {
        self.ensure_online()?;
        let capture = QuickCapture {
            id: Uuid::new_v4(),
            content: request.content.trim().to_string(),
            capture_type: request.capture_type,
            timestamp: Utc::now(),
        };
        self.state.lock().await.captures.insert(0, capture.clone());
        Ok(capture)
    }

    async fn delete_capture(&self, capture_id: Uuid) -> Result<bool> {
        self.ensure_online()?;
        let mut state = self.state.lock().await;
        let before = state.captures.len();
        state.captures.retain(|c| c.id != capture_id);
        Ok(state.captures.len() < before)
    }

    async fn list_posts(&self, limit: Option<i64>) -> Result<Vec<CommunityPost>> {
        self.ensure_online()?;
        let state = self.state.lock().await;
        let limit = limit.unwrap_or(50).clamp(1, 200) as usize;
        Ok(state.posts.iter().take(limit).cloned().collect())
    }

    async fn create_post(&self, request: &CreatePostRequest) -> Result<CommunityPost> {
        self.ensure_online()?;
        let post = CommunityPost {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            user_name: request.user_name.clone(),
            user_avatar: request.user_avatar.clone(),
            content: request.content.clone(),
            likes: 0,
            created_at: Utc::now(),
        };
        self.state.lock().await.posts.insert(0, post.clone());
        Ok(post)
    }

    async fn like_post(&self, post_id: Uuid) -> Result<CommunityPost> {
        self.ensure_online()?;
        let mut state = self.state.lock().await;
        let post = state
            .posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or_else(|| ClientError::NotFound(format!("Post {}", post_id)))?;
        post.likes += 1;
        Ok(post.clone())
    }
}
