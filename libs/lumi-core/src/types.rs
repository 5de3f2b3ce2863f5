//! Core types for the LUMI application.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Task priority, ordered from most to least pressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Urgent,
    High,
    Medium,
    Low,
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl Priority {
    pub const ALL: [Priority; 4] = [Self::Urgent, Self::High, Self::Medium, Self::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Urgent and high tasks are the ones shown in focus view.
    pub fn is_pressing(self) -> bool {
        matches!(self, Self::Urgent | Self::High)
    }
}

impl FromStr for Priority {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "urgent" => Ok(Self::Urgent),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(CoreError::InvalidPriority(other.to_string())),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single task on the user's list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub completed: bool,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_step: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(title: impl Into<String>, priority: Priority) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            completed: false,
            priority,
            steps: None,
            current_step: None,
            completed_at: None,
        }
    }

    /// Flip completion, stamping or clearing `completed_at`.
    ///
    /// Returns the new completion flag.
    pub fn toggle(&mut self, now: DateTime<Utc>) -> bool {
        self.completed = !self.completed;
        self.completed_at = if self.completed { Some(now) } else { None };
        self.completed
    }

    /// Move the step cursor forward by one.
    ///
    /// The cursor stops at `steps.len()`, meaning every step is done. Returns
    /// `None` for tasks without steps or when already past the last step.
    pub fn advance_step(&mut self) -> Option<u32> {
        let total = self.steps.as_ref()?.len() as u32;
        let current = self.current_step.unwrap_or(0);
        if current >= total {
            return None;
        }
        let next = current + 1;
        self.current_step = Some(next);
        Some(next)
    }

    /// The step the user is working on, if any remain.
    pub fn current_step_title(&self) -> Option<&str> {
        let steps = self.steps.as_ref()?;
        let index = self.current_step.unwrap_or(0) as usize;
        steps.get(index).map(String::as_str)
    }
}

/// Which tasks the list screen shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    All,
    Focus,
}

impl Default for ViewMode {
    fn default() -> Self {
        Self::All
    }
}

impl ViewMode {
    /// Incomplete tasks visible in this mode, in list order.
    pub fn filter<'a>(self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks
            .iter()
            .filter(|t| !t.completed)
            .filter(|t| match self {
                Self::All => true,
                Self::Focus => t.priority.is_pressing(),
            })
            .collect()
    }
}

/// Per-user aggregate counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub tasks_completed: i32,
    pub focus_sessions: i32,
    pub current_streak: i32,
    pub total_points: i32,
    pub level: i32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            tasks_completed: 0,
            focus_sessions: 0,
            current_streak: 0,
            total_points: 0,
            level: 1,
        }
    }
}

/// Kind of quick capture. Only text is written by the UI today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureType {
    Text,
    Audio,
    Photo,
}

impl Default for CaptureType {
    fn default() -> Self {
        Self::Text
    }
}

impl CaptureType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Audio => "audio",
            Self::Photo => "photo",
        }
    }
}

impl FromStr for CaptureType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "audio" => Ok(Self::Audio),
            "photo" => Ok(Self::Photo),
            other => Err(CoreError::InvalidCaptureType(other.to_string())),
        }
    }
}

impl fmt::Display for CaptureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A quickly jotted note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickCapture {
    pub id: Uuid,
    pub content: String,
    #[serde(rename = "type")]
    pub capture_type: CaptureType,
    pub timestamp: DateTime<Utc>,
}

/// A post on the community feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityPost {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_avatar: String,
    pub content: String,
    pub likes: i32,
    pub created_at: DateTime<Utc>,
}
