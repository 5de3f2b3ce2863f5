//! Points, levels and the two triggers that move them.
//!
//! A completed task is worth [`TASK_POINTS`], a finished focus session
//! [`FOCUS_SESSION_POINTS`]. The level is always derived from the running
//! point total: `floor(total_points / POINTS_PER_LEVEL) + 1`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Stats;

pub const TASK_POINTS: i32 = 20;
pub const FOCUS_SESSION_POINTS: i32 = 50;
pub const POINTS_PER_LEVEL: i32 = 100;

/// Minutes credited per focus session on the stats screen.
pub const FOCUS_SESSION_MINUTES: i32 = 25;

/// Event that changes a user's aggregate stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsTrigger {
    TaskCompleted,
    FocusSession,
}

impl StatsTrigger {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TaskCompleted => "task_completed",
            Self::FocusSession => "focus_session",
        }
    }

    pub fn points(self) -> i32 {
        match self {
            Self::TaskCompleted => TASK_POINTS,
            Self::FocusSession => FOCUS_SESSION_POINTS,
        }
    }

    /// Counter increments this trigger applies.
    pub fn delta(self) -> StatsDelta {
        match self {
            Self::TaskCompleted => StatsDelta {
                tasks_completed: 1,
                focus_sessions: 0,
                total_points: TASK_POINTS,
            },
            Self::FocusSession => StatsDelta {
                tasks_completed: 0,
                focus_sessions: 1,
                total_points: FOCUS_SESSION_POINTS,
            },
        }
    }
}

impl FromStr for StatsTrigger {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task_completed" => Ok(Self::TaskCompleted),
            "focus_session" => Ok(Self::FocusSession),
            other => Err(CoreError::UnknownTrigger(other.to_string())),
        }
    }
}

impl fmt::Display for StatsTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Increments applied atomically by a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsDelta {
    pub tasks_completed: i32,
    pub focus_sessions: i32,
    pub total_points: i32,
}

/// Level reached with `total_points` points.
pub fn level_for_points(total_points: i32) -> i32 {
    total_points.div_euclid(POINTS_PER_LEVEL) + 1
}

impl Stats {
    /// Row created for a user whose first stats event is `trigger`.
    ///
    /// The streak starts at one on that first event.
    pub fn first_for(trigger: StatsTrigger) -> Self {
        let mut stats = Self {
            current_streak: 1,
            ..Self::default()
        };
        stats.apply(trigger);
        stats
    }

    /// Apply one trigger and recompute the level.
    pub fn apply(&mut self, trigger: StatsTrigger) {
        let delta = trigger.delta();
        self.tasks_completed += delta.tasks_completed;
        self.focus_sessions += delta.focus_sessions;
        self.total_points += delta.total_points;
        self.level = level_for_points(self.total_points);
    }

    /// Copy of `self` with `trigger` applied.
    pub fn applied(mut self, trigger: StatsTrigger) -> Self {
        self.apply(trigger);
        self
    }

    pub fn points_into_level(&self) -> i32 {
        self.total_points.rem_euclid(POINTS_PER_LEVEL)
    }

    pub fn points_to_next_level(&self) -> i32 {
        POINTS_PER_LEVEL - self.points_into_level()
    }

    /// Fraction of the current level already earned, in `[0, 1)`.
    pub fn level_progress(&self) -> f64 {
        f64::from(self.points_into_level()) / f64::from(POINTS_PER_LEVEL)
    }

    pub fn focus_minutes(&self) -> i32 {
        self.focus_sessions * FOCUS_SESSION_MINUTES
    }

    /// Whether `level` agrees with `total_points`.
    pub fn is_consistent(&self) -> bool {
        self.level == level_for_points(self.total_points)
    }
}
