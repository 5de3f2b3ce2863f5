//! Core LUMI library shared by the backend and client applications.
//!
//! Provides:
//! - Shared types (Task, Priority, Stats, QuickCapture, CommunityPost)
//! - Gamification rules (points per trigger, level formula)
//! - Achievement catalogue and unlock rule
//! - Pomodoro timer state machine
//! - Emergency "one thing now" cursor
//! - Wire types shared by the backend API and its clients

pub mod achievements;
pub mod api;
pub mod emergency;
pub mod error;
pub mod gamification;
pub mod timer;
pub mod types;

pub use achievements::{Achievement, AchievementDefinition, AchievementProgress, CATALOGUE};
pub use api::StatsSnapshot;
pub use emergency::EmergencyCursor;
pub use error::{CoreError, Result};
pub use gamification::{level_for_points, StatsDelta, StatsTrigger};
pub use timer::{PomodoroTimer, TickOutcome, TimerPhase};
pub use types::{CaptureType, CommunityPost, Priority, QuickCapture, Stats, Task, ViewMode};
