//! Error types for lumi-core.

use thiserror::Error;

/// Result type alias using CoreError.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by domain rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid priority: {0}")]
    InvalidPriority(String),

    #[error("invalid capture type: {0}")]
    InvalidCaptureType(String),

    #[error("unknown stats trigger: {0}")]
    UnknownTrigger(String),

    #[error("unknown achievement: {0}")]
    UnknownAchievement(String),

    #[error("duration {0} min is not one of the timer presets")]
    InvalidDuration(u32),

    #[error("timer is running")]
    TimerRunning,

    #[error("empty content")]
    EmptyContent,
}
