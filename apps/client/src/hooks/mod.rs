//! Data-access hooks.
//!
//! Each hook owns the state one screen renders from and writes through to
//! the [`RemoteStore`](crate::store::RemoteStore). Remote failures become a
//! user-facing message in [`HookState::error`]; mutations also return them.

pub mod achievements;
pub mod captures;
pub mod community;
pub mod stats;
pub mod tasks;

pub use achievements::AchievementHook;
pub use captures::CaptureHook;
pub use community::{CommunityHook, Profile};
pub use stats::{StatsEvent, StatsHook};
pub use tasks::{TaskHook, ToggleOutcome};

use crate::error::ClientError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HookState<T> {
    pub items: T,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> HookState<T> {
    pub(crate) fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub(crate) fn finish(&mut self) {
        self.loading = false;
    }

    /// Record a failure and hand the error back for `?`.
    pub(crate) fn fail(&mut self, operation: &str, error: ClientError) -> ClientError {
        tracing::warn!(operation, error = %error, "Remote call failed");
        self.loading = false;
        self.error = Some(error.user_message());
        error
    }
}
