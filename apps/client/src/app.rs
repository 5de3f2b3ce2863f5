//! View controller: current screen plus action dispatch to the hooks.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use lumi_core::api::StatsSnapshot;
use lumi_core::{CaptureType, EmergencyCursor, PomodoroTimer, Priority, Task, ViewMode};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::focus::{FocusEvent, FocusEvents, FocusTimer};
use crate::hooks::{
    AchievementHook, CaptureHook, CommunityHook, Profile, StatsEvent, StatsHook, TaskHook,
};
use crate::store::{HttpStore, RemoteStore};

pub const LOCAL_ONLY_BANNER: &str = "Offline: changes are not being saved.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Screen {
    #[default]
    Home,
    Tasks,
    Focus,
    Emergency,
    Capture,
    Settings,
    Gamification,
    Community,
    Stats,
    Learn,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Navigate(Screen),
    AddTask { title: String, priority: Priority },
    ToggleTask(Uuid),
    DeleteTask(Uuid),
    AddCapture(String),
    StartTimer,
    PauseTimer,
    ResetTimer,
    SetDuration(u32),
    EmergencyDone,
    EmergencySkip,
    SetViewMode(ViewMode),
}

impl Action {
    /// Whether the action writes to the remote store.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Action::AddTask { .. }
                | Action::ToggleTask(_)
                | Action::DeleteTask(_)
                | Action::AddCapture(_)
                | Action::EmergencyDone
        )
    }
}

pub struct LumiApp {
    store: Arc<dyn RemoteStore>,
    screen: Screen,
    view_mode: ViewMode,
    connected: bool,
    banner: Option<String>,
    emergency: EmergencyCursor,
    timer: FocusTimer,
    focus_events: FocusEvents,
    pub tasks: TaskHook,
    pub stats: StatsHook,
    pub achievements: AchievementHook,
    pub captures: CaptureHook,
    pub community: CommunityHook,
}

impl LumiApp {
    pub fn new(store: Arc<dyn RemoteStore>, profile: Profile) -> Self {
        let (timer, focus_events) = FocusTimer::new();
        Self {
            tasks: TaskHook::new(Arc::clone(&store)),
            stats: StatsHook::new(Arc::clone(&store)),
            achievements: AchievementHook::new(Arc::clone(&store)),
            captures: CaptureHook::new(Arc::clone(&store)),
            community: CommunityHook::new(Arc::clone(&store), profile),
            store,
            screen: Screen::default(),
            view_mode: ViewMode::All,
            connected: false,
            banner: None,
            emergency: EmergencyCursor::new(),
            timer,
            focus_events,
        }
    }

    /// App talking to the configured backend.
    pub fn from_config(config: &ClientConfig) -> Self {
        let profile = Profile {
            name: config.user_name.clone(),
            avatar: config.user_avatar.clone(),
        };
        Self::new(Arc::new(HttpStore::from_config(config)), profile)
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Persistent connectivity notice, if any.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn timer(&self) -> PomodoroTimer {
        self.timer.snapshot()
    }

    /// Probe the store and set the banner accordingly.
    pub async fn check_connection(&mut self) -> bool {
        match self.store.check_connection().await {
            Ok(true) => {
                self.connected = true;
                self.banner = None;
            }
            Ok(false) => {
                warn!("Store reachable but unhealthy");
                self.connected = false;
                self.banner = Some(LOCAL_ONLY_BANNER.to_string());
            }
            Err(e) => {
                warn!(error = %e, "Connection check failed");
                self.connected = false;
                self.banner = Some(LOCAL_ONLY_BANNER.to_string());
            }
        }
        self.connected
    }

    /// Check connectivity, then load every hook and open the stats feed.
    ///
    /// Individual load failures stay in the hooks' error fields.
    pub async fn boot(&mut self) -> bool {
        if !self.check_connection().await {
            return false;
        }
        let _ = self.tasks.load().await;
        let _ = self.stats.load().await;
        let _ = self.achievements.load().await;
        let _ = self.captures.load().await;
        let _ = self.community.load().await;
        if let Err(e) = self.stats.subscribe().await {
            warn!(error = %e, "Live stats unavailable");
        }
        info!(tasks = self.tasks.tasks().len(), "App ready");
        true
    }

    pub async fn dispatch(&mut self, action: Action) -> Result<()> {
        if action.is_mutation() && !self.connected {
            self.banner = Some(LOCAL_ONLY_BANNER.to_string());
            return Err(ClientError::Disconnected);
        }

        match action {
            Action::Navigate(screen) => {
                if screen == Screen::Emergency {
                    self.emergency.reset();
                }
                self.screen = screen;
            }
            Action::AddTask { title, priority } => {
                self.tasks.add(&title, priority).await?;
            }
            Action::ToggleTask(task_id) => {
                self.toggle_task(task_id).await?;
            }
            Action::DeleteTask(task_id) => {
                self.tasks.delete(task_id).await?;
            }
            Action::AddCapture(content) => {
                self.captures.add(&content, CaptureType::Text).await?;
            }
            Action::StartTimer => self.timer.start(),
            Action::PauseTimer => self.timer.pause(),
            Action::ResetTimer => self.timer.reset(),
            Action::SetDuration(minutes) => self.timer.set_duration(minutes)?,
            Action::EmergencyDone => {
                let len = self.tasks.incomplete().len();
                if let Some(task_id) = self.emergency_task().map(|t| t.id) {
                    self.toggle_task(task_id).await?;
                    self.emergency.complete(len);
                }
            }
            Action::EmergencySkip => {
                let len = self.tasks.incomplete().len();
                self.emergency.skip(len);
            }
            Action::SetViewMode(mode) => self.view_mode = mode,
        }
        Ok(())
    }

    async fn toggle_task(&mut self, task_id: Uuid) -> Result<()> {
        let outcome = self.tasks.toggle(task_id).await?;
        if let Some(snapshot) = outcome.stats {
            self.stats.reduce(StatsEvent::Local(snapshot));
        }
        Ok(())
    }

    /// Incomplete tasks under the current view mode.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.tasks.visible(self.view_mode)
    }

    pub fn emergency_task(&self) -> Option<&Task> {
        self.emergency.current(&self.tasks.incomplete())
    }

    pub fn emergency_position(&self) -> String {
        self.emergency
            .position(self.tasks.incomplete().len())
            .unwrap_or_else(|| "All done!".to_string())
    }

    /// Wait for the next timer event and act on it.
    pub async fn next_focus_event(&mut self) -> Option<FocusEvent> {
        let event = self.focus_events.recv().await?;
        self.handle_focus_event(event).await;
        Some(event)
    }

    /// Handle every timer event already queued.
    pub async fn process_focus_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.focus_events.try_recv() {
            self.handle_focus_event(event).await;
            handled += 1;
        }
        handled
    }

    async fn handle_focus_event(&mut self, event: FocusEvent) {
        if let FocusEvent::Completed { duration_minutes } = event {
            if !self.connected {
                self.banner = Some(LOCAL_ONLY_BANNER.to_string());
                return;
            }
            // Failures land in the stats hook's error; the timer is unaffected
            if let Err(e) = self.stats.increment_focus_session().await {
                warn!(duration_minutes, error = %e, "Focus session not recorded");
            }
        }
    }

    /// Fold queued live stats rows into the stats hook.
    pub fn sync_remote_stats(&mut self) -> usize {
        self.stats.drain_remote()
    }

    pub fn stats_snapshot(&self) -> Option<StatsSnapshot> {
        self.stats.state().items
    }
}
