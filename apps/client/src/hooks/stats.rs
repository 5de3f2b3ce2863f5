//! Stats hook with a live subscription.
//!
//! Loads, local writes and remote row changes all go through
//! [`StatsHook::reduce`], so a late remote notification can never overwrite a
//! newer row obtained from a local write.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use lumi_core::api::{StatsEventRequest, StatsSnapshot};
use lumi_core::{Stats, StatsTrigger};

use super::HookState;
use crate::error::Result;
use crate::store::RemoteStore;

/// Input to the stats reducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsEvent {
    Loaded(StatsSnapshot),
    /// Row returned by this client's own write.
    Local(StatsSnapshot),
    /// Row pushed by the change feed.
    Remote(StatsSnapshot),
}

impl StatsEvent {
    fn snapshot(self) -> StatsSnapshot {
        match self {
            StatsEvent::Loaded(s) | StatsEvent::Local(s) | StatsEvent::Remote(s) => s,
        }
    }
}

pub struct StatsHook {
    store: Arc<dyn RemoteStore>,
    state: HookState<Option<StatsSnapshot>>,
    feed: Option<mpsc::Receiver<StatsSnapshot>>,
}

impl StatsHook {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            store,
            state: HookState::default(),
            feed: None,
        }
    }

    pub fn state(&self) -> &HookState<Option<StatsSnapshot>> {
        &self.state
    }

    /// Current aggregate, zero-valued until loaded.
    pub fn stats(&self) -> Stats {
        self.state.items.map(|s| s.stats).unwrap_or_default()
    }

    pub fn is_subscribed(&self) -> bool {
        self.feed.is_some()
    }

    /// Fold one row into the held state.
    ///
    /// Rows with a lower version than the held one are dropped; returns
    /// whether the event was taken. `updated_at` is stamped at transaction
    /// start, not at commit, and is never compared.
    pub fn reduce(&mut self, event: StatsEvent) -> bool {
        let incoming = event.snapshot();
        if let Some(current) = self.state.items {
            if !incoming.supersedes(&current) {
                debug!(?event, "Stale stats row ignored");
                return false;
            }
        }
        self.state.items = Some(incoming);
        true
    }

    /// Load the row; the store creates the zero row if the user has none.
    pub async fn load(&mut self) -> Result<()> {
        self.state.begin();
        match self.store.get_stats().await {
            Ok(snapshot) => {
                self.reduce(StatsEvent::Loaded(snapshot));
                self.state.finish();
                Ok(())
            }
            Err(e) => Err(self.state.fail("load stats", e)),
        }
    }

    pub async fn record(&mut self, trigger: StatsTrigger) -> Result<StatsSnapshot> {
        self.state.error = None;
        let request = StatsEventRequest {
            trigger,
            event_id: Some(Uuid::new_v4()),
        };
        match self.store.record_stats_event(request).await {
            Ok(response) => {
                self.reduce(StatsEvent::Local(response.snapshot));
                Ok(response.snapshot)
            }
            Err(e) => Err(self.state.fail("record stats", e)),
        }
    }

    pub async fn increment_focus_session(&mut self) -> Result<StatsSnapshot> {
        self.record(StatsTrigger::FocusSession).await
    }

    /// Open the change feed; replaces any previous subscription.
    pub async fn subscribe(&mut self) -> Result<()> {
        match self.store.subscribe_stats().await {
            Ok(feed) => {
                self.feed = Some(feed);
                Ok(())
            }
            Err(e) => Err(self.state.fail("subscribe to stats", e)),
        }
    }

    pub fn unsubscribe(&mut self) {
        self.feed = None;
    }

    /// Wait for the next remote row and fold it in.
    ///
    /// Returns `None` once the feed has closed (or was never opened).
    pub async fn next_remote(&mut self) -> Option<bool> {
        let feed = self.feed.as_mut()?;
        match feed.recv().await {
            Some(snapshot) => Some(self.reduce(StatsEvent::Remote(snapshot))),
            None => {
                self.feed = None;
                None
            }
        }
    }

    /// Fold every remote row already waiting, without blocking.
    pub fn drain_remote(&mut self) -> usize {
        let mut pending = Vec::new();
        if let Some(feed) = self.feed.as_mut() {
            while let Ok(snapshot) = feed.try_recv() {
                pending.push(snapshot);
            }
        }
        pending
            .into_iter()
            .filter(|s| self.reduce(StatsEvent::Remote(*s)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;

    fn snapshot(user_id: Uuid, points: i32, version: i64, age_secs: i64) -> StatsSnapshot {
        let stats = Stats {
            total_points: points,
            level: lumi_core::level_for_points(points),
            ..Stats::default()
        };
        StatsSnapshot {
            user_id,
            stats,
            version,
            updated_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    #[tokio::test]
    async fn load_creates_zero_row() {
        let store = MemoryStore::new(Uuid::new_v4());
        let mut hook = StatsHook::new(Arc::new(store));
        hook.load().await.unwrap();
        assert_eq!(hook.stats(), Stats::default());
        assert!(!hook.state().loading);
    }

    #[tokio::test]
    async fn two_focus_sessions_reach_level_two() {
        let store = MemoryStore::new(Uuid::new_v4());
        let mut hook = StatsHook::new(Arc::new(store));
        hook.increment_focus_session().await.unwrap();
        let snapshot = hook.increment_focus_session().await.unwrap();
        assert_eq!(snapshot.stats.total_points, 100);
        assert_eq!(hook.stats().level, 2);
    }

    #[test]
    fn reducer_drops_older_rows() {
        let store = MemoryStore::new(Uuid::new_v4());
        let user_id = store.user_id();
        let mut hook = StatsHook::new(Arc::new(store));

        assert!(hook.reduce(StatsEvent::Local(snapshot(user_id, 70, 3, 0))));
        assert!(!hook.reduce(StatsEvent::Remote(snapshot(user_id, 50, 2, 10))));
        assert_eq!(hook.stats().total_points, 70);
    }

    #[test]
    fn reducer_orders_by_version_not_timestamp() {
        let store = MemoryStore::new(Uuid::new_v4());
        let user_id = store.user_id();
        let mut hook = StatsHook::new(Arc::new(store));

        // A transaction that started first but committed second carries the
        // earlier stamp and the higher version.
        assert!(hook.reduce(StatsEvent::Remote(snapshot(user_id, 20, 1, 0))));
        assert!(hook.reduce(StatsEvent::Remote(snapshot(user_id, 40, 2, 1))));
        assert_eq!(hook.stats().total_points, 40);

        assert!(!hook.reduce(StatsEvent::Local(snapshot(user_id, 20, 1, 0))));
        assert_eq!(hook.stats().total_points, 40);
    }

    #[test]
    fn reducer_ignores_other_users() {
        let store = MemoryStore::new(Uuid::new_v4());
        let user_id = store.user_id();
        let mut hook = StatsHook::new(Arc::new(store));

        hook.reduce(StatsEvent::Loaded(snapshot(user_id, 0, 0, 5)));
        assert!(!hook.reduce(StatsEvent::Remote(snapshot(Uuid::new_v4(), 500, 9, 0))));
        assert_eq!(hook.stats().total_points, 0);
    }

    #[tokio::test]
    async fn remote_changes_arrive_through_the_feed() {
        let store = MemoryStore::new(Uuid::new_v4());
        let mut hook = StatsHook::new(Arc::new(store.clone()));
        hook.load().await.unwrap();
        hook.subscribe().await.unwrap();

        store
            .push_external_event(StatsEventRequest {
                trigger: StatsTrigger::TaskCompleted,
                event_id: None,
            })
            .await;

        // The first row is the current one sent on subscribe
        while hook.stats().total_points == 0 {
            assert!(hook.next_remote().await.is_some());
        }
        assert_eq!(hook.stats().tasks_completed, 1);
    }

    #[tokio::test]
    async fn local_write_and_feed_echo_agree() {
        let store = MemoryStore::new(Uuid::new_v4());
        let mut hook = StatsHook::new(Arc::new(store.clone()));
        hook.subscribe().await.unwrap();

        hook.record(StatsTrigger::FocusSession).await.unwrap();
        hook.drain_remote();

        let stats = hook.stats();
        assert_eq!(stats.focus_sessions, 1);
        assert_eq!(stats.total_points, 50);
        assert!(stats.is_consistent());
    }

    #[tokio::test]
    async fn failed_record_sets_error() {
        let store = MemoryStore::new(Uuid::new_v4());
        let mut hook = StatsHook::new(Arc::new(store.clone()));
        store.set_offline(true);
        assert!(hook.record(StatsTrigger::TaskCompleted).await.is_err());
        assert!(hook.state().error.is_some());
    }
}
