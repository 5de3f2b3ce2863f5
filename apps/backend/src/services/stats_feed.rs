//! Fan-out of `user_stats` row changes to live subscribers.

use tokio::sync::broadcast;

use crate::models::StatsSnapshot;

/// Capacity of the change channel before slow subscribers start lagging.
const FEED_CAPACITY: usize = 256;

/// Broadcast hub for stats changes; subscribers filter by user id.
#[derive(Clone)]
pub struct StatsFeed {
    tx: broadcast::Sender<StatsSnapshot>,
}

impl Default for StatsFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsFeed {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(FEED_CAPACITY);
        Self { tx }
    }

    /// Publish a changed row. Returns how many subscribers received it.
    pub fn publish(&self, snapshot: StatsSnapshot) -> usize {
        match self.tx.send(snapshot) {
            Ok(n) => n,
            // No subscriber is connected.
            Err(_) => 0,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatsSnapshot> {
        self.tx.subscribe()
    }
}
