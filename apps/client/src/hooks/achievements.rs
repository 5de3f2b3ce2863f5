//! Achievement hook: catalogue joined with the user's progress rows.

use std::sync::Arc;

use lumi_core::achievements::{join_catalogue, missing_definitions};
use lumi_core::{Achievement, AchievementProgress};

use super::HookState;
use crate::error::{ClientError, Result};
use crate::store::RemoteStore;

pub struct AchievementHook {
    store: Arc<dyn RemoteStore>,
    state: HookState<Vec<Achievement>>,
    rows: Vec<AchievementProgress>,
}

impl AchievementHook {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            store,
            state: HookState::default(),
            rows: Vec::new(),
        }
    }

    pub fn state(&self) -> &HookState<Vec<Achievement>> {
        &self.state
    }

    /// Catalogue order, one entry per definition.
    pub fn achievements(&self) -> &[Achievement] {
        &self.state.items
    }

    pub fn unlocked_count(&self) -> usize {
        self.state.items.iter().filter(|a| a.unlocked).count()
    }

    /// Load progress rows, creating zero rows for catalogue entries the user
    /// has never touched.
    pub async fn load(&mut self) -> Result<()> {
        self.state.begin();

        let mut rows = match self.store.list_achievements().await {
            Ok(rows) => rows,
            Err(e) => return Err(self.state.fail("load achievements", e)),
        };

        let missing: Vec<String> = missing_definitions(&rows)
            .iter()
            .map(|def| def.id.to_string())
            .collect();
        if !missing.is_empty() {
            tracing::debug!(count = missing.len(), "Creating achievement rows");
            rows = match self.store.create_achievements(&missing).await {
                Ok(rows) => rows,
                Err(e) => return Err(self.state.fail("create achievements", e)),
            };
        }

        self.set_rows(rows);
        self.state.finish();
        Ok(())
    }

    pub async fn update_progress(&mut self, achievement_id: &str, progress: i32) -> Result<Achievement> {
        self.state.error = None;
        let row = match self.store.update_achievement(achievement_id, progress).await {
            Ok(row) => row,
            Err(e) => return Err(self.state.fail("update achievement", e)),
        };

        let mut rows = std::mem::take(&mut self.rows);
        match rows.iter_mut().find(|r| r.achievement_id == row.achievement_id) {
            Some(slot) => *slot = row,
            None => rows.push(row),
        }
        self.set_rows(rows);

        self.state
            .items
            .iter()
            .find(|a| a.id == achievement_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("Achievement {achievement_id}")))
    }

    fn set_rows(&mut self, rows: Vec<AchievementProgress>) {
        self.state.items = join_catalogue(&rows);
        self.rows = rows;
    }
}
