//! Achievement catalogue and per-user progress.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// A fixed achievement definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementDefinition {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub total: i32,
}

/// Every achievement a user can unlock.
pub const CATALOGUE: [AchievementDefinition; 6] = [
    AchievementDefinition {
        id: "1",
        title: "First Step",
        description: "Complete your first task",
        icon: "🎯",
        total: 1,
    },
    AchievementDefinition {
        id: "2",
        title: "Total Focus",
        description: "Complete 5 focus sessions",
        icon: "🔥",
        total: 5,
    },
    AchievementDefinition {
        id: "3",
        title: "7-Day Streak",
        description: "Keep a 7 day streak",
        icon: "⭐",
        total: 7,
    },
    AchievementDefinition {
        id: "4",
        title: "Productivity Master",
        description: "Complete 50 tasks",
        icon: "🏆",
        total: 50,
    },
    AchievementDefinition {
        id: "5",
        title: "Early Bird",
        description: "Complete a task before 8am",
        icon: "🌅",
        total: 1,
    },
    AchievementDefinition {
        id: "6",
        title: "Organizer",
        description: "Organize 20 tasks into categories",
        icon: "📋",
        total: 20,
    },
];

/// Look up a definition by id.
pub fn definition(id: &str) -> Result<&'static AchievementDefinition> {
    CATALOGUE
        .iter()
        .find(|d| d.id == id)
        .ok_or_else(|| CoreError::UnknownAchievement(id.to_string()))
}

/// Stored progress of one user on one achievement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementProgress {
    pub achievement_id: String,
    pub progress: i32,
    pub unlocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl AchievementProgress {
    /// Zero progress row for a definition.
    pub fn empty(achievement_id: &str) -> Self {
        Self {
            achievement_id: achievement_id.to_string(),
            progress: 0,
            unlocked: false,
            unlocked_at: None,
        }
    }

    /// Set progress and derive the unlock flag against `total`.
    ///
    /// `unlocked_at` keeps the first unlock time while the achievement stays
    /// unlocked and is cleared if progress drops below the threshold.
    pub fn record(&mut self, progress: i32, total: i32, now: DateTime<Utc>) {
        self.progress = progress;
        self.unlocked = progress >= total;
        self.unlocked_at = match (self.unlocked, self.unlocked_at) {
            (true, Some(at)) => Some(at),
            (true, None) => Some(now),
            (false, _) => None,
        };
    }
}

/// Catalogue definition joined with the user's progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub unlocked: bool,
    pub progress: i32,
    pub total: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl Achievement {
    fn from_parts(def: &AchievementDefinition, row: Option<&AchievementProgress>) -> Self {
        Self {
            id: def.id.to_string(),
            title: def.title.to_string(),
            description: def.description.to_string(),
            icon: def.icon.to_string(),
            unlocked: row.map(|r| r.unlocked).unwrap_or(false),
            progress: row.map(|r| r.progress).unwrap_or(0),
            total: def.total,
            unlocked_at: row.and_then(|r| r.unlocked_at),
        }
    }

    /// Share of the target reached, capped at 1.
    pub fn completion(&self) -> f64 {
        if self.total <= 0 {
            return 0.0;
        }
        (f64::from(self.progress) / f64::from(self.total)).clamp(0.0, 1.0)
    }
}

/// Join stored rows against the catalogue, in catalogue order.
///
/// Rows for ids outside the catalogue are ignored.
pub fn join_catalogue(rows: &[AchievementProgress]) -> Vec<Achievement> {
    let by_id: HashMap<&str, &AchievementProgress> = rows
        .iter()
        .map(|r| (r.achievement_id.as_str(), r))
        .collect();

    CATALOGUE
        .iter()
        .map(|def| Achievement::from_parts(def, by_id.get(def.id).copied()))
        .collect()
}

/// Catalogue entries that have no stored row yet.
pub fn missing_definitions(rows: &[AchievementProgress]) -> Vec<&'static AchievementDefinition> {
    CATALOGUE
        .iter()
        .filter(|def| !rows.iter().any(|r| r.achievement_id == def.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn catalogue_has_six_unique_ids() {
        let ids: HashSet<&str> = CATALOGUE.iter().map(|d| d.id).collect();
        assert_eq!(CATALOGUE.len(), 6);
        assert_eq!(ids.len(), CATALOGUE.len());
        assert_eq!(definition("4").unwrap().total, 50);
        assert!(matches!(definition("42"), Err(CoreError::UnknownAchievement(_))));
    }

    #[test]
    fn unlocked_iff_progress_reaches_total() {
        let now = Utc::now();
        for def in CATALOGUE {
            for progress in 0..=def.total + 1 {
                let mut row = AchievementProgress::empty(def.id);
                row.record(progress, def.total, now);
                assert_eq!(row.unlocked, progress >= def.total, "{} at {}", def.id, progress);
                assert_eq!(row.unlocked_at.is_some(), row.unlocked);
            }
        }
    }

    #[test]
    fn unlock_time_is_kept_on_further_progress() {
        let first = Utc::now();
        let later = first + chrono::Duration::hours(3);
        let mut row = AchievementProgress::empty("2");

        row.record(5, 5, first);
        row.record(6, 5, later);

        assert_eq!(row.unlocked_at, Some(first));
    }

    #[test]
    fn join_fills_defaults_for_missing_rows() {
        let mut row = AchievementProgress::empty("2");
        row.record(3, 5, Utc::now());

        let joined = join_catalogue(&[row]);
        assert_eq!(joined.len(), 6);
        assert_eq!(joined[0].progress, 0);
        assert!(!joined[0].unlocked);
        assert_eq!(joined[1].progress, 3);
        assert_eq!(joined[1].total, 5);
        assert!((joined[1].completion() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn missing_definitions_skip_existing_rows() {
        let rows = vec![AchievementProgress::empty("1"), AchievementProgress::empty("6")];
        let missing: Vec<&str> = missing_definitions(&rows).iter().map(|d| d.id).collect();
        assert_eq!(missing, vec!["2", "3", "4", "5"]);
        assert!(missing_definitions(&join_rows_all()).is_empty());
    }

    fn join_rows_all() -> Vec<AchievementProgress> {
        CATALOGUE.iter().map(|d| AchievementProgress::empty(d.id)).collect()
    }
}
