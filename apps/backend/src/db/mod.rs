//! PostgreSQL database operations

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

/// Outcome of applying a stats trigger.
#[derive(Debug, Clone)]
pub struct StatsIncrement {
    pub row: DbUserStats,
    /// False when the event id had already been recorded.
    pub applied: bool,
}

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a pool that connects on first use
    pub fn connect_lazy(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_lazy(database_url)?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round trip to check the store is reachable and migrated
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT id FROM users LIMIT 1")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // === User Repository ===

    /// Make sure a users row exists for `user_id`
    pub async fn ensure_user(&self, user_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email)
            VALUES ($1, $2)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(format!("{}@users.lumi.local", user_id))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // === Task Repository ===

    /// All tasks for a user, newest first
    pub async fn list_tasks(&self, user_id: Uuid) -> Result<Vec<DbTask>> {
        let tasks = sqlx::query_as::<_, DbTask>(
            r#"
            SELECT id, user_id, title, completed, priority, steps, current_step,
                   completed_at, created_at, updated_at
            FROM tasks
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    pub async fn get_task(&self, user_id: Uuid, task_id: Uuid) -> Result<Option<DbTask>> {
        let task = sqlx::query_as::<_, DbTask>(
            r#"
            SELECT id, user_id, title, completed, priority, steps, current_step,
                   completed_at, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    /// Insert a task and return the stored row
    pub async fn insert_task(
        &self,
        user_id: Uuid,
        title: &str,
        priority: Priority,
        steps: Option<&[String]>,
    ) -> Result<DbTask> {
        let current_step = steps.map(|_| 0i32);
        let task = sqlx::query_as::<_, DbTask>(
            r#"
            INSERT INTO tasks (user_id, title, priority, completed, steps, current_step)
            VALUES ($1, $2, $3, FALSE, $4, $5)
            RETURNING id, user_id, title, completed, priority, steps, current_step,
                      completed_at, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(title)
        .bind(priority.as_str())
        .bind(steps)
        .bind(current_step)
        .fetch_one(&self.pool)
        .await?;

        Ok(task)
    }

    /// Set completion, stamping or clearing `completed_at`
    pub async fn set_task_completed(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        completed: bool,
    ) -> Result<Option<DbTask>> {
        let task = sqlx::query_as::<_, DbTask>(
            r#"
            UPDATE tasks
            SET completed = $3,
                completed_at = CASE WHEN $3 THEN NOW() ELSE NULL END,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, completed, priority, steps, current_step,
                      completed_at, created_at, updated_at
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .bind(completed)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    pub async fn set_task_step(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        current_step: i32,
    ) -> Result<Option<DbTask>> {
        let task = sqlx::query_as::<_, DbTask>(
            r#"
            UPDATE tasks
            SET current_step = $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, completed, priority, steps, current_step,
                      completed_at, created_at, updated_at
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .bind(current_step)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    pub async fn delete_task(&self, user_id: Uuid, task_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(task_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // === Stats Repository ===

    pub async fn get_stats(&self, user_id: Uuid) -> Result<Option<DbUserStats>> {
        let stats = sqlx::query_as::<_, DbUserStats>(
            r#"
            SELECT id, user_id, tasks_completed, focus_sessions, current_streak,
                   total_points, level, version, created_at, updated_at
            FROM user_stats
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stats)
    }

    /// Return the user's stats row, creating the zero row if absent
    pub async fn get_or_create_stats(&self, user_id: Uuid) -> Result<DbUserStats> {
        let stats = sqlx::query_as::<_, DbUserStats>(
            r#"
            INSERT INTO user_stats (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING id, user_id, tasks_completed, focus_sessions, current_streak,
                      total_points, level, version, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }

    /// Apply a trigger as one atomic increment.
    ///
    /// The counters are added inside the statement, so concurrent triggers
    /// for one user are serialized by the row lock and none is lost. Each
    /// applied trigger bumps `version`, which follows commit order; the
    /// `updated_at` stamp is the transaction start and does not. With an
    /// `event_id`, the key is recorded in the same transaction and a repeat
    /// returns the current row without counting again.
    pub async fn increment_stats(
        &self,
        user_id: Uuid,
        trigger: StatsTrigger,
        event_id: Option<Uuid>,
    ) -> Result<StatsIncrement> {
        let mut tx = self.pool.begin().await?;

        if let Some(event_id) = event_id {
            let inserted = sqlx::query(
                r#"
                INSERT INTO stats_events (user_id, event_id, trigger)
                VALUES ($1, $2, $3)
                ON CONFLICT (user_id, event_id) DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(event_id)
            .bind(trigger.as_str())
            .execute(&mut *tx)
            .await?;

            if inserted.rows_affected() == 0 {
                tx.rollback().await?;
                let row = self.get_or_create_stats(user_id).await?;
                return Ok(StatsIncrement { row, applied: false });
            }
        }

        let row = Self::apply_increment(&mut tx, user_id, trigger).await?;
        tx.commit().await?;

        Ok(StatsIncrement { row, applied: true })
    }

    /// The counter upsert of [`Database::increment_stats`], inside a caller's
    /// transaction. Takes the row lock until that transaction ends.
    pub async fn apply_increment(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        trigger: StatsTrigger,
    ) -> Result<DbUserStats> {
        let first = Stats::first_for(trigger);
        let delta = trigger.delta();
        let row = sqlx::query_as::<_, DbUserStats>(
            r#"
            INSERT INTO user_stats
                (user_id, tasks_completed, focus_sessions, current_streak, total_points, level, version)
            VALUES ($1, $2, $3, $4, $5, $6, 1)
            ON CONFLICT (user_id) DO UPDATE SET
                tasks_completed = user_stats.tasks_completed + $7,
                focus_sessions = user_stats.focus_sessions + $8,
                total_points = user_stats.total_points + $9,
                level = (user_stats.total_points + $9) / 100 + 1,
                version = user_stats.version + 1,
                updated_at = NOW()
            RETURNING id, user_id, tasks_completed, focus_sessions, current_streak,
                      total_points, level, version, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(first.tasks_completed)
        .bind(first.focus_sessions)
        .bind(first.current_streak)
        .bind(first.total_points)
        .bind(first.level)
        .bind(delta.tasks_completed)
        .bind(delta.focus_sessions)
        .bind(delta.total_points)
        .fetch_one(&mut **tx)
        .await?;

        Ok(row)
    }

    // === Achievement Repository ===

    pub async fn list_achievements(&self, user_id: Uuid) -> Result<Vec<DbAchievement>> {
        let rows = sqlx::query_as::<_, DbAchievement>(
            r#"
            SELECT id, user_id, achievement_id, unlocked, progress, unlocked_at,
                   created_at, updated_at
            FROM achievements
            WHERE user_id = $1
            ORDER BY achievement_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn get_achievement(
        &self,
        user_id: Uuid,
        achievement_id: &str,
    ) -> Result<Option<DbAchievement>> {
        let row = sqlx::query_as::<_, DbAchievement>(
            r#"
            SELECT id, user_id, achievement_id, unlocked, progress, unlocked_at,
                   created_at, updated_at
            FROM achievements
            WHERE user_id = $1 AND achievement_id = $2
            "#,
        )
        .bind(user_id)
        .bind(achievement_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Insert zero-progress rows for the given ids; existing rows are kept
    pub async fn insert_achievements(&self, user_id: Uuid, achievement_ids: &[String]) -> Result<usize> {
        let result = sqlx::query(
            r#"
            INSERT INTO achievements (user_id, achievement_id, unlocked, progress)
            SELECT $1, id, FALSE, 0 FROM UNNEST($2::text[]) AS t(id)
            ON CONFLICT (user_id, achievement_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(achievement_ids)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() as usize)
    }

    /// Upsert the progress row for one achievement
    pub async fn upsert_achievement(
        &self,
        user_id: Uuid,
        progress: &AchievementProgress,
    ) -> Result<DbAchievement> {
        let row = sqlx::query_as::<_, DbAchievement>(
            r#"
            INSERT INTO achievements (user_id, achievement_id, unlocked, progress, unlocked_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, achievement_id) DO UPDATE SET
                unlocked = EXCLUDED.unlocked,
                progress = EXCLUDED.progress,
                unlocked_at = EXCLUDED.unlocked_at,
                updated_at = NOW()
            RETURNING id, user_id, achievement_id, unlocked, progress, unlocked_at,
                      created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(&progress.achievement_id)
        .bind(progress.unlocked)
        .bind(progress.progress)
        .bind(progress.unlocked_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    // === Capture Repository ===

    /// All captures for a user, newest first
    pub async fn list_captures(&self, user_id: Uuid) -> Result<Vec<DbQuickCapture>> {
        let captures = sqlx::query_as::<_, DbQuickCapture>(
            r#"
            SELECT id, user_id, content, type, timestamp, created_at
            FROM quick_captures
            WHERE user_id = $1
            ORDER BY timestamp DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(captures)
    }

    pub async fn insert_capture(
        &self,
        user_id: Uuid,
        content: &str,
        capture_type: CaptureType,
        timestamp: DateTime<Utc>,
    ) -> Result<DbQuickCapture> {
        let capture = sqlx::query_as::<_, DbQuickCapture>(
            r#"
            INSERT INTO quick_captures (user_id, content, type, timestamp)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, content, type, timestamp, created_at
            "#,
        )
        .bind(user_id)
        .bind(content)
        .bind(capture_type.as_str())
        .bind(timestamp)
        .fetch_one(&self.pool)
        .await?;

        Ok(capture)
    }

    pub async fn delete_capture(&self, user_id: Uuid, capture_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM quick_captures WHERE id = $1 AND user_id = $2")
            .bind(capture_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // === Community Repository ===

    /// Latest posts across all users
    pub async fn list_posts(&self, limit: i64) -> Result<Vec<DbCommunityPost>> {
        let posts = sqlx::query_as::<_, DbCommunityPost>(
            r#"
            SELECT id, user_id, user_name, user_avatar, content, likes, created_at, updated_at
            FROM community_posts
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    pub async fn insert_post(
        &self,
        user_id: Uuid,
        request: &CreatePostRequest,
    ) -> Result<DbCommunityPost> {
        let post = sqlx::query_as::<_, DbCommunityPost>(
            r#"
            INSERT INTO community_posts (user_id, user_name, user_avatar, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, user_name, user_avatar, content, likes, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(&request.user_name)
        .bind(&request.user_avatar)
        .bind(&request.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    /// Add one like atomically
    pub async fn like_post(&self, post_id: Uuid) -> Result<Option<DbCommunityPost>> {
        let post = sqlx::query_as::<_, DbCommunityPost>(
            r#"
            UPDATE community_posts
            SET likes = likes + 1, updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, user_name, user_avatar, content, likes, created_at, updated_at
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }
}
