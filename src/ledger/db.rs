//! SQLite-backed store standing in for the hosted backend
//!
//! Holds the append-only points ledger, badge unlocks, attendance, saves and
//! the profile/event directory, with automatic schema migration. Rewards for
//! qualifying actions are decided here, never by the caller.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use super::models::{
    ActivityType, AttendanceStatus, EventSocialSummary, PointsEntry, Profile, UserBadge,
    UserPoints,
};
use super::store::{ActivityStore, DirectoryStore, EventRecord, PointsStore};
use super::streaks::StreakInfo;
use super::time_bucket::{date_of, day_bucket, month_bucket, parse_day_bucket};
use crate::config::RewardSettings;
use crate::curation::HighlightType;
use crate::error::{PlatformError, Result};
use crate::gamification::LevelTable;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

-- Append-only ledger; rows are never updated or deleted
CREATE TABLE IF NOT EXISTS points_entries (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    points INTEGER NOT NULL,
    activity_type TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    event_id TEXT,
    created_at INTEGER NOT NULL,
    day_bucket TEXT NOT NULL,
    month_bucket TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_points_user ON points_entries(user_id);
CREATE INDEX IF NOT EXISTS idx_points_month ON points_entries(month_bucket);

CREATE TABLE IF NOT EXISTS user_badges (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    badge_id TEXT NOT NULL,
    earned_at INTEGER NOT NULL,
    UNIQUE (user_id, badge_id)
);

CREATE TABLE IF NOT EXISTS profiles (
    user_id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE COLLATE NOCASE,
    display_name TEXT,
    avatar_url TEXT
);

CREATE TABLE IF NOT EXISTS events (
    id TEXT PRIMARY KEY,
    slug TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    highlight_type TEXT
);

CREATE TABLE IF NOT EXISTS attendance (
    user_id TEXT NOT NULL,
    event_id TEXT NOT NULL,
    status TEXT NOT NULL,
    updated_at INTEGER NOT NULL,
    PRIMARY KEY (user_id, event_id)
);
CREATE INDEX IF NOT EXISTS idx_attendance_event ON attendance(event_id);

INSERT OR IGNORE INTO schema_version VALUES (1);
"#;

/// SQLite store with a shared connection
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    levels: LevelTable,
    rewards: RewardSettings,
}

impl SqliteStore {
    /// Open or create the database at a specific path
    pub fn open(path: &Path, levels: LevelTable, rewards: RewardSettings) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data dir: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        Self::from_connection(conn, levels, rewards)
    }

    /// In-memory database, used by tests and dry runs
    pub fn open_in_memory(levels: LevelTable, rewards: RewardSettings) -> anyhow::Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, levels, rewards)
    }

    fn from_connection(
        conn: Connection,
        levels: LevelTable,
        rewards: RewardSettings,
    ) -> anyhow::Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
            levels,
            rewards,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.conn();
        conn.execute_batch(SCHEMA_SQL)?;
        drop(conn);
        self.run_migrations()
    }

    fn run_migrations(&self) -> anyhow::Result<()> {
        let conn = self.conn();

        let version: i32 = conn
            .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))
            .unwrap_or(0);

        // Migration 2: rewards for an event are granted once per user and activity
        if version < 2 {
            conn.execute_batch(
                r#"
                CREATE UNIQUE INDEX IF NOT EXISTS idx_points_event_reward
                    ON points_entries(user_id, event_id, activity_type)
                    WHERE event_id IS NOT NULL;
                "#,
            )?;
            conn.execute("INSERT OR REPLACE INTO schema_version VALUES (2)", [])?;
        }

        // Migration 3: saved events
        if version < 3 {
            conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS saved_events (
                    user_id TEXT NOT NULL,
                    event_id TEXT NOT NULL,
                    created_at INTEGER NOT NULL,
                    PRIMARY KEY (user_id, event_id)
                );
                "#,
            )?;
            conn.execute("INSERT OR REPLACE INTO schema_version VALUES (3)", [])?;
        }

        // Migration 4: usernames are unique regardless of case
        if version < 4 {
            conn.execute_batch(
                r#"
                CREATE UNIQUE INDEX IF NOT EXISTS idx_profiles_username_nocase
                    ON profiles(username COLLATE NOCASE);
                "#,
            )?;
            conn.execute("INSERT OR REPLACE INTO schema_version VALUES (4)", [])?;
        }

        Ok(())
    }

    pub fn levels(&self) -> &LevelTable {
        &self.levels
    }

    /// Backend-side manual adjustment (moderation reversal, promo credit).
    /// Not reachable from the client traits.
    pub fn record_adjustment(
        &self,
        user_id: &str,
        points: i64,
        description: &str,
        now_ms: i64,
    ) -> Result<PointsEntry> {
        require_user(user_id)?;
        let entry = new_entry(user_id, points, ActivityType::Other, description, now_ms);
        let conn = self.conn();
        insert_entry(&conn, &entry, None)?;
        info!(user_id, points, "Recorded points adjustment");
        Ok(entry)
    }

    fn active_days(conn: &Connection, user_id: &str) -> Result<Vec<NaiveDate>> {
        let mut stmt = conn.prepare(
            "SELECT DISTINCT day_bucket FROM points_entries WHERE user_id = ?1 AND points > 0",
        )?;
        let rows = stmt.query_map([user_id], |r| r.get::<_, String>(0))?;
        let mut days = Vec::new();
        for day in rows {
            if let Some(date) = parse_day_bucket(&day?) {
                days.push(date);
            }
        }
        Ok(days)
    }

    /// Grant an event reward inside a transaction. None if already granted.
    fn grant_event_reward(
        &self,
        tx: &Transaction<'_>,
        user_id: &str,
        event_id: &str,
        title: &str,
        activity: ActivityType,
        now_ms: i64,
    ) -> Result<Option<PointsEntry>> {
        let (points, label) = match activity {
            ActivityType::Checkin => (self.rewards.checkin, "Check-in"),
            ActivityType::Review => (self.rewards.review, "Review"),
            ActivityType::Other => return Ok(None),
        };
        let entry = new_entry(
            user_id,
            points,
            activity,
            &format!("{}: {}", label, title),
            now_ms,
        );
        if insert_entry(tx, &entry, Some(event_id))? {
            info!(user_id, event_id, points, activity = activity.as_str(), "Points awarded");
            Ok(Some(entry))
        } else {
            debug!(user_id, event_id, activity = activity.as_str(), "Reward already granted");
            Ok(None)
        }
    }
}

fn require_user(user_id: &str) -> Result<()> {
    if user_id.trim().is_empty() {
        return Err(PlatformError::Unauthorized("no signed-in user".to_string()));
    }
    Ok(())
}

fn event_title(conn: &Connection, event_id: &str) -> Result<String> {
    conn.query_row("SELECT title FROM events WHERE id = ?1", [event_id], |r| r.get(0))
        .optional()?
        .ok_or_else(|| PlatformError::NotFound(format!("event {}", event_id)))
}

fn new_entry(
    user_id: &str,
    points: i64,
    activity_type: ActivityType,
    description: &str,
    now_ms: i64,
) -> PointsEntry {
    PointsEntry {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        points,
        activity_type,
        description: description.to_string(),
        created_at: now_ms,
    }
}

/// Insert a ledger row. Returns false if a unique reward index rejected it.
fn insert_entry(conn: &Connection, entry: &PointsEntry, event_id: Option<&str>) -> Result<bool> {
    let changed = conn.execute(
        r#"INSERT OR IGNORE INTO points_entries
           (id, user_id, points, activity_type, description, event_id, created_at, day_bucket, month_bucket)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"#,
        params![
            entry.id,
            entry.user_id,
            entry.points,
            entry.activity_type.as_str(),
            entry.description,
            event_id,
            entry.created_at,
            day_bucket(entry.created_at),
            month_bucket(entry.created_at),
        ],
    )?;
    Ok(changed == 1)
}

/// Map a uniqueness violation on `field` to a validation error
fn unique_violation(err: rusqlite::Error, field: &str) -> PlatformError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            PlatformError::validation(field, "already taken")
        }
        _ => err.into(),
    }
}

fn to_count(value: i64) -> u64 {
    value.max(0) as u64
}

impl PointsStore for SqliteStore {
    fn user_points(&self, user_id: &str, now_ms: i64) -> Result<UserPoints> {
        let conn = self.conn();
        let (total, monthly): (i64, i64) = conn.query_row(
            r#"SELECT COALESCE(SUM(points), 0),
                      COALESCE(SUM(CASE WHEN month_bucket = ?2 THEN points ELSE 0 END), 0)
               FROM points_entries WHERE user_id = ?1"#,
            params![user_id, month_bucket(now_ms)],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;
        let days = Self::active_days(&conn, user_id)?;
        let streak = StreakInfo::from_days(&days, date_of(now_ms));

        Ok(UserPoints {
            user_id: user_id.to_string(),
            total_points: total,
            monthly_points: monthly,
            current_streak: streak.current,
            best_streak: streak.best,
            level: self.levels.level_for(total),
        })
    }

    fn all_user_points(&self, now_ms: i64) -> Result<Vec<UserPoints>> {
        let conn = self.conn();

        let mut days_by_user: HashMap<String, Vec<NaiveDate>> = HashMap::new();
        {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT user_id, day_bucket FROM points_entries WHERE points > 0",
            )?;
            let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?;
            for row in rows {
                let (user_id, day) = row?;
                if let Some(date) = parse_day_bucket(&day) {
                    days_by_user.entry(user_id).or_default().push(date);
                }
            }
        }

        let today = date_of(now_ms);
        let mut stmt = conn.prepare(
            r#"SELECT user_id,
                      COALESCE(SUM(points), 0),
                      COALESCE(SUM(CASE WHEN month_bucket = ?1 THEN points ELSE 0 END), 0)
               FROM points_entries GROUP BY user_id"#,
        )?;
        let rows = stmt.query_map([month_bucket(now_ms)], |r| {
            Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?, r.get::<_, i64>(2)?))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (user_id, total, monthly) = row?;
            let streak = days_by_user
                .get(&user_id)
                .map(|days| StreakInfo::from_days(days, today))
                .unwrap_or_default();
            out.push(UserPoints {
                level: self.levels.level_for(total),
                user_id,
                total_points: total,
                monthly_points: monthly,
                current_streak: streak.current,
                best_streak: streak.best,
            });
        }
        Ok(out)
    }

    fn activity_counts(&self, user_id: &str) -> Result<HashMap<ActivityType, u64>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT activity_type, COUNT(*) FROM points_entries WHERE user_id = ?1 GROUP BY activity_type",
        )?;
        let rows = stmt.query_map([user_id], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)))?;
        let mut counts = HashMap::new();
        for row in rows {
            let (activity, count) = row?;
            if let Some(activity) = ActivityType::from_str(&activity) {
                counts.insert(activity, to_count(count));
            }
        }
        Ok(counts)
    }

    fn ledger(&self, user_id: &str, limit: usize) -> Result<Vec<PointsEntry>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            r#"SELECT id, user_id, points, activity_type, description, created_at
               FROM points_entries WHERE user_id = ?1
               ORDER BY created_at DESC, rowid DESC LIMIT ?2"#,
        )?;
        let rows = stmt.query_map(params![user_id, limit as i64], |r| {
            let activity: String = r.get(3)?;
            Ok(PointsEntry {
                id: r.get(0)?,
                user_id: r.get(1)?,
                points: r.get(2)?,
                activity_type: ActivityType::from_str(&activity).unwrap_or(ActivityType::Other),
                description: r.get(4)?,
                created_at: r.get(5)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn user_badges(&self, user_id: &str) -> Result<Vec<UserBadge>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, badge_id, earned_at FROM user_badges WHERE user_id = ?1 ORDER BY earned_at, rowid",
        )?;
        let rows = stmt.query_map([user_id], |r| {
            Ok(UserBadge {
                id: r.get(0)?,
                user_id: r.get(1)?,
                badge_id: r.get(2)?,
                earned_at: r.get(3)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn insert_user_badge(
        &self,
        user_id: &str,
        badge_id: &str,
        earned_at: i64,
    ) -> Result<Option<UserBadge>> {
        require_user(user_id)?;
        let badge = UserBadge {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            badge_id: badge_id.to_string(),
            earned_at,
        };
        let conn = self.conn();
        let changed = conn.execute(
            "INSERT OR IGNORE INTO user_badges (id, user_id, badge_id, earned_at) VALUES (?1, ?2, ?3, ?4)",
            params![badge.id, badge.user_id, badge.badge_id, badge.earned_at],
        )?;
        Ok((changed == 1).then_some(badge))
    }

    fn profiles(&self, user_ids: &[String]) -> Result<HashMap<String, Profile>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let placeholders = vec!["?"; user_ids.len()].join(", ");
        let sql = format!(
            "SELECT user_id, username, display_name, avatar_url FROM profiles WHERE user_id IN ({})",
            placeholders
        );
        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(user_ids.iter()), |r| {
            Ok(Profile {
                user_id: r.get(0)?,
                username: r.get(1)?,
                display_name: r.get(2)?,
                avatar_url: r.get(3)?,
            })
        })?;
        let mut out = HashMap::new();
        for profile in rows {
            let profile = profile?;
            out.insert(profile.user_id.clone(), profile);
        }
        Ok(out)
    }
}

impl ActivityStore for SqliteStore {
    fn set_attendance(
        &self,
        user_id: &str,
        event_id: &str,
        status: Option<AttendanceStatus>,
        now_ms: i64,
    ) -> Result<Option<PointsEntry>> {
        require_user(user_id)?;
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let title = event_title(&tx, event_id)?;

        let reward = match status {
            None => {
                tx.execute(
                    "DELETE FROM attendance WHERE user_id = ?1 AND event_id = ?2",
                    params![user_id, event_id],
                )?;
                None
            }
            Some(status) => {
                tx.execute(
                    r#"INSERT INTO attendance (user_id, event_id, status, updated_at)
                       VALUES (?1, ?2, ?3, ?4)
                       ON CONFLICT(user_id, event_id) DO UPDATE SET
                           status = excluded.status, updated_at = excluded.updated_at"#,
                    params![user_id, event_id, status.as_str(), now_ms],
                )?;
                if status == AttendanceStatus::Went {
                    self.grant_event_reward(
                        &tx,
                        user_id,
                        event_id,
                        &title,
                        ActivityType::Checkin,
                        now_ms,
                    )?
                } else {
                    None
                }
            }
        };

        tx.commit()?;
        Ok(reward)
    }

    fn attendance(&self, user_id: &str, event_id: &str) -> Result<Option<AttendanceStatus>> {
        let conn = self.conn();
        let status: Option<String> = conn
            .query_row(
                "SELECT status FROM attendance WHERE user_id = ?1 AND event_id = ?2",
                params![user_id, event_id],
                |r| r.get(0),
            )
            .optional()?;
        Ok(status.as_deref().and_then(AttendanceStatus::from_str))
    }

    fn set_saved(&self, user_id: &str, event_id: &str, saved: bool, now_ms: i64) -> Result<()> {
        require_user(user_id)?;
        let conn = self.conn();
        event_title(&conn, event_id)?;
        if saved {
            conn.execute(
                "INSERT OR IGNORE INTO saved_events (user_id, event_id, created_at) VALUES (?1, ?2, ?3)",
                params![user_id, event_id, now_ms],
            )?;
        } else {
            conn.execute(
                "DELETE FROM saved_events WHERE user_id = ?1 AND event_id = ?2",
                params![user_id, event_id],
            )?;
        }
        Ok(())
    }

    fn is_saved(&self, user_id: &str, event_id: &str) -> Result<bool> {
        let conn = self.conn();
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM saved_events WHERE user_id = ?1 AND event_id = ?2)",
            params![user_id, event_id],
            |r| r.get(0),
        )?;
        Ok(exists)
    }

    fn record_review(
        &self,
        user_id: &str,
        event_id: &str,
        now_ms: i64,
    ) -> Result<Option<PointsEntry>> {
        require_user(user_id)?;
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let title = event_title(&tx, event_id)?;
        let reward =
            self.grant_event_reward(&tx, user_id, event_id, &title, ActivityType::Review, now_ms)?;
        tx.commit()?;
        Ok(reward)
    }

    fn social_summary(&self, event_id: &str, avatar_limit: usize) -> Result<EventSocialSummary> {
        let conn = self.conn();
        let (going, maybe, went): (i64, i64, i64) = conn.query_row(
            r#"SELECT COALESCE(SUM(status = 'going'), 0),
                      COALESCE(SUM(status = 'maybe'), 0),
                      COALESCE(SUM(status = 'went'), 0)
               FROM attendance WHERE event_id = ?1"#,
            [event_id],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )?;

        let mut stmt = conn.prepare(
            r#"SELECT p.avatar_url FROM attendance a
               JOIN profiles p ON p.user_id = a.user_id
               WHERE a.event_id = ?1 AND a.status IN ('going', 'went') AND p.avatar_url IS NOT NULL
               ORDER BY CASE a.status WHEN 'going' THEN 0 ELSE 1 END, a.updated_at DESC
               LIMIT ?2"#,
        )?;
        let avatars = stmt
            .query_map(params![event_id, avatar_limit as i64], |r| r.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(EventSocialSummary {
            going: to_count(going),
            maybe: to_count(maybe),
            went: to_count(went),
            avatars,
        })
    }
}

impl DirectoryStore for SqliteStore {
    fn upsert_profile(&self, profile: &Profile) -> Result<()> {
        require_user(&profile.user_id)?;
        let conn = self.conn();
        conn.execute(
            r#"INSERT INTO profiles (user_id, username, display_name, avatar_url)
               VALUES (?1, ?2, ?3, ?4)
               ON CONFLICT(user_id) DO UPDATE SET
                   username = excluded.username,
                   display_name = excluded.display_name,
                   avatar_url = excluded.avatar_url"#,
            params![
                profile.user_id,
                profile.username,
                profile.display_name,
                profile.avatar_url
            ],
        )
        .map_err(|e| unique_violation(e, "username"))?;
        Ok(())
    }

    fn upsert_event(&self, event: &EventRecord) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            r#"INSERT INTO events (id, slug, title, highlight_type)
               VALUES (?1, ?2, ?3, ?4)
               ON CONFLICT(id) DO UPDATE SET
                   slug = excluded.slug,
                   title = excluded.title,
                   highlight_type = excluded.highlight_type"#,
            params![
                event.id,
                event.slug,
                event.title,
                event.highlight_type.map(|h| h.as_str())
            ],
        )
        .map_err(|e| unique_violation(e, "slug"))?;
        Ok(())
    }

    fn event(&self, event_id: &str) -> Result<EventRecord> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, slug, title, highlight_type FROM events WHERE id = ?1",
            [event_id],
            |r| {
                let highlight: Option<String> = r.get(3)?;
                Ok(EventRecord {
                    id: r.get(0)?,
                    slug: r.get(1)?,
                    title: r.get(2)?,
                    highlight_type: highlight.as_deref().and_then(HighlightType::from_str),
                })
            },
        )
        .optional()?
        .ok_or_else(|| PlatformError::NotFound(format!("event {}", event_id)))
    }

    fn username_taken(&self, username: &str) -> Result<bool> {
        let conn = self.conn();
        Ok(conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM profiles WHERE username = ?1 COLLATE NOCASE)",
            [username],
            |r| r.get(0),
        )?)
    }

    fn slug_taken(&self, slug: &str) -> Result<bool> {
        let conn = self.conn();
        Ok(conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM events WHERE slug = ?1)",
            [slug],
            |r| r.get(0),
        )?)
    }
}
