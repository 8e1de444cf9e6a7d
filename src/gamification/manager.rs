//! Gamification manager - ties the store to levels, badges and rankings
//!
//! Reads go through the query cache; every action that can change points
//! invalidates the acting user's entries and all rankings before anything
//! is read again.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::badges::{Badge, BADGES};
use super::cache::{CacheKey, QueryCache};
use super::evaluator::{self, BadgeReport};
use super::levels::{LevelProgress, LevelTable, LevelUp};
use super::ranking::{Ranking, RankingType, RankingWindow};
use crate::error::{degrade, Result};
use crate::ledger::{
    day_bucket, ActivityStore, AttendanceStatus, PointsEntry, PointsStore, UserBadge, UserPoints,
};

/// Events produced by a qualifying action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GamificationEvent {
    PointsAwarded { amount: i64, reason: String },
    LevelUp(LevelUp),
    BadgeUnlocked(UserBadge),
}

/// Everything the profile page shows about a user's progress
#[derive(Debug, Clone, Serialize)]
pub struct PlayerProfile {
    pub points: UserPoints,
    pub level: LevelProgress,
    pub badges: BadgeReport<'static>,
    /// Unlocks recorded by the refresh that built this profile
    pub newly_unlocked: Vec<UserBadge>,
}

pub struct GamificationManager<S> {
    store: Arc<S>,
    levels: LevelTable,
    badges: &'static [Badge],
    points_cache: QueryCache<UserPoints>,
    ranking_cache: QueryCache<Ranking>,
}

impl<S: PointsStore> GamificationManager<S> {
    pub fn new(store: Arc<S>, levels: LevelTable) -> Self {
        Self::with_badges(store, levels, BADGES)
    }

    pub fn with_badges(store: Arc<S>, levels: LevelTable, badges: &'static [Badge]) -> Self {
        Self {
            store,
            levels,
            badges,
            points_cache: QueryCache::new(),
            ranking_cache: QueryCache::new(),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn levels(&self) -> &LevelTable {
        &self.levels
    }

    /// Cached aggregate points for a user as of the day of `now_ms`.
    ///
    /// Streaks move with the calendar day, so entries are keyed by day.
    pub fn user_points(&self, user_id: &str, now_ms: i64) -> Result<Arc<UserPoints>> {
        let key = CacheKey::user(user_id, &day_bucket(now_ms));
        self.points_cache
            .get_or_try_insert(key, || self.store.user_points(user_id, now_ms))
    }

    /// Detect and record unlocks for predicates that are newly satisfied.
    ///
    /// Each unlock is stamped with `now_ms`, the time it was detected.
    /// Re-running with unchanged stats records nothing.
    pub fn refresh_badges(&self, user_id: &str, now_ms: i64) -> Result<Vec<UserBadge>> {
        let stats = self.store.user_stats(user_id, now_ms)?;
        let earned = self.store.user_badges(user_id)?;

        let mut unlocked = Vec::new();
        for badge in evaluator::newly_satisfied(self.badges, &stats, &earned) {
            if let Some(record) = self.store.insert_user_badge(user_id, badge.id, now_ms)? {
                info!(user_id, badge = badge.id, "Badge unlocked");
                unlocked.push(record);
            } else {
                debug!(user_id, badge = badge.id, "Badge already recorded");
            }
        }
        Ok(unlocked)
    }

    /// Level, earned badges and upcoming badge progress for a user
    pub fn profile(&self, user_id: &str, now_ms: i64) -> Result<PlayerProfile> {
        let newly_unlocked = self.refresh_badges(user_id, now_ms)?;
        let points = (*self.user_points(user_id, now_ms)?).clone();
        let stats = self.store.user_stats(user_id, now_ms)?;
        let earned = degrade(self.store.user_badges(user_id), "user badges")?;

        Ok(PlayerProfile {
            level: self.levels.resolve(points.total_points),
            badges: evaluator::evaluate(self.badges, &stats, &earned),
            points,
            newly_unlocked,
        })
    }

    /// Full ranking of a type, cached per day bucket
    pub fn ranking(&self, kind: RankingType, now_ms: i64) -> Result<Arc<Ranking>> {
        let key = CacheKey::ranking(kind, &day_bucket(now_ms));
        self.ranking_cache.get_or_try_insert(key, || -> Result<Ranking> {
            let rows = self.store.all_user_points(now_ms)?;
            let ids: Vec<String> = rows.iter().map(|r| r.user_id.clone()).collect();
            let profiles = degrade(self.store.profiles(&ids), "ranking profiles")?;
            debug!(kind = kind.as_str(), users = rows.len(), "Ranking rebuilt");
            Ok(Ranking::build(kind, &rows, &profiles))
        })
    }

    /// A user's rank anywhere in the ranking, not only in the displayed top rows
    pub fn rank_of(&self, user_id: &str, kind: RankingType, now_ms: i64) -> Result<Option<u32>> {
        Ok(self.ranking(kind, now_ms)?.rank_of(user_id))
    }

    pub fn ranking_window(
        &self,
        kind: RankingType,
        limit: usize,
        viewer_id: Option<&str>,
        now_ms: i64,
    ) -> Result<RankingWindow> {
        Ok(self.ranking(kind, now_ms)?.window(limit, viewer_id))
    }

    /// Mark a user's points as stale everywhere they are cached
    pub fn invalidate(&self, user_id: &str) {
        self.points_cache.invalidate_user(user_id);
        self.ranking_cache.invalidate_rankings();
    }

    /// Turn a granted reward into events, refreshing caches and badges.
    ///
    /// The reward is already committed, so failed follow-up reads are logged
    /// and skipped rather than reported as a failed action.
    fn after_reward(
        &self,
        user_id: &str,
        before: &UserPoints,
        reward: Option<PointsEntry>,
        now_ms: i64,
    ) -> Vec<GamificationEvent> {
        let Some(entry) = reward else {
            return Vec::new();
        };
        self.invalidate(user_id);

        let mut events = vec![GamificationEvent::PointsAwarded {
            amount: entry.points,
            reason: entry.description,
        }];

        match self.user_points(user_id, now_ms) {
            Ok(after) => {
                if let Some(level_up) =
                    self.levels.level_up(before.total_points, after.total_points)
                {
                    info!(
                        user_id,
                        old = level_up.old_level,
                        new = level_up.new_level,
                        "Level up"
                    );
                    events.push(GamificationEvent::LevelUp(level_up));
                }
            }
            Err(err) => warn!(user_id, error = %err, "Level check skipped after reward"),
        }

        match self.refresh_badges(user_id, now_ms) {
            Ok(unlocked) => {
                events.extend(unlocked.into_iter().map(GamificationEvent::BadgeUnlocked))
            }
            Err(err) => warn!(user_id, error = %err, "Badge refresh skipped after reward"),
        }
        events
    }
}

impl<S: PointsStore + ActivityStore> GamificationManager<S> {
    /// Set or clear attendance; "went" earns the check-in reward once per event
    pub fn mark_attendance(
        &self,
        user_id: &str,
        event_id: &str,
        status: Option<AttendanceStatus>,
        now_ms: i64,
    ) -> Result<Vec<GamificationEvent>> {
        let before = self.store.user_points(user_id, now_ms)?;
        let reward = self.store.set_attendance(user_id, event_id, status, now_ms)?;
        Ok(self.after_reward(user_id, &before, reward, now_ms))
    }

    /// Post a review; the first review of an event earns the review reward
    pub fn post_review(
        &self,
        user_id: &str,
        event_id: &str,
        now_ms: i64,
    ) -> Result<Vec<GamificationEvent>> {
        let before = self.store.user_points(user_id, now_ms)?;
        let reward = self.store.record_review(user_id, event_id, now_ms)?;
        Ok(self.after_reward(user_id, &before, reward, now_ms))
    }
}
