//! Backend read/write interface
//!
//! The gamification layer only sees these traits, so the backing store can be
//! swapped without touching level, badge or ranking logic.

use std::collections::HashMap;

use super::models::{
    ActivityType, AttendanceStatus, EventSocialSummary, PointsEntry, Profile, UserBadge,
    UserPoints, UserStats,
};
use crate::curation::HighlightType;
use crate::error::Result;

/// Read side of the points ledger plus the one write the client may trigger
/// on it directly: recording a badge unlock.
pub trait PointsStore: Send + Sync {
    /// Aggregate points for one user at `now_ms` (monthly uses that month)
    fn user_points(&self, user_id: &str, now_ms: i64) -> Result<UserPoints>;

    /// Aggregate points for every user with ledger entries
    fn all_user_points(&self, now_ms: i64) -> Result<Vec<UserPoints>>;

    /// Ledger entry counts per activity type
    fn activity_counts(&self, user_id: &str) -> Result<HashMap<ActivityType, u64>>;

    /// Full stats snapshot for badge evaluation
    fn user_stats(&self, user_id: &str, now_ms: i64) -> Result<UserStats> {
        Ok(UserStats::new(
            self.user_points(user_id, now_ms)?,
            self.activity_counts(user_id)?,
        ))
    }

    /// A user's ledger, newest first
    fn ledger(&self, user_id: &str, limit: usize) -> Result<Vec<PointsEntry>>;

    /// Unlocks recorded for a user, oldest first
    fn user_badges(&self, user_id: &str) -> Result<Vec<UserBadge>>;

    /// Record an unlock. Returns None when the pair was already recorded.
    fn insert_user_badge(
        &self,
        user_id: &str,
        badge_id: &str,
        earned_at: i64,
    ) -> Result<Option<UserBadge>>;

    /// Profiles for the given users; unknown ids are absent from the map
    fn profiles(&self, user_ids: &[String]) -> Result<HashMap<String, Profile>>;
}

/// Qualifying user actions. The backend decides and ledgers the reward.
pub trait ActivityStore: Send + Sync {
    /// Set or clear attendance. Returns the ledger entry if this earned points.
    fn set_attendance(
        &self,
        user_id: &str,
        event_id: &str,
        status: Option<AttendanceStatus>,
        now_ms: i64,
    ) -> Result<Option<PointsEntry>>;

    fn attendance(&self, user_id: &str, event_id: &str) -> Result<Option<AttendanceStatus>>;

    fn set_saved(&self, user_id: &str, event_id: &str, saved: bool, now_ms: i64) -> Result<()>;

    fn is_saved(&self, user_id: &str, event_id: &str) -> Result<bool>;

    /// Post a review. Returns the ledger entry if this earned points.
    fn record_review(
        &self,
        user_id: &str,
        event_id: &str,
        now_ms: i64,
    ) -> Result<Option<PointsEntry>>;

    /// Counts per attendance status plus a small avatar sample, in one round trip
    fn social_summary(&self, event_id: &str, avatar_limit: usize) -> Result<EventSocialSummary>;
}

/// Minimal event row kept by the directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub highlight_type: Option<HighlightType>,
}

/// Profile and event directory: uniqueness checks and upserts
pub trait DirectoryStore: Send + Sync {
    fn upsert_profile(&self, profile: &Profile) -> Result<()>;

    fn upsert_event(&self, event: &EventRecord) -> Result<()>;

    fn event(&self, event_id: &str) -> Result<EventRecord>;

    fn username_taken(&self, username: &str) -> Result<bool>;

    fn slug_taken(&self, slug: &str) -> Result<bool>;
}
