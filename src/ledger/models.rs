//! Data models for the points ledger and the read models derived from it
//!
//! Ledger rows are immutable; everything else here is an aggregate computed
//! by the store and only read by the gamification layer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Kind of activity that earned (or cost) points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Checkin,
    Review,
    Other,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checkin => "checkin",
            Self::Review => "review",
            Self::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "checkin" => Some(Self::Checkin),
            "review" => Some(Self::Review),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn all() -> &'static [ActivityType] {
        &[Self::Checkin, Self::Review, Self::Other]
    }
}

/// One ledger row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointsEntry {
    pub id: String,
    pub user_id: String,
    /// Signed: reversals are appended as negative entries
    pub points: i64,
    pub activity_type: ActivityType,
    pub description: String,
    /// ms since epoch
    pub created_at: i64,
}

/// Per-user aggregate over the ledger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPoints {
    pub user_id: String,
    pub total_points: i64,
    pub monthly_points: i64,
    pub current_streak: u32,
    pub best_streak: u32,
    pub level: u32,
}

/// Snapshot of everything a badge predicate may look at
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserStats {
    pub points: UserPoints,
    pub activity_counts: HashMap<ActivityType, u64>,
}

impl UserStats {
    pub fn new(points: UserPoints, activity_counts: HashMap<ActivityType, u64>) -> Self {
        Self {
            points,
            activity_counts,
        }
    }

    /// Count of ledger entries of a given type (0 when never recorded)
    pub fn activity_count(&self, activity: ActivityType) -> u64 {
        self.activity_counts.get(&activity).copied().unwrap_or(0)
    }
}

/// A permanent badge unlock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBadge {
    pub id: String,
    pub user_id: String,
    pub badge_id: String,
    /// ms since epoch, time the unlock was detected
    pub earned_at: i64,
}

/// Public profile data shown next to ranking rows and attendee avatars
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// A user's declared relationship with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Going,
    Maybe,
    Went,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Going => "going",
            Self::Maybe => "maybe",
            Self::Went => "went",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "going" => Some(Self::Going),
            "maybe" => Some(Self::Maybe),
            "went" => Some(Self::Went),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Going => "Going",
            Self::Maybe => "Maybe",
            Self::Went => "Went",
        }
    }
}

/// Aggregate social counts for one event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSocialSummary {
    pub going: u64,
    pub maybe: u64,
    pub went: u64,
    pub avatars: Vec<String>,
}

impl EventSocialSummary {
    pub fn total(&self) -> u64 {
        self.going + self.maybe + self.went
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_type_roundtrip() {
        for activity in ActivityType::all() {
            assert_eq!(ActivityType::from_str(activity.as_str()), Some(*activity));
        }
        assert_eq!(ActivityType::from_str("like"), None);
    }

    #[test]
    fn test_missing_activity_counts_as_zero() {
        let stats = UserStats::default();
        assert_eq!(stats.activity_count(ActivityType::Review), 0);
    }
}
