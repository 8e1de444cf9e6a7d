//! Badge definitions and their unlock predicates
//!
//! Predicates are a closed set of variants, each reading exactly one stat, so
//! every badge can be enumerated and evaluated in isolation.

use serde::Serialize;

use crate::ledger::{ActivityType, UserStats};

/// Badge category for grouping in the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeType {
    Achievement,
    Milestone,
    Special,
}

impl BadgeType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Achievement => "Achievements",
            Self::Milestone => "Milestones",
            Self::Special => "Special",
        }
    }
}

/// Condition a user's stats must meet to unlock a badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnlockPredicate {
    TotalPointsAtLeast { points: i64 },
    MonthlyPointsAtLeast { points: i64 },
    CurrentStreakAtLeast { days: u32 },
    BestStreakAtLeast { days: u32 },
    ActivityCountAtLeast { activity: ActivityType, count: u64 },
    LevelAtLeast { level: u32 },
}

impl UnlockPredicate {
    /// Target value of the predicate
    pub fn threshold(&self) -> i64 {
        match *self {
            Self::TotalPointsAtLeast { points } | Self::MonthlyPointsAtLeast { points } => points,
            Self::CurrentStreakAtLeast { days } | Self::BestStreakAtLeast { days } => days as i64,
            Self::ActivityCountAtLeast { count, .. } => count.min(i64::MAX as u64) as i64,
            Self::LevelAtLeast { level } => level as i64,
        }
    }

    /// The stat this predicate reads, taken from a snapshot
    pub fn current_value(&self, stats: &UserStats) -> i64 {
        match *self {
            Self::TotalPointsAtLeast { .. } => stats.points.total_points,
            Self::MonthlyPointsAtLeast { .. } => stats.points.monthly_points,
            Self::CurrentStreakAtLeast { .. } => stats.points.current_streak as i64,
            Self::BestStreakAtLeast { .. } => stats.points.best_streak as i64,
            Self::ActivityCountAtLeast { activity, .. } => {
                stats.activity_count(activity).min(i64::MAX as u64) as i64
            }
            Self::LevelAtLeast { .. } => stats.points.level as i64,
        }
    }

    pub fn is_satisfied(&self, stats: &UserStats) -> bool {
        self.current_value(stats) >= self.threshold()
    }

    /// Unit shown in progress text ("3/7 day streak")
    pub fn unit(&self) -> &'static str {
        match self {
            Self::TotalPointsAtLeast { .. } => "points",
            Self::MonthlyPointsAtLeast { .. } => "points this month",
            Self::CurrentStreakAtLeast { .. } => "day streak",
            Self::BestStreakAtLeast { .. } => "day best streak",
            Self::ActivityCountAtLeast { activity, .. } => match activity {
                ActivityType::Checkin => "check-ins",
                ActivityType::Review => "reviews",
                ActivityType::Other => "activities",
            },
            Self::LevelAtLeast { .. } => "level",
        }
    }
}

/// Badge definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub badge_type: BadgeType,
    pub predicate: UnlockPredicate,
}

impl Badge {
    /// Look up a built-in badge by id
    pub fn get(id: &str) -> Option<&'static Badge> {
        BADGES.iter().find(|b| b.id == id)
    }
}

/// All built-in badges, in creation order
pub static BADGES: &[Badge] = &[
    Badge {
        id: "first_checkin",
        name: "First Night Out",
        description: "Check in at your first event",
        icon: "🎟️",
        color: "#F97316",
        badge_type: BadgeType::Achievement,
        predicate: UnlockPredicate::ActivityCountAtLeast {
            activity: ActivityType::Checkin,
            count: 1,
        },
    },
    Badge {
        id: "first_review",
        name: "Critic's Debut",
        description: "Write your first event review",
        icon: "✍️",
        color: "#8B5CF6",
        badge_type: BadgeType::Achievement,
        predicate: UnlockPredicate::ActivityCountAtLeast {
            activity: ActivityType::Review,
            count: 1,
        },
    },
    Badge {
        id: "regular",
        name: "Regular",
        description: "Check in at 10 events",
        icon: "🎭",
        color: "#EC4899",
        badge_type: BadgeType::Milestone,
        predicate: UnlockPredicate::ActivityCountAtLeast {
            activity: ActivityType::Checkin,
            count: 10,
        },
    },
    Badge {
        id: "culture_buff",
        name: "Culture Buff",
        description: "Check in at 50 events",
        icon: "🏛️",
        color: "#0EA5E9",
        badge_type: BadgeType::Milestone,
        predicate: UnlockPredicate::ActivityCountAtLeast {
            activity: ActivityType::Checkin,
            count: 50,
        },
    },
    Badge {
        id: "seasoned_critic",
        name: "Seasoned Critic",
        description: "Write 25 reviews",
        icon: "📝",
        color: "#6366F1",
        badge_type: BadgeType::Milestone,
        predicate: UnlockPredicate::ActivityCountAtLeast {
            activity: ActivityType::Review,
            count: 25,
        },
    },
    Badge {
        id: "points_500",
        name: "Rising Star",
        description: "Earn 500 points",
        icon: "⭐",
        color: "#EAB308",
        badge_type: BadgeType::Milestone,
        predicate: UnlockPredicate::TotalPointsAtLeast { points: 500 },
    },
    Badge {
        id: "points_5000",
        name: "Headliner",
        description: "Earn 5000 points",
        icon: "🌟",
        color: "#F59E0B",
        badge_type: BadgeType::Milestone,
        predicate: UnlockPredicate::TotalPointsAtLeast { points: 5000 },
    },
    Badge {
        id: "streak_7",
        name: "On a Roll",
        description: "Be active 7 days in a row",
        icon: "🔥",
        color: "#EF4444",
        badge_type: BadgeType::Achievement,
        predicate: UnlockPredicate::CurrentStreakAtLeast { days: 7 },
    },
    Badge {
        id: "streak_30",
        name: "Unstoppable",
        description: "Reach a 30-day activity streak",
        icon: "⚡",
        color: "#DC2626",
        badge_type: BadgeType::Special,
        predicate: UnlockPredicate::BestStreakAtLeast { days: 30 },
    },
    Badge {
        id: "month_highlight",
        name: "Month Highlight",
        description: "Earn 300 points in a single month",
        icon: "📅",
        color: "#14B8A6",
        badge_type: BadgeType::Special,
        predicate: UnlockPredicate::MonthlyPointsAtLeast { points: 300 },
    },
    Badge {
        id: "gold_tier",
        name: "Golden Audience",
        description: "Reach the Gold level",
        icon: "🥇",
        color: "#D4AF37",
        badge_type: BadgeType::Special,
        predicate: UnlockPredicate::LevelAtLeast { level: 3 },
    },
];
