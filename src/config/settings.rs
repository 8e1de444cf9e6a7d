//! Settings sections of the configuration file

use serde::{Deserialize, Serialize};

/// Points awarded by the backend for qualifying actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSettings {
    /// Marking attendance as "went" at an event
    #[serde(default = "default_checkin_points")]
    pub checkin: i64,

    /// Posting a review of an event
    #[serde(default = "default_review_points")]
    pub review: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingSettings {
    /// Rows shown in the ranking list
    #[serde(default = "default_display_limit")]
    pub display_limit: usize,

    /// Attendee avatars included in an event's social summary
    #[serde(default = "default_avatar_sample")]
    pub avatar_sample: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurationSettings {
    /// Satisfied criteria shown as chips before collapsing into "+N"
    #[serde(default = "default_max_chips")]
    pub max_chips: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSettings {
    /// Quiet period before a username/slug availability check fires
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundarySettings {
    /// Resets attempted before an error boundary forces a reload
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_checkin_points() -> i64 {
    10
}

fn default_review_points() -> i64 {
    5
}

fn default_display_limit() -> usize {
    10
}

fn default_avatar_sample() -> usize {
    5
}

fn default_max_chips() -> usize {
    3
}

fn default_debounce_ms() -> u64 {
    450
}

fn default_max_retries() -> u32 {
    3
}

impl Default for RewardSettings {
    fn default() -> Self {
        Self {
            checkin: default_checkin_points(),
            review: default_review_points(),
        }
    }
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            display_limit: default_display_limit(),
            avatar_sample: default_avatar_sample(),
        }
    }
}

impl Default for CurationSettings {
    fn default() -> Self {
        Self {
            max_chips: default_max_chips(),
        }
    }
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for BoundarySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
        }
    }
}
