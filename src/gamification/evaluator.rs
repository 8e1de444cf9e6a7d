//! Badge evaluation
//!
//! Splits badge definitions into earned (with unlock time) and upcoming
//! (with progress), and finds badges whose predicate is newly satisfied.
//! Evaluation is read-only; recording unlocks is the manager's job.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use super::badges::{Badge, UnlockPredicate};
use crate::ledger::{UserBadge, UserStats};

/// Highest progress an unearned badge may show
pub const UNEARNED_PROGRESS_CEILING: u8 = 99;

/// Progress toward an unearned badge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BadgeProgress<'a> {
    pub badge: &'a Badge,
    /// In [0, 99]
    pub progress_pct: u8,
    pub progress_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EarnedBadge<'a> {
    pub badge: &'a Badge,
    pub earned_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BadgeReport<'a> {
    /// In unlock order
    pub earned: Vec<EarnedBadge<'a>>,
    /// Closest to completion first
    pub upcoming: Vec<BadgeProgress<'a>>,
}

/// Progress percentage of an unearned badge, floored and capped at 99
pub fn progress_pct(predicate: &UnlockPredicate, stats: &UserStats) -> u8 {
    let threshold = predicate.threshold();
    if threshold <= 0 {
        return UNEARNED_PROGRESS_CEILING;
    }
    let current = predicate.current_value(stats).max(0) as i128;
    let raw = current * 100 / threshold as i128;
    raw.min(UNEARNED_PROGRESS_CEILING as i128) as u8
}

/// Human-readable progress, e.g. "4/7 day streak"
pub fn progress_text(predicate: &UnlockPredicate, stats: &UserStats) -> String {
    let threshold = predicate.threshold();
    let current = predicate.current_value(stats).clamp(0, threshold.max(0));
    format!("{}/{} {}", current, threshold, predicate.unit())
}

/// Evaluate every badge against a stats snapshot.
///
/// `badges` must be in creation order; upcoming badges with equal progress
/// keep that order.
pub fn evaluate<'a>(badges: &'a [Badge], stats: &UserStats, earned: &[UserBadge]) -> BadgeReport<'a> {
    let earned_at: HashMap<&str, i64> = earned
        .iter()
        .map(|ub| (ub.badge_id.as_str(), ub.earned_at))
        .collect();

    let mut report = BadgeReport::default();
    for badge in badges {
        match earned_at.get(badge.id) {
            Some(&at) => report.earned.push(EarnedBadge {
                badge,
                earned_at: at,
            }),
            None => report.upcoming.push(BadgeProgress {
                badge,
                progress_pct: progress_pct(&badge.predicate, stats),
                progress_text: progress_text(&badge.predicate, stats),
            }),
        }
    }

    for ub in earned {
        if !badges.iter().any(|b| b.id == ub.badge_id) {
            debug!(badge_id = %ub.badge_id, "Skipping unlock of unknown badge");
        }
    }

    report.earned.sort_by_key(|e| e.earned_at);
    // Stable sort: ties stay in creation order
    report
        .upcoming
        .sort_by(|a, b| b.progress_pct.cmp(&a.progress_pct));
    report
}

/// Badges whose predicate holds but which have no unlock record yet
pub fn newly_satisfied<'a>(
    badges: &'a [Badge],
    stats: &UserStats,
    earned: &[UserBadge],
) -> Vec<&'a Badge> {
    badges
        .iter()
        .filter(|b| !earned.iter().any(|ub| ub.badge_id == b.id))
        .filter(|b| b.predicate.is_satisfied(stats))
        .collect()
}
