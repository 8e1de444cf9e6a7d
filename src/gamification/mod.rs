//! Gamification layer: levels, badges, rankings
//!
//! Pure level/badge/rank logic on top of the ledger aggregates, plus a
//! manager that caches reads and records badge unlocks.

mod badges;
mod cache;
mod evaluator;
mod levels;
mod manager;
mod ranking;

pub use badges::{Badge, BadgeType, UnlockPredicate, BADGES};
pub use cache::{CacheKey, QueryCache};
pub use evaluator::{
    evaluate, newly_satisfied, progress_pct, progress_text, BadgeProgress, BadgeReport,
    EarnedBadge, UNEARNED_PROGRESS_CEILING,
};
pub use levels::{LevelProgress, LevelTable, LevelTableError, LevelTier, LevelUp};
pub use manager::{GamificationEvent, GamificationManager, PlayerProfile};
pub use ranking::{Ranking, RankingType, RankingUser, RankingWindow};
