//! Points ledger and the aggregates derived from it
//!
//! The ledger is append-only: every point change is a new row. Totals,
//! monthly points, streaks and levels are computed from it by the store.
//!
//! # Usage
//!
//! ```ignore
//! let store = SqliteStore::open(&path, LevelTable::default(), RewardSettings::default())?;
//! store.set_attendance("user-1", "event-9", Some(AttendanceStatus::Went), now_ms())?;
//! let points = store.user_points("user-1", now_ms())?;
//! ```

mod db;
mod models;
mod store;
mod streaks;
mod time_bucket;

pub use db::SqliteStore;
pub use models::{
    ActivityType, AttendanceStatus, EventSocialSummary, PointsEntry, Profile, UserBadge,
    UserPoints, UserStats,
};
pub use store::{ActivityStore, DirectoryStore, EventRecord, PointsStore};
pub use streaks::StreakInfo;
pub use time_bucket::{
    current_month_bucket, date_of, day_bucket, month_bucket, now_ms, parse_day_bucket,
};
