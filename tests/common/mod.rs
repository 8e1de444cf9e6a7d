//! Shared test utilities for store-backed integration tests

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use tempfile::TempDir;

use palco::config::RewardSettings;
use palco::gamification::{GamificationManager, LevelTable};
use palco::ledger::{DirectoryStore, EventRecord, Profile, SqliteStore};

/// Creates a SQLite store in a temporary directory.
/// Keep the `TempDir` alive for as long as the store is used.
pub fn create_test_store() -> (TempDir, Arc<SqliteStore>) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = SqliteStore::open(
        &temp_dir.path().join("palco.db"),
        LevelTable::default(),
        RewardSettings::default(),
    )
    .expect("Failed to open store");
    (temp_dir, Arc::new(store))
}

pub fn create_test_manager() -> (TempDir, Arc<GamificationManager<SqliteStore>>) {
    let (dir, store) = create_test_store();
    (dir, Arc::new(GamificationManager::new(store, LevelTable::default())))
}

pub fn add_event(store: &SqliteStore, id: &str, title: &str) {
    store
        .upsert_event(&EventRecord {
            id: id.to_string(),
            slug: palco::validation::slugify(title),
            title: title.to_string(),
            highlight_type: None,
        })
        .expect("Failed to add event");
}

pub fn add_profile(store: &SqliteStore, user_id: &str, username: &str) {
    store
        .upsert_profile(&Profile {
            user_id: user_id.to_string(),
            username: username.to_string(),
            display_name: None,
            avatar_url: Some(format!("https://img.example/{}.png", username)),
        })
        .expect("Failed to add profile");
}

/// Timestamp in ms for noon UTC on a date
pub fn ts(y: i32, m: u32, d: u32) -> i64 {
    NaiveDate::from_ymd_opt(y, m, d)
        .expect("valid date")
        .and_hms_opt(12, 0, 0)
        .expect("valid time")
        .and_utc()
        .timestamp_millis()
}
