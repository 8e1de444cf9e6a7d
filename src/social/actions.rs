//! Attendance and save toggles backed by the ledger stores

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::toggle::{ToggleBackend, ToggleController};
use crate::error::{degrade, PlatformError, Result};
use crate::gamification::{GamificationEvent, GamificationManager};
use crate::ledger::{now_ms, ActivityStore, AttendanceStatus, EventSocialSummary, PointsStore};

pub type AttendanceToggle<S> = ToggleController<Option<AttendanceStatus>, AttendanceBackend<S>>;
pub type SaveToggle<S> = ToggleController<bool, SaveBackend<S>>;

/// Writes attendance through the gamification manager so rewards and
/// cache invalidation happen with the write
pub struct AttendanceBackend<S> {
    manager: Arc<GamificationManager<S>>,
    user_id: String,
    event_id: String,
}

impl<S> AttendanceBackend<S> {
    pub fn new(manager: Arc<GamificationManager<S>>, user_id: &str, event_id: &str) -> Self {
        Self {
            manager,
            user_id: user_id.to_string(),
            event_id: event_id.to_string(),
        }
    }
}

#[async_trait]
impl<S> ToggleBackend<Option<AttendanceStatus>> for AttendanceBackend<S>
where
    S: PointsStore + ActivityStore + 'static,
{
    async fn apply(&self, value: &Option<AttendanceStatus>) -> Result<()> {
        let manager = Arc::clone(&self.manager);
        let user_id = self.user_id.clone();
        let event_id = self.event_id.clone();
        let status = *value;

        let events = tokio::task::spawn_blocking(move || {
            manager.mark_attendance(&user_id, &event_id, status, now_ms())
        })
        .await
        .map_err(|e| PlatformError::Server(format!("attendance task failed: {}", e)))??;

        log_events(&self.user_id, &events);
        Ok(())
    }
}

pub struct SaveBackend<S> {
    store: Arc<S>,
    user_id: String,
    event_id: String,
}

impl<S> SaveBackend<S> {
    pub fn new(store: Arc<S>, user_id: &str, event_id: &str) -> Self {
        Self {
            store,
            user_id: user_id.to_string(),
            event_id: event_id.to_string(),
        }
    }
}

#[async_trait]
impl<S: ActivityStore + 'static> ToggleBackend<bool> for SaveBackend<S> {
    async fn apply(&self, value: &bool) -> Result<()> {
        let store = Arc::clone(&self.store);
        let user_id = self.user_id.clone();
        let event_id = self.event_id.clone();
        let saved = *value;

        tokio::task::spawn_blocking(move || store.set_saved(&user_id, &event_id, saved, now_ms()))
            .await
            .map_err(|e| PlatformError::Server(format!("save task failed: {}", e)))?
    }
}

/// Attendance toggle seeded with the user's stored status
pub fn attendance_toggle<S>(
    manager: Arc<GamificationManager<S>>,
    user_id: &str,
    event_id: &str,
) -> Result<AttendanceToggle<S>>
where
    S: PointsStore + ActivityStore + 'static,
{
    let current = manager.store().attendance(user_id, event_id)?;
    let backend = AttendanceBackend::new(manager, user_id, event_id);
    Ok(ToggleController::new(current, backend))
}

pub fn save_toggle<S: ActivityStore + 'static>(
    store: Arc<S>,
    user_id: &str,
    event_id: &str,
) -> Result<SaveToggle<S>> {
    let current = store.is_saved(user_id, event_id)?;
    Ok(ToggleController::new(
        current,
        SaveBackend::new(store, user_id, event_id),
    ))
}

/// Attendance counts and avatar sample; empty when the backend is unreachable
pub fn load_social_summary<S: ActivityStore + ?Sized>(
    store: &S,
    event_id: &str,
    avatar_limit: usize,
) -> Result<EventSocialSummary> {
    degrade(
        store.social_summary(event_id, avatar_limit),
        "event social summary",
    )
}

fn log_events(user_id: &str, events: &[GamificationEvent]) {
    for event in events {
        match event {
            GamificationEvent::PointsAwarded { amount, reason } => {
                info!(user_id, amount, reason = %reason, "Points awarded")
            }
            GamificationEvent::LevelUp(up) => {
                info!(user_id, level = up.new_level, name = %up.new_name, "Level up")
            }
            GamificationEvent::BadgeUnlocked(badge) => {
                info!(user_id, badge = %badge.badge_id, "Badge unlocked")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::config::RewardSettings;
    use crate::gamification::LevelTable;
    use crate::ledger::{
        ActivityType, DirectoryStore, EventRecord, PointsEntry, Profile, SqliteStore, UserBadge,
        UserPoints,
    };

    /// SQLite store whose point reads go offline once attendance is written
    struct OfflineAfterWrite {
        inner: SqliteStore,
        written: AtomicBool,
    }

    impl PointsStore for OfflineAfterWrite {
        fn user_points(&self, user_id: &str, now_ms: i64) -> Result<UserPoints> {
            if self.written.load(Ordering::SeqCst) {
                return Err(PlatformError::Network("connection reset".to_string()));
            }
            self.inner.user_points(user_id, now_ms)
        }

        fn all_user_points(&self, now_ms: i64) -> Result<Vec<UserPoints>> {
            self.inner.all_user_points(now_ms)
        }

        fn activity_counts(&self, user_id: &str) -> Result<HashMap<ActivityType, u64>> {
            self.inner.activity_counts(user_id)
        }

        fn ledger(&self, user_id: &str, limit: usize) -> Result<Vec<PointsEntry>> {
            self.inner.ledger(user_id, limit)
        }

        fn user_badges(&self, user_id: &str) -> Result<Vec<UserBadge>> {
            self.inner.user_badges(user_id)
        }

        fn insert_user_badge(
            &self,
            user_id: &str,
            badge_id: &str,
            earned_at: i64,
        ) -> Result<Option<UserBadge>> {
            self.inner.insert_user_badge(user_id, badge_id, earned_at)
        }

        fn profiles(&self, user_ids: &[String]) -> Result<HashMap<String, Profile>> {
            self.inner.profiles(user_ids)
        }
    }

    impl ActivityStore for OfflineAfterWrite {
        fn set_attendance(
            &self,
            user_id: &str,
            event_id: &str,
            status: Option<AttendanceStatus>,
            now_ms: i64,
        ) -> Result<Option<PointsEntry>> {
            let reward = self.inner.set_attendance(user_id, event_id, status, now_ms)?;
            self.written.store(true, Ordering::SeqCst);
            Ok(reward)
        }

        fn attendance(&self, user_id: &str, event_id: &str) -> Result<Option<AttendanceStatus>> {
            self.inner.attendance(user_id, event_id)
        }

        fn set_saved(&self, user_id: &str, event_id: &str, saved: bool, now_ms: i64) -> Result<()> {
            self.inner.set_saved(user_id, event_id, saved, now_ms)
        }

        fn is_saved(&self, user_id: &str, event_id: &str) -> Result<bool> {
            self.inner.is_saved(user_id, event_id)
        }

        fn record_review(
            &self,
            user_id: &str,
            event_id: &str,
            now_ms: i64,
        ) -> Result<Option<PointsEntry>> {
            self.inner.record_review(user_id, event_id, now_ms)
        }

        fn social_summary(
            &self,
            event_id: &str,
            avatar_limit: usize,
        ) -> Result<EventSocialSummary> {
            self.inner.social_summary(event_id, avatar_limit)
        }
    }

    fn sqlite_with_event() -> SqliteStore {
        let store = SqliteStore::open_in_memory(LevelTable::default(), RewardSettings::default())
            .unwrap();
        store
            .upsert_event(&EventRecord {
                id: "ev-1".to_string(),
                slug: "samba-no-cais".to_string(),
                title: "Samba no Cais".to_string(),
                highlight_type: None,
            })
            .unwrap();
        store
    }

    fn setup() -> Arc<GamificationManager<SqliteStore>> {
        Arc::new(GamificationManager::new(
            Arc::new(sqlite_with_event()),
            LevelTable::default(),
        ))
    }

    #[tokio::test]
    async fn test_committed_checkin_survives_failed_refresh() {
        let store = Arc::new(OfflineAfterWrite {
            inner: sqlite_with_event(),
            written: AtomicBool::new(false),
        });
        let manager = Arc::new(GamificationManager::new(
            Arc::clone(&store),
            LevelTable::default(),
        ));
        let toggle = attendance_toggle(manager, "u1", "ev-1").unwrap();

        toggle.set(Some(AttendanceStatus::Went)).await.unwrap();
        assert_eq!(toggle.value(), Some(AttendanceStatus::Went));
        assert_eq!(
            store.inner.attendance("u1", "ev-1").unwrap(),
            Some(AttendanceStatus::Went)
        );
        assert_eq!(store.inner.user_points("u1", now_ms()).unwrap().total_points, 10);
    }

    #[tokio::test]
    async fn test_attendance_toggle_awards_checkin() {
        let manager = setup();
        let toggle = attendance_toggle(Arc::clone(&manager), "u1", "ev-1").unwrap();
        assert_eq!(toggle.value(), None);

        toggle.set(Some(AttendanceStatus::Went)).await.unwrap();
        assert_eq!(toggle.value(), Some(AttendanceStatus::Went));

        let points = manager.user_points("u1", now_ms()).unwrap();
        assert_eq!(points.total_points, 10);
    }

    #[tokio::test]
    async fn test_attendance_toggle_seeded_from_store() {
        let manager = setup();
        manager
            .store()
            .set_attendance("u1", "ev-1", Some(AttendanceStatus::Maybe), now_ms())
            .unwrap();
        let toggle = attendance_toggle(manager, "u1", "ev-1").unwrap();
        assert_eq!(toggle.value(), Some(AttendanceStatus::Maybe));
    }

    #[tokio::test]
    async fn test_unknown_event_rolls_back() {
        let manager = setup();
        let toggle = attendance_toggle(manager, "u1", "missing").unwrap();
        let err = toggle.set(Some(AttendanceStatus::Going)).await;
        assert!(err.is_err());
        assert_eq!(toggle.value(), None);
    }

    #[tokio::test]
    async fn test_save_toggle_persists() {
        let manager = setup();
        let store = Arc::clone(manager.store());
        let toggle = save_toggle(Arc::clone(&store), "u1", "ev-1").unwrap();
        assert!(!toggle.value());

        toggle.set(true).await.unwrap();
        assert!(store.is_saved("u1", "ev-1").unwrap());

        toggle.set(false).await.unwrap();
        assert!(!store.is_saved("u1", "ev-1").unwrap());
    }

    #[test]
    fn test_social_summary_counts() {
        let manager = setup();
        let store = manager.store();
        store
            .set_attendance("u1", "ev-1", Some(AttendanceStatus::Going), now_ms())
            .unwrap();
        store
            .set_attendance("u2", "ev-1", Some(AttendanceStatus::Maybe), now_ms())
            .unwrap();
        let summary = load_social_summary(store.as_ref(), "ev-1", 5).unwrap();
        assert_eq!(summary.going, 1);
        assert_eq!(summary.maybe, 1);
        assert_eq!(summary.total(), 2);
    }
}
