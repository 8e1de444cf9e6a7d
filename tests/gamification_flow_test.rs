//! End-to-end gamification flow on a SQLite store:
//! attendance -> points -> level up -> badges -> rankings

mod common;

use common::{add_event, add_profile, create_test_manager, create_test_store, ts};

use palco::gamification::{GamificationEvent, GamificationManager, LevelTable, RankingType};
use palco::ledger::{ActivityStore, AttendanceStatus, PointsStore, SqliteStore};

fn badge_ids(events: &[GamificationEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            GamificationEvent::BadgeUnlocked(b) => Some(b.badge_id.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_checkin_awards_points_once() {
    let (_dir, manager) = create_test_manager();
    add_event(manager.store(), "ev-1", "Samba no Cais");
    let now = ts(2024, 3, 10);

    let events = manager
        .mark_attendance("ana", "ev-1", Some(AttendanceStatus::Went), now)
        .unwrap();
    assert!(matches!(
        events[0],
        GamificationEvent::PointsAwarded { amount: 10, .. }
    ));
    assert_eq!(badge_ids(&events), vec!["first_checkin".to_string()]);

    // Flipping status back and forth never pays twice
    manager
        .mark_attendance("ana", "ev-1", Some(AttendanceStatus::Going), now)
        .unwrap();
    let again = manager
        .mark_attendance("ana", "ev-1", Some(AttendanceStatus::Went), now)
        .unwrap();
    assert!(again.is_empty());

    let points = manager.user_points("ana", now).unwrap();
    assert_eq!(points.total_points, 10);
    assert_eq!(points.monthly_points, 10);
    assert_eq!(points.current_streak, 1);
}

#[test]
fn test_review_reward_separate_from_checkin() {
    let (_dir, manager) = create_test_manager();
    add_event(manager.store(), "ev-1", "Samba no Cais");
    let now = ts(2024, 3, 10);

    manager
        .mark_attendance("ana", "ev-1", Some(AttendanceStatus::Went), now)
        .unwrap();
    let events = manager.post_review("ana", "ev-1", now).unwrap();
    assert!(badge_ids(&events).contains(&"first_review".to_string()));
    assert!(manager.post_review("ana", "ev-1", now).unwrap().is_empty());

    assert_eq!(manager.user_points("ana", now).unwrap().total_points, 15);
}

#[test]
fn test_crossing_threshold_levels_up() {
    let (_dir, manager) = create_test_manager();
    add_event(manager.store(), "ev-1", "Samba no Cais");
    let now = ts(2024, 3, 10);

    manager
        .store()
        .record_adjustment("ana", 995, "Launch promo", now)
        .unwrap();
    manager.invalidate("ana");
    assert_eq!(manager.user_points("ana", now).unwrap().level, 1);

    let events = manager
        .mark_attendance("ana", "ev-1", Some(AttendanceStatus::Went), now)
        .unwrap();

    let level_up = events.iter().find_map(|e| match e {
        GamificationEvent::LevelUp(up) => Some(up),
        _ => None,
    });
    let level_up = level_up.expect("level up event");
    assert_eq!(level_up.old_level, 1);
    assert_eq!(level_up.new_level, 2);
    assert_eq!(level_up.new_name, "Silver");

    let unlocked = badge_ids(&events);
    assert!(unlocked.contains(&"points_500".to_string()));
    assert!(unlocked.contains(&"month_highlight".to_string()));

    let profile = manager.profile("ana", now).unwrap();
    assert_eq!(profile.level.level, 2);
    assert_eq!(profile.level.points_to_next, 2500 - 1005);
    assert!(profile.newly_unlocked.is_empty());
    assert!(profile.badges.upcoming.iter().all(|b| b.progress_pct <= 99));
}

#[test]
fn test_streak_across_consecutive_days() {
    let (_dir, manager) = create_test_manager();
    for day in 1..=7 {
        let id = format!("ev-{}", day);
        add_event(manager.store(), &id, &format!("Night {}", day));
        manager
            .mark_attendance("ana", &id, Some(AttendanceStatus::Went), ts(2024, 3, day))
            .unwrap();
    }

    let points = manager.user_points("ana", ts(2024, 3, 7)).unwrap();
    assert_eq!(points.current_streak, 7);
    assert_eq!(points.best_streak, 7);

    let earned = manager.store().user_badges("ana").unwrap();
    assert!(earned.iter().any(|b| b.badge_id == "streak_7"));

    // Two idle days later the streak is broken but the best is kept
    let later = manager.store().user_points("ana", ts(2024, 3, 10)).unwrap();
    assert_eq!(later.current_streak, 0);
    assert_eq!(later.best_streak, 7);
}

#[test]
fn test_cached_streak_follows_the_calendar() {
    let (_dir, manager) = create_test_manager();
    add_event(manager.store(), "ev-1", "Samba no Cais");
    let checkin_day = ts(2024, 3, 1);
    manager
        .mark_attendance("ana", "ev-1", Some(AttendanceStatus::Went), checkin_day)
        .unwrap();
    assert_eq!(
        manager.user_points("ana", checkin_day).unwrap().current_streak,
        1
    );

    let later = ts(2024, 3, 10);
    let points = manager.user_points("ana", later).unwrap();
    assert_eq!(points.current_streak, 0);
    assert_eq!(points.best_streak, 1);

    let profile = manager.profile("ana", later).unwrap();
    assert_eq!(profile.points.current_streak, 0);
    let streak_badge = profile
        .badges
        .upcoming
        .iter()
        .find(|p| p.badge.id == "streak_7")
        .expect("streak badge in progress");
    assert_eq!(streak_badge.progress_pct, 0);

    let ranking = manager.ranking(RankingType::Global, later).unwrap();
    assert_eq!(ranking.entries()[0].current_streak, 0);
}

#[test]
fn test_global_ranking_dense_with_profiles() {
    let (_dir, manager) = create_test_manager();
    let store = manager.store();
    let now = ts(2024, 3, 10);
    for (user, points) in [("bia", 100), ("ana", 100), ("caio", 50), ("davi", 10)] {
        store.record_adjustment(user, points, "Seed", now).unwrap();
    }
    add_profile(store, "ana", "ana");

    let ranking = manager.ranking(RankingType::Global, now).unwrap();
    let ranks: Vec<(&str, u32)> = ranking
        .entries()
        .iter()
        .map(|e| (e.user_id.as_str(), e.rank))
        .collect();
    assert_eq!(ranks, vec![("ana", 1), ("bia", 1), ("caio", 2), ("davi", 3)]);
    assert_eq!(
        ranking.entries()[0].profile.as_ref().map(|p| p.username.as_str()),
        Some("ana")
    );

    let window = manager
        .ranking_window(RankingType::Global, 2, Some("davi"), now)
        .unwrap();
    assert_eq!(window.top.len(), 2);
    assert_eq!(window.viewer.as_ref().map(|v| v.rank), Some(3));
}

#[test]
fn test_monthly_ranking_only_counts_current_month() {
    let (_dir, manager) = create_test_manager();
    let store = manager.store();
    store
        .record_adjustment("ana", 500, "January", ts(2024, 1, 15))
        .unwrap();
    store
        .record_adjustment("bia", 100, "February", ts(2024, 2, 10))
        .unwrap();

    let now = ts(2024, 2, 20);
    assert_eq!(
        manager.rank_of("bia", RankingType::Monthly, now).unwrap(),
        Some(1)
    );
    assert_eq!(
        manager.rank_of("ana", RankingType::Monthly, now).unwrap(),
        Some(2)
    );
    assert_eq!(
        manager.rank_of("ana", RankingType::Global, now).unwrap(),
        Some(1)
    );
    assert_eq!(manager.rank_of("nobody", RankingType::Global, now).unwrap(), None);
}

#[test]
fn test_ranking_refreshes_after_reward() {
    let (_dir, manager) = create_test_manager();
    add_event(manager.store(), "ev-1", "Samba no Cais");
    let now = ts(2024, 3, 10);
    manager.store().record_adjustment("bia", 5, "Seed", now).unwrap();

    assert_eq!(manager.rank_of("bia", RankingType::Global, now).unwrap(), Some(1));

    manager
        .mark_attendance("ana", "ev-1", Some(AttendanceStatus::Went), now)
        .unwrap();
    assert_eq!(manager.rank_of("ana", RankingType::Global, now).unwrap(), Some(1));
    assert_eq!(manager.rank_of("bia", RankingType::Global, now).unwrap(), Some(2));
}

#[test]
fn test_ledger_survives_reopen() {
    let (dir, store) = create_test_store();
    add_event(&store, "ev-1", "Samba no Cais");
    store
        .set_attendance("ana", "ev-1", Some(AttendanceStatus::Went), ts(2024, 3, 10))
        .unwrap();
    drop(store);

    let reopened = SqliteStore::open(
        &dir.path().join("palco.db"),
        LevelTable::default(),
        Default::default(),
    )
    .unwrap();
    let manager = GamificationManager::new(std::sync::Arc::new(reopened), LevelTable::default());
    assert_eq!(
        manager.user_points("ana", ts(2024, 3, 10)).unwrap().total_points,
        10
    );
    // Still only one check-in reward for the event
    assert!(manager
        .store()
        .set_attendance("ana", "ev-1", Some(AttendanceStatus::Went), ts(2024, 3, 11))
        .unwrap()
        .is_none());
}

#[test]
fn test_attendance_requires_user() {
    let (_dir, store) = create_test_store();
    add_event(&store, "ev-1", "Samba no Cais");
    let err = store
        .set_attendance("", "ev-1", Some(AttendanceStatus::Going), ts(2024, 3, 10))
        .unwrap_err();
    assert_eq!(err.kind(), palco::error::ErrorKind::Unauthorized);
}
