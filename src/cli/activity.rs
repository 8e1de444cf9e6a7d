//! Attend and review command implementations

use std::sync::Arc;

use anyhow::{bail, Result};

use palco::config::Config;
use palco::gamification::GamificationEvent;
use palco::ledger::{now_ms, AttendanceStatus};
use palco::social::{attendance_toggle, load_social_summary};

/// Set attendance for an event ("none" clears it)
pub async fn attend_command(config: &Config, user_id: &str, event_id: &str, status: &str) -> Result<()> {
    let status = match status {
        "none" | "clear" => None,
        other => match AttendanceStatus::from_str(other) {
            Some(s) => Some(s),
            None => bail!("Unknown status: {} (expected going, maybe, went or none)", other),
        },
    };

    let manager = super::open_manager(config)?;
    let before = manager.user_points(user_id, now_ms())?;
    let toggle = attendance_toggle(Arc::clone(&manager), user_id, event_id)?;
    toggle.set(status).await?;

    match toggle.value() {
        Some(s) => println!("Marked as {}", s.label()),
        None => println!("Attendance cleared"),
    }

    let after = manager.user_points(user_id, now_ms())?;
    let gained = after.total_points - before.total_points;
    if gained > 0 {
        println!("+{} points ({} total)", gained, after.total_points);
    }

    let summary = load_social_summary(
        manager.store().as_ref(),
        event_id,
        config.ranking.avatar_sample,
    )?;
    println!(
        "{} going · {} maybe · {} went",
        summary.going, summary.maybe, summary.went
    );

    Ok(())
}

/// Record a review of an event
pub fn review_command(config: &Config, user_id: &str, event_id: &str) -> Result<()> {
    let manager = super::open_manager(config)?;
    let events = manager.post_review(user_id, event_id, now_ms())?;

    if events.is_empty() {
        println!("Review recorded (already rewarded for this event)");
    }
    for event in events {
        print_event(&event);
    }
    Ok(())
}

fn print_event(event: &GamificationEvent) {
    match event {
        GamificationEvent::PointsAwarded { amount, reason } => {
            println!("+{} points: {}", amount, reason)
        }
        GamificationEvent::LevelUp(up) => {
            println!("Level up! You are now {} (level {})", up.new_name, up.new_level)
        }
        GamificationEvent::BadgeUnlocked(badge) => println!("Badge unlocked: {}", badge.badge_id),
    }
}
