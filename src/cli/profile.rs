//! Profile command implementation

use anyhow::Result;

use palco::config::Config;
use palco::gamification::RankingType;
use palco::ledger::{now_ms, PointsStore};

/// Show a user's points, level, ranks and badges
pub fn profile_command(config: &Config, user_id: &str, history: usize) -> Result<()> {
    let manager = super::open_manager(config)?;
    let now = now_ms();
    let profile = manager.profile(user_id, now)?;
    let points = &profile.points;
    let level = &profile.level;

    let names = manager.store().profiles(&[user_id.to_string()])?;
    println!("{}\n", super::display_name(user_id, names.get(user_id)));

    println!("  Points:   {} total, {} this month", points.total_points, points.monthly_points);
    println!(
        "  Level:    {} {} ({:.0}%)",
        level.current.icon, level.current.name, level.progress_pct
    );
    println!(
        "  Streak:   {} day(s), best {}",
        points.current_streak, points.best_streak
    );
    for kind in [RankingType::Global, RankingType::Monthly] {
        match manager.rank_of(user_id, kind, now)? {
            Some(rank) => println!("  {:<9} #{}", format!("{}:", kind.label()), rank),
            None => println!("  {:<9} unranked", format!("{}:", kind.label())),
        }
    }

    for badge in &profile.newly_unlocked {
        println!("\n  New badge unlocked: {}", badge.badge_id);
    }

    println!("\nBadges ({} earned):", profile.badges.earned.len());
    for earned in &profile.badges.earned {
        println!("  {} {}", earned.badge.icon, earned.badge.name);
    }

    if !profile.badges.upcoming.is_empty() {
        println!("\nNext up:");
        for progress in profile.badges.upcoming.iter().take(5) {
            println!(
                "  {} {:<20} {:>3}%  {}",
                progress.badge.icon, progress.badge.name, progress.progress_pct, progress.progress_text
            );
        }
    }

    if history > 0 {
        let entries = manager.store().ledger(user_id, history)?;
        println!("\nRecent activity:");
        if entries.is_empty() {
            println!("  (none)");
        }
        for entry in entries {
            println!("  {:+5}  {}", entry.points, entry.description);
        }
    }

    Ok(())
}
