//! Ranking command implementation

use anyhow::{bail, Result};

use palco::config::Config;
use palco::gamification::{RankingType, RankingUser};
use palco::ledger::now_ms;

/// Print the top of a ranking, plus the viewer's row if it falls below
pub fn ranking_command(
    config: &Config,
    kind: &str,
    limit: Option<usize>,
    viewer: Option<&str>,
) -> Result<()> {
    let Some(kind) = RankingType::from_str(kind) else {
        bail!("Unknown ranking type: {} (expected global or monthly)", kind);
    };
    let limit = limit.unwrap_or(config.ranking.display_limit);

    let manager = super::open_manager(config)?;
    let window = manager.ranking_window(kind, limit, viewer, now_ms())?;

    println!("{} ranking\n", kind.label());
    if window.top.is_empty() {
        println!("  No points recorded yet.");
        return Ok(());
    }

    for row in &window.top {
        print_row(kind, row, viewer);
    }
    if let Some(row) = &window.viewer {
        println!("  ...");
        print_row(kind, row, viewer);
    }

    Ok(())
}

fn print_row(kind: RankingType, row: &RankingUser, viewer: Option<&str>) {
    let points = match kind {
        RankingType::Global => row.total_points,
        RankingType::Monthly => row.monthly_points,
    };
    let you = if viewer == Some(row.user_id.as_str()) { "  (you)" } else { "" };
    println!(
        "  #{:<4} {:<24} {:>7} pts  lvl {}{}",
        row.rank,
        super::display_name(&row.user_id, row.profile.as_ref()),
        points,
        row.level,
        you
    );
}
