//! Level command implementation

use anyhow::Result;

use palco::config::Config;

/// Show the level a point total resolves to
pub fn level_command(config: &Config, points: i64) -> Result<()> {
    let table = config.level_table()?;
    let progress = table.resolve(points);

    println!(
        "{} {} (level {}/{})",
        progress.current.icon,
        progress.current.name,
        progress.level,
        table.max_level()
    );
    match &progress.next {
        Some(next) => println!(
            "  {:.1}% to {} ({} points to go)",
            progress.progress_pct, next.name, progress.points_to_next
        ),
        None => println!("  Max level reached"),
    }

    println!("\nTiers:");
    for (i, tier) in table.tiers().iter().enumerate() {
        let marker = if i + 1 == progress.level as usize { ">" } else { " " };
        println!("  {} {:>6}  {} {}", marker, tier.min_points, tier.icon, tier.name);
    }

    Ok(())
}
