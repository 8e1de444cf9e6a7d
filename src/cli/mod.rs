//! CLI command implementations

pub mod activity;
pub mod curation;
pub mod directory;
pub mod init;
pub mod level;
pub mod profile;
pub mod ranking;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use palco::config::Config;
use palco::gamification::GamificationManager;
use palco::ledger::SqliteStore;

/// Load the config for `work_dir`, or from an explicit file
pub fn load_config(work_dir: &Path, config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(path) => Config::from_file(path),
        None => Config::from_dir(work_dir),
    }
}

pub fn open_store(config: &Config) -> Result<Arc<SqliteStore>> {
    let store = SqliteStore::open(
        &config.database_path(),
        config.level_table()?,
        config.rewards,
    )?;
    Ok(Arc::new(store))
}

pub fn open_manager(config: &Config) -> Result<Arc<GamificationManager<SqliteStore>>> {
    let store = open_store(config)?;
    Ok(Arc::new(GamificationManager::new(store, config.level_table()?)))
}

/// Profile name if known, otherwise the raw id
fn display_name(user_id: &str, profile: Option<&palco::ledger::Profile>) -> String {
    match profile {
        Some(p) => p
            .display_name
            .clone()
            .unwrap_or_else(|| format!("@{}", p.username)),
        None => user_id.to_string(),
    }
}
