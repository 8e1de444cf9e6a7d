//! Configuration loading and management

mod io;
mod settings;

pub use io::DEFAULT_CONFIG;
pub use settings::{
    BoundarySettings, CurationSettings, RankingSettings, RewardSettings, ValidationSettings,
};

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::gamification::{LevelTable, LevelTier};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database (defaults to ~/.palco/palco.db)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    #[serde(default)]
    pub rewards: RewardSettings,

    #[serde(default)]
    pub ranking: RankingSettings,

    #[serde(default)]
    pub curation: CurationSettings,

    #[serde(default)]
    pub validation: ValidationSettings,

    #[serde(default)]
    pub boundary: BoundarySettings,

    /// Replaces the built-in level tiers when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub levels: Option<Vec<LevelTier>>,
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        // Reject a broken level table at load time rather than on first use
        config
            .level_table()
            .with_context(|| format!("Invalid levels in config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration for a directory.
    /// Looks for: .palco/config.toml, then ~/.palco/config.toml, then defaults.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let local = dir.join(".palco/config.toml");
        if local.exists() {
            return Self::from_file(&local);
        }

        let global = Self::global_config_path();
        if global.exists() {
            return Self::from_file(&global);
        }

        Ok(Self::default())
    }

    /// The level table in effect
    pub fn level_table(&self) -> Result<LevelTable> {
        match &self.levels {
            Some(tiers) => Ok(LevelTable::new(tiers.clone())?),
            None => Ok(LevelTable::default()),
        }
    }

    /// Database location, defaulting under the global config dir
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| Self::global_config_dir().join("palco.db"))
    }
}
