//! Config file locations and writing

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use super::Config;

/// Default configuration content for `palco init`
pub const DEFAULT_CONFIG: &str = r##"# Palco configuration
# ===================

# SQLite database holding the points ledger, badges, attendance and saves.
# Defaults to ~/.palco/palco.db when unset.
# database_path = "/var/lib/palco/palco.db"

# Points the backend awards for qualifying actions
[rewards]
checkin = 10
review = 5

[ranking]
# Rows shown in ranking lists (your own rank is always resolved)
display_limit = 10
# Attendee avatars included in an event's social summary
avatar_sample = 5

[curation]
# Satisfied criteria shown as chips before "+N"
max_chips = 3

[validation]
# Quiet period before username/slug availability checks (ms)
debounce_ms = 450

[boundary]
# Resets attempted before an error boundary forces a full reload
max_retries = 3

# Level tiers override. Thresholds must start at 0 and strictly increase.
# [[levels]]
# min_points = 0
# name = "Bronze"
# icon = "🥉"
# color = "#CD7F32"
"##;

impl Config {
    /// Get the global config directory (~/.palco)
    pub fn global_config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".palco")
    }

    /// Get the global config file path (~/.palco/config.toml)
    pub fn global_config_path() -> PathBuf {
        Self::global_config_dir().join("config.toml")
    }

    /// Serialize and write this config, replacing the file atomically
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).with_context(|| "Failed to serialize config")?;
        write_atomic(path, &content)
    }

    /// Write the commented default config, refusing to overwrite unless `force`
    pub fn write_default(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            bail!(
                "Configuration already exists: {}\nUse --force to overwrite.",
                path.display()
            );
        }
        write_atomic(path, DEFAULT_CONFIG)
    }
}

fn write_atomic(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create config directory: {}", parent.display())
        })?;
    }

    // Write to temp file first, then rename over the target
    let temp_path = path.with_extension("toml.tmp");
    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;
    temp_file
        .write_all(content.as_bytes())
        .with_context(|| format!("Failed to write temp file: {}", temp_path.display()))?;
    temp_file.sync_all()?;
    drop(temp_file);

    std::fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to replace config file: {}", path.display()))?;
    Ok(())
}
