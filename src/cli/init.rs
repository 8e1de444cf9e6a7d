//! Init command implementation

use std::path::PathBuf;

use anyhow::Result;

use palco::config::Config;

/// Write the default config, globally unless a path is given
pub fn init_command(config_path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = config_path.unwrap_or_else(Config::global_config_path);
    Config::write_default(&config_path, force)?;
    println!("Created: {}", config_path.display());
    Ok(())
}
