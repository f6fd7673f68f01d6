// Command handlers module
pub mod backup;
pub mod config;
pub mod monitor;
pub mod notify;
pub mod organize;
pub mod rename;
pub mod report;
pub mod run;
pub mod version;

// Re-exports for cleaner imports
pub use version::execute as version;

use crate::core::Config;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Config file chosen by `--config`, `$CARETAKER_CONFIG` or the default location
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Config::get_config_path().context("Could not locate config file"),
    }
}

/// Load and validate the active config
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = config_path(explicit)?;
    let config = Config::load_from(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config in {}", path.display()))?;
    Ok(config)
}
