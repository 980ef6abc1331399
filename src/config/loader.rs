//! Configuration loading from the file system

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, instrument};

use super::defaults::DEFAULT_CONFIG_PATH;
use super::types::NavigatorOptions;
use crate::error::ResultExt;

/// Read options from a JSON file.
pub fn load_options(path: &Path) -> Result<NavigatorOptions> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let options: NavigatorOptions = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config JSON: {}", path.display()))?;
    Ok(options)
}

/// Path of the user config file (~/.navigatorx/config.json).
pub fn default_config_path() -> PathBuf {
    PathBuf::from(shellexpand::tilde(DEFAULT_CONFIG_PATH).as_ref())
}

/// Directory used by file-backed storage when none is configured.
pub fn default_storage_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".navigatorx").join("storage"))
        .unwrap_or_else(|| std::env::temp_dir().join("navigatorx-storage"))
}

/// Resolve the configured storage directory, expanding `~`.
pub fn storage_dir(options: &NavigatorOptions) -> PathBuf {
    match &options.storage_dir {
        Some(dir) => PathBuf::from(shellexpand::tilde(dir).as_ref()),
        None => default_storage_dir(),
    }
}

/// Load the user config, falling back to defaults on any failure.
#[instrument(name = "load_config")]
pub fn load_config() -> NavigatorOptions {
    let config_path = default_config_path();

    if !config_path.exists() {
        info!(path = %config_path.display(), "Config file not found, using defaults");
        return NavigatorOptions::default();
    }

    match load_options(&config_path).warn_on_err() {
        Some(options) => {
            info!(path = %config_path.display(), "Successfully loaded config");
            options
        }
        None => {
            info!("Using default config");
            NavigatorOptions::default()
        }
    }
}
