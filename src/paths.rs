//! Centralized path resolution for herd
//!
//! # Environment Variables
//!
//! - `HERD_CONFIG_DIR` - Override config directory (e.g., `~/dotfiles/herd`)
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `HERD_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/herd` (if set)
//! 3. `~/.config/herd`
//!
//! The config directory holds two files, both optional:
//! - `hosts` - host groups and the default group
//! - `config.toml` - transport and repository settings

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "HERD_CONFIG_DIR";

/// File name of the host group file
pub const HOSTS_FILE: &str = "hosts";

/// File name of the settings file
pub const SETTINGS_FILE: &str = "config.toml";

/// Get the herd config directory path
///
/// Priority:
/// 1. `HERD_CONFIG_DIR` env var
/// 2. `XDG_CONFIG_HOME/herd`
/// 3. `~/.config/herd`
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        let path = PathBuf::from(xdg_config).join("herd");
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join("herd");
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Path of the host group file
pub fn hosts_file() -> Result<PathBuf> {
    Ok(config_dir()?.join(HOSTS_FILE))
}

/// Path of the settings file
pub fn settings_file() -> Result<PathBuf> {
    Ok(config_dir()?.join(SETTINGS_FILE))
}

/// Expand ~ and environment variables in a path string.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

// ============================================================================
// Tests
// ============================================================================
