//! Config and log path resolution.

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application directory name under `~/.config` and `~/.local/state`.
const APP_DIR: &str = "cinefind";

/// Resolves the config file path.
///
/// - If `dir` is `Some`, returns `{dir}/config.toml`.
/// - Otherwise returns `~/.config/cinefind/config.toml`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined (when `dir` is `None`).
pub fn resolve_config_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join("config.toml"));
    }

    let home = std::env::var("HOME").context("HOME environment variable is not set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join(APP_DIR)
        .join("config.toml"))
}

/// Resolves the log file used while the terminal browser owns the screen.
///
/// - If `dir` is `Some`, returns `{dir}/cinefind.log`.
/// - Otherwise returns `~/.local/state/cinefind/cinefind.log`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined (when `dir` is `None`).
pub fn resolve_log_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join("cinefind.log"));
    }

    let home = std::env::var("HOME").context("HOME environment variable is not set")?;
    Ok(PathBuf::from(home)
        .join(".local")
        .join("state")
        .join(APP_DIR)
        .join("cinefind.log"))
}
