//! Per-user locations for the archiver's config, credentials and state.
//!
//! Setting `ZOOM_ARCHIVER_HOME` puts config and state in one directory,
//! which keeps separate archives (one per Zoom account, say) apart.

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_DIR: &str = "zoom-archiver";
const COMPLETED_LOG: &str = "completed-downloads.log";
pub const HOME_ENV: &str = "ZOOM_ARCHIVER_HOME";

fn home_override() -> Option<PathBuf> {
    std::env::var_os(HOME_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn app_dir(home: Option<PathBuf>, base: Option<PathBuf>, kind: &str) -> Result<PathBuf> {
    home.or_else(|| base.map(|dir| dir.join(APP_DIR)))
        .with_context(|| format!("Unable to determine {} directory", kind))
}

pub fn config_dir() -> Result<PathBuf> {
    app_dir(home_override(), dirs::config_dir(), "config")
}

pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Credentials file read after the working directory's `.env`.
pub fn env_file() -> Result<PathBuf> {
    Ok(config_dir()?.join(".env"))
}

pub fn data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")));
    app_dir(home_override(), base, "data")
}

/// Default location of the append-only log of archived meeting UUIDs.
pub fn completed_log_file() -> Result<PathBuf> {
    Ok(data_dir()?.join(COMPLETED_LOG))
}
