use crate::global;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub zoom: ZoomConfig,
    pub storage: StorageConfig,
    pub behavior: BehaviorConfig,
    pub vimeo: VimeoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub api_base: String,
    /// Bearer token for the Zoom REST API. Usually supplied through
    /// ZOOM_API_TOKEN rather than written to disk.
    pub token: String,
    /// Page size for both the user and the recording listings.
    pub page_size: u32,
    /// Widest date range the recording listing accepts per call.
    pub window_days: u32,
    /// How far back the default range starts, counted from today.
    pub lookback_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub download_dir: PathBuf,
    /// Append-only log of finished meeting UUIDs. Defaults to the data dir.
    pub completed_log: Option<PathBuf>,
    /// Staging directory uploaded files are moved into before cleanup.
    pub uploaded_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Delete the cloud recording once every file of a meeting is on disk.
    pub delete_remote: bool,
    pub success_policy: SuccessPolicy,
    pub show_progress: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VimeoConfig {
    pub api_base: String,
    pub token: String,
}

/// Decides when a meeting with several files counts as downloaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuccessPolicy {
    /// One successful file is enough.
    #[default]
    AnySucceeded,
    /// Every selected file must succeed.
    AllSucceeded,
}

impl SuccessPolicy {
    pub fn is_satisfied(&self, succeeded: usize, attempted: usize) -> bool {
        match self {
            Self::AnySucceeded => succeeded > 0,
            Self::AllSucceeded => attempted > 0 && succeeded == attempted,
        }
    }
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.zoom.us/v2".to_string(),
            token: String::new(),
            page_size: 300,
            window_days: 30,
            lookback_days: 1,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("downloads"),
            completed_log: None,
            uploaded_dir: PathBuf::from("uploaded"),
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            delete_remote: false,
            success_policy: SuccessPolicy::default(),
            show_progress: true,
        }
    }
}

impl Default for VimeoConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.vimeo.com".to_string(),
            token: String::new(),
        }
    }
}

impl Config {
    /// Load the config from `explicit` when given, otherwise from the default
    /// location (created with defaults on first run). Environment overrides
    /// are applied on top in both cases.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from(path)?,
            None => Self::load_default()?,
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn load_default() -> Result<Self> {
        let config_path = global::config_file()?;
        if !config_path.exists() {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            config.save_to(&config_path)?;
            return Ok(config);
        }
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Reads `.env` from the working directory, then the one next to the
    /// config file, and lets the process environment override credentials
    /// and the download directory. Variables already set are never replaced.
    pub fn apply_env_overrides(&mut self) {
        let _ = dotenvy::dotenv();
        if let Ok(path) = global::env_file() {
            let _ = dotenvy::from_path(path);
        }

        if let Some(token) = env_non_empty("ZOOM_API_TOKEN").or_else(|| env_non_empty("JWT_TOKEN")) {
            self.zoom.token = token;
        }
        if let Some(token) = env_non_empty("VIMEO_TOKEN") {
            self.vimeo.token = token;
        }
        if let Some(dir) = env_non_empty("ZOOM_ARCHIVER_DOWNLOAD_DIR") {
            self.storage.download_dir = PathBuf::from(dir);
        }
    }

    pub fn completed_log_path(&self) -> Result<PathBuf> {
        match &self.storage.completed_log {
            Some(path) => Ok(path.clone()),
            None => global::completed_log_file(),
        }
    }

    pub fn require_zoom_token(&self) -> Result<&str> {
        if self.zoom.token.trim().is_empty() {
            bail!("No Zoom API token configured. Set ZOOM_API_TOKEN or zoom.token in the config file");
        }
        Ok(&self.zoom.token)
    }

    pub fn require_vimeo_token(&self) -> Result<&str> {
        if self.vimeo.token.trim().is_empty() {
            bail!("No Vimeo token configured. Set VIMEO_TOKEN or vimeo.token in the config file");
        }
        Ok(&self.vimeo.token)
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_api_limits() {
        let config = Config::default();
        assert_eq!(config.zoom.page_size, 300);
        assert_eq!(config.zoom.window_days, 30);
        assert_eq!(config.zoom.lookback_days, 1);
        assert!(!config.behavior.delete_remote);
        assert_eq!(config.behavior.success_policy, SuccessPolicy::AnySucceeded);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [zoom]
            lookback_days = 7

            [behavior]
            success_policy = "all-succeeded"
            "#,
        )
        .unwrap();

        assert_eq!(config.zoom.lookback_days, 7);
        assert_eq!(config.zoom.page_size, 300);
        assert_eq!(config.behavior.success_policy, SuccessPolicy::AllSucceeded);
        assert_eq!(config.storage.download_dir, PathBuf::from("downloads"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.storage.completed_log = Some(PathBuf::from("/tmp/done.log"));
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.storage.completed_log, Some(PathBuf::from("/tmp/done.log")));
    }

    #[test]
    fn test_success_policy() {
        assert!(SuccessPolicy::AnySucceeded.is_satisfied(1, 3));
        assert!(!SuccessPolicy::AnySucceeded.is_satisfied(0, 3));
        assert!(!SuccessPolicy::AllSucceeded.is_satisfied(2, 3));
        assert!(SuccessPolicy::AllSucceeded.is_satisfied(3, 3));
        assert!(!SuccessPolicy::AllSucceeded.is_satisfied(0, 0));
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let config = Config::default();
        assert!(config.require_zoom_token().is_err());
        assert!(config.require_vimeo_token().is_err());
    }
}
