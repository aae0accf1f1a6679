use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_reminders_path")]
    pub reminders_path: String,
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: String,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_snapshot_on_rollover")]
    pub snapshot_on_rollover: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reminders_path: default_reminders_path(),
            snapshot_dir: default_snapshot_dir(),
            poll_interval_secs: default_poll_interval_secs(),
            snapshot_on_rollover: default_snapshot_on_rollover(),
            log_level: default_log_level(),
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }
}

// Default value functions
fn default_reminders_path() -> String {
    // This is a fallback - actual profile will be determined at load time
    data_file_for_profile(utils::Profile::Prod, "reminders.json")
}

fn default_snapshot_dir() -> String {
    data_file_for_profile(utils::Profile::Prod, "")
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_snapshot_on_rollover() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
}

fn data_file_for_profile(profile: utils::Profile, file_name: &str) -> String {
    if let Some(data_dir) = utils::get_data_dir(profile) {
        data_dir.join(file_name).to_string_lossy().to_string()
    } else {
        let dir = match profile {
            utils::Profile::Dev => "~/.local/share/organizer-dev",
            utils::Profile::Prod => "~/.local/share/organizer",
        };
        if file_name.is_empty() {
            dir.to_string()
        } else {
            format!("{}/{}", dir, file_name)
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
}

impl Config {
    /// Load configuration from the profile's config directory, or create the default if missing
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;

        if config_path.exists() {
            Self::read_from(&config_path)
        } else {
            let mut config = Config::default();
            config.reminders_path = data_file_for_profile(profile, "reminders.json");
            config.snapshot_dir = data_file_for_profile(profile, "");
            config.save_to(&config_path)?;
            log::info!("Wrote default config to {}", config_path.display());
            Ok(config)
        }
    }

    /// Load configuration from an explicit path. A missing file yields the defaults
    /// and is not created.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::read_from(path)
        } else {
            log::warn!("Config file {} not found, using defaults", path.display());
            Ok(Config::default())
        }
    }

    fn read_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to `path`, creating the parent directory if needed
    pub fn save_to(&mut self, path: &Path) -> Result<(), ConfigError> {
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile).ok_or_else(|| {
            ConfigError::ConfigDirError("Could not determine config directory".to_string())
        })?;
        Ok(config_dir.join("config.toml"))
    }

    /// Get the expanded calendar file path (with ~ expansion)
    pub fn get_reminders_path(&self) -> PathBuf {
        utils::expand_path(&self.reminders_path)
    }

    /// Get the expanded snapshot directory (with ~ expansion)
    pub fn get_snapshot_dir(&self) -> PathBuf {
        utils::expand_path(&self.snapshot_dir)
    }

    /// Polling interval, never shorter than one second
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_defaults() {
        let config: Config = toml::from_str("reminders_path = \"/tmp/r.json\"\n").unwrap();
        assert_eq!(config.reminders_path, "/tmp/r.json");
        assert_eq!(config.poll_interval_secs, 60);
        assert!(config.snapshot_on_rollover);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.config_version, Some(CURRENT_CONFIG_VERSION));
    }

    #[test]
    fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("config.toml");
        let mut config = Config::default();
        config.poll_interval_secs = 30;
        config.snapshot_on_rollover = false;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.poll_interval_secs, 30);
        assert!(!loaded.snapshot_on_rollover);
    }

    #[test]
    fn missing_explicit_path_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.poll_interval_secs, 60);
        assert!(!path.exists());
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "poll_interval_secs = \"soon\"").unwrap();
        assert!(matches!(Config::load_from_path(&path), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn zero_interval_is_clamped() {
        let mut config = Config::default();
        config.poll_interval_secs = 0;
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
    }
}
