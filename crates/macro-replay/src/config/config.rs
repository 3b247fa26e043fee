//! Configuration management for macro-replay.
//!
//! Loads and saves a TOML file in the platform config directory, creating
//! it with defaults on first run. Saves are atomic (temp file + rename).

use crate::{
    AppError, AppResult,
    config::{DEFAULT_POLL_INTERVAL_MS, PlaybackConfig, RecordingConfig},
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use macro_replay_core::keys::canonical_key_name;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Main configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Capture settings.
    #[serde(default)]
    pub recording: RecordingConfig,
    /// Replay settings.
    #[serde(default)]
    pub playback: PlaybackConfig,
}

impl Config {
    /// Load configuration from the platform config directory, creating a default if not found.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            info!("No config found, creating default");
            let config = Config::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    /// Load and validate configuration from `path`.
    #[track_caller]
    #[instrument]
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let mut config: Config = toml::from_str(&contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        config.validate()?;
        config.recording.abort_key = canonical_key_name(&config.recording.abort_key);

        info!(config_path = ?path, "Configuration loaded");

        Ok(config)
    }

    /// Reject values the engine cannot honour.
    #[track_caller]
    pub fn validate(&self) -> AppResult<()> {
        let poll = self.playback.poll_interval_ms;
        if poll == 0 || poll > DEFAULT_POLL_INTERVAL_MS {
            return Err(AppError::ConfigError {
                reason: format!(
                    "playback.poll_interval_ms must be between 1 and {}, got {}",
                    DEFAULT_POLL_INTERVAL_MS, poll
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let speed = self.playback.speed;
        if !speed.is_finite() || speed <= 0.0 {
            return Err(AppError::ConfigError {
                reason: format!("playback.speed must be a positive number, got {}", speed),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.recording.abort_key.trim().is_empty() {
            return Err(AppError::ConfigError {
                reason: "recording.abort_key must not be empty".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }

    /// Save configuration to `path` using an atomic write.
    ///
    /// Writes to a temporary file first, then renames, so a crash during the
    /// write never leaves a truncated config behind.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let temp_path = path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?path, "Configuration saved (atomic write)");

        Ok(())
    }

    /// Platform project directories for macro-replay.
    #[track_caller]
    pub fn project_dirs() -> AppResult<ProjectDirs> {
        ProjectDirs::from("com", "macro-replay", "Macro-Replay").ok_or_else(|| {
            AppError::ConfigError {
                reason: "Failed to get project directories".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }
        })
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        let proj_dirs = Self::project_dirs()?;
        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Ok(config_dir.join("config.toml"))
    }
}
