//! Studio configuration
//!
//! Stored as `studio.toml` in the app config directory. A missing or
//! unreadable file falls back to defaults.

use crate::mixer::DEFAULT_VOLUME;
use crate::studio::{Profile, RecordingSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tauri::{AppHandle, Manager};
use thiserror::Error;

const CONFIG_FILE: &str = "studio.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StudioConfig {
    /// Which flavour of the studio to run
    #[serde(default)]
    pub profile: Profile,

    /// Where finished recordings are written
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    #[serde(default)]
    pub recording: RecordingSettings,

    /// How often the level meter refreshes
    #[serde(default = "default_meter_interval_ms")]
    pub meter_interval_ms: u64,

    #[serde(default = "default_volume")]
    pub default_volume: u8,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            output_dir: default_output_dir(),
            ffmpeg_path: default_ffmpeg_path(),
            recording: RecordingSettings::default(),
            meter_interval_ms: default_meter_interval_ms(),
            default_volume: default_volume(),
        }
    }
}

impl StudioConfig {
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Load config from disk or return default
    pub fn load_or_default(app_handle: &AppHandle) -> Self {
        let config_path = get_config_path(app_handle);
        if !config_path.exists() {
            return Self::default();
        }

        match Self::load_from(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load {}: {}", config_path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to disk
    pub fn save(&self, app_handle: &AppHandle) -> anyhow::Result<()> {
        self.save_to(&get_config_path(app_handle))?;
        Ok(())
    }
}

/// Recordings land next to the user's other downloads
fn default_output_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_meter_interval_ms() -> u64 {
    100
}

fn default_volume() -> u8 {
    DEFAULT_VOLUME
}

fn get_config_path(app_handle: &AppHandle) -> PathBuf {
    app_handle
        .path()
        .app_config_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(CONFIG_FILE)
}
