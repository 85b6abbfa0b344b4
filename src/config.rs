//! User settings
//!
//! Read from ~/.config/sunodl/config.json when present. The file is never
//! written by sunodl; every field is optional and falls back to a default.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::suno::DEFAULT_API_BASE;

const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory playlists are downloaded into
    pub output_dir: Option<PathBuf>,
    /// Base URL of the playlist metadata API
    pub api_base: String,
    /// User agent sent to the metadata API
    pub user_agent: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Downsize embedded covers to this many pixels per side
    pub cover_max_size: Option<u32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: None,
            api_base: DEFAULT_API_BASE.to_string(),
            user_agent: concat!("sunodl/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            cover_max_size: None,
        }
    }
}

impl Settings {
    /// Load settings from the default location
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("No config directory on this platform, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load settings from `path`, using defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;

        let settings: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings in {:?}", path))?;

        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Get the settings file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sunodl").join("config.json"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Pick the output root: explicit choice, then settings, then the
    /// platform music folder, then the current directory
    pub fn resolve_output_dir(&self, explicit: Option<PathBuf>) -> PathBuf {
        explicit
            .or_else(|| self.output_dir.clone())
            .or_else(dirs::audio_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
