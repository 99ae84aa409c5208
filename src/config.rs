//! # Configuration Persistence
//!
//! User settings stored as JSON in the platform config directory.
//!
//! ## File Location
//!
//! ```text
//! ~/.config/magic-menu/config.json        (Linux)
//! ~/Library/Application Support/magic-menu/config.json   (macOS)
//! ```
//!
//! The `directories` crate resolves the platform-appropriate directory.
//! Every field has a default, so an empty object `{}` is a valid file.

use crate::progress::SpinnerStyle;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "magic-menu";

/// Persisted user configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Log verbosity: `off`, `error`, `warn`, `info`, `debug` or `trace`.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log file; the data directory is used when unset.
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Highlight the selected item with color.
    #[serde(default = "default_true")]
    pub color: bool,

    /// Animate spinners.
    #[serde(default = "default_true")]
    pub animations: bool,

    /// Identical keys closer together than this are dropped.
    #[serde(default = "default_key_debounce_ms")]
    pub key_debounce_ms: u64,

    #[serde(default)]
    pub spinner_style: SpinnerStyle,

    #[serde(default = "default_spinner_tick_ms")]
    pub spinner_tick_ms: u64,

    /// Always use numbered line input, even on a terminal.
    #[serde(default)]
    pub line_input: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_key_debounce_ms() -> u64 {
    20
}

fn default_spinner_tick_ms() -> u64 {
    100
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_file: None,
            color: true,
            animations: true,
            key_debounce_ms: default_key_debounce_ms(),
            spinner_style: SpinnerStyle::default(),
            spinner_tick_ms: default_spinner_tick_ms(),
            line_input: false,
        }
    }
}

impl Config {
    /// Load configuration from disk. Returns `Config::default()` if the file
    /// does not exist or cannot be parsed.
    pub fn load() -> Self {
        Self::try_load().unwrap_or_default()
    }

    fn try_load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path. Returns `Config::default()` if
    /// the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save the current configuration to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    /// Save the current configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path of the default config file.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.json"))
    }

    /// Log file used when none is configured.
    pub fn default_log_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?
            .data_local_dir()
            .join(format!("{APP_NAME}.log")))
    }

    fn project_dirs() -> Result<directories::ProjectDirs> {
        directories::ProjectDirs::from("", "", APP_NAME)
            .context("Could not determine the home directory")
    }
}
