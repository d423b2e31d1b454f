//! TOML-based application configuration.
//!
//! Stores the session and check-in defaults:
//! - Target session duration and auto-stop behavior
//! - Whether adaptive check-ins are enabled
//! - Tick period for the cooperative timer loop
//! - Debounce delay for best-effort note persistence
//!
//! Configuration is stored at `~/.config/procheck/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::{ConfigError, Result};

/// Session defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Default target duration in minutes; 0 disables the target.
    #[serde(default = "default_target_min")]
    pub default_target_min: u32,
    /// Raise a session-finished decision point when the target is reached.
    #[serde(default = "default_true")]
    pub auto_stop: bool,
    /// Tick period for the cooperative loop, in milliseconds.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

/// Check-in behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckinConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Notes persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesConfig {
    /// Quiescence delay before a pending note edit is written out.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/procheck/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub checkins: CheckinConfig,
    #[serde(default)]
    pub notes: NotesConfig,
}

// Default functions
fn default_target_min() -> u32 {
    30
}
fn default_tick_ms() -> u64 {
    200
}
fn default_debounce_ms() -> u64 {
    400
}
fn default_true() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_target_min: default_target_min(),
            auto_stop: true,
            tick_ms: default_tick_ms(),
        }
    }
}

impl Default for CheckinConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            checkins: CheckinConfig::default(),
            notes: NotesConfig::default(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing out the default on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Write the configuration to its default location.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Render as pretty TOML (used by `config show`).
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}
