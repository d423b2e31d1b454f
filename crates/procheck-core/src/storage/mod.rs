//! File-backed stores and the per-user data directory.

mod config;
mod debounce;
mod notes;
mod state;

pub use config::Config;
pub use debounce::Debouncer;
pub use notes::NotesStore;
pub use state::{StateStore, TaskProfile, DEFAULT_TASK_COLOR};

use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Event log file name inside the data directory.
pub const LOG_FILE: &str = "events.csv";
/// Task/UI state document file name.
pub const STATE_FILE: &str = "state.json";
/// Per-day notes document file name.
pub const NOTES_FILE: &str = "notes.json";

/// Returns `~/.config/procheck[-dev]/` based on PROCHECK_ENV, creating it
/// if needed.
///
/// Set PROCHECK_ENV=dev to use a development data directory, or
/// PROCHECK_DATA_DIR to point somewhere else entirely (tests use this).
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var("PROCHECK_DATA_DIR") {
        Ok(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("PROCHECK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("procheck-dev")
            } else {
                base_dir.join("procheck")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Path of the event log inside the data directory.
pub fn log_path() -> Result<PathBuf> {
    Ok(data_dir()?.join(LOG_FILE))
}

/// Path of the state document inside the data directory.
pub fn state_path() -> Result<PathBuf> {
    Ok(data_dir()?.join(STATE_FILE))
}

/// Path of the notes document inside the data directory.
pub fn notes_path() -> Result<PathBuf> {
    Ok(data_dir()?.join(NOTES_FILE))
}
