//! Task profile and UI state document.
//!
//! One JSON document with two top-level keys: `tasks`, mapping task name
//! to its adaptive profile, and `ui`, an opaque bag owned by whatever
//! presentation layer sits on top of the core. The core round-trips `ui`
//! untouched.
//!
//! Saves are best-effort: a failed write is logged and swallowed, the
//! in-memory document stays authoritative (single writer, low stakes).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::adaptive::{DEFAULT_INTERVAL_MIN, MAX_INTERVAL_MIN, MIN_INTERVAL_MIN};
use crate::error::Result;

/// Default swatch color for newly created tasks.
pub const DEFAULT_TASK_COLOR: &str = "#dfe8ff";

/// Per-task adaptive state. Created lazily on first reference, never
/// deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskProfile {
    /// Current check-in interval in minutes, always within [3, 30].
    #[serde(default = "default_interval")]
    pub interval_min: u32,
    /// Consecutive on-task check-in responses since the last change.
    #[serde(default)]
    pub yes_streak: u32,
    /// Display color, opaque to the engine.
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_interval() -> u32 {
    DEFAULT_INTERVAL_MIN
}

fn default_color() -> String {
    DEFAULT_TASK_COLOR.to_string()
}

impl Default for TaskProfile {
    fn default() -> Self {
        Self {
            interval_min: DEFAULT_INTERVAL_MIN,
            yes_streak: 0,
            color: default_color(),
        }
    }
}

/// The on-disk document shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StateDoc {
    #[serde(default)]
    tasks: BTreeMap<String, TaskProfile>,
    #[serde(default = "empty_object")]
    ui: serde_json::Value,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Default for StateDoc {
    fn default() -> Self {
        Self {
            tasks: BTreeMap::new(),
            ui: empty_object(),
        }
    }
}

/// File-backed store for the task/UI state document.
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    doc: StateDoc,
}

impl StateStore {
    /// Open the store at `path`, falling back to an empty document when
    /// the file is missing or unreadable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let doc = std::fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();
        Self { path, doc }
    }

    /// Open the store at its default location in the data directory.
    pub fn open_default() -> Result<Self> {
        Ok(Self::open(super::state_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up a profile without creating it.
    pub fn profile(&self, task: &str) -> Option<&TaskProfile> {
        self.doc.tasks.get(task.trim())
    }

    /// Fetch the profile for `task`, creating it with defaults on first
    /// reference. The stored interval is clamped into bounds, so a
    /// hand-edited document cannot smuggle an out-of-range value back in.
    pub fn get_or_create(&mut self, task: &str) -> &mut TaskProfile {
        let profile = self
            .doc
            .tasks
            .entry(task.trim().to_string())
            .or_default();
        profile.interval_min = profile.interval_min.clamp(MIN_INTERVAL_MIN, MAX_INTERVAL_MIN);
        if profile.color.is_empty() {
            profile.color = default_color();
        }
        profile
    }

    /// All known task profiles, name-ordered.
    pub fn tasks(&self) -> &BTreeMap<String, TaskProfile> {
        &self.doc.tasks
    }

    /// The opaque presentation-layer bag.
    pub fn ui(&self) -> &serde_json::Value {
        &self.doc.ui
    }

    /// Mutable access to the presentation-layer bag, coerced to an
    /// object if a legacy document stored something else there.
    pub fn ui_mut(&mut self) -> &mut serde_json::Value {
        if !self.doc.ui.is_object() {
            self.doc.ui = empty_object();
        }
        &mut self.doc.ui
    }

    /// Write the document out, best-effort.
    pub fn save(&self) {
        if let Err(err) = self.try_save() {
            tracing::warn!(path = ?self.path, error = %err, "failed to save state document");
        }
    }

    fn try_save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&self.doc)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_profile_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = StateStore::open(dir.path().join("state.json"));

        let profile = store.get_or_create("Write");
        assert_eq!(profile.interval_min, DEFAULT_INTERVAL_MIN);
        assert_eq!(profile.yes_streak, 0);
        assert_eq!(profile.color, DEFAULT_TASK_COLOR);
    }

    #[test]
    fn trims_task_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = StateStore::open(dir.path().join("state.json"));
        store.get_or_create("  Write  ");
        assert!(store.profile("Write").is_some());
    }

    #[test]
    fn round_trips_profiles_and_ui_bag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut store = StateStore::open(&path);
        store.get_or_create("Write").interval_min = 12;
        store.ui_mut()["window_geometry"] = serde_json::json!("1040x700");
        store.save();

        let reloaded = StateStore::open(&path);
        assert_eq!(reloaded.profile("Write").unwrap().interval_min, 12);
        assert_eq!(reloaded.ui()["window_geometry"], "1040x700");
    }

    #[test]
    fn clamps_out_of_range_interval_on_access() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(
            &path,
            r##"{"tasks": {"Write": {"interval_min": 500, "yes_streak": 1, "color": "#fff"}}, "ui": {}}"##,
        )
        .unwrap();

        let mut store = StateStore::open(&path);
        assert_eq!(store.get_or_create("Write").interval_min, MAX_INTERVAL_MIN);
    }

    #[test]
    fn malformed_file_falls_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();

        let store = StateStore::open(&path);
        assert!(store.tasks().is_empty());
    }
}
