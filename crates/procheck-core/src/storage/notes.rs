//! Per-day free-text notes, independent of the event log.
//!
//! A flat JSON map from `YYYY-MM-DD` day keys to note text. Saves are
//! best-effort and usually debounced by the caller (see
//! [`super::Debouncer`]).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// File-backed store for day notes.
#[derive(Debug)]
pub struct NotesStore {
    path: PathBuf,
    map: BTreeMap<String, String>,
}

impl NotesStore {
    /// Open the store at `path`; a missing or malformed file yields an
    /// empty map.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let map = std::fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();
        Self { path, map }
    }

    /// Open the store at its default location in the data directory.
    pub fn open_default() -> Result<Self> {
        Ok(Self::open(super::notes_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The note for a day, if any.
    pub fn get(&self, day: &str) -> Option<&str> {
        self.map.get(day).map(String::as_str)
    }

    /// Set (or clear, with empty text) the note for a day. Trailing
    /// whitespace is dropped; persistence is the caller's call.
    pub fn set(&mut self, day: &str, text: &str) {
        let text = text.trim_end();
        if text.is_empty() {
            self.map.remove(day);
        } else {
            self.map.insert(day.to_string(), text.to_string());
        }
    }

    /// Days that have a note, ascending.
    pub fn days(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    /// Write the map out, best-effort.
    pub fn save(&self) {
        if let Err(err) = self.try_save() {
            tracing::warn!(path = ?self.path, error = %err, "failed to save notes");
        }
    }

    fn try_save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&self.map)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut notes = NotesStore::open(dir.path().join("notes.json"));

        notes.set("2026-03-02", "review PRs\n");
        assert_eq!(notes.get("2026-03-02"), Some("review PRs"));
        notes.save();

        let reloaded = NotesStore::open(notes.path().to_path_buf());
        assert_eq!(reloaded.get("2026-03-02"), Some("review PRs"));
    }

    #[test]
    fn empty_text_clears_the_day() {
        let dir = tempfile::tempdir().unwrap();
        let mut notes = NotesStore::open(dir.path().join("notes.json"));
        notes.set("2026-03-02", "something");
        notes.set("2026-03-02", "   ");
        assert_eq!(notes.get("2026-03-02"), None);
    }

    #[test]
    fn malformed_file_falls_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        let notes = NotesStore::open(&path);
        assert_eq!(notes.days().count(), 0);
    }
}
