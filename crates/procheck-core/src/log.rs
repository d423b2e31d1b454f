//! Append-only CSV event log, the single source of truth.
//!
//! One row per event, column order `timestamp, event, task,
//! session_seconds, note`, header written on file creation. Rows are
//! never rewritten or deleted; all statistics are recomputed from the
//! file on demand, which makes every other component trivially
//! restartable.
//!
//! Appends are best-effort: a failed write is logged and swallowed, the
//! in-memory state stays authoritative for the rest of the run. Loads
//! skip rows whose timestamp or event kind does not parse, so older or
//! hand-edited logs degrade gracefully instead of failing.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::event::{Event, EventKind};

/// Header row, written once when the file is created.
const HEADER: [&str; 5] = ["timestamp", "event", "task", "session_seconds", "note"];

/// Handle on the append-only event log file.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    /// Create a handle. No IO happens until the first append or load.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event, best-effort. Failures are swallowed after a
    /// warning; a missed line degrades statistics, it does not corrupt
    /// them.
    pub fn append(&self, event: &Event) {
        if let Err(err) = self.try_append(event) {
            tracing::warn!(path = ?self.path, error = %err, "failed to append event to log");
        }
    }

    fn try_append(&self, event: &Event) -> Result<()> {
        self.ensure_header()?;
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record([
            event.timestamp_str().as_str(),
            event.kind.as_str(),
            event.task.as_str(),
            event.secs.to_string().as_str(),
            event.note.as_str(),
        ])?;
        writer.flush()?;
        Ok(())
    }

    /// Create the file with its header row if it does not exist yet.
    pub fn ensure_header(&self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().write(true).create_new(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(HEADER)?;
        writer.flush()?;
        Ok(())
    }

    /// Load every parseable record, sorted ascending by timestamp.
    ///
    /// A log on disk is not trusted to be pre-sorted. Rows with a
    /// malformed timestamp or an unknown event kind are skipped; a
    /// malformed `session_seconds` column reads as 0 without dropping
    /// the row. A missing file yields an empty vec.
    ///
    /// # Errors
    ///
    /// Returns an error only when the file exists but cannot be read.
    pub fn load_all(&self) -> Result<Vec<Event>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;

        let mut events = Vec::new();
        for record in reader.records() {
            let record = match record {
                Ok(r) => r,
                Err(err) => {
                    tracing::debug!(error = %err, "skipping unreadable log row");
                    continue;
                }
            };

            let Some(timestamp) = record.get(0).and_then(Event::parse_timestamp) else {
                continue;
            };
            let Some(kind) = record.get(1).and_then(EventKind::parse) else {
                tracing::debug!(row = ?record.get(1), "skipping row with unknown event kind");
                continue;
            };
            let task = record.get(2).unwrap_or("").trim().to_string();
            let secs = record
                .get(3)
                .and_then(|s| s.trim().parse::<i64>().ok())
                .map(|s| s.max(0) as u64)
                .unwrap_or(0);
            let note = record.get(4).unwrap_or("").to_string();

            events.push(Event {
                timestamp,
                kind,
                task,
                secs,
                note,
            });
        }

        events.sort_by_key(|e| e.timestamp);
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;

    fn event(ts: &str, kind: EventKind, task: &str, secs: u64, note: &str) -> Event {
        Event::new(Event::parse_timestamp(ts).unwrap(), kind, task, secs, note)
    }

    #[test]
    fn append_creates_header_then_rows() {
        let dir = tempfile::tempdir().unwrap();
        let log = EventLog::open(dir.path().join("events.csv"));

        log.append(&event("2026-03-02 09:00:00", EventKind::Start, "Write", 0, "interval_min=10"));
        log.append(&event("2026-03-02 09:30:00", EventKind::Stop, "Write", 1800, ""));

        let raw = std::fs::read_to_string(log.path()).unwrap();
        let mut lines = raw.lines();
        assert_eq!(lines.next().unwrap(), "timestamp,event,task,session_seconds,note");
        assert_eq!(log.load_all().unwrap().len(), 2);
    }

    #[test]
    fn load_sorts_unordered_rows() {
        let dir = tempfile::tempdir().unwrap();
        let log = EventLog::open(dir.path().join("events.csv"));

        log.append(&event("2026-03-02 10:00:00", EventKind::Stop, "A", 60, ""));
        log.append(&event("2026-03-02 09:00:00", EventKind::Start, "A", 0, ""));

        let events = log.load_all().unwrap();
        assert_eq!(events[0].kind, EventKind::Start);
        assert_eq!(events[1].kind, EventKind::Stop);
    }

    #[test]
    fn load_skips_malformed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.csv");
        std::fs::write(
            &path,
            "timestamp,event,task,session_seconds,note\n\
             garbage,start,A,0,\n\
             2026-03-02 09:00:00,nonsense_kind,A,0,\n\
             2026-03-02 09:05:00,start,A,zero,\n\
             2026-03-02 09:10:00,stop,A,300,done\n",
        )
        .unwrap();

        let log = EventLog::open(&path);
        let events = log.load_all().unwrap();
        assert_eq!(events.len(), 2);
        // Bad seconds column reads as 0 without dropping the row.
        assert_eq!(events[0].kind, EventKind::Start);
        assert_eq!(events[0].secs, 0);
        assert_eq!(events[1].secs, 300);
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = EventLog::open(dir.path().join("nope.csv"));
        assert!(log.load_all().unwrap().is_empty());
    }

    #[test]
    fn notes_with_commas_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let log = EventLog::open(dir.path().join("events.csv"));
        let note = "checked phone, then email | interval_min=10";
        log.append(&event("2026-03-02 09:00:00", EventKind::Procrastination, "Write", 120, note));

        let events = log.load_all().unwrap();
        assert_eq!(events[0].note, note);
    }
}
