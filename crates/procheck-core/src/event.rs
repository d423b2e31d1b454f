//! The event model: one immutable record per user-visible action.
//!
//! Every state change that matters to statistics is appended to the event
//! log as one of these records. The wire format is a CSV row with the
//! fixed column order `timestamp, event, task, session_seconds, note`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Wall-clock timestamp format used in the log, second resolution.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Day-key format used for grouping and range filters.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Closed vocabulary of event kinds.
///
/// `SessionComplete` is a legacy kind found in older logs: it is accepted
/// on read (day summaries count it as both a complete and a stop) but
/// never emitted, and per-task session aggregation ignores it entirely so
/// it cannot double-count against `Stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Start,
    Stop,
    Cancel,
    SessionComplete,
    Break,
    Procrastination,
    CheckinOnTask,
    CheckinOffTask,
    IntervalSet,
    IntervalAdaptUp,
    IntervalAdaptDown,
}

impl EventKind {
    /// The wire name of this kind, as written to the log.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Start => "start",
            EventKind::Stop => "stop",
            EventKind::Cancel => "cancel",
            EventKind::SessionComplete => "session_complete",
            EventKind::Break => "break",
            EventKind::Procrastination => "procrastination",
            EventKind::CheckinOnTask => "checkin_on_task",
            EventKind::CheckinOffTask => "checkin_off_task",
            EventKind::IntervalSet => "interval_set",
            EventKind::IntervalAdaptUp => "interval_adapt_up",
            EventKind::IntervalAdaptDown => "interval_adapt_down",
        }
    }

    /// Parse a wire name. Unknown names yield `None` so unrecognized rows
    /// can be skipped on load instead of failing the whole file.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "start" => Some(EventKind::Start),
            "stop" => Some(EventKind::Stop),
            "cancel" => Some(EventKind::Cancel),
            "session_complete" => Some(EventKind::SessionComplete),
            "break" => Some(EventKind::Break),
            "procrastination" => Some(EventKind::Procrastination),
            "checkin_on_task" => Some(EventKind::CheckinOnTask),
            "checkin_off_task" => Some(EventKind::CheckinOffTask),
            "interval_set" => Some(EventKind::IntervalSet),
            "interval_adapt_up" => Some(EventKind::IntervalAdaptUp),
            "interval_adapt_down" => Some(EventKind::IntervalAdaptDown),
            _ => None,
        }
    }

    /// Name used when listing events to the user: `checkin_off_task`
    /// displays as the shorter `off_task`.
    pub fn display_name(&self) -> &'static str {
        match self {
            EventKind::CheckinOffTask => "off_task",
            other => other.as_str(),
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One log record. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: NaiveDateTime,
    pub kind: EventKind,
    /// Trimmed task label; empty means no task.
    pub task: String,
    /// Elapsed session seconds for stop/cancel, break duration for break,
    /// 0 for instantaneous events.
    pub secs: u64,
    /// Free text, may embed `key=value` tokens (see [`crate::note`]).
    pub note: String,
}

impl Event {
    pub fn new(timestamp: NaiveDateTime, kind: EventKind, task: &str, secs: u64, note: &str) -> Self {
        Self {
            timestamp,
            kind,
            task: task.trim().to_string(),
            secs,
            note: note.to_string(),
        }
    }

    /// The `YYYY-MM-DD` day key this event falls on.
    pub fn day(&self) -> String {
        self.timestamp.format(DAY_FORMAT).to_string()
    }

    /// The timestamp in wire format.
    pub fn timestamp_str(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Parse a wire-format timestamp. `None` for malformed input; callers
    /// skip such rows.
    pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT).ok()
    }
}
