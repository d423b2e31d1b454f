//! The stats engine: log loading, day and range summaries.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::event::{Event, EventKind, DAY_FORMAT};
use crate::log::EventLog;
use crate::note;

/// Aggregated numbers for one day.
///
/// On/off minutes are attributed from the `interval_min` note token of
/// check-in and procrastination events: each on-task check-in credits one
/// interval's worth of focused minutes, each off-task check-in or
/// procrastination mark debits the same. Events without the token
/// contribute counts but no minutes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub day: String,
    pub on_min: u64,
    pub off_min: u64,
    pub total_min: u64,
    /// Undefined (not zero) when no interval-based minutes exist.
    pub ratio_on: Option<f64>,
    pub checkins_on: u32,
    pub checkins_off: u32,
    pub procrastinations: u32,
    pub starts: u32,
    pub stops: u32,
    pub cancels: u32,
    pub completes: u32,
    pub breaks: u32,
}

/// Monday-to-Sunday week of day summaries; days without events yield
/// zeroed summaries, never holes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekSummary {
    pub days: Vec<String>,
    pub per_day: Vec<DaySummary>,
}

/// Aggregate over an inclusive day range.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RangeSummary {
    pub start_day: String,
    pub end_day: String,
    pub on_min: u64,
    pub off_min: u64,
    pub ratio_on: Option<f64>,
    pub procrastinations: u32,
    pub starts: u32,
    pub stops: u32,
    pub cancels: u32,
    pub break_count: u32,
    pub break_secs: u64,
}

/// Heat band for the calendar view, derived from a day's on-ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatLevel {
    /// No interval-based data for the day.
    None,
    /// ratio_on below 0.40
    Low,
    /// ratio_on in [0.40, 0.70)
    Mid,
    /// ratio_on at or above 0.70
    High,
}

/// Classify a day's on-ratio into its heat band.
pub fn heat_level(ratio_on: Option<f64>) -> HeatLevel {
    match ratio_on {
        None => HeatLevel::None,
        Some(r) if r < 0.40 => HeatLevel::Low,
        Some(r) if r < 0.70 => HeatLevel::Mid,
        Some(_) => HeatLevel::High,
    }
}

/// The Monday of the week containing `day`.
pub fn monday_of(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.weekday().num_days_from_monday()))
}

/// The seven day keys, Monday..Sunday, of the week containing `anchor`.
pub fn week_days(anchor: NaiveDate) -> Vec<String> {
    let monday = monday_of(anchor);
    (0..7)
        .map(|i| (monday + Duration::days(i)).format(DAY_FORMAT).to_string())
        .collect()
}

/// Statistics engine over an event log.
///
/// Holds a cached copy of the log; call [`StatsEngine::reload`] to pick
/// up appended events. All queries are pure functions of that cache, so
/// reloading the same log twice yields identical results.
pub struct StatsEngine {
    log: EventLog,
    events: Vec<Event>,
}

impl StatsEngine {
    /// Create an engine with an empty cache. Call `reload()` before
    /// querying.
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            events: Vec::new(),
        }
    }

    /// Reload the cached events from the log file.
    ///
    /// # Errors
    /// Returns an error if the log file exists but cannot be read.
    pub fn reload(&mut self) -> Result<()> {
        self.events = self.log.load_all()?;
        Ok(())
    }

    /// All cached events, ascending by timestamp.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Sorted distinct day keys present in the log.
    pub fn days_present(&self) -> Vec<String> {
        let mut days: Vec<String> = self.events.iter().map(Event::day).collect();
        days.sort();
        days.dedup();
        days
    }

    /// Events on one day, in log order.
    pub fn events_for_day(&self, day: &str) -> Vec<&Event> {
        self.events.iter().filter(|e| e.day() == day).collect()
    }

    /// Events within an inclusive day range. Day keys compare
    /// lexicographically, which for `YYYY-MM-DD` is chronological.
    pub fn events_in_range(&self, start_day: &str, end_day: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| {
                let day = e.day();
                day.as_str() >= start_day && day.as_str() <= end_day
            })
            .collect()
    }

    /// Summarize one day. See [`DaySummary`] for the attribution rules;
    /// the legacy `session_complete` kind counts as both a complete and
    /// a stop here.
    pub fn summary_for_day(&self, day: &str) -> DaySummary {
        let mut summary = DaySummary {
            day: day.to_string(),
            ..DaySummary::default()
        };

        for event in self.events_for_day(day) {
            let interval = note::extract(&event.note, "interval_min").filter(|&i| i > 0);

            match event.kind {
                EventKind::CheckinOnTask => {
                    summary.checkins_on += 1;
                    if let Some(i) = interval {
                        summary.on_min += i as u64;
                    }
                }
                EventKind::CheckinOffTask => {
                    summary.checkins_off += 1;
                    if let Some(i) = interval {
                        summary.off_min += i as u64;
                    }
                }
                EventKind::Procrastination => {
                    summary.procrastinations += 1;
                    if let Some(i) = interval {
                        summary.off_min += i as u64;
                    }
                }
                EventKind::Start => summary.starts += 1,
                EventKind::Stop => summary.stops += 1,
                EventKind::Cancel => summary.cancels += 1,
                EventKind::SessionComplete => {
                    summary.completes += 1;
                    // Legacy rows end a session too; count them in the
                    // stop total for the day.
                    summary.stops += 1;
                }
                EventKind::Break => summary.breaks += 1,
                EventKind::IntervalSet
                | EventKind::IntervalAdaptUp
                | EventKind::IntervalAdaptDown => {}
            }
        }

        summary.total_min = summary.on_min + summary.off_min;
        summary.ratio_on = if summary.total_min > 0 {
            Some(summary.on_min as f64 / summary.total_min as f64)
        } else {
            None
        };
        summary
    }

    /// Summaries for the Monday..Sunday week containing `anchor`.
    pub fn week_summary(&self, anchor: NaiveDate) -> WeekSummary {
        let days = week_days(anchor);
        let per_day = days.iter().map(|d| self.summary_for_day(d)).collect();
        WeekSummary { days, per_day }
    }

    /// Aggregate an inclusive day range: interval-based minutes summed
    /// across the days plus raw event counts and break totals.
    pub fn range_summary(&self, start_day: &str, end_day: &str) -> RangeSummary {
        let mut summary = RangeSummary {
            start_day: start_day.to_string(),
            end_day: end_day.to_string(),
            ..RangeSummary::default()
        };

        for event in self.events_in_range(start_day, end_day) {
            match event.kind {
                EventKind::Procrastination => summary.procrastinations += 1,
                EventKind::Start => summary.starts += 1,
                EventKind::Stop | EventKind::SessionComplete => summary.stops += 1,
                EventKind::Cancel => summary.cancels += 1,
                EventKind::Break => {
                    summary.break_count += 1;
                    summary.break_secs += event.secs;
                }
                _ => {}
            }
        }

        if let (Ok(start), Ok(end)) = (
            NaiveDate::parse_from_str(start_day, DAY_FORMAT),
            NaiveDate::parse_from_str(end_day, DAY_FORMAT),
        ) {
            let mut day = start;
            while day <= end {
                let s = self.summary_for_day(&day.format(DAY_FORMAT).to_string());
                summary.on_min += s.on_min;
                summary.off_min += s.off_min;
                match day.succ_opt() {
                    Some(next) => day = next,
                    None => break,
                }
            }
        }

        let total = summary.on_min + summary.off_min;
        summary.ratio_on = if total > 0 {
            Some(summary.on_min as f64 / total as f64)
        } else {
            None
        };
        summary
    }
}
