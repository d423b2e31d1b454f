//! CSV export of a week's statistics.
//!
//! The artifact has a fixed section order: export header, insight block,
//! per-day summary table, per-task on/off table, then the raw event rows
//! for the range. The Events section uses the exact log schema, so
//! re-parsing it reproduces the log tuples for the exported range.

use std::io::Write;

use chrono::{Duration, NaiveDate};

use crate::error::Result;
use crate::event::DAY_FORMAT;
use crate::format::format_secs_short;
use crate::stats::{monday_of, StatsEngine};

fn fmt_opt_secs(secs: Option<f64>) -> String {
    match secs {
        Some(s) => format_secs_short(s.max(0.0) as u64),
        None => "n/a".to_string(),
    }
}

fn fmt_opt_pct(ratio: Option<f64>) -> String {
    match ratio {
        Some(r) => format!("{}%", (r * 100.0) as i64),
        None => "n/a".to_string(),
    }
}

/// Write the week containing `anchor` (Monday..Sunday) as CSV.
///
/// # Errors
/// Returns an error when writing to `out` fails.
pub fn export_week_csv<W: Write>(stats: &StatsEngine, anchor: NaiveDate, out: W) -> Result<()> {
    let start = monday_of(anchor);
    let end = start + Duration::days(6);
    let start_day = start.format(DAY_FORMAT).to_string();
    let end_day = end.format(DAY_FORMAT).to_string();

    let insights = stats.session_stats_in_range(&start_day, &end_day);
    let week = stats.week_summary(anchor);
    let task_rows = stats.on_off_by_task_in_range(&start_day, &end_day);
    let events = stats.events_in_range(&start_day, &end_day);

    // Section widths differ, so the writer must be flexible.
    let mut w = csv::WriterBuilder::new().flexible(true).from_writer(out);

    w.write_record(["Export", "Current week", start_day.as_str(), end_day.as_str()])?;
    w.write_record([""])?;

    w.write_record(["Insights"])?;
    w.write_record(["Avg session duration", fmt_opt_secs(insights.avg_session_secs).as_str()])?;
    w.write_record(["Cancel rate", fmt_opt_pct(insights.cancel_rate).as_str()])?;
    w.write_record([
        "Avg time to first procrastination",
        fmt_opt_secs(insights.avg_first_procrastination_secs).as_str(),
    ])?;
    w.write_record([""])?;

    w.write_record(["Per-day summary (interval-based)"])?;
    w.write_record([
        "day",
        "on_min",
        "off_min",
        "on_pct",
        "procrastinations",
        "starts",
        "stops",
        "cancels",
    ])?;
    for day in &week.per_day {
        w.write_record([
            day.day.clone(),
            day.on_min.to_string(),
            day.off_min.to_string(),
            fmt_opt_pct(day.ratio_on),
            day.procrastinations.to_string(),
            day.starts.to_string(),
            day.stops.to_string(),
            day.cancels.to_string(),
        ])?;
    }
    w.write_record([""])?;

    w.write_record(["Task performance (interval-based)"])?;
    w.write_record(["task", "on_min", "off_min", "on_pct"])?;
    for row in &task_rows {
        w.write_record([
            row.task.clone(),
            row.on_min.to_string(),
            row.off_min.to_string(),
            fmt_opt_pct(row.ratio_on),
        ])?;
    }
    w.write_record([""])?;

    w.write_record(["Events"])?;
    w.write_record(["timestamp", "event", "task", "session_seconds", "note"])?;
    for event in events {
        w.write_record([
            event.timestamp_str(),
            event.kind.as_str().to_string(),
            event.task.clone(),
            event.secs.to_string(),
            event.note.clone(),
        ])?;
    }

    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opt_formatting() {
        assert_eq!(fmt_opt_secs(None), "n/a");
        assert_eq!(fmt_opt_secs(Some(1800.0)), "30m 0s");
        assert_eq!(fmt_opt_pct(None), "n/a");
        // Truncates toward zero like integer percent display should.
        assert_eq!(fmt_opt_pct(Some(0.666)), "66%");
    }
}
