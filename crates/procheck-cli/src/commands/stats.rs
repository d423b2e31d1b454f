use chrono::NaiveDate;
use clap::Subcommand;
use procheck_core::event::DAY_FORMAT;
use procheck_core::note;
use procheck_core::stats::{heat_level, monday_of, StatsEngine};
use procheck_core::storage;
use procheck_core::EventLog;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Summary for one day (default: today)
    Day {
        #[arg(long)]
        date: Option<String>,
    },
    /// Monday..Sunday summaries for the week containing a day
    Week {
        #[arg(long)]
        anchor: Option<String>,
        /// Use the week before the anchor's week
        #[arg(long)]
        previous: bool,
    },
    /// Aggregate summary plus insights over an inclusive day range
    Range { from: String, to: String },
    /// Per-task breakdowns (sessions, on/off minutes, procrastinations)
    Tasks {
        from: Option<String>,
        to: Option<String>,
    },
    /// Raw event rundown for one day
    Events {
        #[arg(long)]
        date: Option<String>,
        /// Only events for this task
        #[arg(long)]
        task: Option<String>,
        /// Only events with this (display) name, e.g. "off_task"
        #[arg(long)]
        event: Option<String>,
    },
}

fn today() -> String {
    chrono::Local::now().date_naive().format(DAY_FORMAT).to_string()
}

fn parse_day(s: &str) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    Ok(NaiveDate::parse_from_str(s, DAY_FORMAT)?)
}

fn open_stats() -> Result<StatsEngine, Box<dyn std::error::Error>> {
    let mut stats = StatsEngine::new(EventLog::open(storage::log_path()?));
    stats.reload()?;
    Ok(stats)
}

/// Full range of days present in the log, or today when it is empty.
fn all_time_range(stats: &StatsEngine) -> (String, String) {
    let days = stats.days_present();
    match (days.first(), days.last()) {
        (Some(first), Some(last)) => (first.clone(), last.clone()),
        _ => (today(), today()),
    }
}

/// Events shown in the day rundown; adaptive bookkeeping and on-task
/// check-ins stay out of the listing.
const RUNDOWN_EVENTS: [&str; 7] = [
    "start",
    "session_complete",
    "stop",
    "break",
    "cancel",
    "procrastination",
    "off_task",
];

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let stats = open_stats()?;

    match action {
        StatsAction::Day { date } => {
            let day = date.unwrap_or_else(today);
            parse_day(&day)?;
            let summary = stats.summary_for_day(&day);
            let out = serde_json::json!({
                "summary": summary,
                "heat": heat_level(summary.ratio_on),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        StatsAction::Week { anchor, previous } => {
            let mut day = parse_day(&anchor.unwrap_or_else(today))?;
            if previous {
                day = day - chrono::Duration::days(7);
            }
            let week = stats.week_summary(day);
            let start = monday_of(day).format(DAY_FORMAT).to_string();
            let end = week.days.last().cloned().unwrap_or_else(|| start.clone());
            let range = stats.range_summary(&start, &end);
            let insights = stats.session_stats_in_range(&start, &end);
            let out = serde_json::json!({
                "week": week,
                "summary": range,
                "insights": insights,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        StatsAction::Range { from, to } => {
            parse_day(&from)?;
            parse_day(&to)?;
            let out = serde_json::json!({
                "summary": stats.range_summary(&from, &to),
                "insights": stats.session_stats_in_range(&from, &to),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        StatsAction::Tasks { from, to } => {
            let (default_from, default_to) = all_time_range(&stats);
            let from = from.unwrap_or(default_from);
            let to = to.unwrap_or(default_to);
            parse_day(&from)?;
            parse_day(&to)?;
            let out = serde_json::json!({
                "sessions": stats.sessions_by_task_in_range(&from, &to),
                "on_off": stats.on_off_by_task_in_range(&from, &to),
                "procrastinations": stats.procrastination_counts_by_task(&from, &to),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        StatsAction::Events { date, task, event } => {
            let day = date.unwrap_or_else(today);
            parse_day(&day)?;
            let rows: Vec<serde_json::Value> = stats
                .events_for_day(&day)
                .into_iter()
                .filter(|e| RUNDOWN_EVENTS.contains(&e.kind.display_name()))
                .filter(|e| task.as_deref().map_or(true, |t| e.task == t))
                .filter(|e| event.as_deref().map_or(true, |f| e.kind.display_name() == f))
                .map(|e| {
                    serde_json::json!({
                        "time": e.timestamp.format("%H:%M:%S").to_string(),
                        "event": e.kind.display_name(),
                        "task": e.task,
                        "secs": e.secs,
                        "note": note::clean_for_display(&e.note),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }
    Ok(())
}
