//! Statistics over the event log.
//!
//! Everything here is derived purely from the append-only log: the
//! engine holds an explicitly reloaded copy of the events and recomputes
//! aggregations on demand, so there is no materialized state to keep
//! consistent or to lose in a crash.

mod engine;
mod sessions;
mod tasks;

pub use engine::{
    heat_level, monday_of, week_days, DaySummary, HeatLevel, RangeSummary, StatsEngine,
    WeekSummary,
};
pub use sessions::SessionInsights;
pub use tasks::{TaskOnOff, TaskProcrastinations, TaskSessions, NO_TASK_LABEL};
