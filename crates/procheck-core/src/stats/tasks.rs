//! Per-task aggregations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::event::{Event, EventKind};
use crate::note;

use super::StatsEngine;

/// Label substituted for events with no task.
pub const NO_TASK_LABEL: &str = "(no task)";

/// Completed-session tally for one task.
///
/// A session is counted only on a `stop` event; `cancel` is tracked in
/// its own counter and excluded from the session count and the average,
/// and legacy `session_complete` rows are ignored entirely so they can
/// never double-count against the `stop` that accompanies them in old
/// logs. This asymmetry defines what "average session length" means --
/// keep it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSessions {
    pub task: String,
    pub sessions: u32,
    pub total_secs: u64,
    /// Undefined when the task has no completed sessions.
    pub avg_secs: Option<f64>,
    pub cancels: u32,
}

/// Interval-attributed on/off minutes for one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOnOff {
    pub task: String,
    pub on_min: u64,
    pub off_min: u64,
    pub total_min: u64,
    pub ratio_on: Option<f64>,
}

/// Procrastination count for one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskProcrastinations {
    pub task: String,
    pub count: u32,
}

fn task_label(event: &Event) -> String {
    let task = event.task.trim();
    if task.is_empty() {
        NO_TASK_LABEL.to_string()
    } else {
        task.to_string()
    }
}

impl StatsEngine {
    /// Completed sessions grouped by task over an inclusive day range,
    /// sorted descending by total seconds then session count. Grouping
    /// is name-ordered before the stable sort, so ties come out
    /// alphabetical.
    pub fn sessions_by_task_in_range(&self, start_day: &str, end_day: &str) -> Vec<TaskSessions> {
        #[derive(Default)]
        struct Acc {
            sessions: u32,
            total_secs: u64,
            cancels: u32,
        }

        let mut by_task: BTreeMap<String, Acc> = BTreeMap::new();
        for event in self.events_in_range(start_day, end_day) {
            match event.kind {
                EventKind::Stop => {
                    let acc = by_task.entry(task_label(event)).or_default();
                    acc.sessions += 1;
                    acc.total_secs += event.secs;
                }
                EventKind::Cancel => {
                    by_task.entry(task_label(event)).or_default().cancels += 1;
                }
                _ => {}
            }
        }

        let mut rows: Vec<TaskSessions> = by_task
            .into_iter()
            .map(|(task, acc)| TaskSessions {
                task,
                sessions: acc.sessions,
                total_secs: acc.total_secs,
                avg_secs: if acc.sessions > 0 {
                    Some(acc.total_secs as f64 / f64::from(acc.sessions))
                } else {
                    None
                },
                cancels: acc.cancels,
            })
            .collect();
        rows.sort_by(|a, b| (b.total_secs, b.sessions).cmp(&(a.total_secs, a.sessions)));
        rows
    }

    /// Interval-attributed on/off minutes grouped by task, sorted
    /// descending by total minutes then on-minutes, stable ties.
    pub fn on_off_by_task_in_range(&self, start_day: &str, end_day: &str) -> Vec<TaskOnOff> {
        let mut on_by: BTreeMap<String, u64> = BTreeMap::new();
        let mut off_by: BTreeMap<String, u64> = BTreeMap::new();

        for event in self.events_in_range(start_day, end_day) {
            let Some(interval) = note::extract(&event.note, "interval_min").filter(|&i| i > 0)
            else {
                continue;
            };
            match event.kind {
                EventKind::CheckinOnTask => {
                    *on_by.entry(task_label(event)).or_default() += interval as u64;
                }
                EventKind::CheckinOffTask | EventKind::Procrastination => {
                    *off_by.entry(task_label(event)).or_default() += interval as u64;
                }
                _ => {}
            }
        }

        let mut tasks: Vec<String> = on_by.keys().chain(off_by.keys()).cloned().collect();
        tasks.sort();
        tasks.dedup();

        let mut rows: Vec<TaskOnOff> = tasks
            .into_iter()
            .map(|task| {
                let on_min = on_by.get(&task).copied().unwrap_or(0);
                let off_min = off_by.get(&task).copied().unwrap_or(0);
                let total_min = on_min + off_min;
                TaskOnOff {
                    task,
                    on_min,
                    off_min,
                    total_min,
                    ratio_on: if total_min > 0 {
                        Some(on_min as f64 / total_min as f64)
                    } else {
                        None
                    },
                }
            })
            .collect();
        rows.sort_by(|a, b| (b.total_min, b.on_min).cmp(&(a.total_min, a.on_min)));
        rows
    }

    /// Procrastination mark counts by task, sorted descending by count,
    /// stable ties.
    pub fn procrastination_counts_by_task(
        &self,
        start_day: &str,
        end_day: &str,
    ) -> Vec<TaskProcrastinations> {
        let mut counts: BTreeMap<String, u32> = BTreeMap::new();
        for event in self.events_in_range(start_day, end_day) {
            if event.kind == EventKind::Procrastination {
                *counts.entry(task_label(event)).or_default() += 1;
            }
        }

        let mut rows: Vec<TaskProcrastinations> = counts
            .into_iter()
            .map(|(task, count)| TaskProcrastinations { task, count })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count));
        rows
    }
}
