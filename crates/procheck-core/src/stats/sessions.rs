//! Session-level insights over a day range.

use serde::{Deserialize, Serialize};

use crate::event::EventKind;

use super::StatsEngine;

/// Range-wide session statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionInsights {
    /// Mean `stop` duration; undefined with no stops in range.
    pub avg_session_secs: Option<f64>,
    /// cancels / (stops + cancels); undefined with no session ends.
    pub cancel_rate: Option<f64>,
    /// Mean seconds until the first procrastination mark of a session,
    /// averaged over sessions that had one. Sessions with none are
    /// excluded from the mean, they do not contribute zero.
    pub avg_first_procrastination_secs: Option<f64>,
}

fn is_boundary(kind: EventKind) -> bool {
    matches!(kind, EventKind::Stop | EventKind::Cancel | EventKind::Start)
}

impl StatsEngine {
    /// Compute [`SessionInsights`] for an inclusive day range.
    ///
    /// Only `stop` ends a completed session and only `cancel` ends a
    /// cancelled one; legacy `session_complete` rows are ignored to
    /// avoid double counting. Time-to-first-procrastination walks
    /// forward from each `start` to the next stop/cancel/start boundary
    /// and records the `secs` field of the first procrastination mark
    /// strictly inside that window. The boundary event is consumed by
    /// the walk, so a `start` acting as a boundary is not reused as the
    /// next anchor.
    pub fn session_stats_in_range(&self, start_day: &str, end_day: &str) -> SessionInsights {
        let events = self.events_in_range(start_day, end_day);

        let stop_secs: Vec<u64> = events
            .iter()
            .filter(|e| e.kind == EventKind::Stop)
            .map(|e| e.secs)
            .collect();
        let cancels = events
            .iter()
            .filter(|e| e.kind == EventKind::Cancel)
            .count();
        let ends = stop_secs.len() + cancels;

        let avg_session_secs = if stop_secs.is_empty() {
            None
        } else {
            Some(stop_secs.iter().sum::<u64>() as f64 / stop_secs.len() as f64)
        };
        let cancel_rate = if ends > 0 {
            Some(cancels as f64 / ends as f64)
        } else {
            None
        };

        let mut first_procrastinations: Vec<u64> = Vec::new();
        let n = events.len();
        let mut i = 0;
        while i < n {
            if events[i].kind != EventKind::Start {
                i += 1;
                continue;
            }
            let mut j = i + 1;
            let mut first = None;
            while j < n && !is_boundary(events[j].kind) {
                if events[j].kind == EventKind::Procrastination {
                    first = Some(events[j].secs);
                    break;
                }
                j += 1;
            }
            if let Some(secs) = first {
                first_procrastinations.push(secs);
            }
            while j < n && !is_boundary(events[j].kind) {
                j += 1;
            }
            i = j + 1;
        }

        let avg_first_procrastination_secs = if first_procrastinations.is_empty() {
            None
        } else {
            Some(
                first_procrastinations.iter().sum::<u64>() as f64
                    / first_procrastinations.len() as f64,
            )
        };

        SessionInsights {
            avg_session_secs,
            cancel_rate,
            avg_first_procrastination_secs,
        }
    }
}
