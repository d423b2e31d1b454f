//! Session timer state machine.
//!
//! A wall-clock state machine with no internal thread: the caller ticks
//! it periodically and supplies epoch-millis on every call, so the engine
//! is deterministic under test and immune to hidden clock reads.
//!
//! ## State transitions
//!
//! ```text
//! Idle -> Running -> Idle            (stop / cancel)
//! Running -> AwaitingDecision -> Running | Idle
//! Idle -> OnBreak -> Idle
//! ```
//!
//! Decision points (check-in due, target reached) are explicit
//! suspension states, not callbacks: `tick()` moves the machine into
//! `AwaitingDecision` and the elapsed clock freezes until the decision is
//! delivered, so time spent deciding never counts as session time.
//! Elapsed time accumulates from tick deltas with `saturating_sub`, so a
//! system clock stepping backwards contributes zero rather than negative
//! time.

use serde::{Deserialize, Serialize};

/// Which decision the timer is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prompt {
    /// "Still on task?"
    CheckIn,
    /// Target duration reached; continue, break, or end.
    SessionFinished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerState {
    Idle,
    Running,
    OnBreak,
    AwaitingDecision(Prompt),
}

/// Per-session settings, snapshotted at start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Target duration in minutes; 0 disables the session-finished prompt.
    pub target_min: u32,
    /// Raise the session-finished prompt when the target is reached.
    pub auto_stop: bool,
    /// Raise periodic check-in prompts.
    pub checkins_enabled: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            target_min: 30,
            auto_stop: true,
            checkins_enabled: true,
        }
    }
}

/// The session/break timer.
///
/// Serializable so a host can snapshot it between ticks (the CLI stows it
/// in the state document's `ui` bag between invocations).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTimer {
    state: TimerState,
    task: String,
    options: SessionOptions,
    /// Check-in cadence for the running session, minutes.
    interval_min: u32,
    elapsed_ms: u64,
    /// Elapsed-ms threshold for the next check-in prompt.
    next_checkin_ms: Option<u64>,
    break_elapsed_ms: u64,
    /// Anchor for delta accumulation; `None` whenever nothing accrues.
    #[serde(default)]
    last_tick_epoch_ms: Option<u64>,
}

impl Default for SessionTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionTimer {
    pub fn new() -> Self {
        Self {
            state: TimerState::Idle,
            task: String::new(),
            options: SessionOptions::default(),
            interval_min: crate::adaptive::DEFAULT_INTERVAL_MIN,
            elapsed_ms: 0,
            next_checkin_ms: None,
            break_elapsed_ms: 0,
            last_tick_epoch_ms: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    pub fn interval_min(&self) -> u32 {
        self.interval_min
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_ms / 1000
    }

    pub fn break_elapsed_secs(&self) -> u64 {
        self.break_elapsed_ms / 1000
    }

    /// True while a session exists, running or suspended on a prompt.
    pub fn session_active(&self) -> bool {
        matches!(
            self.state,
            TimerState::Running | TimerState::AwaitingDecision(_)
        )
    }

    /// The pending prompt, if the timer is suspended on one.
    pub fn prompt(&self) -> Option<Prompt> {
        match self.state {
            TimerState::AwaitingDecision(p) => Some(p),
            _ => None,
        }
    }

    /// Elapsed session seconds if a session is active, else 0. This is
    /// the default `session_seconds` value for logged events.
    pub fn session_secs_or_zero(&self) -> u64 {
        if self.session_active() {
            self.elapsed_secs()
        } else {
            0
        }
    }

    /// Milliseconds until the next check-in fires, if one is scheduled.
    pub fn checkin_remaining_ms(&self) -> Option<u64> {
        match (self.state, self.next_checkin_ms) {
            (TimerState::Running, Some(at)) if self.options.checkins_enabled => {
                Some(at.saturating_sub(self.elapsed_ms))
            }
            _ => None,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a session. No-op (returns false) unless Idle with a
    /// non-empty task: invariant violations are silent by design.
    pub fn start(&mut self, task: &str, interval_min: u32, options: SessionOptions, now_ms: u64) -> bool {
        let task = task.trim();
        if task.is_empty() || self.state != TimerState::Idle {
            return false;
        }
        self.state = TimerState::Running;
        self.task = task.to_string();
        self.options = options;
        self.interval_min = interval_min;
        self.elapsed_ms = 0;
        self.next_checkin_ms = Some(u64::from(interval_min) * 60_000);
        self.last_tick_epoch_ms = Some(now_ms);
        true
    }

    /// End the running session, returning its elapsed seconds. `None`
    /// unless Running; the caller decides whether the end is a stop or a
    /// cancel (they differ only in the logged event kind).
    pub fn end_session(&mut self, now_ms: u64) -> Option<u64> {
        if self.state != TimerState::Running {
            return None;
        }
        self.flush_elapsed(now_ms);
        let secs = self.elapsed_secs();
        self.reset_session();
        Some(secs)
    }

    /// Drop the session without reporting elapsed time (the restart path
    /// after a session-finished "continue", where no stop is logged).
    pub(crate) fn reset_session(&mut self) {
        self.state = TimerState::Idle;
        self.task.clear();
        self.elapsed_ms = 0;
        self.next_checkin_ms = None;
        self.last_tick_epoch_ms = None;
    }

    /// Enter a break. Only valid from Idle; a running session must be
    /// ended (and logged) first.
    pub fn begin_break(&mut self, now_ms: u64) -> bool {
        if self.state != TimerState::Idle {
            return false;
        }
        self.state = TimerState::OnBreak;
        self.break_elapsed_ms = 0;
        self.last_tick_epoch_ms = Some(now_ms);
        true
    }

    /// End the break, returning its duration in seconds.
    pub fn end_break(&mut self, now_ms: u64) -> Option<u64> {
        if self.state != TimerState::OnBreak {
            return None;
        }
        self.flush_elapsed(now_ms);
        let secs = self.break_elapsed_secs();
        self.state = TimerState::Idle;
        self.break_elapsed_ms = 0;
        self.last_tick_epoch_ms = None;
        Some(secs)
    }

    /// Leave an `AwaitingDecision` state and resume accrual. The caller
    /// has handled (or abandoned) the decision.
    pub fn resume_from_prompt(&mut self, now_ms: u64) {
        if let TimerState::AwaitingDecision(_) = self.state {
            self.state = TimerState::Running;
            self.last_tick_epoch_ms = Some(now_ms);
        }
    }

    /// Update the check-in cadence. While a session is active the next
    /// check-in is rescheduled from the current elapsed time so the new
    /// cadence takes effect immediately.
    pub fn set_interval(&mut self, minutes: u32) {
        self.interval_min = minutes;
        if self.session_active() {
            self.schedule_next_checkin();
        }
    }

    /// Schedule the next check-in one full interval from now (elapsed
    /// time). Called after every resolved check-in or procrastination
    /// mark, whether or not the interval changed.
    pub fn schedule_next_checkin(&mut self) {
        self.next_checkin_ms = Some(self.elapsed_ms + u64::from(self.interval_min) * 60_000);
    }

    /// Advance the timer. Accrues elapsed time while Running or OnBreak;
    /// returns a prompt when a decision point fires, moving the machine
    /// into `AwaitingDecision` and freezing the elapsed clock. At most
    /// one prompt fires per tick, target-reached taking priority over
    /// check-in.
    pub fn tick(&mut self, now_ms: u64) -> Option<Prompt> {
        match self.state {
            TimerState::Running => {
                self.flush_elapsed(now_ms);

                let target_ms = u64::from(self.options.target_min) * 60_000;
                if self.options.auto_stop && target_ms > 0 && self.elapsed_ms >= target_ms {
                    return Some(self.suspend(Prompt::SessionFinished));
                }

                if self.options.checkins_enabled {
                    if let Some(at) = self.next_checkin_ms {
                        if self.elapsed_ms >= at {
                            return Some(self.suspend(Prompt::CheckIn));
                        }
                    }
                }
                None
            }
            TimerState::OnBreak => {
                self.flush_elapsed(now_ms);
                None
            }
            _ => None,
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn suspend(&mut self, prompt: Prompt) -> Prompt {
        self.state = TimerState::AwaitingDecision(prompt);
        self.last_tick_epoch_ms = None;
        prompt
    }

    fn flush_elapsed(&mut self, now_ms: u64) {
        let Some(last) = self.last_tick_epoch_ms else {
            self.last_tick_epoch_ms = Some(now_ms);
            return;
        };
        let delta = now_ms.saturating_sub(last);
        self.last_tick_epoch_ms = Some(now_ms);
        match self.state {
            TimerState::Running => self.elapsed_ms += delta,
            TimerState::OnBreak => self.break_elapsed_ms += delta,
            _ => {}
        }
    }
}
