//! Application state and orchestration.
//!
//! `App` is the explicit application-state struct: it owns the stores and
//! the timer, and every user action arrives as a plain method call with a
//! plain-value outcome. Decision points (check-in answers, procrastination
//! reasons, the session-finished choice) are delivered as arguments, never
//! as callbacks, so the whole engine runs and tests without any UI.
//!
//! Callers supply epoch-millis (`now_ms`) on time-sensitive calls; the
//! [`now_ms`] helper reads the real clock for production callers. The tick
//! loop is cooperative: call [`App::tick`] every couple hundred
//! milliseconds and react to the prompt it returns.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::adaptive::{Adaptation, AdaptivePolicy};
use crate::error::Result;
use crate::event::{Event, EventKind};
use crate::log::EventLog;
use crate::note;
use crate::stats::StatsEngine;
use crate::storage::{self, Config, Debouncer, NotesStore, StateStore};
use crate::timer::{Prompt, SessionOptions, SessionTimer, TimerState};

/// Outcome of the session-finished decision point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishChoice {
    /// Reset and immediately start a fresh session for the same task.
    Continue,
    /// Move into a break; the break event carries the `auto_stop` marker.
    Break,
    /// Log a `stop` with the `auto_stop` marker and go idle.
    End,
}

/// Transient session state a host can persist between tick loops (the
/// CLI stows this in the state document's `ui` bag).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub timer: SessionTimer,
    #[serde(default)]
    pub break_task: String,
    #[serde(default)]
    pub break_note: String,
}

/// The application state: configuration, stores, and the session timer.
pub struct App {
    config: Config,
    policy: AdaptivePolicy,
    log: EventLog,
    state: StateStore,
    notes: NotesStore,
    timer: SessionTimer,
    note_debounce: Debouncer,
    /// Task/note captured when a break begins, logged when it ends.
    break_task: String,
    break_note: String,
}

impl App {
    pub fn new(config: Config, log: EventLog, state: StateStore, notes: NotesStore) -> Self {
        let note_debounce = Debouncer::new(config.notes.debounce_ms);
        Self {
            config,
            policy: AdaptivePolicy::new(),
            log,
            state,
            notes,
            timer: SessionTimer::new(),
            note_debounce,
            break_task: String::new(),
            break_note: String::new(),
        }
    }

    /// Open against the default data directory, loading (or creating)
    /// the configuration.
    ///
    /// # Errors
    /// Returns an error if the data directory or configuration cannot be
    /// prepared.
    pub fn open_default() -> Result<Self> {
        let config = Config::load()?;
        let log = EventLog::open(storage::log_path()?);
        let state = StateStore::open_default()?;
        let notes = NotesStore::open_default()?;
        Ok(Self::new(config, log, state, notes))
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn timer(&self) -> &SessionTimer {
        &self.timer
    }

    pub fn state(&self) -> &StateStore {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut StateStore {
        &mut self.state
    }

    pub fn notes(&self) -> &NotesStore {
        &self.notes
    }

    /// Task the current break is attributed to, if a break is active.
    pub fn break_task(&self) -> &str {
        &self.break_task
    }

    /// A fresh stats engine over this app's event log. The engine keeps
    /// its own explicitly reloaded copy of the log.
    pub fn stats(&self) -> StatsEngine {
        StatsEngine::new(self.log.clone())
    }

    /// Snapshot the transient session state for persistence.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            timer: self.timer.clone(),
            break_task: self.break_task.clone(),
            break_note: self.break_note.clone(),
        }
    }

    /// Restore a previously snapshotted session.
    pub fn restore(&mut self, snapshot: SessionSnapshot) {
        self.timer = snapshot.timer;
        self.break_task = snapshot.break_task;
        self.break_note = snapshot.break_note;
    }

    // ── Tick loop ────────────────────────────────────────────────────

    /// Advance the cooperative loop: accrue timer state and flush any
    /// debounced note write whose quiescence delay has elapsed. Returns
    /// the decision point that fired, if any; the caller answers it via
    /// [`App::resolve_checkin`] / [`App::resolve_session_finished`].
    pub fn tick(&mut self, now_ms: u64) -> Option<Prompt> {
        let prompt = self.timer.tick(now_ms);
        if self.note_debounce.fire(now_ms) {
            self.notes.save();
        }
        prompt
    }

    // ── Session lifecycle ────────────────────────────────────────────

    /// Start a session. Loads (or lazily creates) the task profile,
    /// seeds the check-in interval from it, and logs `start`. Silent
    /// no-op on an empty task or when not idle.
    pub fn start_session(&mut self, task: &str, target_min: Option<u32>, now_ms: u64) -> bool {
        let task = task.trim().to_string();
        if task.is_empty() || self.timer.state() != TimerState::Idle {
            return false;
        }

        let interval_min = self.state.get_or_create(&task).interval_min;
        self.state.save();

        let options = SessionOptions {
            target_min: target_min.unwrap_or(self.config.session.default_target_min),
            auto_stop: self.config.session.auto_stop,
            checkins_enabled: self.config.checkins.enabled,
        };
        if !self.timer.start(&task, interval_min, options, now_ms) {
            return false;
        }

        let note = note::compose(None, Some(options.target_min), Some(interval_min), None);
        self.append(EventKind::Start, &task, note, now_ms);
        true
    }

    /// Stop the running session, logging `stop` with its elapsed seconds.
    pub fn stop_session(&mut self, now_ms: u64) -> bool {
        self.end_running_session(EventKind::Stop, None, now_ms)
    }

    /// Cancel the running session. Ends it exactly like `stop` but logs
    /// `cancel`, which aggregation never counts as a completed session.
    pub fn cancel_session(&mut self, now_ms: u64) -> bool {
        self.end_running_session(EventKind::Cancel, None, now_ms)
    }

    fn end_running_session(&mut self, kind: EventKind, extra: Option<&str>, now_ms: u64) -> bool {
        let task = self.timer.task().to_string();
        let target = self.timer.options().target_min;
        let interval = self.timer.interval_min();
        let Some(secs) = self.timer.end_session(now_ms) else {
            return false;
        };
        let note = note::compose(None, Some(target), Some(interval), extra);
        self.append_with_secs(kind, &task, secs, note, now_ms);
        true
    }

    /// Start a break. A running session is stopped (and logged, with the
    /// `manual_break` marker) first; a session suspended on a prompt must
    /// be resolved before breaking. With no session, `task_hint` labels
    /// the break.
    pub fn start_break(&mut self, task_hint: Option<&str>, now_ms: u64) -> bool {
        match self.timer.state() {
            TimerState::OnBreak | TimerState::AwaitingDecision(_) => return false,
            TimerState::Idle | TimerState::Running => {}
        }

        let task = if self.timer.session_active() {
            self.timer.task().to_string()
        } else {
            task_hint.unwrap_or("").trim().to_string()
        };
        let target = if self.timer.session_active() {
            self.timer.options().target_min
        } else {
            self.config.session.default_target_min
        };
        let interval = if self.timer.session_active() {
            Some(self.timer.interval_min())
        } else if task.is_empty() {
            None
        } else {
            let interval = self.state.get_or_create(&task).interval_min;
            self.state.save();
            Some(interval)
        };
        let note = note::compose(None, Some(target), interval, Some("manual_break=1"));

        if self.timer.state() == TimerState::Running {
            self.end_running_session(EventKind::Stop, Some("manual_break=1"), now_ms);
        }
        if !self.timer.begin_break(now_ms) {
            return false;
        }
        self.break_task = task;
        self.break_note = note;
        true
    }

    /// End the break, logging `break` with the break duration and the
    /// task/note captured when the break began.
    pub fn end_break(&mut self, now_ms: u64) -> bool {
        let Some(secs) = self.timer.end_break(now_ms) else {
            return false;
        };
        let task = std::mem::take(&mut self.break_task);
        let note = std::mem::take(&mut self.break_note);
        self.append_with_secs(EventKind::Break, &task, secs, note, now_ms);
        true
    }

    /// Record a procrastination mark without ending the session. Always
    /// takes the off-task branch of the adaptive policy. A `None` reason
    /// means the user abandoned the prompt: nothing is logged, nothing
    /// changes.
    pub fn mark_procrastination(&mut self, reason: Option<&str>, now_ms: u64) -> bool {
        if self.timer.state() != TimerState::Running {
            return false;
        }
        let Some(reason) = reason else {
            return false;
        };

        let task = self.timer.task().to_string();
        let target = self.timer.options().target_min;
        let interval = self.timer.interval_min();
        let note = note::compose(Some(reason), Some(target), Some(interval), None);
        self.append(EventKind::Procrastination, &task, note, now_ms);
        self.apply_adaptation(&task, false, now_ms);
        true
    }

    // ── Decision points ──────────────────────────────────────────────

    /// Answer a pending check-in. The check-in event is logged with the
    /// interval in force when the prompt fired (so minute attribution
    /// uses the old cadence), then the adaptive policy runs and the next
    /// check-in is scheduled one (possibly new) interval out.
    ///
    /// An off-task answer with no reason abandons the prompt: the timer
    /// resumes, nothing is logged, and the check-in fires again on the
    /// next tick.
    pub fn resolve_checkin(&mut self, on_task: bool, reason: Option<&str>, now_ms: u64) -> bool {
        if self.timer.prompt() != Some(Prompt::CheckIn) {
            return false;
        }
        let task = self.timer.task().to_string();
        let target = self.timer.options().target_min;
        let interval = self.timer.interval_min();

        if on_task {
            let note = note::compose(None, Some(target), Some(interval), None);
            self.append(EventKind::CheckinOnTask, &task, note, now_ms);
            self.apply_adaptation(&task, true, now_ms);
        } else {
            let Some(reason) = reason else {
                self.timer.resume_from_prompt(now_ms);
                return false;
            };
            let note = note::compose(Some(reason), Some(target), Some(interval), None);
            self.append(EventKind::CheckinOffTask, &task, note, now_ms);
            self.apply_adaptation(&task, false, now_ms);
        }

        self.timer.resume_from_prompt(now_ms);
        true
    }

    /// Resolve the session-finished decision point.
    pub fn resolve_session_finished(&mut self, choice: FinishChoice, now_ms: u64) -> bool {
        if self.timer.prompt() != Some(Prompt::SessionFinished) {
            return false;
        }
        let task = self.timer.task().to_string();
        let target = self.timer.options().target_min;
        let interval = self.timer.interval_min();
        let elapsed = self.timer.elapsed_secs();

        match choice {
            FinishChoice::Continue => {
                // No stop is logged; the fresh start event marks the
                // boundary.
                self.timer.reset_session();
                self.start_session(&task, Some(target), now_ms)
            }
            FinishChoice::Break => {
                let note = note::compose(None, Some(target), Some(interval), Some("auto_stop=1"));
                self.timer.reset_session();
                if !self.timer.begin_break(now_ms) {
                    return false;
                }
                self.break_task = task;
                self.break_note = note;
                true
            }
            FinishChoice::End => {
                let note = note::compose(None, Some(target), Some(interval), Some("auto_stop=1"));
                self.timer.reset_session();
                self.append_with_secs(EventKind::Stop, &task, elapsed, note, now_ms);
                true
            }
        }
    }

    // ── Task profiles ────────────────────────────────────────────────

    /// Manually override a task's check-in interval. Clamped, streak
    /// reset, logged as `interval_set`, and applied immediately to a
    /// session running on that task. Returns the applied value.
    pub fn set_task_interval(&mut self, task: &str, minutes: u32, now_ms: u64) -> Option<u32> {
        let task = task.trim().to_string();
        if task.is_empty() {
            return None;
        }
        let profile = self.state.get_or_create(&task);
        let applied = self.policy.override_interval(profile, minutes);
        self.state.save();

        if self.timer.session_active() && self.timer.task() == task {
            self.timer.set_interval(applied);
        }
        self.append(EventKind::IntervalSet, &task, format!("interval_min={applied}"), now_ms);
        Some(applied)
    }

    /// Set a task's display color. The color is opaque to the engine and
    /// not an event worth logging.
    pub fn set_task_color(&mut self, task: &str, color: &str) {
        let task = task.trim();
        if task.is_empty() {
            return;
        }
        self.state.get_or_create(task).color = color.to_string();
        self.state.save();
    }

    // ── Day notes ────────────────────────────────────────────────────

    pub fn day_note(&self, day: &str) -> Option<&str> {
        self.notes.get(day)
    }

    /// Update a day note. Persistence is debounced: the write fires from
    /// the tick loop after the configured quiescence delay, folding rapid
    /// edits into one save.
    pub fn set_day_note(&mut self, day: &str, text: &str, now_ms: u64) {
        self.notes.set(day, text);
        self.note_debounce.request(now_ms);
    }

    /// Force out any pending debounced write. Hosts call this before
    /// exiting.
    pub fn flush(&mut self) {
        if self.note_debounce.take_pending() {
            self.notes.save();
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Run the adaptive policy for a response, log any interval change,
    /// persist the profile, and restart the check-in cadence of an
    /// affected running session.
    fn apply_adaptation(&mut self, task: &str, on_task: bool, now_ms: u64) {
        let profile = self.state.get_or_create(task);
        let adaptation = self.policy.respond(profile, on_task);
        let interval = profile.interval_min;
        self.state.save();

        if let Some(adaptation) = adaptation {
            let kind = match adaptation {
                Adaptation::Up { .. } => EventKind::IntervalAdaptUp,
                Adaptation::Down { .. } => EventKind::IntervalAdaptDown,
            };
            self.append(kind, task, format!("interval_min={}", adaptation.interval_min()), now_ms);
        }

        if self.timer.session_active() && self.timer.task() == task {
            // Reschedules even when the interval is unchanged: the
            // cadence restarts from the response.
            self.timer.set_interval(interval);
        }
    }

    fn append(&self, kind: EventKind, task: &str, note: String, now_ms: u64) {
        self.append_with_secs(kind, task, self.timer.session_secs_or_zero(), note, now_ms);
    }

    fn append_with_secs(&self, kind: EventKind, task: &str, secs: u64, note: String, now_ms: u64) {
        let event = Event::new(local_naive(now_ms), kind, task, secs, &note);
        self.log.append(&event);
    }
}

/// Epoch milliseconds from the real clock.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Local wall-clock time for a given epoch-millis instant.
fn local_naive(now_ms: u64) -> NaiveDateTime {
    use chrono::{Local, TimeZone};
    match Local.timestamp_millis_opt(now_ms as i64).earliest() {
        Some(dt) => dt.naive_local(),
        None => chrono::DateTime::from_timestamp_millis(now_ms as i64)
            .map(|dt| dt.naive_utc())
            .unwrap_or(NaiveDateTime::MIN),
    }
}
