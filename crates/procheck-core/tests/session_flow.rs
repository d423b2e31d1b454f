//! End-to-end session flows through the App, with an injected clock.

use std::path::Path;

use chrono::{TimeZone, Utc};
use procheck_core::storage::{Config, NotesStore, StateStore};
use procheck_core::{App, Event, EventKind, EventLog, FinishChoice, Prompt, TimerState};

const MIN_MS: u64 = 60_000;

/// 09:00 UTC keeps every event of a short flow on one local calendar day
/// in any timezone, so day summaries are stable under test.
fn t0() -> u64 {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
        .unwrap()
        .timestamp_millis() as u64
}

fn make_app(dir: &Path) -> App {
    make_app_with(dir, Config::default())
}

fn make_app_with(dir: &Path, config: Config) -> App {
    let log = EventLog::open(dir.join("events.csv"));
    let state = StateStore::open(dir.join("state.json"));
    let notes = NotesStore::open(dir.join("notes.json"));
    App::new(config, log, state, notes)
}

fn load_events(dir: &Path) -> Vec<Event> {
    EventLog::open(dir.join("events.csv")).load_all().unwrap()
}

fn kinds(events: &[Event]) -> Vec<EventKind> {
    events.iter().map(|e| e.kind).collect()
}

#[test]
fn adaptive_checkin_flow_relaxes_after_two_on_task_answers() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = make_app(dir.path());
    let t0 = t0();

    assert!(app.start_session("Write", Some(30), t0));
    assert_eq!(app.timer().interval_min(), 10);

    // First check-in fires at the 10 minute mark, not before.
    assert_eq!(app.tick(t0 + 9 * MIN_MS), None);
    assert_eq!(app.tick(t0 + 10 * MIN_MS), Some(Prompt::CheckIn));

    // First on-task answer: streak only, no interval change.
    assert!(app.resolve_checkin(true, None, t0 + 10 * MIN_MS));
    assert_eq!(app.timer().interval_min(), 10);
    assert_eq!(app.state().profile("Write").unwrap().yes_streak, 1);

    // Second on-task answer: interval steps up to 12 and is logged.
    assert_eq!(app.tick(t0 + 20 * MIN_MS), Some(Prompt::CheckIn));
    assert!(app.resolve_checkin(true, None, t0 + 20 * MIN_MS));
    let profile = app.state().profile("Write").unwrap();
    assert_eq!(profile.interval_min, 12);
    assert_eq!(profile.yes_streak, 0);
    assert_eq!(app.timer().interval_min(), 12);

    assert!(app.stop_session(t0 + 30 * MIN_MS));
    assert_eq!(app.timer().state(), TimerState::Idle);

    let events = load_events(dir.path());
    assert_eq!(
        kinds(&events),
        vec![
            EventKind::Start,
            EventKind::CheckinOnTask,
            EventKind::CheckinOnTask,
            EventKind::IntervalAdaptUp,
            EventKind::Stop,
        ]
    );
    let adapt = &events[3];
    assert_eq!(procheck_core::note::extract(&adapt.note, "interval_min"), Some(12));
    assert_eq!(events[4].secs, 1800);

    // The log feeds straight into the session aggregation.
    let mut stats = app.stats();
    stats.reload().unwrap();
    let day = events[0].day();
    let sessions = stats.sessions_by_task_in_range(&day, &day);
    assert_eq!(sessions[0].sessions, 1);
    assert_eq!(sessions[0].total_secs, 1800);
    assert_eq!(sessions[0].avg_secs, Some(1800.0));
    assert!(stats.summary_for_day(&day).on_min >= 20);
}

#[test]
fn off_task_answer_tightens_immediately_and_reschedules() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = make_app(dir.path());
    let t0 = t0();

    app.start_session("Write", Some(60), t0);
    assert_eq!(app.tick(t0 + 10 * MIN_MS), Some(Prompt::CheckIn));
    assert!(app.resolve_checkin(false, Some("doomscrolling"), t0 + 10 * MIN_MS));

    let profile = app.state().profile("Write").unwrap();
    assert_eq!(profile.interval_min, 7);
    assert_eq!(profile.yes_streak, 0);

    // New cadence takes effect immediately: next prompt 7 minutes out.
    assert_eq!(app.tick(t0 + 16 * MIN_MS), None);
    assert_eq!(app.tick(t0 + 17 * MIN_MS), Some(Prompt::CheckIn));

    let events = load_events(dir.path());
    assert_eq!(events[1].kind, EventKind::CheckinOffTask);
    assert!(events[1].note.contains("doomscrolling"));
    assert_eq!(events[2].kind, EventKind::IntervalAdaptDown);
    assert_eq!(procheck_core::note::extract(&events[2].note, "interval_min"), Some(7));
}

#[test]
fn abandoned_off_task_reason_leaves_no_trace_and_reprompts() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = make_app(dir.path());
    let t0 = t0();

    app.start_session("Write", Some(60), t0);
    assert_eq!(app.tick(t0 + 10 * MIN_MS), Some(Prompt::CheckIn));

    // Dismissing the reason prompt abandons the whole answer.
    assert!(!app.resolve_checkin(false, None, t0 + 10 * MIN_MS));
    assert_eq!(app.state().profile("Write").unwrap().interval_min, 10);
    assert_eq!(kinds(&load_events(dir.path())), vec![EventKind::Start]);

    // The unanswered check-in comes right back.
    assert_eq!(app.tick(t0 + 10 * MIN_MS + 200), Some(Prompt::CheckIn));
}

#[test]
fn procrastination_marks_without_ending_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = make_app(dir.path());
    let t0 = t0();

    app.start_session("Write", Some(30), t0);
    app.tick(t0 + 5 * MIN_MS);

    // An abandoned reason prompt is a no-op.
    assert!(!app.mark_procrastination(None, t0 + 5 * MIN_MS));
    assert_eq!(kinds(&load_events(dir.path())), vec![EventKind::Start]);

    assert!(app.mark_procrastination(Some("phone"), t0 + 5 * MIN_MS));
    assert_eq!(app.timer().state(), TimerState::Running);
    assert_eq!(app.state().profile("Write").unwrap().interval_min, 7);

    assert!(app.cancel_session(t0 + 6 * MIN_MS));

    let events = load_events(dir.path());
    assert_eq!(
        kinds(&events),
        vec![
            EventKind::Start,
            EventKind::Procrastination,
            EventKind::IntervalAdaptDown,
            EventKind::Cancel,
        ]
    );
    assert_eq!(events[1].secs, 300);
    assert_eq!(events[3].secs, 360);

    let mut stats = app.stats();
    stats.reload().unwrap();
    let day = events[0].day();
    let sessions = stats.sessions_by_task_in_range(&day, &day);
    assert_eq!(sessions[0].sessions, 0);
    assert_eq!(sessions[0].cancels, 1);
    let insights = stats.session_stats_in_range(&day, &day);
    assert_eq!(insights.avg_first_procrastination_secs, Some(300.0));
}

#[test]
fn manual_break_stops_the_session_first() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = make_app(dir.path());
    let t0 = t0();

    app.start_session("Write", Some(30), t0);
    app.tick(t0 + 3 * MIN_MS);
    assert!(app.start_break(None, t0 + 3 * MIN_MS));
    assert_eq!(app.timer().state(), TimerState::OnBreak);

    assert!(app.end_break(t0 + 10 * MIN_MS));
    assert_eq!(app.timer().state(), TimerState::Idle);

    let events = load_events(dir.path());
    assert_eq!(
        kinds(&events),
        vec![EventKind::Start, EventKind::Stop, EventKind::Break]
    );
    // The implicit stop carries the manual-break marker and the elapsed
    // session time; the break row carries the break duration.
    assert!(events[1].note.contains("manual_break=1"));
    assert_eq!(events[1].secs, 180);
    assert_eq!(events[2].task, "Write");
    assert_eq!(events[2].secs, 420);
    assert!(events[2].note.contains("manual_break=1"));
}

#[test]
fn session_finished_end_logs_stop_with_marker() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = make_app(dir.path());
    let t0 = t0();

    app.start_session("Write", Some(30), t0);
    assert_eq!(app.tick(t0 + 30 * MIN_MS), Some(Prompt::SessionFinished));

    // Elapsed freezes while the decision is pending.
    app.tick(t0 + 45 * MIN_MS);
    assert_eq!(app.timer().elapsed_secs(), 1800);

    assert!(app.resolve_session_finished(FinishChoice::End, t0 + 45 * MIN_MS));
    assert_eq!(app.timer().state(), TimerState::Idle);

    let events = load_events(dir.path());
    assert_eq!(kinds(&events), vec![EventKind::Start, EventKind::Stop]);
    assert_eq!(events[1].secs, 1800);
    assert!(events[1].note.contains("auto_stop=1"));
}

#[test]
fn session_finished_continue_restarts_without_stop() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = make_app(dir.path());
    let t0 = t0();

    app.start_session("Write", Some(30), t0);
    assert_eq!(app.tick(t0 + 30 * MIN_MS), Some(Prompt::SessionFinished));
    assert!(app.resolve_session_finished(FinishChoice::Continue, t0 + 30 * MIN_MS));

    assert_eq!(app.timer().state(), TimerState::Running);
    assert_eq!(app.timer().elapsed_secs(), 0);

    // Two starts, no stop: the fresh start marks the boundary.
    assert_eq!(
        kinds(&load_events(dir.path())),
        vec![EventKind::Start, EventKind::Start]
    );
}

#[test]
fn session_finished_break_carries_auto_stop_marker() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = make_app(dir.path());
    let t0 = t0();

    app.start_session("Write", Some(30), t0);
    assert_eq!(app.tick(t0 + 30 * MIN_MS), Some(Prompt::SessionFinished));
    assert!(app.resolve_session_finished(FinishChoice::Break, t0 + 30 * MIN_MS));
    assert_eq!(app.timer().state(), TimerState::OnBreak);

    assert!(app.end_break(t0 + 35 * MIN_MS));
    let events = load_events(dir.path());
    assert_eq!(kinds(&events), vec![EventKind::Start, EventKind::Break]);
    assert_eq!(events[1].secs, 300);
    assert!(events[1].note.contains("auto_stop=1"));
}

#[test]
fn empty_task_start_is_a_silent_noop() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = make_app(dir.path());

    assert!(!app.start_session("   ", None, t0()));
    assert_eq!(app.timer().state(), TimerState::Idle);
    assert!(!dir.path().join("events.csv").exists());
}

#[test]
fn stop_without_session_is_a_silent_noop() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = make_app(dir.path());
    assert!(!app.stop_session(t0()));
    assert!(!app.cancel_session(t0()));
    assert!(!app.end_break(t0()));
}

#[test]
fn manual_interval_override_logs_and_reschedules() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = make_app(dir.path());
    let t0 = t0();

    app.start_session("Write", Some(60), t0);
    app.tick(t0 + 2 * MIN_MS);

    // Clamped into bounds, streak reset, applied to the live session.
    assert_eq!(app.set_task_interval("Write", 99, t0 + 2 * MIN_MS), Some(30));
    assert_eq!(app.timer().interval_min(), 30);

    let events = load_events(dir.path());
    assert_eq!(events[1].kind, EventKind::IntervalSet);
    assert_eq!(procheck_core::note::extract(&events[1].note, "interval_min"), Some(30));
    // Logged with the session's elapsed seconds, like the other
    // mid-session bookkeeping events.
    assert_eq!(events[1].secs, 120);

    // Next check-in is a full new interval out.
    assert_eq!(app.tick(t0 + 31 * MIN_MS), None);
    assert_eq!(app.tick(t0 + 32 * MIN_MS), Some(Prompt::CheckIn));
}

#[test]
fn day_notes_save_after_quiescence() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = make_app(dir.path());
    let t0 = t0();
    let notes_path = dir.path().join("notes.json");

    app.set_day_note("2026-03-02", "review PRs", t0);
    app.tick(t0 + 200);
    assert!(!notes_path.exists());

    // A second edit resets the quiescence window.
    app.set_day_note("2026-03-02", "review PRs, then email", t0 + 300);
    app.tick(t0 + 600);
    assert!(!notes_path.exists());

    app.tick(t0 + 800);
    assert!(notes_path.exists());

    let reloaded = NotesStore::open(&notes_path);
    assert_eq!(reloaded.get("2026-03-02"), Some("review PRs, then email"));
}

#[test]
fn flush_writes_pending_note_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = make_app(dir.path());

    app.set_day_note("2026-03-02", "pending", t0());
    app.flush();
    assert_eq!(NotesStore::open(dir.path().join("notes.json")).get("2026-03-02"), Some("pending"));
}

#[test]
fn snapshot_round_trips_session_state() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = make_app(dir.path());
    let t0 = t0();

    app.start_session("Write", Some(30), t0);
    app.tick(t0 + 3 * MIN_MS);
    app.start_break(None, t0 + 3 * MIN_MS);

    let snapshot = app.snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();

    let mut restored = make_app(dir.path());
    restored.restore(serde_json::from_str(&json).unwrap());
    assert_eq!(restored.timer().state(), TimerState::OnBreak);
    assert_eq!(restored.break_task(), "Write");

    // The restored app finishes the break exactly as the original would.
    assert!(restored.end_break(t0 + 8 * MIN_MS));
    let events = load_events(dir.path());
    assert_eq!(events.last().unwrap().kind, EventKind::Break);
    assert_eq!(events.last().unwrap().secs, 300);
}
