//! Basic CLI E2E tests.
//!
//! Each test points PROCHECK_DATA_DIR at its own temp directory so
//! nothing touches the real user state.

use std::path::Path;
use std::process::Command;

/// Run the CLI against an isolated data directory.
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_procheck"))
        .env("PROCHECK_DATA_DIR", data_dir)
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_cli_success(data_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\nstderr: {stderr}");
    stdout
}

#[test]
fn status_on_fresh_state_is_idle() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(dir.path(), &["session", "status"]);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["state"], "idle");
    assert_eq!(json["elapsed_secs"], 0);
}

#[test]
fn start_then_stop_appends_log_rows() {
    let dir = tempfile::tempdir().unwrap();

    let stdout = run_cli_success(dir.path(), &["session", "start", "Write", "--target-min", "45"]);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["state"], "running");
    assert_eq!(json["task"], "Write");
    assert_eq!(json["interval_min"], 10);

    let stdout = run_cli_success(dir.path(), &["session", "stop"]);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["state"], "idle");

    let log = std::fs::read_to_string(dir.path().join("events.csv")).unwrap();
    let mut lines = log.lines();
    assert_eq!(lines.next().unwrap(), "timestamp,event,task,session_seconds,note");
    assert!(log.contains(",start,Write,"));
    assert!(log.contains(",stop,Write,"));
}

#[test]
fn task_set_interval_clamps_and_logs() {
    let dir = tempfile::tempdir().unwrap();

    let stdout = run_cli_success(dir.path(), &["task", "set-interval", "Write", "99"]);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["interval_min"], 30);

    let stdout = run_cli_success(dir.path(), &["task", "list"]);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["Write"]["interval_min"], 30);

    let log = std::fs::read_to_string(dir.path().join("events.csv")).unwrap();
    assert!(log.contains(",interval_set,Write,0,interval_min=30"));
}

#[test]
fn stats_day_on_empty_log_is_zeroed() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(dir.path(), &["stats", "day"]);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["summary"]["total_min"], 0);
    assert_eq!(json["summary"]["ratio_on"], serde_json::Value::Null);
    assert_eq!(json["heat"], "none");
}

#[test]
fn note_set_show_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["note", "set", "buy milk", "--date", "2026-03-02"]);
    let stdout = run_cli_success(dir.path(), &["note", "show", "--date", "2026-03-02"]);
    assert_eq!(stdout.trim_end(), "buy milk");
}

#[test]
fn export_week_writes_sections() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("events.csv"),
        "timestamp,event,task,session_seconds,note\n\
         2026-03-02 09:00:00,start,Write,0,interval_min=10\n\
         2026-03-02 09:30:00,stop,Write,1800,interval_min=10\n",
    )
    .unwrap();

    let out = dir.path().join("week.csv");
    run_cli_success(
        dir.path(),
        &[
            "export",
            "week",
            "--anchor",
            "2026-03-04",
            "--out",
            out.to_str().unwrap(),
        ],
    );

    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("Export,Current week,2026-03-02,2026-03-08"));
    assert!(text.contains("Events"));
    assert!(text.contains("2026-03-02 09:30:00,stop,Write,1800,interval_min=10"));
}
