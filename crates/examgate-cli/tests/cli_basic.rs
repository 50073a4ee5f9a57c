//! Basic CLI E2E tests.
//!
//! Tests invoke the built `examgate` binary and verify its outputs. Every
//! `HH:MM` argument is read on today's local date, so the expectations hold
//! regardless of when or where the suite runs.

use std::io::Write;
use std::process::{Command, Stdio};

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_examgate"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_cli_success(args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\n{stderr}");
    stdout
}

const EXAM: &str = "start=09:00&interval=10&duration=1";

#[test]
fn test_status_waiting_after_window() {
    let stdout = run_cli_success(&["status", "--query", EXAM, "--now", "09:31"]);
    assert_eq!(stdout.trim(), "Next submission window opens in 9 minutes.");
}

#[test]
fn test_status_can_submit() {
    let stdout = run_cli_success(&["status", "--query", EXAM, "--now", "09:40"]);
    assert_eq!(stdout.trim(), "You may submit now.");
}

#[test]
fn test_status_not_started() {
    let stdout = run_cli_success(&["status", "--query", EXAM, "--now", "08:59"]);
    assert_eq!(stdout.trim(), "The exam has not started yet.");
}

#[test]
fn test_status_indicator_when_shown() {
    let query = format!("{EXAM}&show=1");
    let stdout = run_cli_success(&["status", "--query", &query, "--now", "09:00"]);
    assert_eq!(
        stdout.trim(),
        "[WAITING] Next submission window opens in 30 minutes."
    );
}

#[test]
fn test_status_json() {
    let stdout = run_cli_success(&["status", "--query", EXAM, "--now", "09:31", "--json"]);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("status JSON");
    assert_eq!(json["state"], "waiting");
    assert_eq!(json["remaining_min"], 9);
    assert_eq!(json["show_status"], false);
    assert_eq!(json["query"], "start=09%3A00&interval=10&duration=1&show=0");
}

#[test]
fn test_status_from_url_ignores_malformed_params() {
    let stdout = run_cli_success(&[
        "status",
        "--url",
        "https://exam.example/?start=09:00&interval=abc&duration=0",
        "--now",
        "09:41",
    ]);
    // Defaults (10 / 1) apply to the rejected fields.
    assert_eq!(stdout.trim(), "Next submission window opens in 9 minutes.");
}

#[test]
fn test_status_bad_url_fails() {
    let (_, stderr, code) = run_cli(&["status", "--url", "not a link"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error: Invalid URL"), "stderr: {stderr}");
}

#[test]
fn test_status_bad_now_fails() {
    let (_, stderr, code) = run_cli(&["status", "--now", "later"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Invalid instant"), "stderr: {stderr}");
}

#[test]
fn test_link_rewrites_parameters() {
    let stdout = run_cli_success(&[
        "link",
        "--base",
        "https://exam.example/room?lang=en&interval=3",
        "--start",
        "09:00",
        "--interval",
        "15",
        "--duration",
        "2",
        "--show",
        "1",
    ]);
    assert_eq!(
        stdout.trim(),
        "https://exam.example/room?lang=en&start=09%3A00&interval=15&duration=2&show=1"
    );
}

#[test]
fn test_link_keeps_prior_on_invalid_input() {
    let stdout = run_cli_success(&[
        "link",
        "--base",
        "https://exam.example/?start=10:30&interval=20&duration=5&show=1",
        "--interval",
        "-4",
        "--start",
        "99:99",
    ]);
    assert_eq!(
        stdout.trim(),
        "https://exam.example/?start=10%3A30&interval=20&duration=5&show=1"
    );
}

#[test]
fn test_watch_stops_after_timeout() {
    let stdout = run_cli_success(&[
        "watch",
        "--query",
        "start=00:00&interval=10&duration=1",
        "--period-ms",
        "200",
        "--stop-after",
        "1",
    ]);
    assert!(stdout.lines().count() >= 1, "no status lines: {stdout:?}");
}

#[test]
fn test_watch_merges_stdin_updates_onto_running_settings() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_examgate"))
        .args([
            "watch",
            "--query",
            "start=08:00&interval=7",
            "--period-ms",
            "200",
            "--stop-after",
            "1",
            "--events",
        ])
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn watch");

    {
        let mut stdin = child.stdin.take().expect("stdin");
        stdin
            .write_all(b"show=1&duration=bad\n")
            .expect("write update");
    }
    let output = child.wait_with_output().expect("watch output");
    assert_eq!(output.status.code(), Some(0));

    let stderr = String::from_utf8_lossy(&output.stderr);
    let applied: Vec<serde_json::Value> = stderr
        .lines()
        .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
        .filter(|event| event["type"] == "settings_applied")
        .collect();
    assert_eq!(applied.len(), 1, "stderr: {stderr}");

    let settings = &applied[0]["settings"];
    assert_eq!(settings["show_status"], true);
    assert_eq!(settings["policy"]["interval_min"], 7);
    assert_eq!(settings["policy"]["window_min"], 1);

    let report = run_cli_success(&["status", "--query", "start=08:00", "--json"]);
    let report: serde_json::Value = serde_json::from_str(&report).expect("status JSON");
    assert_eq!(settings["policy"]["start"], report["start"]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    let last = stdout.lines().last().unwrap_or_default();
    assert!(last.contains('['), "indicator missing after update: {stdout:?}");
}

#[test]
fn test_watch_events_report_first_status() {
    let (_, stderr, code) = run_cli(&[
        "watch",
        "--query",
        "start=00:00&interval=10&duration=1",
        "--period-ms",
        "200",
        "--stop-after",
        "1",
        "--events",
    ]);
    assert_eq!(code, 0);
    let first = stderr.lines().next().unwrap_or_default();
    let event: serde_json::Value = serde_json::from_str(first).expect("event JSON");
    assert_eq!(event["type"], "status_changed");
    assert!(event["from"].is_null());
}
