//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary with `STUDYPLAN_HOME` pointing at a fresh
//! temporary directory and a fixed `--today` (Wednesday 2026-10-14, so the
//! current week starts on Monday 2026-10-12).

use std::path::Path;
use std::process::Command;

use serde::Deserialize;

const TODAY: &str = "2026-10-14";

#[derive(Debug, Deserialize)]
struct GoalOut {
    id: String,
    title: String,
    slot_minutes: u32,
    completed: bool,
}

#[derive(Debug, Deserialize)]
struct SessionOut {
    id: String,
    goal_id: String,
    start: String,
    end: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct ProgressOut {
    target_minutes: i64,
    completed_minutes: i64,
    remaining_minutes: i64,
    percent: u8,
}

/// Run a CLI command and return output.
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_studyplan-cli"))
        .env("STUDYPLAN_HOME", home)
        .env_remove("STUDYPLAN_LOG")
        .arg("--today")
        .arg(TODAY)
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_ok(home: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "command {args:?} failed: {stderr}");
    stdout
}

fn goals(home: &Path) -> Vec<GoalOut> {
    serde_json::from_str(&run_ok(home, &["goal", "list", "--json"])).unwrap()
}

fn sessions(home: &Path) -> Vec<SessionOut> {
    serde_json::from_str(&run_ok(home, &["session", "list", "--json"])).unwrap()
}

#[test]
fn test_goal_add_plans_current_week() {
    let home = tempfile::tempdir().unwrap();
    let out = run_ok(
        home.path(),
        &[
            "goal",
            "add",
            "Algebra",
            "--hours",
            "2",
            "--slot",
            "60",
            "--window",
            "mon:morning",
            "--window",
            "wed:morning",
        ],
    );
    assert!(out.contains("Goal created:"));

    let goals = goals(home.path());
    assert_eq!(goals.len(), 1);
    assert_eq!(goals[0].title, "Algebra");

    let sessions = sessions(home.path());
    let starts: Vec<&str> = sessions.iter().map(|s| s.start.as_str()).collect();
    assert_eq!(starts, vec!["2026-10-12T06:00:00", "2026-10-14T06:00:00"]);
    assert!(sessions.iter().all(|s| s.goal_id == goals[0].id && s.status == "planned"));
}

#[test]
fn test_goal_add_clamps_slot() {
    let home = tempfile::tempdir().unwrap();
    run_ok(home.path(), &["goal", "add", "Tiny", "--hours", "1", "--slot", "5"]);
    assert_eq!(goals(home.path())[0].slot_minutes, 15);
}

#[test]
fn test_busy_event_moves_session() {
    let home = tempfile::tempdir().unwrap();
    run_ok(home.path(), &["goal", "add", "Algebra", "--hours", "1", "--window", "mon:morning"]);
    run_ok(
        home.path(),
        &["busy", "add", "Gym", "--date", "2026-10-12", "--start", "06:00", "--end", "07:00"],
    );

    let sessions = sessions(home.path());
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].start, "2026-10-12T07:00:00");
    assert_eq!(sessions[0].end, "2026-10-12T08:00:00");
}

#[test]
fn test_invalid_busy_range_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(
        home.path(),
        &["busy", "add", "Backwards", "--date", "2026-10-12", "--start", "10:00", "--end", "09:00"],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
    assert!(stderr.contains("Invalid time range"));
}

#[test]
fn test_session_lifecycle_and_progress() {
    let home = tempfile::tempdir().unwrap();
    run_ok(home.path(), &["goal", "add", "Physics", "--hours", "2", "--window", "tue:evening"]);
    let goal_id = goals(home.path())[0].id.clone();
    let first = sessions(home.path())[0].id.clone();

    run_ok(home.path(), &["session", "check-in", &first]);
    run_ok(home.path(), &["session", "complete", &first]);
    let (_, stderr, code) = run_cli(home.path(), &["session", "check-in", &first]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Invalid session transition"));

    let progress: ProgressOut =
        serde_json::from_str(&run_ok(home.path(), &["plan", "progress", &goal_id])).unwrap();
    assert_eq!(progress.target_minutes, 120);
    assert_eq!(progress.completed_minutes, 60);
    assert_eq!(progress.remaining_minutes, 0);
    assert_eq!(progress.percent, 50);

    let remaining = run_ok(home.path(), &["plan", "remaining", &goal_id]);
    assert_eq!(remaining.trim(), "0");
}

#[test]
fn test_goal_complete_and_delete() {
    let home = tempfile::tempdir().unwrap();
    run_ok(home.path(), &["goal", "add", "Essay", "--hours", "1", "--window", "fri:afternoon"]);
    let goal_id = goals(home.path())[0].id.clone();
    let prefix = &goal_id[..8];

    run_ok(home.path(), &["goal", "complete", prefix]);
    assert!(goals(home.path())[0].completed);
    assert!(sessions(home.path()).is_empty());

    run_ok(home.path(), &["goal", "reopen", prefix]);
    assert_eq!(sessions(home.path()).len(), 1);

    run_ok(home.path(), &["goal", "delete", prefix]);
    assert!(goals(home.path()).is_empty());
    assert!(sessions(home.path()).is_empty());
}

#[test]
fn test_unknown_goal_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["goal", "show", "does-not-exist"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("goal not found"));
}

#[test]
fn test_plan_free_reports_week() {
    let home = tempfile::tempdir().unwrap();
    let out = run_ok(home.path(), &["plan", "free", "--json"]);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["week"], "2026-10-12");
    assert_eq!(json["days"].as_array().unwrap().len(), 7);

    let text = run_ok(home.path(), &["plan", "free"]);
    assert!(text.contains("total  6720 min"));
}

#[test]
fn test_plan_week_navigation() {
    let home = tempfile::tempdir().unwrap();
    run_ok(home.path(), &["goal", "add", "History", "--hours", "1", "--window", "sat:morning"]);
    run_ok(home.path(), &["plan", "week", "2026-12-02"]);

    let out = run_ok(home.path(), &["session", "list", "--json", "--week", "2026-12-02"]);
    let sessions: Vec<SessionOut> = serde_json::from_str(&out).unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].start, "2026-12-05T06:00:00");
}

#[test]
fn test_config_get_set() {
    let home = tempfile::tempdir().unwrap();
    assert_eq!(run_ok(home.path(), &["config", "get", "scheduler.day_start_hour"]).trim(), "6");

    run_ok(home.path(), &["config", "set", "bands.morning.start", "8"]);
    assert_eq!(run_ok(home.path(), &["config", "get", "bands.morning.start"]).trim(), "8");
    assert!(home.path().join("config.toml").exists());

    let (_, stderr, code) = run_cli(home.path(), &["config", "set", "scheduler.unknown", "1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));

    let path = run_ok(home.path(), &["config", "path"]);
    assert!(path.trim().ends_with("config.toml"));
}

#[test]
fn test_json_backend() {
    let home = tempfile::tempdir().unwrap();
    run_ok(home.path(), &["config", "set", "storage.backend", "json"]);
    run_ok(home.path(), &["goal", "add", "Latin", "--hours", "1", "--window", "thu:morning"]);
    assert!(home.path().join("state.json").exists());
    assert_eq!(goals(home.path())[0].title, "Latin");
}

#[test]
fn test_plan_upcoming_lists_next_week() {
    let home = tempfile::tempdir().unwrap();
    run_ok(home.path(), &["goal", "add", "Algebra", "--hours", "1", "--window", "mon:morning"]);
    run_ok(
        home.path(),
        &["busy", "add", "Lab", "--date", "2026-10-14", "--start", "09:00", "--end", "10:00"],
    );

    let out = run_ok(home.path(), &["plan", "upcoming", "--at", "00:00", "--json"]);
    let items: Vec<serde_json::Value> = serde_json::from_str(&out).unwrap();
    let summary: Vec<(&str, &str)> = items
        .iter()
        .map(|i| (i["kind"].as_str().unwrap(), i["start"].as_str().unwrap()))
        .collect();
    assert_eq!(
        summary,
        vec![("busy", "2026-10-14T09:00:00"), ("study", "2026-10-19T06:00:00")]
    );

    let out = run_ok(home.path(), &["plan", "upcoming", "--at", "00:00", "--limit", "1"]);
    assert_eq!(out.lines().count(), 1);
    assert!(out.contains("Lab"));
}
