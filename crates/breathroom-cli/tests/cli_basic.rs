//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a temporary data directory and
//! verify outputs. `practice` runs with stdin closed, which stops it at once.

mod common;

use common::{assert_contains, parse_json, run_cli_failure, run_cli_success};

#[test]
fn test_practice_appends_one_record() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_cli_success(dir.path(), &["practice", "--no-speech"]);
    assert_contains(&out, "Session saved: 4-4-4-4");

    let list = run_cli_success(dir.path(), &["log", "list", "--json"]);
    let records: Vec<serde_json::Value> = parse_json(&list);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["pattern"], "4-4-4-4");
    assert_eq!(records[0]["cycles"], 0);
}

#[test]
fn test_practice_writes_csv_header() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["practice", "--pattern", "4-7-8-0", "--no-speech"]);
    let raw = std::fs::read_to_string(dir.path().join("breathing_log.csv")).unwrap();
    let mut lines = raw.lines();
    assert_eq!(lines.next(), Some("DATE,PATTERN,CYCLES,TIME"));
    assert_contains(lines.next().unwrap(), ",4-7-8-0,0,");
}

#[test]
fn test_practice_json_event_stream() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_cli_success(dir.path(), &["practice", "--pattern", "1-0-1-0", "--json"]);
    let events: Vec<serde_json::Value> = out.lines().map(|l| parse_json(l)).collect();
    assert_eq!(events.first().unwrap()["type"], "session_started");
    assert_eq!(events.first().unwrap()["pattern"], "1-0-1-0");
    let last = events.last().unwrap();
    assert_eq!(last["type"], "session_saved");
    assert_eq!(last["record"]["pattern"], "1-0-1-0");
}

#[test]
fn test_practice_clamps_phase_overrides() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["practice", "--inhale", "99", "--hold2", "0", "--no-speech"]);
    let list = run_cli_success(dir.path(), &["log", "list", "--json"]);
    let records: Vec<serde_json::Value> = parse_json(&list);
    assert_eq!(records[0]["pattern"], "20-4-4-0");
}

#[test]
fn test_practice_rejects_invalid_pattern() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, _) = run_cli_failure(dir.path(), &["practice", "--pattern", "0-0-0-0"]);
    assert_contains(&stderr, "error:");
    assert!(!dir.path().join("breathing_log.csv").exists());
}

#[test]
fn test_log_list_empty() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_cli_success(dir.path(), &["log", "list"]);
    assert_contains(&out, "No sessions recorded yet.");
}

#[test]
fn test_log_list_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["practice", "--pattern", "4-4-4-4", "--no-speech"]);
    run_cli_success(dir.path(), &["practice", "--pattern", "4-7-8-0", "--no-speech"]);
    let list = run_cli_success(dir.path(), &["log", "list", "-n", "1", "--json"]);
    let records: Vec<serde_json::Value> = parse_json(&list);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["pattern"], "4-7-8-0");
}

#[test]
fn test_log_stats() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["practice", "--no-speech"]);
    run_cli_success(dir.path(), &["practice", "--no-speech"]);
    let stats: serde_json::Value = parse_json(&run_cli_success(dir.path(), &["log", "stats"]));
    assert_eq!(stats["total_sessions"], 2);
}

#[test]
fn test_config_set_get() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(run_cli_success(dir.path(), &["config", "set", "pattern.hold1", "7"]).trim(), "ok");
    assert_eq!(run_cli_success(dir.path(), &["config", "get", "pattern.hold1"]).trim(), "7");
    let show = run_cli_success(dir.path(), &["pattern", "show"]);
    assert_contains(&show, "4-7-4-4");
}

#[test]
fn test_config_unknown_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_failure(dir.path(), &["config", "set", "pattern.tempo", "3"]);
    run_cli_failure(dir.path(), &["config", "get", "pattern.tempo"]);
}

#[test]
fn test_config_list_is_json() {
    let dir = tempfile::tempdir().unwrap();
    let config: serde_json::Value = parse_json(&run_cli_success(dir.path(), &["config", "list"]));
    assert_eq!(config["speech"]["enabled"], true);
    assert_eq!(config["log"]["recent_count"], 5);
}

#[test]
fn test_pattern_check() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(run_cli_success(dir.path(), &["pattern", "check", "4-7-8-0"]).trim(), "4-7-8-0");
    run_cli_failure(dir.path(), &["pattern", "check", "4-7"]);
    run_cli_failure(dir.path(), &["pattern", "check", "0-4-4-4"]);
}

#[test]
fn test_pattern_show_json() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["config", "set", "pattern.hold2", "0"]);
    let view: serde_json::Value = parse_json(&run_cli_success(dir.path(), &["pattern", "show", "--json"]));
    assert_eq!(view["pattern"], "4-4-4-0");
    assert_eq!(view["cycle_secs"], 12);
    assert_eq!(view["phases"][3]["skipped"], true);
}

#[test]
fn test_completions() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_cli_success(dir.path(), &["completions", "bash"]);
    assert_contains(&out, "breathroom");
}
