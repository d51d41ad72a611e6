#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use std::io::Write;
use tempfile::NamedTempFile;

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.write_stdin(script.to_string()).assert()
}

#[test]
fn cli_exits_cleanly_on_end_of_input() {
    run_cli("help\n")
        .success()
        .stdout(str_contains("Goal Planner (CLI)"))
        .stdout(str_contains("reschedule <YYYY-MM-DD> [hours]"));
}

#[test]
fn cli_schedules_from_start_date() {
    let assert = run_cli(
        "start 2025-03-03\nadd 1 2 Setup\nadd 2 4 Ownership\nschedule\nquit\n",
    )
    .success()
    .stdout(str_contains("Item upserted."))
    .stdout(str_contains("Scheduled (items=2"));
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    let after_schedule = output.split("Scheduled").last().unwrap_or_default();
    assert!(after_schedule.contains("2025-03-03"), "{after_schedule}");
    assert!(after_schedule.contains("2025-03-05"), "{after_schedule}");
}

#[test]
fn cli_exclude_moves_due_dates() {
    let assert = run_cli(
        "start 2025-03-03\nadd 1 2 Setup\nschedule\nexclude 2025-03-03, soon\nquit\n",
    )
    .success()
    .stdout(str_contains("Skipped: soon"))
    .stdout(str_contains("Exclusions updated (1 rescheduled, 1 changed)."));
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    let after = output.split("Exclusions updated").last().unwrap_or_default();
    assert!(after.contains("2025-03-04"), "{after}");
}

#[test]
fn cli_done_and_stats() {
    run_cli("start 2025-03-03\nadd 1 2 Setup\nadd 2 2 Read\nschedule\ndone 1 90\nstats\nquit\n")
        .success()
        .stdout(str_contains("Item 1 completed."))
        .stdout(str_contains("Items completed    : 1/2"))
        .stdout(str_contains("Progress           : 50.0%"))
        .stdout(str_contains("Time spent         : 1.5 h"));
}

#[test]
fn cli_rejects_bad_budget() {
    run_cli("add 1 2 Setup\nbudget 0\nquit\n")
        .success()
        .stdout(str_contains("Error: daily budget must be a positive number"));
}

#[test]
fn cli_save_and_load_json_round_trip() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().to_string_lossy().replace('\\', "\\\\");
    let script = format!(
        "add 1 3 Persisted\nschedule\nsave json {path}\nadd 2 1 Temporary\nload json {path}\nshow\nquit\n"
    );
    let assert = run_cli(&script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("Plan saved to"));
    let after_reload = output.split("Plan loaded from").last().unwrap_or_default();
    assert!(after_reload.contains("Persisted"));
    assert!(
        !after_reload.contains("Temporary"),
        "item added after save should be gone:\n{after_reload}"
    );
}

#[test]
fn cli_imports_generated_curriculum() {
    let mut tmp = NamedTempFile::new().expect("create temp file");
    write!(
        tmp,
        "```json\n{{\"curriculum\": [{{\"day\": 1, \"topic\": \"Basics\"}}, {{\"day\": 2, \"topic\": \"Borrowing\"}}]}}\n```"
    )
    .unwrap();
    tmp.flush().unwrap();
    let path = tmp.path().to_string_lossy().replace('\\', "\\\\");
    run_cli(&format!("import {path}\nquit\n"))
        .success()
        .stdout(str_contains("Imported 2 item(s)."))
        .stdout(str_contains("Borrowing"));
}
