#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::NamedTempFile;

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.env_remove("STUDY_PLANNER_DB")
        .write_stdin(script.to_string())
        .assert()
}

#[test]
fn cli_places_task_after_fixed_event() {
    run_cli("event add Monday 07:00 09:00 Calculus\ntask add 2 Essay\nquit\n")
        .success()
        .stdout(str_contains("Added fixed event 1."))
        .stdout(str_contains("Added task 1 at Monday 09:00."));
}

#[test]
fn cli_rejects_unpadded_times() {
    run_cli("event add Monday 8:00 10:00 Lab\nquit\n")
        .success()
        .stdout(str_contains("expected a whole hour formatted as HH:00"));
}

#[test]
fn cli_generate_reports_summary() {
    run_cli("task add 1 A\ntask add 1 B\ngenerate\nquit\n")
        .success()
        .stdout(str_contains("Generated (tasks=2, scheduled=2)"));
}

#[test]
fn cli_save_and_load_json_round_trip() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().to_string_lossy().replace('\\', "\\\\");
    let script = format!(
        "task add 2 KeepMe\nsave json {path}\ntask add 1 Temporary\nload json {path}\nlist\nquit\n"
    );
    let assert = run_cli(&script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("Loaded from"), "expected load confirmation");
    let after_reload = output.split("Loaded from").last().unwrap_or_default();
    assert!(after_reload.contains("KeepMe"));
    assert!(
        !after_reload.contains("Temporary"),
        "temporary task should not appear after reload:\n{after_reload}"
    );
}
