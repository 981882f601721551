//! E2E tests for the `hydra` binary.
//!
//! Spawns the real binary; responses are read from stdout.

mod common;

use common::hydra_cmd;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

// ─── Introspection ─────────────────────────────────────────────────

#[test]
fn intents_lists_every_operation() {
    let (mut cmd, _home) = hydra_cmd();
    cmd.arg("intents")
        .assert()
        .success()
        .stdout(contains("project:open"))
        .stdout(contains("project:close"))
        .stdout(contains("workspace:create"))
        .stdout(contains("workspace:switch"))
        .stdout(contains("ui:set-mode"));
}

#[test]
fn config_reflects_flags() {
    let (mut cmd, _home) = hydra_cmd();
    cmd.args(["--max-depth", "3", "config"])
        .assert()
        .success()
        .stdout(contains("max_dispatch_depth = 3"));
}

#[test]
fn config_reads_project_file() {
    let (mut cmd, home) = hydra_cmd();
    std::fs::create_dir_all(home.path().join(".hydra")).expect("mkdir");
    std::fs::write(
        home.path().join(".hydra/config.toml"),
        "[workspace]\ninitial_mode = \"dialog\"\n",
    )
    .expect("write config");

    cmd.arg("config")
        .assert()
        .success()
        .stdout(contains("initial_mode = \"dialog\""));
}

#[test]
fn broken_config_fails_startup() {
    let (mut cmd, home) = hydra_cmd();
    std::fs::create_dir_all(home.path().join(".hydra")).expect("mkdir");
    std::fs::write(home.path().join(".hydra/config.toml"), "[engine\n").expect("write");

    cmd.arg("intents")
        .assert()
        .failure()
        .stderr(contains("config error"));
}

// ─── Dispatch ──────────────────────────────────────────────────────

#[test]
fn set_mode_reports_previous_mode() {
    let (mut cmd, _home) = hydra_cmd();
    cmd.args(["dispatch", "ui:set-mode", r#"{"mode":"shortcut"}"#])
        .assert()
        .success()
        .stdout(contains(r#""status":"ok""#))
        .stdout(contains(r#""previousMode":"workspace""#));
}

#[test]
fn unknown_intent_is_a_routing_error() {
    let (mut cmd, _home) = hydra_cmd();
    cmd.args(["dispatch", "project:rename"])
        .assert()
        .failure()
        .stdout(contains(r#""kind":"routing""#).and(contains("DISPATCH_UNKNOWN_INTENT")));
}

#[test]
fn missing_project_directory_carries_domain_code() {
    let (mut cmd, home) = hydra_cmd();
    let missing = home.path().join("nope");
    let payload = serde_json::json!({ "kind": "local", "path": missing }).to_string();

    cmd.args(["dispatch", "project:open", payload.as_str()])
        .assert()
        .failure()
        .stdout(contains("WORKSPACE_PATH_NOT_FOUND"));
}

#[test]
fn non_json_payload_is_a_request_error() {
    let (mut cmd, _home) = hydra_cmd();
    cmd.args(["dispatch", "ui:set-mode", "shortcut"])
        .assert()
        .failure()
        .stdout(contains(r#""kind":"request""#));
}

// ─── Session ───────────────────────────────────────────────────────

#[test]
fn session_keeps_state_between_lines() {
    let (mut cmd, _home) = hydra_cmd();
    let input = concat!(
        r#"{"type":"ui:set-mode","payload":{"mode":"shortcut"}}"#,
        "\n\n",
        r#"{"type":"ui:set-mode","payload":{"mode":"shortcut"}}"#,
        "\n",
        "not json\n",
    );

    let output = cmd.arg("session").write_stdin(input).output().expect("runs");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).expect("one json object per line"))
        .collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["result"]["previousMode"], "workspace");
    assert_eq!(lines[1]["result"]["previousMode"], "shortcut");
    assert_eq!(lines[2]["error"]["kind"], "request");
}

#[test]
fn logs_stay_off_stdout() {
    let (mut cmd, _home) = hydra_cmd();
    cmd.args(["--debug", "dispatch", "ui:set-mode", r#"{"mode":"dialog"}"#])
        .assert()
        .success()
        .stdout(contains("DEBUG").not())
        .stderr(contains("DEBUG"));
}
