// Drives the compiled binary's non-interactive subcommands.
// Recording needs a terminal and is covered by the library tests instead.

use assert_cmd::Command;
use std::fs;
use tempfile::tempdir;

const EVENTS: &str = r#"[
    {"keyCode": 16, "type": "keydown", "timestamp": 0, "shiftKey": true},
    {"keyCode": 72, "type": "keydown", "timestamp": 30, "shiftKey": true},
    {"keyCode": 16, "type": "keyup", "timestamp": 80},
    {"keyCode": 72, "type": "keyup", "timestamp": 100},
    {"keyCode": 73, "type": "keydown", "timestamp": 180},
    {"keyCode": 73, "type": "keyup", "timestamp": 240}
]"#;

const SESSION: &str = r#"{
    "user": "alice",
    "data": [
        {"character": "a", "timeDown": 0, "timeUp": 100},
        {"character": "t", "timeDown": 150, "timeUp": 200}
    ]
}"#;

fn typespy() -> Command {
    Command::cargo_bin("typespy").expect("binary built")
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().expect("run typespy");
    assert!(
        output.status.success(),
        "typespy failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("utf-8 output")
}

#[test]
fn analyze_prints_statistics() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.json");
    fs::write(&path, SESSION).unwrap();

    let out = stdout_of(typespy().arg("analyze").arg(&path));
    assert!(out.contains("User: alice"));
    assert!(out.contains("Avg Hold"));
    assert!(out.contains("75.0 ms"));
    assert!(out.contains("a -> t  150.0 ms (1x)"));
}

#[test]
fn analyze_json_is_a_report() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.json");
    fs::write(&path, SESSION).unwrap();

    let out = stdout_of(typespy().arg("analyze").arg(&path).arg("--json"));
    let report: serde_json::Value = serde_json::from_str(&out).expect("valid JSON");
    assert_eq!(report["user"], "alice");
    assert_eq!(report["summary"]["averageHoldMs"], 75.0);
    assert_eq!(report["metadata"]["recordCount"], 2);
}

#[test]
fn replay_writes_paired_session() {
    let dir = tempdir().unwrap();
    let events = dir.path().join("events.json");
    let output = dir.path().join("session.json");
    fs::write(&events, EVENTS).unwrap();

    let out = stdout_of(
        typespy()
            .arg("replay")
            .arg(&events)
            .args(["--user", "bob", "--output"])
            .arg(&output),
    );
    assert!(out.contains("Recorded"));

    let session: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(session["user"], "bob");
    let data = session["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["character"], "H");
    assert_eq!(data[0]["timeUp"], 100.0);
    assert_eq!(data[1]["character"], "i");
}

#[test]
fn missing_session_file_fails() {
    let dir = tempdir().unwrap();
    let output = typespy()
        .arg("analyze")
        .arg(dir.path().join("nope.json"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read session"));
}

#[test]
fn explicit_config_is_used() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let events = dir.path().join("events.json");
    fs::write(&config, "[recorder]\nmax_hold_ms = 65\nrecord_control_keys = false\n").unwrap();
    fs::write(&events, EVENTS).unwrap();

    // H is held for 70 ms, over the limit, and is dropped; i is held for 60 ms
    let out = stdout_of(
        typespy()
            .arg("--config")
            .arg(&config)
            .arg("replay")
            .arg(&events)
            .arg("--json"),
    );
    let report: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(report["metadata"]["recordCount"], 1);
    assert_eq!(report["summary"]["recorder"]["droppedDowns"], 1);
}
