mod common;

use common::{fixture_arg, silkcore};

// ============================================================================
// version command
// ============================================================================

#[test]
fn version_human() {
    let output = silkcore(&["version"]);
    assert!(
        output.status.success(),
        "version should exit 0: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("silkcore"), "missing crate name: {stdout}");
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")), "{stdout}");
}

#[test]
fn version_json() {
    let output = silkcore(&["version", "--format", "json"]);
    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("version JSON should be valid");
    assert_eq!(parsed["name"], "silkcore");
    assert_eq!(parsed["version"], env!("CARGO_PKG_VERSION"));
    assert!(parsed.get("commit").is_some());
}

// ============================================================================
// validate command
// ============================================================================

#[test]
fn validate_accepts_every_scenario_fixture() {
    let files: Vec<String> = ["duel.yaml", "hazard.yaml", "marks.yaml", "boss.yaml"]
        .into_iter()
        .map(fixture_arg)
        .collect();
    let mut args = vec!["validate", "--strict"];
    args.extend(files.iter().map(String::as_str));

    let output = silkcore(&args);
    assert!(
        output.status.success(),
        "fixtures should validate cleanly: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 4, "{stdout}");
    assert!(stdout.contains("0 warnings"));
}

#[test]
fn validate_json_reports_counts() {
    let file = fixture_arg("marks.yaml");
    let output = silkcore(&["validate", "--format", "json", &file]);
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed[0]["actors"], 4);
    assert_eq!(parsed[0]["contacts"], 3);
    assert_eq!(parsed[0]["warnings"].as_array().map(Vec::len), Some(0));
}

#[test]
fn validate_warnings_pass_unless_strict() {
    let file = fixture_arg("unreachable_state.yaml");

    let relaxed = silkcore(&["validate", &file]);
    assert!(relaxed.status.success());
    assert!(String::from_utf8_lossy(&relaxed.stdout).contains("1 warnings"));

    let strict = silkcore(&["validate", "--strict", &file]);
    assert_eq!(strict.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&strict.stderr);
    assert!(stderr.contains("never entered"), "{stderr}");
}

#[test]
fn validate_unknown_state_suggests_fix() {
    let file = fixture_arg("unknown_state.yaml");
    let output = silkcore(&["validate", &file]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("did you mean 'idle'"), "{stderr}");
}

#[test]
fn validate_empty_file_rejected() {
    let file = fixture_arg("empty.yaml");
    let output = silkcore(&["validate", &file]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("empty"), "{stderr}");
}

#[test]
fn validate_yaml_syntax_error_rejected() {
    let file = fixture_arg("bad_yaml.yaml");
    let output = silkcore(&["validate", &file]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("parse error"));
}

#[test]
fn validate_missing_file_rejected() {
    let output = silkcore(&["validate", "does/not/exist.yaml"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("file not found"));
}

#[test]
fn validate_requires_a_file() {
    let output = silkcore(&["validate"]);
    assert!(!output.status.success());
}

// ============================================================================
// run command
// ============================================================================

#[test]
fn run_prints_json_summary() {
    let file = fixture_arg("duel.yaml");
    let output = silkcore(&["run", &file, "--format", "json"]);
    assert!(
        output.status.success(),
        "run should exit 0: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["seed"], 7);
    assert_eq!(summary["steps"], 10);
    assert_eq!(summary["damage_events"], 1);
    assert_eq!(summary["actors"][0]["name"], "knight");
    assert_eq!(summary["actors"][0]["hp"], 3);
    assert_eq!(summary["actors"][0]["state"], "hurt");
}

#[test]
fn run_overrides_ticks_and_seed() {
    let file = fixture_arg("duel.yaml");
    let output = silkcore(&[
        "run", &file, "--ticks", "2", "--seed", "11", "--format", "json",
    ]);
    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["steps"], 2);
    assert_eq!(summary["seed"], 11);
    assert_eq!(summary["damage_events"], 0);
}

#[test]
fn run_human_summary() {
    let file = fixture_arg("marks.yaml");
    let output = silkcore(&["run", &file]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("seed 0 / 5 steps"), "{stdout}");
    assert!(stdout.contains("chain: wisp_a -> wisp_b, wisp_b -> wisp_c"), "{stdout}");
}

#[test]
fn run_writes_event_stream() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let events = dir.path().join("events.jsonl");
    let file = fixture_arg("duel.yaml");

    let output = silkcore(&[
        "run",
        &file,
        "--events-file",
        events.to_str().unwrap(),
        "--quiet",
    ]);
    assert!(output.status.success());

    let content = std::fs::read_to_string(&events).unwrap();
    let lines: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert!(lines.len() >= 4, "{content}");
    assert_eq!(lines[0]["type"], "RunStarted");
    assert_eq!(lines.last().unwrap()["type"], "RunFinished");
    let run_id = &lines[0]["run_id"];
    for (i, line) in lines.iter().enumerate() {
        assert_eq!(line["sequence"], i);
        assert_eq!(&line["run_id"], run_id);
    }
    assert!(lines.iter().any(|l| l["notification"]["type"] == "damage_applied"
        && l["step"] == 2));
}

#[test]
fn run_metrics_rendered_to_stderr() {
    let file = fixture_arg("hazard.yaml");
    let output = silkcore(&["run", &file, "--metrics", "--quiet"]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("silkcore_damage_applied_total 4"), "{stderr}");
    assert!(
        stderr.contains("silkcore_contacts_rejected_total{reason=\"invulnerable\"} 6"),
        "{stderr}"
    );
}

#[test]
fn run_rejects_zero_timestep() {
    let file = fixture_arg("duel.yaml");
    let output = silkcore(&["run", &file, "--fixed-dt", "0"]);
    assert!(!output.status.success());
}
