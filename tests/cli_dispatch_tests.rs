use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_combat_digest")
}

fn unique_temp_path(name: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("combat-digest-{name}-{stamp}.json"))
}

fn sample_fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("battles")
        .join("sample_battle.json")
}

/// Binary invocation isolated from any local dictionary or catalog files.
fn command() -> Command {
    let mut cmd = Command::new(bin());
    cmd.env("COMBAT_DIGEST_NAMES_PATH", unique_temp_path("missing-names"))
        .env("COMBAT_DIGEST_CATALOG_PATH", unique_temp_path("missing-catalog"))
        .env("COMBAT_DIGEST_LOG", "off");
    cmd
}

#[test]
fn missing_command_prints_usage() {
    let output = command().output().expect("binary should run");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: combat_digest"));
}

#[test]
fn analyze_command_emits_report_json() {
    let output = command()
        .args(["analyze", sample_fixture().to_string_lossy().as_ref()])
        .output()
        .expect("analyze should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(&stdout).expect("analyze should emit json");
    assert_eq!(payload["lineups"][0]["avatarName"], "March 7th");
    assert_eq!(payload["overkillSummary"].as_array().map(Vec::len), Some(1));
    assert!(stdout.contains('\n'), "pretty output spans lines");
}

#[test]
fn analyze_command_compact_is_single_line() {
    let output = command()
        .args([
            "analyze",
            sample_fixture().to_string_lossy().as_ref(),
            "--compact",
        ])
        .output()
        .expect("analyze should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim_end().lines().count(), 1);
}

#[test]
fn analyze_command_returns_usage_without_path() {
    let output = command()
        .arg("analyze")
        .output()
        .expect("analyze should run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: combat_digest analyze"));
}

#[test]
fn analyze_command_fails_on_malformed_log() {
    let path = unique_temp_path("broken-log");
    fs::write(&path, "{\"turnHistory\": []}").expect("fixture should be written");

    let output = command()
        .args(["analyze", path.to_string_lossy().as_ref()])
        .output()
        .expect("analyze should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to parse"));

    let _ = fs::remove_file(path);
}

#[test]
fn names_command_prints_resolved_names() {
    let dictionary = unique_temp_path("names");
    fs::write(&dictionary, "{\"1002\":\"Dan Heng \u{2022} Imbibitor Lunae\"}")
        .expect("dictionary should be written");

    let output = command()
        .env("COMBAT_DIGEST_NAMES_PATH", &dictionary)
        .args(["names", sample_fixture().to_string_lossy().as_ref()])
        .output()
        .expect("names should run");

    assert_eq!(output.status.code(), Some(0));
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("names should emit json");
    assert_eq!(payload["1001"], "March 7th");
    assert_eq!(payload["1002"], "Dan Heng \u{2022} Imbibitor Lunae");

    let _ = fs::remove_file(dictionary);
}
