//! CLI integration tests

use std::process::Command;

fn overdub_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_overdub"))
}

#[test]
fn help_output() {
    let output = overdub_bin()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("backing track"));
    assert!(stdout.contains("--output-dir"));
    assert!(stdout.contains("--sample-rate"));
    assert!(stdout.contains("--notify"));
    assert!(stdout.contains("--save-as"));
}

#[test]
fn version_output() {
    let output = overdub_bin()
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("overdub"));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn config_path_command() {
    let output = overdub_bin()
        .args(["config", "path"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("overdub"));
    assert!(stdout.contains("config.toml"));
}

#[test]
fn config_help() {
    let output = overdub_bin()
        .args(["config", "--help"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("init"));
    assert!(stdout.contains("set"));
    assert!(stdout.contains("get"));
    assert!(stdout.contains("list"));
    assert!(stdout.contains("path"));
}

#[test]
fn config_get_unknown_key() {
    let output = overdub_bin()
        .args(["config", "get", "unknown_key"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unknown") || stderr.contains("Valid"),
        "Expected error about unknown key, got: {}",
        stderr
    );
}

#[test]
fn config_set_unknown_key() {
    let output = overdub_bin()
        .args(["config", "set", "unknown_key", "value"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unknown") || stderr.contains("Valid"),
        "Expected error about unknown key, got: {}",
        stderr
    );
}

#[test]
fn config_set_invalid_sample_rate() {
    let output = overdub_bin()
        .args(["config", "set", "sample_rate", "fast"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid") || stderr.contains("sample"),
        "Expected error about invalid sample rate, got: {}",
        stderr
    );
}

#[test]
fn invalid_sample_rate_flag_is_usage_error() {
    let output = overdub_bin()
        .args(["--sample-rate", "100"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("100") || stderr.contains("invalid"),
        "Expected range error, got: {}",
        stderr
    );
}

#[test]
fn missing_source_file_fails_before_recording() {
    let dir = tempfile::tempdir().unwrap();
    let output = overdub_bin()
        .arg(dir.path().join("does-not-exist.mp3"))
        .args(["--output-dir"])
        .arg(dir.path())
        .args(["--save-as", "never-used"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Source unavailable"),
        "Expected a source error, got: {}",
        stderr
    );

    // Nothing was written to the output directory
    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    assert!(entries.is_empty());
}

#[test]
fn undecodable_source_file_fails_before_recording() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("noise.wav");
    std::fs::write(&source, b"this is not audio").unwrap();

    let output = overdub_bin()
        .arg(&source)
        .args(["--output-dir"])
        .arg(dir.path().join("takes"))
        .args(["--save-as", "never-used"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Source unavailable"),
        "Expected a decode error, got: {}",
        stderr
    );
}
