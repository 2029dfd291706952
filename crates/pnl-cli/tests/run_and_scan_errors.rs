//! `run` and `scan` fail cleanly (non-zero exit, no panic) on bad inputs,
//! without ever reaching a real node or prover.

use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::tempdir;

#[test]
fn run_fails_when_the_targets_file_is_missing() {
    let dir = tempdir().expect("tempdir");
    let config_path = dir.path().join("config.json");
    std::fs::write(
        &config_path,
        r#"{"node_endpoint":"http://127.0.0.1:0","prover_endpoint":"http://127.0.0.1:0"}"#,
    )
    .expect("write config");

    let mut cmd = cargo_bin_cmd!("pnl");
    cmd.args([
        "run",
        "--targets",
        dir.path().join("missing-targets.json").to_str().expect("utf8 path"),
        "--config",
        config_path.to_str().expect("utf8 path"),
        "--oracle-address",
        "0x01",
        "--assets-map-slot",
        "0x02",
    ]);
    let output = cmd.output().expect("runs");
    assert!(!output.status.success());
}

#[test]
fn run_fails_when_the_targets_file_has_no_targets() {
    let dir = tempdir().expect("tempdir");
    let config_path = dir.path().join("config.json");
    std::fs::write(
        &config_path,
        r#"{"node_endpoint":"http://127.0.0.1:0","prover_endpoint":"http://127.0.0.1:0"}"#,
    )
    .expect("write config");
    let targets_path = dir.path().join("targets.json");
    std::fs::write(&targets_path, r#"{"account":"alice","targets":[]}"#).expect("write targets");

    let mut cmd = cargo_bin_cmd!("pnl");
    cmd.args([
        "run",
        "--targets",
        targets_path.to_str().expect("utf8 path"),
        "--config",
        config_path.to_str().expect("utf8 path"),
        "--oracle-address",
        "0x01",
        "--assets-map-slot",
        "0x02",
    ]);
    let output = cmd.output().expect("runs");
    assert!(!output.status.success());
}

#[test]
fn scan_fails_when_the_node_endpoint_is_unreachable() {
    let mut cmd = cargo_bin_cmd!("pnl");
    cmd.args([
        "scan",
        "--node-endpoint",
        "http://127.0.0.1:1",
        "--node-timeout-secs",
        "1",
        "--secret",
        "0x01",
        "--app",
        "0x02",
        "--max-indices",
        "1",
        "--batch-size",
        "1",
    ]);
    let output = cmd.output().expect("runs");
    assert!(!output.status.success());
}
