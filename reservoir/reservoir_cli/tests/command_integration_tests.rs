use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn reservoir() -> Command {
    Command::cargo_bin("reservoir").unwrap()
}

#[test]
fn test_bench_reports_elapsed_time() {
    reservoir()
        .args([
            "bench",
            "--connections",
            "3",
            "--tasks",
            "30",
            "--query-ms",
            "1",
            "--connect-ms",
            "0",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Benchmark connection pool:"))
        .stdout(predicate::str::contains("30 tasks, 3 connections"));
}

#[test]
fn test_bench_json_report() {
    let output = reservoir()
        .args([
            "bench",
            "--connections",
            "2",
            "--tasks",
            "20",
            "--query-ms",
            "1",
            "--connect-ms",
            "0",
            "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["mode"], "pooled");
    assert_eq!(report["connections"], 2);
    assert_eq!(report["opened"], 2);
    assert_eq!(report["closed"], 2);
    assert_eq!(report["statements"], 20);
    assert!(report["peak_in_use"].as_u64().unwrap() <= 2);
    assert_eq!(report["state"], "Closed");
    assert_eq!(report["stats"]["acquired"], 20);
    assert_eq!(report["stats"]["released"], 20);
    assert_eq!(report["stats"]["closed"], 2);
    assert_eq!(report["stats"]["timed_out"], 0);
}

#[test]
fn test_bench_unpooled() {
    reservoir()
        .args([
            "bench-unpooled",
            "--tasks",
            "5",
            "--query-ms",
            "1",
            "--connect-ms",
            "0",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Benchmark non-pool connections:"))
        .stdout(predicate::str::contains("5 tasks"));
}

#[test]
fn test_bench_rejects_empty_pool() {
    reservoir()
        .args(["bench", "--connections", "0", "--tasks", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_connections must be at least 1"));
}

#[test]
fn test_bench_with_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bench.toml");
    fs::write(
        &path,
        "tasks = 12\nquery_ms = 1\nconnect_ms = 0\n\n[pool]\nmax_connections = 4\n",
    )
    .unwrap();

    reservoir()
        .arg("bench")
        .arg("--config")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("12 tasks, 4 connections"));
}

#[test]
fn test_check_config_valid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bench.toml");
    fs::write(&path, "[pool]\nmax_connections = 7\nacquire_timeout_ms = 900\n").unwrap();

    reservoir()
        .arg("check-config")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration OK"))
        .stdout(predicate::str::contains("max_connections = 7"))
        .stdout(predicate::str::contains("acquire_timeout_ms = 900"))
        .stdout(predicate::str::contains("tasks = 1000"));
}

#[test]
fn test_check_config_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bench.toml");
    fs::write(&path, "[pool]\nmax_connections = 0\n").unwrap();

    reservoir()
        .arg("check-config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"));
}

#[test]
fn test_invalid_log_level() {
    reservoir()
        .args(["--log-level", "loud", "check-config", "missing.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid log level"));
}
