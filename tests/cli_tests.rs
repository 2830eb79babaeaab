//! Command-line behaviour of the buildtrace binary
#![allow(deprecated)] // suppress assert_cmd::Command::cargo_bin deprecation in tests

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sqlite_make.strace")
}

fn buildtrace() -> Command {
    Command::cargo_bin("buildtrace").unwrap()
}

#[test]
fn test_text_report_shows_summary_table() {
    buildtrace()
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("% calls"))
        .stdout(predicate::str::contains("55.000%"))
        .stdout(predicate::str::contains("openat"))
        .stdout(predicate::str::contains("total (6 unique)"))
        .stdout(predicate::str::contains("Dependency edges:    6"));
}

#[test]
fn test_top_limits_rows() {
    buildtrace()
        .arg("--top")
        .arg("1")
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("openat"))
        .stdout(predicate::str::contains("execve").not());
}

#[test]
fn test_csv_format() {
    buildtrace()
        .arg("--format")
        .arg("csv")
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "syscall,count,percentage\nopenat,11,55.000%\n",
        ));
}

#[test]
fn test_json_format_with_order() {
    let output = buildtrace()
        .arg("--format")
        .arg("json")
        .arg("--order")
        .arg(fixture())
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["format"], "buildtrace-json-v1");
    assert_eq!(report["summary"]["edges"], 6);
    assert_eq!(report["syscalls"][0]["syscall"], "openat");
    assert_eq!(report["dependencies"]["sqlite3.c"][2], "keywordhash.inc");
    assert_eq!(report["build_order"]["status"], "ordered");
    assert_eq!(report["build_order"]["nodes"][0], "sqlite3.c");
}

#[test]
fn test_order_headers_first() {
    buildtrace()
        .arg("--order")
        .arg("--headers-first")
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("1. linker.h"));
}

#[test]
fn test_writes_artifacts_quietly() {
    let dir = TempDir::new().unwrap();
    let csv = dir.path().join("syscall_stats.csv");
    let deps = dir.path().join("deps.json");
    let order = dir.path().join("order.txt");

    buildtrace()
        .arg("--quiet")
        .arg("--syscall-csv")
        .arg(&csv)
        .arg("--deps-json")
        .arg(&deps)
        .arg("--order-out")
        .arg(&order)
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert!(fs::read_to_string(&csv).unwrap().contains("read,2,10.000%"));
    assert!(fs::read_to_string(&deps)
        .unwrap()
        .contains("\"shell.c\": ["));
    assert!(fs::read_to_string(&order)
        .unwrap()
        .starts_with("sqlite3.c\nshell.c\n"));
}

#[test]
fn test_missing_log_fails() {
    buildtrace()
        .arg("/nonexistent/make.strace")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Trace log unavailable"));
}

#[test]
fn test_unwritable_artifact_fails() {
    buildtrace()
        .arg("--edges-csv")
        .arg("/nonexistent/dir/edges.csv")
        .arg(fixture())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to export artifacts"));
}

#[test]
fn test_config_file_sets_input() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("buildtrace.toml");
    fs::write(
        &config,
        format!("input = {:?}\n", fixture().display().to_string()),
    )
    .unwrap();

    buildtrace()
        .arg("--config")
        .arg(&config)
        .arg("--format")
        .arg("csv")
        .assert()
        .success()
        .stdout(predicate::str::contains("execve,4,20.000%"));
}

#[test]
fn test_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("bad.toml");
    fs::write(&config, "[patterns]\ncompilers = []\n").unwrap();

    buildtrace()
        .arg("--config")
        .arg(&config)
        .arg(fixture())
        .assert()
        .failure()
        .stderr(predicate::str::contains("compilers"));
}

#[test]
fn test_cycle_fails_with_unresolved_nodes() {
    // Header suffix ".c" lets a source be recorded as another source's dependency
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("cycle.log");
    fs::write(
        &log,
        concat!(
            "1 execve(\"/usr/bin/gcc\", [\"gcc\",\"-c\",\"a.c\"], ...) = 0\n",
            "2 openat(AT_FDCWD, \"b.c\", O_RDONLY) = 3\n",
            "3 execve(\"/usr/bin/gcc\", [\"gcc\",\"-c\",\"b.c\"], ...) = 0\n",
            "4 openat(AT_FDCWD, \"a.c\", O_RDONLY) = 3\n",
        ),
    )
    .unwrap();
    let config = dir.path().join("buildtrace.toml");
    fs::write(&config, "[patterns]\nheader_suffixes = [\".c\"]\n").unwrap();

    buildtrace()
        .arg("--config")
        .arg(&config)
        .arg("--order")
        .arg(&log)
        .assert()
        .failure()
        .stderr(predicate::str::contains("2 node(s) could not be ordered: a.c, b.c"));
}

#[test]
fn test_order_out_cycle_reports_like_order() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("cycle.log");
    fs::write(
        &log,
        concat!(
            "1 execve(\"/usr/bin/gcc\", [\"gcc\",\"-c\",\"a.c\"], ...) = 0\n",
            "2 openat(AT_FDCWD, \"b.c\", O_RDONLY) = 3\n",
            "3 execve(\"/usr/bin/gcc\", [\"gcc\",\"-c\",\"b.c\"], ...) = 0\n",
            "4 openat(AT_FDCWD, \"a.c\", O_RDONLY) = 3\n",
        ),
    )
    .unwrap();
    let config = dir.path().join("buildtrace.toml");
    fs::write(&config, "[patterns]\nheader_suffixes = [\".c\"]\n").unwrap();
    let edges = dir.path().join("edges.csv");
    let order = dir.path().join("order.txt");

    buildtrace()
        .arg("--config")
        .arg(&config)
        .arg("--edges-csv")
        .arg(&edges)
        .arg("--order-out")
        .arg(&order)
        .arg(&log)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Dependency edges:    2"))
        .stderr(predicate::str::contains("Failed to compute build order"))
        .stderr(predicate::str::contains("Failed to export artifacts").not())
        .stderr(predicate::str::contains("2 node(s) could not be ordered: a.c, b.c"));

    assert_eq!(
        fs::read_to_string(&edges).unwrap(),
        "source,target\na.c,b.c\nb.c,a.c\n"
    );
    assert!(!order.exists());
}
