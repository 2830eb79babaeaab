//! End-to-end analysis of a recorded make/gcc trace
//!
//! The fixture mixes noise (make, linker exec, signals, exit markers), headers opened
//! before any compile, an unterminated quoted path and two compiler invocations.

use buildtrace::classifier::Classifier;
use buildtrace::config::{AnalysisConfig, OutputConfig, PatternConfig};
use buildtrace::dependency::{DependencyEdge, DependencyGraph};
use buildtrace::export::ArtifactExporter;
use buildtrace::scan::{analyze_file, ScanSummary};
use buildtrace::topo::topological_order;
use buildtrace::AnalysisError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sqlite_make.strace")
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_fixture_dependency_graph() {
    let analysis = analyze_file(&fixture(), &Classifier::default()).unwrap();

    assert_eq!(
        analysis.graph.headers_of("sqlite3.c").unwrap(),
        strings(&["sqlite3.h", "stdlib.h", "keywordhash.inc"]).as_slice()
    );
    // The link step is not a compile invocation, so its header open stays with shell.c
    assert_eq!(
        analysis.graph.headers_of("shell.c").unwrap(),
        strings(&["sqlite3.h", "stdio.h", "linker.h"]).as_slice()
    );
    assert!(analysis.graph.headers_of("early.h").is_none());
    assert_eq!(
        analysis.graph.sources().collect::<Vec<_>>(),
        vec!["sqlite3.c", "shell.c"]
    );
}

#[test]
fn test_fixture_syscall_tally() {
    let analysis = analyze_file(&fixture(), &Classifier::default()).unwrap();
    let sorted: Vec<(&str, u64)> = analysis
        .tally
        .sorted()
        .iter()
        .map(|c| (c.name.as_str(), c.count))
        .collect();

    assert_eq!(
        sorted,
        vec![
            ("openat", 11),
            ("execve", 4),
            ("read", 2),
            ("brk", 1),
            ("close", 1),
            ("write", 1),
        ]
    );
    assert_eq!(analysis.tally.total(), 20);
}

#[test]
fn test_fixture_summary() {
    let analysis = analyze_file(&fixture(), &Classifier::default()).unwrap();
    assert_eq!(
        analysis.summary,
        ScanSummary {
            lines: 22,
            syscall_lines: 20,
            compile_invocations: 2,
            header_opens: 8,
            edges: 6,
        }
    );
}

#[test]
fn test_fixture_build_order() {
    let analysis = analyze_file(&fixture(), &Classifier::default()).unwrap();
    let order = topological_order(&analysis.graph).unwrap();

    assert_eq!(
        order.nodes(),
        strings(&[
            "sqlite3.c",
            "shell.c",
            "stdlib.h",
            "keywordhash.inc",
            "sqlite3.h",
            "stdio.h",
            "linker.h",
        ])
        .as_slice()
    );
}

#[test]
fn test_sqlite_example_lines() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("build.log");
    let mut file = fs::File::create(&log).unwrap();
    writeln!(
        file,
        r#"12345 execve("/usr/bin/gcc", ["gcc","-c","sqlite3.c"], ...) = 0"#
    )
    .unwrap();
    writeln!(file, r#"12346 openat(AT_FDCWD, "sqlite3.h", O_RDONLY) = 3"#).unwrap();
    writeln!(file, r#"12347 openat(AT_FDCWD, "stdlib.h", O_RDONLY) = 3"#).unwrap();
    writeln!(file, r#"12348 openat(AT_FDCWD, "sqlite3.h", O_RDONLY) = 3"#).unwrap();
    drop(file);

    let analysis = analyze_file(&log, &Classifier::default()).unwrap();
    assert_eq!(
        serde_json::to_string(&analysis.graph).unwrap(),
        r#"{"sqlite3.c":["sqlite3.h","stdlib.h"]}"#
    );
    assert_eq!(analysis.tally.count("execve"), 1);
    assert_eq!(analysis.tally.count("openat"), 3);
}

#[test]
fn test_missing_log_is_input_unavailable() {
    let err = analyze_file(Path::new("/no/such/build.strace"), &Classifier::default())
        .unwrap_err();
    assert!(matches!(err, AnalysisError::InputUnavailable { .. }));
    assert!(err.to_string().contains("/no/such/build.strace"));
}

#[test]
fn test_export_artifacts_from_fixture() {
    let dir = TempDir::new().unwrap();
    let outputs = OutputConfig {
        syscall_table: Some(dir.path().join("syscall_stats.csv")),
        dependency_map: Some(dir.path().join("sqlite_dependencies.json")),
        edge_list: Some(dir.path().join("edges.csv")),
        ..Default::default()
    };
    let analysis = analyze_file(&fixture(), &Classifier::default()).unwrap();
    ArtifactExporter::new(outputs).export(&analysis, None).unwrap();

    let csv = fs::read_to_string(dir.path().join("syscall_stats.csv")).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("syscall,count,percentage"));
    assert_eq!(lines.next(), Some("openat,11,55.000%"));
    assert_eq!(lines.next(), Some("execve,4,20.000%"));

    // The map and the flat edge list describe the same graph
    let map: DependencyGraph = serde_json::from_str(
        &fs::read_to_string(dir.path().join("sqlite_dependencies.json")).unwrap(),
    )
    .unwrap();
    let edges: Vec<DependencyEdge> = fs::read_to_string(dir.path().join("edges.csv"))
        .unwrap()
        .lines()
        .skip(1)
        .map(|line| {
            let (source, target) = line.split_once(',').unwrap();
            DependencyEdge::new(source, target)
        })
        .collect();
    assert_eq!(DependencyGraph::from_edges(edges), map);
    assert_eq!(map, analysis.graph);
}

#[test]
fn test_config_file_drives_analysis() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("cc.log");
    fs::write(
        &log,
        concat!(
            "1 execve(\"/usr/bin/cc\", [\"cc\",\"-c\",\"util.c\"], ...) = 0\n",
            "2 open(\"util.h\", O_RDONLY) = 3\n",
        ),
    )
    .unwrap();

    let config_path = dir.path().join("buildtrace.toml");
    fs::write(
        &config_path,
        format!(
            "input = {:?}\n[patterns]\ncompilers = [\"cc\"]\nopen_marker = \"open\"\n",
            log.display().to_string()
        ),
    )
    .unwrap();

    let config = AnalysisConfig::from_file(&config_path).unwrap();
    assert_eq!(config.patterns.header_suffixes, PatternConfig::default().header_suffixes);

    let classifier = Classifier::new(&config.patterns).unwrap();
    let analysis = analyze_file(&config.input, &classifier).unwrap();
    assert_eq!(
        analysis.graph.edges(),
        vec![DependencyEdge::new("util.c", "util.h")]
    );
}
