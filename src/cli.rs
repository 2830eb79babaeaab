//! CLI argument parsing for buildtrace

use crate::config::AnalysisConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the report printed to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary table (default)
    Text,
    /// JSON report for machine parsing
    Json,
    /// Syscall table as CSV
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "buildtrace")]
#[command(version)]
#[command(
    about = "Recover syscall statistics and header dependencies from an strace log of a C build",
    long_about = None
)]
pub struct Cli {
    /// Trace log to analyze (overrides `input` from the config file)
    #[arg(value_name = "LOG")]
    pub log: Option<PathBuf>,

    /// Load settings from a TOML config file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Report format printed to stdout
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Only show the N most frequent syscalls in the report
    #[arg(short = 'n', long = "top", value_name = "N")]
    pub top: Option<usize>,

    /// Include the topological build order in the report
    #[arg(long = "order")]
    pub order: bool,

    /// List headers before the sources that opened them when printing the order
    #[arg(long = "headers-first", requires = "order")]
    pub headers_first: bool,

    /// Do not print a report, only write artifacts
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Write the syscall table as CSV
    #[arg(long = "syscall-csv", value_name = "PATH")]
    pub syscall_csv: Option<PathBuf>,

    /// Write the syscall table as JSON
    #[arg(long = "syscall-json", value_name = "PATH")]
    pub syscall_json: Option<PathBuf>,

    /// Write the dependency map as JSON
    #[arg(long = "deps-json", value_name = "PATH")]
    pub deps_json: Option<PathBuf>,

    /// Write the flattened dependency edges as CSV
    #[arg(long = "edges-csv", value_name = "PATH")]
    pub edges_csv: Option<PathBuf>,

    /// Write the build order, one file per line
    #[arg(long = "order-out", value_name = "PATH")]
    pub order_out: Option<PathBuf>,

    /// Enable debug logging to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Apply command-line overrides on top of a loaded configuration
    pub fn apply_overrides(&self, config: &mut AnalysisConfig) {
        if let Some(log) = &self.log {
            config.input = log.clone();
        }

        let outputs = &mut config.outputs;
        for (flag, slot) in [
            (&self.syscall_csv, &mut outputs.syscall_table),
            (&self.syscall_json, &mut outputs.syscall_json),
            (&self.deps_json, &mut outputs.dependency_map),
            (&self.edges_csv, &mut outputs.edge_list),
            (&self.order_out, &mut outputs.build_order),
        ] {
            if let Some(path) = flag {
                *slot = Some(path.clone());
            }
        }
    }
}
