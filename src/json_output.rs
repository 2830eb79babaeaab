//! JSON output for analysis reports

use crate::dependency::DependencyGraph;
use crate::scan::{Analysis, ScanSummary};
use crate::stats::SyscallTally;
use crate::topo::TopoOrder;
use serde::{Deserialize, Serialize};

/// One row of the syscall frequency table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSyscallRow {
    /// Syscall name (e.g., "openat", "read")
    pub syscall: String,
    /// Occurrences in the trace
    pub count: u64,
    /// Share of all syscalls, three decimals (e.g., "75.000%")
    pub percentage: String,
}

/// Build-order section of the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JsonBuildOrder {
    Ordered { nodes: Vec<String> },
    Cycle { unresolved: Vec<String> },
}

/// Root JSON report structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    /// Format version identifier
    pub version: String,
    /// Format name
    pub format: String,
    /// Input log the report was computed from
    pub input: String,
    /// Line counts from the scan
    pub summary: ScanSummary,
    /// Syscall table, descending by count
    pub syscalls: Vec<JsonSyscallRow>,
    /// Source file -> headers it opened
    pub dependencies: DependencyGraph,
    /// Build order (if requested)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_order: Option<JsonBuildOrder>,
}

impl JsonReport {
    /// Create a report from a finished analysis
    pub fn new(input: &str, analysis: &Analysis, limit: Option<usize>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "buildtrace-json-v1".to_string(),
            input: input.to_string(),
            summary: analysis.summary,
            syscalls: syscall_rows(&analysis.tally, limit),
            dependencies: analysis.graph.clone(),
            build_order: None,
        }
    }

    /// Attach a build order
    pub fn set_build_order(&mut self, order: &TopoOrder) {
        self.build_order = Some(JsonBuildOrder::Ordered {
            nodes: order.nodes().to_vec(),
        });
    }

    /// Attach the nodes left over by a cycle
    pub fn set_cycle(&mut self, unresolved: &[String]) {
        self.build_order = Some(JsonBuildOrder::Cycle {
            unresolved: unresolved.to_vec(),
        });
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Syscall table rows, descending by count; `limit` keeps only the top entries
pub fn syscall_rows(tally: &SyscallTally, limit: Option<usize>) -> Vec<JsonSyscallRow> {
    let rows = match limit {
        Some(n) => tally.top(n),
        None => tally.sorted(),
    };
    rows.into_iter()
        .map(|row| JsonSyscallRow {
            syscall: row.name.clone(),
            count: row.count,
            percentage: tally.format_percentage(row.count),
        })
        .collect()
}

/// Syscall table as a pretty JSON array
pub fn syscall_table_json(tally: &SyscallTally) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&syscall_rows(tally, None))
}

/// Dependency map as pretty JSON (`{"a.c": ["a.h", ...]}`), in scan order
pub fn dependency_map_json(graph: &DependencyGraph) -> serde_json::Result<String> {
    serde_json::to_string_pretty(graph)
}
