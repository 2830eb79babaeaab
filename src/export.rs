//! Artifact export
//!
//! Writes the syscall table and dependency graph to the destinations named in an
//! [`OutputConfig`]. A failed write aborts the export and is reported as
//! [`AnalysisError::ExportFailure`]; the analysis itself stays valid and can be
//! exported again elsewhere. The build order is passed in by the caller, so a cycle is
//! reported once, by whoever computed the order.

use crate::config::OutputConfig;
use crate::csv_output::{edge_list_csv, syscall_table_csv};
use crate::error::{AnalysisError, Result};
use crate::json_output::{dependency_map_json, syscall_table_json};
use crate::scan::Analysis;
use crate::topo::TopoOrder;
use std::path::{Path, PathBuf};

/// Writes analysis artifacts to configured destinations
#[derive(Debug, Clone)]
pub struct ArtifactExporter {
    outputs: OutputConfig,
}

impl ArtifactExporter {
    pub fn new(outputs: OutputConfig) -> Self {
        Self { outputs }
    }

    /// Whether a build-order destination is configured
    pub fn wants_build_order(&self) -> bool {
        self.outputs.build_order.is_some()
    }

    /// Write every configured artifact, returning the paths written
    ///
    /// `order` is the build order computed by the caller. When it is `None` (for
    /// example because the graph has a cycle) the build-order artifact is skipped.
    pub fn export(&self, analysis: &Analysis, order: Option<&TopoOrder>) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        if let Some(path) = &self.outputs.syscall_table {
            write_artifact(path, &syscall_table_csv(&analysis.tally))?;
            written.push(path.clone());
        }

        if let Some(path) = &self.outputs.syscall_json {
            write_artifact(path, &to_json_text(syscall_table_json(&analysis.tally), path)?)?;
            written.push(path.clone());
        }

        if let Some(path) = &self.outputs.dependency_map {
            write_artifact(path, &to_json_text(dependency_map_json(&analysis.graph), path)?)?;
            written.push(path.clone());
        }

        if let Some(path) = &self.outputs.edge_list {
            write_artifact(path, &edge_list_csv(&analysis.graph))?;
            written.push(path.clone());
        }

        if let Some(path) = &self.outputs.build_order {
            match order {
                Some(order) => {
                    write_artifact(path, &build_order_text(order))?;
                    written.push(path.clone());
                }
                None => {
                    tracing::warn!(path = %path.display(), "no build order available, skipping");
                }
            }
        }

        Ok(written)
    }
}

/// One node per line, newline-terminated
pub fn build_order_text(order: &TopoOrder) -> String {
    let mut text = String::new();
    for node in order.nodes() {
        text.push_str(node);
        text.push('\n');
    }
    text
}

/// Write `contents` to `path`, replacing any existing file
pub fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|e| AnalysisError::ExportFailure {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "artifact written");
    Ok(())
}

fn to_json_text(json: serde_json::Result<String>, path: &Path) -> Result<String> {
    json.map_err(|e| AnalysisError::ExportFailure {
        path: path.to_path_buf(),
        source: e.into(),
    })
}
