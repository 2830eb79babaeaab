//! Error taxonomy for trace analysis
//!
//! Parsing-level problems never surface here: a line that matches no known shape is
//! simply skipped. Only structural failures (missing input, unorderable graph, failed
//! export, unusable configuration) propagate to the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while analyzing a build trace
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Trace log unavailable: {path}: {source}")]
    InputUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Dependency cycle detected: {} node(s) could not be ordered: {}",
        .unresolved.len(),
        .unresolved.join(", ")
    )]
    CycleDetected { unresolved: Vec<String> },

    #[error("Failed to write artifact {path}: {source}")]
    ExportFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid trace pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl AnalysisError {
    /// Nodes left unordered when a cycle was detected (empty for other variants)
    pub fn unresolved_nodes(&self) -> &[String] {
        match self {
            AnalysisError::CycleDetected { unresolved } => unresolved,
            _ => &[],
        }
    }
}

/// Result type for trace analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_names_nodes() {
        let err = AnalysisError::CycleDetected {
            unresolved: vec!["a.c".to_string(), "b.h".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("2 node(s)"));
        assert!(msg.contains("a.c, b.h"));
        assert_eq!(err.unresolved_nodes().len(), 2);
    }

    #[test]
    fn test_input_unavailable_includes_path() {
        let err = AnalysisError::InputUnavailable {
            path: PathBuf::from("/no/such/strace.log"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("/no/such/strace.log"));
        assert!(err.unresolved_nodes().is_empty());
    }
}
