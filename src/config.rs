//! Analysis configuration
//!
//! Input path, output destinations and line patterns are passed explicitly to each
//! component instead of being baked into the scanner. A configuration can be loaded
//! from a TOML file; every field has a default so partial files are accepted.
//!
//! # Example
//!
//! ```
//! use buildtrace::config::AnalysisConfig;
//!
//! let config: AnalysisConfig = toml::from_str(r#"
//!     input = "logs/make.strace"
//!
//!     [patterns]
//!     compilers = ["cc"]
//!
//!     [outputs]
//!     syscall_table = "syscall_stats.csv"
//! "#).unwrap();
//!
//! assert_eq!(config.patterns.compilers, vec!["cc".to_string()]);
//! assert_eq!(config.patterns.exec_marker, "execve");
//! assert!(config.validate().is_ok());
//! ```

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Trace log to scan
    #[serde(default = "default_input")]
    pub input: PathBuf,

    /// Line shapes recognised by the classifier
    pub patterns: PatternConfig,

    /// Artifact destinations
    pub outputs: OutputConfig,
}

fn default_input() -> PathBuf {
    PathBuf::from("build_logs/strace.log")
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            patterns: PatternConfig::default(),
            outputs: OutputConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load a configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| AnalysisError::InputUnavailable {
                path: path.to_path_buf(),
                source: e,
            })?;
        let config: Self = toml::from_str(&contents).map_err(|e| {
            AnalysisError::InvalidConfig(format!("{}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.input.as_os_str().is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "input path must not be empty".to_string(),
            ));
        }
        self.patterns.validate()
    }
}

/// Markers and suffixes that identify compiler invocations and header opens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Token marking a process-execution event
    #[serde(default = "default_exec_marker")]
    pub exec_marker: String,

    /// Compiler binary names; any one of them must appear on an exec line
    #[serde(default = "default_compilers")]
    pub compilers: Vec<String>,

    /// Token marking a file-open event
    #[serde(default = "default_open_marker")]
    pub open_marker: String,

    /// Suffixes of compiled source files
    #[serde(default = "default_source_suffixes")]
    pub source_suffixes: Vec<String>,

    /// Suffixes of header/include files
    #[serde(default = "default_header_suffixes")]
    pub header_suffixes: Vec<String>,
}

fn default_exec_marker() -> String {
    "execve".to_string()
}

fn default_compilers() -> Vec<String> {
    vec!["gcc".to_string(), "clang".to_string()]
}

fn default_open_marker() -> String {
    "openat".to_string()
}

fn default_source_suffixes() -> Vec<String> {
    vec![".c".to_string()]
}

fn default_header_suffixes() -> Vec<String> {
    vec![".h".to_string(), ".inc".to_string()]
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            exec_marker: default_exec_marker(),
            compilers: default_compilers(),
            open_marker: default_open_marker(),
            source_suffixes: default_source_suffixes(),
            header_suffixes: default_header_suffixes(),
        }
    }
}

impl PatternConfig {
    /// Validate markers and suffix lists
    pub fn validate(&self) -> Result<()> {
        if self.exec_marker.is_empty() || self.open_marker.is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "exec_marker and open_marker must not be empty".to_string(),
            ));
        }

        if self.compilers.is_empty() || self.compilers.iter().any(|c| c.is_empty()) {
            return Err(AnalysisError::InvalidConfig(
                "compilers must list at least one non-empty name".to_string(),
            ));
        }

        for (field, suffixes) in [
            ("source_suffixes", &self.source_suffixes),
            ("header_suffixes", &self.header_suffixes),
        ] {
            if suffixes.is_empty() {
                return Err(AnalysisError::InvalidConfig(format!(
                    "{} must not be empty",
                    field
                )));
            }
            if let Some(bad) = suffixes.iter().find(|s| !s.starts_with('.') || s.len() < 2) {
                return Err(AnalysisError::InvalidConfig(format!(
                    "{} entries must look like \".ext\", got {:?}",
                    field, bad
                )));
            }
        }

        Ok(())
    }
}

/// Where exported artifacts are written; `None` skips that artifact
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Syscall frequency table as CSV (`syscall,count,percentage`)
    pub syscall_table: Option<PathBuf>,

    /// Syscall frequency table as JSON rows
    pub syscall_json: Option<PathBuf>,

    /// Dependency map as JSON (`{source: [headers]}`)
    pub dependency_map: Option<PathBuf>,

    /// Flattened dependency edges as CSV (`source,target`)
    pub edge_list: Option<PathBuf>,

    /// Topological build order, one node per line
    pub build_order: Option<PathBuf>,
}

impl OutputConfig {
    /// True if no artifact destination is configured
    pub fn is_empty(&self) -> bool {
        self.syscall_table.is_none()
            && self.syscall_json.is_none()
            && self.dependency_map.is_none()
            && self.edge_list.is_none()
            && self.build_order.is_none()
    }
}
