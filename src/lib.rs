//! buildtrace - syscall statistics and header dependency graphs from C build traces
//!
//! This library scans an strace-style log captured during a C build and recovers
//! a syscall frequency table and a source → header dependency graph, from which a
//! topological build order can be derived.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod csv_output;
pub mod dependency;
pub mod error;
pub mod export;
pub mod json_output;
pub mod scan;
pub mod stats;
pub mod topo;

pub use error::{AnalysisError, Result};
