//! Single-pass trace scan
//!
//! Reads a trace log line by line and feeds every line to both the syscall tally and
//! the dependency graph builder. The two accumulators share nothing, so fusing them
//! into one pass gives the same result as two separate passes.
//!
//! Lines are split on `\n`, a trailing `\r` is dropped, and bytes that are not valid
//! UTF-8 are dropped rather than aborting the scan.

use crate::classifier::{Classifier, LineClass};
use crate::dependency::{DependencyGraph, DependencyGraphBuilder};
use crate::error::{AnalysisError, Result};
use crate::stats::SyscallTally;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Line counts collected during a scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Lines read from the log
    pub lines: u64,
    /// Lines with the syscall shape (equals the tally total)
    pub syscall_lines: u64,
    /// Compiler invocation lines
    pub compile_invocations: u64,
    /// Header-open lines, including those seen before any compile target
    pub header_opens: u64,
    /// Distinct dependency edges recorded
    pub edges: u64,
}

/// Result of scanning one trace log
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub tally: SyscallTally,
    pub graph: DependencyGraph,
    pub summary: ScanSummary,
}

/// Incremental analyzer that can be fed lines one at a time
#[derive(Debug)]
pub struct Analyzer<'c> {
    classifier: &'c Classifier,
    tally: SyscallTally,
    builder: DependencyGraphBuilder,
    lines: u64,
}

impl<'c> Analyzer<'c> {
    pub fn new(classifier: &'c Classifier) -> Self {
        Self {
            classifier,
            tally: SyscallTally::new(),
            builder: DependencyGraphBuilder::new(),
            lines: 0,
        }
    }

    /// Process one line (without its newline)
    pub fn process_line(&mut self, raw: &str) {
        self.lines += 1;
        let line = self.classifier.inspect(raw);

        if let Some(name) = line.syscall {
            self.tally.record(name);
        }
        if line.class != LineClass::NoMatch {
            self.builder.feed(&line.class);
        }
    }

    /// Finish the scan
    pub fn finish(self) -> Analysis {
        let summary = ScanSummary {
            lines: self.lines,
            syscall_lines: self.tally.total(),
            compile_invocations: self.builder.compile_invocations(),
            header_opens: self.builder.header_opens(),
            edges: 0,
        };
        let graph = self.builder.finish();
        let summary = ScanSummary {
            edges: graph.edge_count() as u64,
            ..summary
        };

        tracing::info!(
            lines = summary.lines,
            syscalls = summary.syscall_lines,
            unique_syscalls = self.tally.len(),
            compile_targets = summary.compile_invocations,
            edges = summary.edges,
            "trace scan complete"
        );

        Analysis {
            tally: self.tally,
            graph,
            summary,
        }
    }
}

/// Scan an already-open reader
///
/// `path` is only used to label read errors.
pub fn analyze_reader<R: BufRead>(
    mut reader: R,
    classifier: &Classifier,
    path: &Path,
) -> Result<Analysis> {
    let mut analyzer = Analyzer::new(classifier);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| AnalysisError::InputUnavailable {
                path: path.to_path_buf(),
                source: e,
            })?;
        if read == 0 {
            break;
        }

        let line = trim_line_ending(&buf);
        analyzer.process_line(&decode_line(line));
    }

    Ok(analyzer.finish())
}

/// Scan a trace log file
///
/// The file handle is dropped on every exit path, including read failures.
pub fn analyze_file(path: &Path, classifier: &Classifier) -> Result<Analysis> {
    tracing::debug!(path = %path.display(), "opening trace log");
    let file = File::open(path).map_err(|e| AnalysisError::InputUnavailable {
        path: path.to_path_buf(),
        source: e,
    })?;
    analyze_reader(BufReader::new(file), classifier, path)
}

/// Decode a raw line, discarding invalid UTF-8 sequences
///
/// Discarding keeps the surrounding text contiguous, so a stray byte inside a pid or a
/// quoted path does not break the match.
pub fn decode_line(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()),
    }
}

fn trim_line_ending(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}
