//! Source → header dependency graph recovered from a build trace
//!
//! The scan is a left-to-right fold over classified lines. [`ScanState`] carries the
//! active compile target; each step returns the next state plus an optional
//! [`DependencyEdge`]. [`DependencyGraph`] collects the edges, keeping headers unique
//! per source in first-observed order.
//!
//! # Example
//!
//! ```
//! use buildtrace::classifier::Classifier;
//! use buildtrace::dependency::DependencyGraphBuilder;
//!
//! let classifier = Classifier::default();
//! let mut builder = DependencyGraphBuilder::new();
//! for line in [
//!     r#"1 execve("/usr/bin/gcc", ["gcc","-c","shell.c"], ...) = 0"#,
//!     r#"2 openat(AT_FDCWD, "sqlite3.h", O_RDONLY) = 3"#,
//! ] {
//!     builder.feed(&classifier.classify(line));
//! }
//!
//! let graph = builder.finish();
//! assert_eq!(graph.headers_of("shell.c"), Some(&["sqlite3.h".to_string()][..]));
//! ```

use crate::classifier::LineClass;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// An observed (source, header) relationship
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub source: String,
    pub target: String,
}

impl DependencyEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Scan accumulator: the compile target active at the current line
///
/// Only a compiler invocation changes the target; no other line resets it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanState {
    current_target: Option<String>,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Active compile target, if any compiler invocation has been seen
    pub fn current_target(&self) -> Option<&str> {
        self.current_target.as_deref()
    }

    /// Advance over one classified line
    ///
    /// Returns the next state and the edge the line proposes, if any. Header opens
    /// seen before the first compiler invocation propose nothing.
    pub fn advance(self, class: &LineClass<'_>) -> (Self, Option<DependencyEdge>) {
        match class {
            LineClass::CompileInvocation { target } => (
                Self {
                    current_target: Some((*target).to_string()),
                },
                None,
            ),
            LineClass::HeaderOpen { header } => {
                let edge = self
                    .current_target
                    .as_ref()
                    .map(|source| DependencyEdge::new(source.clone(), *header));
                (self, edge)
            }
            LineClass::NoMatch => (self, None),
        }
    }
}

/// Mapping from compile target to its unique headers in first-observed order
///
/// Sources are kept in the order their first header was recorded. A target only
/// appears once it has at least one header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    entries: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
    seen: HashSet<(usize, String)>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a graph from a flat edge list
    ///
    /// Duplicate edges collapse; order follows first occurrence.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = DependencyEdge>,
    {
        let mut graph = Self::new();
        for edge in edges {
            graph.insert(&edge.source, &edge.target);
        }
        graph
    }

    /// Record `source → header`; returns false if the edge already exists
    pub fn insert(&mut self, source: &str, header: &str) -> bool {
        let pos = match self.index.get(source) {
            Some(&pos) => pos,
            None => {
                let pos = self.entries.len();
                self.index.insert(source.to_string(), pos);
                self.entries.push((source.to_string(), Vec::new()));
                pos
            }
        };

        if !self.seen.insert((pos, header.to_string())) {
            return false;
        }
        self.entries[pos].1.push(header.to_string());
        true
    }

    /// Headers recorded for a source
    pub fn headers_of(&self, source: &str) -> Option<&[String]> {
        self.index
            .get(source)
            .map(|&pos| self.entries[pos].1.as_slice())
    }

    /// Sources in insertion order
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(source, _)| source.as_str())
    }

    /// `(source, headers)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(source, headers)| (source.as_str(), headers.as_slice()))
    }

    /// Flattened edge list: sources in insertion order, headers in observed order
    pub fn edges(&self) -> Vec<DependencyEdge> {
        self.iter()
            .flat_map(|(source, headers)| {
                headers
                    .iter()
                    .map(move |header| DependencyEdge::new(source, header.as_str()))
            })
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.seen.len()
    }

    /// Number of distinct names appearing as a source or a header
    pub fn node_count(&self) -> usize {
        let mut nodes: HashSet<&str> = HashSet::new();
        for (source, headers) in self.iter() {
            nodes.insert(source);
            nodes.extend(headers.iter().map(String::as_str));
        }
        nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for DependencyGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (source, headers) in &self.entries {
            map.serialize_entry(source, headers)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DependencyGraph {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GraphVisitor;

        impl<'de> Visitor<'de> for GraphVisitor {
            type Value = DependencyGraph;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map from source file to a list of header files")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut graph = DependencyGraph::new();
                while let Some((source, headers)) = access.next_entry::<String, Vec<String>>()? {
                    for header in &headers {
                        graph.insert(&source, header);
                    }
                }
                Ok(graph)
            }
        }

        deserializer.deserialize_map(GraphVisitor)
    }
}

/// Drives [`ScanState`] over classified lines and owns the graph under construction
#[derive(Debug, Default)]
pub struct DependencyGraphBuilder {
    state: ScanState,
    graph: DependencyGraph,
    compile_invocations: u64,
    header_opens: u64,
}

impl DependencyGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one classified line
    pub fn feed(&mut self, class: &LineClass<'_>) {
        match class {
            LineClass::CompileInvocation { target } => {
                self.compile_invocations += 1;
                tracing::debug!(source = *target, "compile target changed");
            }
            LineClass::HeaderOpen { .. } => self.header_opens += 1,
            LineClass::NoMatch => {}
        }

        let (next, edge) = std::mem::take(&mut self.state).advance(class);
        self.state = next;

        if let Some(edge) = edge {
            if self.graph.insert(&edge.source, &edge.target) {
                tracing::trace!(source = %edge.source, header = %edge.target, "dependency edge");
            }
        }
    }

    /// Active compile target
    pub fn current_target(&self) -> Option<&str> {
        self.state.current_target()
    }

    /// Compiler invocation lines seen so far
    pub fn compile_invocations(&self) -> u64 {
        self.compile_invocations
    }

    /// Header-open lines seen so far, with or without an active target
    pub fn header_opens(&self) -> u64 {
        self.header_opens
    }

    /// Finish the scan and hand over the graph
    pub fn finish(self) -> DependencyGraph {
        self.graph
    }
}
