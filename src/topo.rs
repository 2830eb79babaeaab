//! Build-order derivation via Kahn's algorithm
//!
//! Every source and header in a [`DependencyGraph`] becomes a node and every
//! `(source, header)` pair a directed edge `source → header`. Nodes with in-degree
//! zero are processed FIFO in the order they are first seen while walking the edge
//! list, so the result is reproducible for a given graph.
//!
//! Edges are taken literally: a source is placed before the headers it opened. A
//! compiler needs the reverse (headers before the sources including them); callers
//! that want that order can reverse the result.
//!
//! # Example
//!
//! ```
//! use buildtrace::dependency::{DependencyEdge, DependencyGraph};
//! use buildtrace::topo::topological_order;
//!
//! let graph = DependencyGraph::from_edges([
//!     DependencyEdge::new("sqlite3.c", "sqlite3.h"),
//!     DependencyEdge::new("sqlite3.c", "stdlib.h"),
//! ]);
//! let order = topological_order(&graph).unwrap();
//! assert_eq!(order.nodes(), &["sqlite3.c", "sqlite3.h", "stdlib.h"]);
//! ```

use crate::dependency::DependencyGraph;
use crate::error::{AnalysisError, Result};
use std::collections::{HashMap, VecDeque};

/// Linear ordering of every node in a dependency graph
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TopoOrder {
    nodes: Vec<String>,
}

impl TopoOrder {
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Position of a node in the order
    pub fn position(&self, node: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n == node)
    }

    /// Reverse the order so headers come before the sources that opened them
    pub fn reversed(&self) -> Self {
        Self {
            nodes: self.nodes.iter().rev().cloned().collect(),
        }
    }

    pub fn into_nodes(self) -> Vec<String> {
        self.nodes
    }
}

/// Node table built from a graph: names in first-seen order plus adjacency by index
struct NodeTable<'a> {
    names: Vec<&'a str>,
    successors: Vec<Vec<usize>>,
    in_degree: Vec<usize>,
}

impl<'a> NodeTable<'a> {
    fn from_graph(graph: &'a DependencyGraph) -> Self {
        let mut table = Self {
            names: Vec::new(),
            successors: Vec::new(),
            in_degree: Vec::new(),
        };
        let mut ids: HashMap<&'a str, usize> = HashMap::new();

        for (source, headers) in graph.iter() {
            for header in headers {
                let from = table.intern(&mut ids, source);
                let to = table.intern(&mut ids, header.as_str());
                table.successors[from].push(to);
                table.in_degree[to] += 1;
            }
        }

        table
    }

    fn intern(&mut self, ids: &mut HashMap<&'a str, usize>, name: &'a str) -> usize {
        *ids.entry(name).or_insert_with(|| {
            self.names.push(name);
            self.successors.push(Vec::new());
            self.in_degree.push(0);
            self.names.len() - 1
        })
    }
}

/// Compute a topological order of the graph
///
/// # Errors
///
/// Returns [`AnalysisError::CycleDetected`] naming every node that could not be
/// ordered (in first-seen order) when the graph contains a cycle.
pub fn topological_order(graph: &DependencyGraph) -> Result<TopoOrder> {
    let NodeTable {
        names,
        successors,
        mut in_degree,
    } = NodeTable::from_graph(graph);

    let mut queue: VecDeque<usize> = (0..names.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(names.len());

    while let Some(node) = queue.pop_front() {
        order.push(node);
        for &next in &successors[node] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    if order.len() < names.len() {
        let unresolved: Vec<String> = (0..names.len())
            .filter(|&i| in_degree[i] > 0)
            .map(|i| names[i].to_string())
            .collect();
        tracing::warn!(
            ordered = order.len(),
            unresolved = unresolved.len(),
            "dependency graph contains a cycle"
        );
        return Err(AnalysisError::CycleDetected { unresolved });
    }

    Ok(TopoOrder {
        nodes: order.into_iter().map(|i| names[i].to_string()).collect(),
    })
}
