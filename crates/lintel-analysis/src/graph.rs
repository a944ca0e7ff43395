//! Dependency graph over project-relative asset ids, with cycle detection.

use std::collections::HashMap;

use rustworkx_core::petgraph::algo::is_cyclic_directed;
use rustworkx_core::petgraph::graph::{DiGraph, NodeIndex};
use serde_json::json;

use lintel_core::{ErrorCode, FileType, IssueKind, Severity, ValidationIssue};

use crate::parsers::ParsedFile;
use crate::references::Reference;

/// A cycle found by [`DependencyGraph::find_cycles`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    /// Node the traversal started from; the issue is attributed here.
    pub root: String,
    /// The closed chain, first and last element equal.
    pub chain: Vec<String>,
}

impl Cycle {
    #[must_use]
    pub fn to_issue(&self) -> ValidationIssue {
        ValidationIssue::new(
            Severity::Warning,
            IssueKind::CircularDependency,
            ErrorCode::CircularDependency,
            self.root.clone(),
            format!(
                "Circular dependency detected in component references: {}",
                self.chain.join(" -> ")
            ),
        )
        .with_fix("Review dependency chain and remove circular references")
        .with_context(json!({ "cycle": self.chain }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

struct Frame {
    node: NodeIndex,
    successors: Vec<NodeIndex>,
    next: usize,
}

/// Directed graph `from -> to` meaning "from references to".
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    id_to_index: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes for every parsed agent and task (in the given order), then one
    /// edge per resolved agent/task reference.
    #[must_use]
    pub fn build(parsed: &[ParsedFile], references: &[Reference]) -> Self {
        let mut graph = Self::new();
        for file in parsed
            .iter()
            .filter(|file| matches!(file.file_type, FileType::Agent | FileType::Task))
        {
            graph.add_node(&file.path.to_string_lossy().replace('\\', "/"));
        }
        for reference in references.iter().filter(|reference| reference.is_edge()) {
            graph.add_edge(&reference.source, &reference.target_id);
        }
        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "dependency graph built"
        );
        graph
    }

    /// Index of `id`, inserting it if absent.
    pub fn add_node(&mut self, id: &str) -> NodeIndex {
        if let Some(&index) = self.id_to_index.get(id) {
            return index;
        }
        let index = self.graph.add_node(id.to_string());
        self.id_to_index.insert(id.to_string(), index);
        index
    }

    /// Add `from -> to`. Repeated edges collapse into one.
    pub fn add_edge(&mut self, from: &str, to: &str) {
        let from = self.add_node(from);
        let to = self.add_node(to);
        self.graph.update_edge(from, to, ());
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.id_to_index.contains_key(id)
    }

    /// Direct successors of `id`, in the order their edges were added.
    #[must_use]
    pub fn neighbors(&self, id: &str) -> Vec<&str> {
        self.id_to_index
            .get(id)
            .map(|&index| {
                self.successors(index)
                    .into_iter()
                    .map(|next| self.graph[next].as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Three-colour depth-first search with an explicit stack.
    ///
    /// Roots are visited in node insertion order. Each traversal reports at
    /// most one cycle (its first back edge) and then runs to completion, so
    /// every node of a cycle turns black and is not reported again from a
    /// later root.
    #[must_use]
    pub fn find_cycles(&self) -> Vec<Cycle> {
        let mut color = vec![Color::White; self.graph.node_count()];
        let mut cycles = Vec::new();

        for root in self.graph.node_indices() {
            if color[root.index()] != Color::White {
                continue;
            }
            let mut reported = false;
            let mut path: Vec<NodeIndex> = vec![root];
            let mut stack = vec![self.frame(root)];
            color[root.index()] = Color::Gray;

            while let Some(frame) = stack.last_mut() {
                let Some(&next) = frame.successors.get(frame.next) else {
                    color[frame.node.index()] = Color::Black;
                    stack.pop();
                    path.pop();
                    continue;
                };
                frame.next += 1;

                match color[next.index()] {
                    Color::White => {
                        color[next.index()] = Color::Gray;
                        path.push(next);
                        stack.push(self.frame(next));
                    }
                    Color::Gray if !reported => {
                        reported = true;
                        let start = path.iter().position(|&node| node == next).unwrap_or(0);
                        let chain = path[start..]
                            .iter()
                            .chain(std::iter::once(&next))
                            .map(|&node| self.graph[node].clone())
                            .collect();
                        cycles.push(Cycle {
                            root: self.graph[root].clone(),
                            chain,
                        });
                    }
                    Color::Gray | Color::Black => {}
                }
            }
        }

        tracing::debug!(cycles = cycles.len(), "cycle detection complete");
        cycles
    }

    fn frame(&self, node: NodeIndex) -> Frame {
        Frame {
            node,
            successors: self.successors(node),
            next: 0,
        }
    }

    fn successors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        // petgraph yields the most recently added edge first
        let mut successors: Vec<NodeIndex> = self.graph.neighbors(node).collect();
        successors.reverse();
        successors
    }
}
