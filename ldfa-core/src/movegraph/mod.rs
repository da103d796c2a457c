//! Move graph (`spec.md` §4.5): an acyclic graph of named nodes connected by
//! named edges, each carrying pre-guards, a change vector (`spec.md` §4.4),
//! and post-guards. Compiled by [`eval::evaluate`] into a single operator,
//! "apply one ply to a set of positions".
pub mod dnf;
pub mod eval;

use std::collections::HashSet;

use crate::error::{LdfaError, Result};
use crate::ldfa::change::ChangeVector;
use crate::ldfa::Ldfa;

pub use eval::evaluate;

/// One edge: a named transition from node `from` to node `to`, guarded by
/// `pre_guards` before the change and `post_guards` after it.
#[derive(Clone)]
pub struct MoveEdge {
    pub name: String,
    pub from: usize,
    pub to: usize,
    pub pre_guards: Vec<Ldfa>,
    pub change: ChangeVector,
    pub post_guards: Vec<Ldfa>,
}

/// A graph of nodes `0..len`, topologically ordered by construction: every
/// edge must go from a lower index to a strictly higher one. Node 0 is the
/// begin node, the last node the end node.
#[derive(Clone, Default)]
pub struct MoveGraph {
    nodes: Vec<String>,
    node_names: HashSet<String>,
    edge_names: HashSet<String>,
    edges: Vec<MoveEdge>,
}

impl MoveGraph {
    pub fn new() -> Self {
        MoveGraph::default()
    }

    pub fn add_node(&mut self, name: impl Into<String>) -> Result<usize> {
        let name = name.into();
        if !self.node_names.insert(name.clone()) {
            return Err(LdfaError::DuplicateNodeName(name));
        }
        self.nodes.push(name);
        Ok(self.nodes.len() - 1)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_edge(
        &mut self,
        name: impl Into<String>,
        from: usize,
        to: usize,
        pre_guards: Vec<Ldfa>,
        change: ChangeVector,
        post_guards: Vec<Ldfa>,
    ) -> Result<()> {
        let name = name.into();
        if from >= self.nodes.len() {
            return Err(LdfaError::NoSuchNode(from));
        }
        if to >= self.nodes.len() {
            return Err(LdfaError::NoSuchNode(to));
        }
        if from >= to {
            return Err(LdfaError::OutOfOrderEdge { edge: name, from, to });
        }
        if !self.edge_names.insert(name.clone()) {
            return Err(LdfaError::DuplicateEdgeName(name));
        }
        self.edges.push(MoveEdge {
            name,
            from,
            to,
            pre_guards,
            change,
            post_guards,
        });
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node_name(&self, node: usize) -> &str {
        &self.nodes[node]
    }

    pub fn begin_node(&self) -> usize {
        0
    }

    pub fn end_node(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn edges_from(&self, node: usize) -> impl Iterator<Item = &MoveEdge> {
        self.edges.iter().filter(move |e| e.from == node)
    }

    /// The graph with every edge reversed: `from`/`to` swapped (with node
    /// indices flipped end-to-start so edges stay strictly forward),
    /// pre-guards and post-guards swapped, and every change descriptor's
    /// `(before, after)` pair swapped to `(after, before)`.
    pub fn reverse(&self) -> MoveGraph {
        let last = self.nodes.len() - 1;
        let nodes: Vec<String> = self.nodes.iter().rev().cloned().collect();
        let node_names = self.node_names.clone();
        let edge_names = self.edge_names.clone();

        let edges = self
            .edges
            .iter()
            .map(|e| {
                let change = e
                    .change
                    .iter()
                    .map(|d| d.map(|(before, after)| (after, before)))
                    .collect();
                MoveEdge {
                    name: e.name.clone(),
                    from: last - e.to,
                    to: last - e.from,
                    pre_guards: e.post_guards.clone(),
                    change,
                    post_guards: e.pre_guards.clone(),
                }
            })
            .collect();

        MoveGraph {
            nodes,
            node_names,
            edge_names,
            edges,
        }
    }
}
