//! Explicit directed distance/path tables.
//!
//! Useful when the caller already has costs from elsewhere (another router,
//! a survey tool, a test fixture).

use std::collections::{HashMap, HashSet};

use crate::path::Path;
use crate::traits::{NodeId, ResourceTables};

#[derive(Debug, Clone)]
struct Entry {
    cost: f64,
    path: Path,
}

/// Directed lookup table keyed by (origin, destination).
///
/// Missing entries are unreachable. A node always reaches itself at zero cost.
#[derive(Debug, Clone)]
pub struct MatrixTables {
    base: NodeId,
    nodes: HashSet<NodeId>,
    entries: HashMap<(NodeId, NodeId), Entry>,
}

impl MatrixTables {
    pub fn new(base: NodeId) -> Self {
        let mut nodes = HashSet::new();
        nodes.insert(base);
        Self {
            base,
            nodes,
            entries: HashMap::new(),
        }
    }

    /// Registers a node with no edges, e.g. an isolated POI.
    pub fn with_node(mut self, node: NodeId) -> Self {
        self.nodes.insert(node);
        self
    }

    /// Adds a one-way entry with a direct two-waypoint path.
    pub fn with_edge(self, from: NodeId, to: NodeId, cost: f64) -> Self {
        self.with_path(from, to, cost, Path::new(vec![from, to]))
    }

    /// Adds the same cost in both directions.
    pub fn with_symmetric_edge(self, a: NodeId, b: NodeId, cost: f64) -> Self {
        self.with_edge(a, b, cost).with_edge(b, a, cost)
    }

    pub fn with_path(mut self, from: NodeId, to: NodeId, cost: f64, path: Path) -> Self {
        self.insert(from, to, cost, path);
        self
    }

    pub fn insert(&mut self, from: NodeId, to: NodeId, cost: f64, path: Path) {
        self.nodes.insert(from);
        self.nodes.insert(to);
        self.entries.insert((from, to), Entry { cost, path });
    }
}

impl ResourceTables for MatrixTables {
    fn base(&self) -> NodeId {
        self.base
    }

    fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    fn distance(&self, from: NodeId, to: NodeId) -> Option<f64> {
        if from == to && self.contains(from) {
            return Some(0.0);
        }
        self.entries.get(&(from, to)).map(|entry| entry.cost)
    }

    fn path(&self, from: NodeId, to: NodeId) -> Option<&Path> {
        self.entries.get(&(from, to)).map(|entry| &entry.path)
    }
}
