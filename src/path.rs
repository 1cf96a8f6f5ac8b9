//! Waypoint paths between table nodes.
//!
//! Paths are produced by the table provider and only carried through the
//! action profile. The planner never inspects individual waypoints.

use serde::{Deserialize, Serialize};

use crate::traits::NodeId;

/// An ordered waypoint sequence, origin and destination included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    nodes: Vec<NodeId>,
}

impl Path {
    pub fn new(nodes: Vec<NodeId>) -> Self {
        Self { nodes }
    }

    /// Returns the waypoint node ids.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Consumes the path and returns the owned waypoint ids.
    pub fn into_nodes(self) -> Vec<NodeId> {
        self.nodes
    }

    /// Converts waypoints to (row, col) cells of a grid with `width` columns.
    /// Returns no cells when `width` is 0.
    pub fn cells(&self, width: usize) -> Vec<(usize, usize)> {
        if width == 0 {
            return Vec::new();
        }
        self.nodes.iter().map(|&id| (id / width, id % width)).collect()
    }
}
