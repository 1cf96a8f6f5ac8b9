//! Core domain traits for the mission planner.
//!
//! The planner never builds the navigable graph itself. Anything that can
//! answer directed cost and path queries between relevant nodes can drive it.

use crate::path::Path;

/// Node identifier in the navigable graph.
pub type NodeId = usize;

/// Read-only distance/path lookup produced once per mission.
///
/// Costs are directed: `distance(u, v)` need not equal `distance(v, u)`.
pub trait ResourceTables {
    /// The fixed start/end node of every trip.
    fn base(&self) -> NodeId;

    /// Whether the tables know this node at all.
    fn contains(&self, node: NodeId) -> bool;

    /// Traversal cost from `from` to `to`, or `None` when unreachable.
    fn distance(&self, from: NodeId, to: NodeId) -> Option<f64>;

    /// Waypoints from `from` to `to`, or `None` when unreachable.
    fn path(&self, from: NodeId, to: NodeId) -> Option<&Path>;
}
