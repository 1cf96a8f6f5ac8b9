//! Error types for the planner.
//!
//! Only contract violations are errors. Running out of battery or memory,
//! or hitting an unreachable leg, is reported as an infeasible plan.

use thiserror::Error;

use crate::traits::NodeId;

pub type PlanResult<T> = Result<T, PlanError>;

#[derive(Debug, Error)]
pub enum PlanError {
    /// A tour or pool references a node the tables know nothing about.
    #[error("node {0} is not present in the resource tables")]
    UnknownNode(NodeId),

    #[error("base node {0} cannot be a point of interest")]
    BaseAsPoi(NodeId),

    #[error("node {0} appears more than once in the candidate pool")]
    DuplicatePoi(NodeId),

    #[error("selection mask has length {actual}, pool has {expected} members")]
    MaskLengthMismatch { expected: usize, actual: usize },

    #[error("visiting order is not a permutation of the {pool_size} pool members")]
    NotAPermutation { pool_size: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("invalid terrain grid: {0}")]
    InvalidGrid(String),
}
