//! Test fixtures for mission-planner.
//!
//! Table builders shared by the integration tests:
//! - small terrain grids with named POI cells
//! - hand-written directed tables for exact budget scenarios

#![allow(dead_code)]

use mission_planner::NodeId;
use mission_planner::config::{MissionConfig, OptimizerOptions, PlannerConfig};
use mission_planner::tables::MatrixTables;
use mission_planner::terrain::{GridTables, TerrainGrid};

/// 3x3 flat grid with the base in the top-left corner and POIs in the other
/// three corners: (0, 2), (2, 2), (2, 0).
pub fn corner_grid() -> (GridTables, Vec<NodeId>) {
    let grid = TerrainGrid::from_rows(&["...", "...", "..."]).expect("valid grid");
    let pois = vec![grid.node_id(0, 2), grid.node_id(2, 2), grid.node_id(2, 0)];
    let tables = GridTables::build(&grid, 0, &pois).expect("tables");
    (tables, pois)
}

/// Grid whose right column is walled off; the POI at (0, 4) cannot be reached.
pub fn walled_grid() -> (GridTables, Vec<NodeId>, NodeId) {
    let grid = TerrainGrid::from_rows(&["...X.", "...X.", "...X."]).expect("valid grid");
    let isolated = grid.node_id(0, 4);
    let pois = vec![grid.node_id(0, 2), isolated, grid.node_id(2, 2), grid.node_id(2, 0)];
    let tables = GridTables::build(&grid, 0, &pois).expect("tables");
    (tables, pois, isolated)
}

/// Base 0 and POIs 1..=n on a ring: neighbors are 1 apart, every POI is
/// `spoke` away from the base in both directions.
pub fn ring(n: usize, spoke: f64) -> MatrixTables {
    let mut tables = MatrixTables::new(0);
    for a in 1..=n {
        tables = tables.with_symmetric_edge(0, a, spoke);
        for b in 1..=n {
            if a != b {
                let gap = a.abs_diff(b).min(n - a.abs_diff(b)) as f64;
                tables = tables.with_edge(a, b, gap);
            }
        }
    }
    tables
}

pub fn mission(max_battery: f64) -> MissionConfig {
    MissionConfig {
        max_battery,
        ..MissionConfig::default()
    }
}

pub fn config(max_battery: f64, generations: usize) -> PlannerConfig {
    PlannerConfig {
        mission: mission(max_battery),
        optimizer: OptimizerOptions {
            population_size: 30,
            generations,
            ..OptimizerOptions::default()
        },
        ..PlannerConfig::default()
    }
}
