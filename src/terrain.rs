//! Terrain grid table provider.
//!
//! Builds directed cost/path tables between the base and every POI of a
//! discretized terrain grid. Moves are 8-connected and the energy spent on a
//! step depends on the terrain of the cell being entered.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PlanError, PlanResult};
use crate::path::Path;
use crate::tables::MatrixTables;
use crate::traits::{NodeId, ResourceTables};

/// Side length of one grid cell in meters.
const DEFAULT_CELL_SIZE_M: f64 = 1.0;

const MOVES: [(isize, isize); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

/// Terrain class of a navigable cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Flat,
    Rocks,
    Sand,
    Dunes,
}

impl Terrain {
    /// Energy spent per meter when entering a cell of this class.
    pub fn energy_factor(self) -> f64 {
        match self {
            Terrain::Flat => 1.0,
            Terrain::Rocks => 2.0,
            Terrain::Sand => 1.5,
            Terrain::Dunes => 2.5,
        }
    }

    fn from_symbol(symbol: char) -> Option<Option<Self>> {
        match symbol {
            '.' => Some(Some(Terrain::Flat)),
            'R' => Some(Some(Terrain::Rocks)),
            'S' => Some(Some(Terrain::Sand)),
            'D' => Some(Some(Terrain::Dunes)),
            'X' => Some(None),
            _ => None,
        }
    }
}

/// Rectangular grid of cells; `None` marks an obstacle.
#[derive(Debug, Clone)]
pub struct TerrainGrid {
    cells: Vec<Vec<Option<Terrain>>>,
    width: usize,
    cell_size_m: f64,
}

impl TerrainGrid {
    pub fn new(cells: Vec<Vec<Option<Terrain>>>) -> PlanResult<Self> {
        let width = cells.first().map(Vec::len).unwrap_or(0);
        if cells.is_empty() || width == 0 {
            return Err(PlanError::InvalidGrid("grid has no cells".to_string()));
        }
        if cells.iter().any(|row| row.len() != width) {
            return Err(PlanError::InvalidGrid("rows have different lengths".to_string()));
        }
        Ok(Self {
            cells,
            width,
            cell_size_m: DEFAULT_CELL_SIZE_M,
        })
    }

    /// Parses rows of symbols: `.` flat, `R` rocks, `S` sand, `D` dunes, `X` obstacle.
    pub fn from_rows(rows: &[&str]) -> PlanResult<Self> {
        let mut cells = Vec::with_capacity(rows.len());
        for row in rows {
            let parsed = row
                .chars()
                .map(|symbol| {
                    Terrain::from_symbol(symbol).ok_or_else(|| {
                        PlanError::InvalidGrid(format!("unknown terrain symbol '{symbol}'"))
                    })
                })
                .collect::<PlanResult<Vec<_>>>()?;
            cells.push(parsed);
        }
        Self::new(cells)
    }

    /// Sets the side length of a cell; must be finite and positive.
    pub fn with_cell_size(mut self, cell_size_m: f64) -> PlanResult<Self> {
        if !(cell_size_m.is_finite() && cell_size_m > 0.0) {
            return Err(PlanError::InvalidGrid(format!(
                "cell size must be a positive number, got {cell_size_m}"
            )));
        }
        self.cell_size_m = cell_size_m;
        Ok(self)
    }

    pub fn height(&self) -> usize {
        self.cells.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn node_id(&self, row: usize, col: usize) -> NodeId {
        row * self.width + col
    }

    pub fn cell_of(&self, node: NodeId) -> (usize, usize) {
        (node / self.width, node % self.width)
    }

    /// Terrain of a node, or `None` for obstacles and out-of-range ids.
    pub fn terrain(&self, node: NodeId) -> Option<Terrain> {
        let (row, col) = self.cell_of(node);
        self.cells.get(row).and_then(|cells| cells.get(col)).copied().flatten()
    }

    fn neighbors(&self, node: NodeId) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        let (row, col) = self.cell_of(node);
        MOVES.iter().filter_map(move |&(dr, dc)| {
            let r = row.checked_add_signed(dr)?;
            let c = col.checked_add_signed(dc)?;
            if r >= self.height() || c >= self.width {
                return None;
            }
            let next = self.node_id(r, c);
            let terrain = self.terrain(next)?;
            let step = if dr == 0 || dc == 0 {
                self.cell_size_m
            } else {
                self.cell_size_m * std::f64::consts::SQRT_2
            };
            Some((next, terrain.energy_factor() * step))
        })
    }

    /// Single-source shortest energy costs and predecessor links.
    fn shortest_from(&self, source: NodeId) -> (Vec<f64>, Vec<Option<NodeId>>) {
        let count = self.height() * self.width;
        let mut dist = vec![f64::INFINITY; count];
        let mut prev = vec![None; count];
        let mut queue = BinaryHeap::new();

        dist[source] = 0.0;
        queue.push(Reverse(QueueEntry { cost: 0.0, node: source }));

        while let Some(Reverse(QueueEntry { cost, node })) = queue.pop() {
            if cost > dist[node] {
                continue;
            }
            for (next, step) in self.neighbors(node) {
                let alt = cost + step;
                if alt < dist[next] {
                    dist[next] = alt;
                    prev[next] = Some(node);
                    queue.push(Reverse(QueueEntry { cost: alt, node: next }));
                }
            }
        }

        (dist, prev)
    }
}

#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    cost: f64,
    node: NodeId,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then_with(|| self.node.cmp(&other.node))
    }
}

/// Tables between the base and POIs of a terrain grid.
#[derive(Debug, Clone)]
pub struct GridTables {
    width: usize,
    tables: MatrixTables,
}

impl GridTables {
    /// Runs one shortest-path search per relevant node and keeps the
    /// directed costs and waypoints between every relevant pair.
    pub fn build(grid: &TerrainGrid, base: NodeId, pois: &[NodeId]) -> PlanResult<Self> {
        let mut relevant = Vec::with_capacity(pois.len() + 1);
        relevant.push(base);
        relevant.extend(pois.iter().copied().filter(|&poi| poi != base));
        relevant.dedup();

        for &node in &relevant {
            if grid.terrain(node).is_none() {
                return Err(PlanError::InvalidGrid(format!(
                    "node {node} is outside the grid or on an obstacle"
                )));
            }
        }

        let mut tables = MatrixTables::new(base);
        for &source in &relevant {
            tables = tables.with_node(source);
            let (dist, prev) = grid.shortest_from(source);
            for &target in &relevant {
                if target == source || !dist[target].is_finite() {
                    continue;
                }
                let path = trace_path(&prev, source, target);
                tables.insert(source, target, dist[target], path);
            }
        }

        debug!(nodes = relevant.len(), "built grid tables");
        Ok(Self {
            width: grid.width(),
            tables,
        })
    }

    /// Waypoints of a leg as (row, col) cells.
    pub fn cells(&self, from: NodeId, to: NodeId) -> Option<Vec<(usize, usize)>> {
        self.tables.path(from, to).map(|path| path.cells(self.width))
    }
}

fn trace_path(prev: &[Option<NodeId>], source: NodeId, target: NodeId) -> Path {
    let mut nodes = vec![target];
    let mut node = target;
    while node != source {
        match prev[node] {
            Some(before) => {
                nodes.push(before);
                node = before;
            }
            None => break,
        }
    }
    nodes.reverse();
    Path::new(nodes)
}

impl ResourceTables for GridTables {
    fn base(&self) -> NodeId {
        self.tables.base()
    }

    fn contains(&self, node: NodeId) -> bool {
        self.tables.contains(node)
    }

    fn distance(&self, from: NodeId, to: NodeId) -> Option<f64> {
        self.tables.distance(from, to)
    }

    fn path(&self, from: NodeId, to: NodeId) -> Option<&Path> {
        self.tables.path(from, to)
    }
}
