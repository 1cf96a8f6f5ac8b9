//! Branch-and-bound POI subset selection.
//!
//! Explores inclusion/exclusion of each candidate, nearest to the base
//! first, keeping the largest subset whose estimated round trip fits the
//! battery and memory budgets. The search is exponential in the pool size
//! and meant for pools of a few dozen candidates; a node budget bounds the
//! work on anything larger.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::config::{MissionConfig, SelectorOptions};
use crate::error::{PlanError, PlanResult};
use crate::estimate::estimate_tour_cost;
use crate::simulate::check_tour;
use crate::traits::{NodeId, ResourceTables};

/// Result of a subset search.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Chosen POIs, nearest to the base first. Not an optimized visiting order.
    pub pois: Vec<NodeId>,
    /// Estimated round-trip cost including per-visit overhead.
    pub estimated_cost: f64,
    /// Search frames expanded.
    pub explored: usize,
    /// The node budget ran out before the search space was covered.
    pub budget_exhausted: bool,
    /// No subset was recorded and the result came from the singleton scan.
    pub used_fallback: bool,
}

enum Frame {
    /// Record the current selection if it is the best so far, then branch on candidate `i`.
    Expand(usize),
    /// Tentatively add candidate `i`.
    Include(usize),
    /// Undo the last inclusion.
    Retract,
}

struct Budget<'a, T: ?Sized> {
    tables: &'a T,
    mission: &'a MissionConfig,
    base: NodeId,
}

impl<T> Budget<'_, T>
where
    T: ResourceTables + ?Sized,
{
    /// Estimated cost of `selected` when it fits every budget.
    fn fits(&self, selected: &[NodeId]) -> Option<f64> {
        if !self.mission.fits_memory(selected.len()) {
            return None;
        }
        let cost = estimate_tour_cost(self.base, selected, self.tables)
            + selected.len() as f64 * self.mission.per_visit_overhead();
        (cost <= self.mission.usable_battery()).then_some(cost)
    }
}

/// Candidates sorted by distance from the base; unreachable ones last.
pub fn order_by_proximity<T>(candidates: &[NodeId], tables: &T) -> Vec<NodeId>
where
    T: ResourceTables + ?Sized,
{
    let base = tables.base();
    let mut order = candidates.to_vec();
    order.sort_by(|&a, &b| {
        let da = tables.distance(base, a).unwrap_or(f64::INFINITY);
        let db = tables.distance(base, b).unwrap_or(f64::INFINITY);
        da.total_cmp(&db)
    });
    order
}

/// Finds the largest candidate subset that fits the mission budgets.
///
/// Candidates must be distinct known POIs; the base is not a candidate.
///
/// Among subsets of equal size the first one discovered wins. If nothing is
/// recorded, the first singleton that fits (in proximity order) is returned;
/// otherwise the selection is empty.
pub fn select_subset<T>(
    tables: &T,
    candidates: &[NodeId],
    mission: &MissionConfig,
    options: &SelectorOptions,
) -> PlanResult<Selection>
where
    T: ResourceTables + ?Sized,
{
    check_tour(candidates, tables)?;
    let mut seen = HashSet::with_capacity(candidates.len());
    if let Some(&duplicate) = candidates.iter().find(|&&poi| !seen.insert(poi)) {
        return Err(PlanError::DuplicatePoi(duplicate));
    }

    let base = tables.base();
    let order = order_by_proximity(candidates, tables);
    let budget = Budget {
        tables,
        mission,
        base,
    };

    let mut best: Vec<NodeId> = Vec::new();
    let mut best_cost = 0.0;
    let mut selected: Vec<NodeId> = Vec::with_capacity(order.len());
    let mut stack = vec![Frame::Expand(0)];
    let mut explored = 0usize;
    let mut budget_exhausted = false;

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Expand(i) => {
                if explored >= options.node_budget {
                    budget_exhausted = true;
                    break;
                }
                explored += 1;

                if selected.len() > best.len() {
                    if let Some(cost) = budget.fits(&selected) {
                        best.clone_from(&selected);
                        best_cost = cost;
                        if best.len() == order.len() {
                            break;
                        }
                    }
                }
                if i >= order.len() {
                    continue;
                }
                stack.push(Frame::Expand(i + 1));
                stack.push(Frame::Include(i));
            }
            Frame::Include(i) => {
                let poi = order[i];
                if tables.distance(base, poi).is_none() {
                    continue;
                }
                selected.push(poi);
                if budget.fits(&selected).is_some() {
                    stack.push(Frame::Retract);
                    stack.push(Frame::Expand(i + 1));
                } else {
                    selected.pop();
                }
            }
            Frame::Retract => {
                selected.pop();
            }
        }
    }

    if budget_exhausted {
        warn!(
            explored,
            pool = order.len(),
            "subset search stopped at node budget"
        );
    }

    let mut used_fallback = false;
    if best.is_empty() {
        if let Some((poi, cost)) = order
            .iter()
            .find_map(|&poi| budget.fits(&[poi]).map(|cost| (poi, cost)))
        {
            best = vec![poi];
            best_cost = cost;
            used_fallback = true;
        }
    }

    debug!(
        explored,
        chosen = best.len(),
        pool = order.len(),
        used_fallback,
        "subset search finished"
    );

    Ok(Selection {
        pois: best,
        estimated_cost: best_cost,
        explored,
        budget_exhausted,
        used_fallback,
    })
}
