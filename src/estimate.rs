//! Greedy tour-cost estimate used to prune subset search.
//!
//! Nearest-neighbor from the base over the selected POIs, then back to base.
//! This is neither a lower bound nor the optimum: a subset it rejects may
//! still have a feasible visiting order.

use crate::traits::{NodeId, ResourceTables};

/// Estimated cost to visit every node of `selected` and return to `base`.
///
/// Returns infinity when a required leg is unreachable and zero for an
/// empty selection. Ties go to the earliest node in `selected`.
pub fn estimate_tour_cost<T>(base: NodeId, selected: &[NodeId], tables: &T) -> f64
where
    T: ResourceTables + ?Sized,
{
    if selected.is_empty() {
        return 0.0;
    }

    let mut visited = vec![false; selected.len()];
    let mut current = base;
    let mut cost = 0.0;

    for _ in 0..selected.len() {
        let mut best: Option<(usize, f64)> = None;
        for (i, &poi) in selected.iter().enumerate() {
            if visited[i] {
                continue;
            }
            if let Some(d) = tables.distance(current, poi) {
                if best.is_none_or(|(_, best_d)| d < best_d) {
                    best = Some((i, d));
                }
            }
        }

        let Some((next, d)) = best else {
            return f64::INFINITY;
        };
        visited[next] = true;
        cost += d;
        current = selected[next];
    }

    match tables.distance(current, base) {
        Some(back) => cost + back,
        None => f64::INFINITY,
    }
}
