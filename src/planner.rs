//! Mission planning pipeline.
//!
//! Subset selection proposes the largest affordable set of POIs, the
//! optimizer searches subsets and orders starting from that proposal, and the
//! winning tour is replayed once more to produce the reported profile.

use serde::Serialize;
use tracing::info;

use crate::config::PlannerConfig;
use crate::csp::{Selection, select_subset};
use crate::error::PlanResult;
use crate::genetic::CandidatePool;
use crate::optimizer::optimize;
use crate::simulate::Step;
use crate::traits::{NodeId, ResourceTables};

/// The plan handed back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct MissionPlan {
    /// POIs in visiting order.
    pub tour: Vec<NodeId>,
    pub feasible: bool,
    pub total_cost: f64,
    pub final_battery: f64,
    pub final_memory: f64,
    pub fitness: f64,
    /// Every accepted step, ending with the return leg.
    pub profile: Vec<Step>,
    /// What subset selection proposed before optimization.
    pub selection: Vec<NodeId>,
}

/// Plans a mission over `candidates`.
pub fn plan_mission<T>(
    tables: &T,
    candidates: &[NodeId],
    config: &PlannerConfig,
) -> PlanResult<MissionPlan>
where
    T: ResourceTables + Sync + ?Sized,
{
    config.validate()?;
    let pool = CandidatePool::new(candidates.to_vec())?;

    let Selection {
        pois: selection,
        estimated_cost,
        explored,
        ..
    } = select_subset(tables, pool.members(), &config.mission, &config.selector)?;
    info!(
        chosen = selection.len(),
        estimated_cost, explored, "subset selection done"
    );

    let seed = (!selection.is_empty()).then_some(selection.as_slice());
    let result = optimize(tables, &pool, &config.mission, &config.optimizer, seed)?;

    let summary = result.outcome.summary;
    Ok(MissionPlan {
        tour: result.tour,
        feasible: summary.feasible,
        total_cost: summary.total_cost,
        final_battery: summary.remaining_battery(),
        final_memory: summary.final_state.memory,
        fitness: result.fitness,
        profile: result.outcome.profile,
        selection,
    })
}
