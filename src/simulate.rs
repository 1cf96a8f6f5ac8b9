//! Trip replay: the single authority on feasibility and cost.
//!
//! A trip leaves the start state, visits each POI in order (move, capture,
//! optional sample, optional transmit) and must make it back to the base.
//! Running out of battery or memory, or meeting an unreachable leg, ends the
//! replay with `feasible == false`; only malformed tours are errors.

use serde::Serialize;

use crate::config::MissionConfig;
use crate::error::{PlanError, PlanResult};
use crate::path::Path;
use crate::state::{AgentState, StepFailure};
use crate::traits::{NodeId, ResourceTables};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Sample,
    Transmit,
}

/// One accepted step of a trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Step {
    Move {
        to: NodeId,
        cost: f64,
        path: Option<Path>,
    },
    Action {
        kind: ActionKind,
        node: NodeId,
        cost: f64,
    },
}

/// Feasibility and cost of a replayed trip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripSummary {
    pub feasible: bool,
    pub final_state: AgentState,
    /// Cost of the whole trip when feasible. Otherwise the cost spent up to
    /// and including the rejected step, or infinity for an unreachable leg.
    pub total_cost: f64,
    pub failure: Option<StepFailure>,
}

impl TripSummary {
    pub fn remaining_battery(&self) -> f64 {
        self.final_state.battery
    }
}

/// A replayed trip with its full action profile.
#[derive(Debug, Clone, PartialEq)]
pub struct TripOutcome {
    pub summary: TripSummary,
    /// Nodes entered, in order, ending at the base when feasible.
    pub route: Vec<NodeId>,
    /// Steps accepted before the trip ended or failed.
    pub profile: Vec<Step>,
}

impl TripOutcome {
    pub fn feasible(&self) -> bool {
        self.summary.feasible
    }

    pub fn total_cost(&self) -> f64 {
        self.summary.total_cost
    }

    pub fn remaining_battery(&self) -> f64 {
        self.summary.remaining_battery()
    }
}

/// Replays `tour` from `state` and records every step.
pub fn simulate<T>(
    state: &AgentState,
    tour: &[NodeId],
    tables: &T,
    mission: &MissionConfig,
) -> PlanResult<TripOutcome>
where
    T: ResourceTables + ?Sized,
{
    let mut log = TripLog::default();
    let summary = replay(state, tour, tables, mission, Some(&mut log))?;
    Ok(TripOutcome {
        summary,
        route: log.route,
        profile: log.profile,
    })
}

/// Replays `tour` from `state` without recording the profile.
pub fn evaluate<T>(
    state: &AgentState,
    tour: &[NodeId],
    tables: &T,
    mission: &MissionConfig,
) -> PlanResult<TripSummary>
where
    T: ResourceTables + ?Sized,
{
    replay(state, tour, tables, mission, None)
}

/// Rejects tours that reference nodes the tables do not know.
pub fn check_tour<T>(tour: &[NodeId], tables: &T) -> PlanResult<()>
where
    T: ResourceTables + ?Sized,
{
    let base = tables.base();
    for &poi in tour {
        if poi == base {
            return Err(PlanError::BaseAsPoi(poi));
        }
        if !tables.contains(poi) {
            return Err(PlanError::UnknownNode(poi));
        }
    }
    Ok(())
}

#[derive(Debug, Default)]
struct TripLog {
    route: Vec<NodeId>,
    profile: Vec<Step>,
}

struct Replay<'a, T: ?Sized> {
    tables: &'a T,
    mission: &'a MissionConfig,
    base: NodeId,
    state: AgentState,
    total_cost: f64,
    log: Option<&'a mut TripLog>,
}

impl<T> Replay<'_, T>
where
    T: ResourceTables + ?Sized,
{
    fn travel(&mut self, to: NodeId) -> Result<(), StepFailure> {
        let from = self.state.position;
        let Some(cost) = self.tables.distance(from, to) else {
            self.total_cost = f64::INFINITY;
            return Err(StepFailure::Unreachable { from, to });
        };
        self.total_cost += cost;
        self.state = self
            .state
            .try_move(to, cost, self.base, self.mission.safety_margin)?;
        if let Some(log) = self.log.as_deref_mut() {
            log.route.push(to);
            log.profile.push(Step::Move {
                to,
                cost,
                path: self.tables.path(from, to).cloned(),
            });
        }
        Ok(())
    }

    fn act(&mut self, kind: ActionKind, cost: f64) -> Result<(), StepFailure> {
        let margin = self.mission.safety_margin;
        self.total_cost += cost;
        self.state = match kind {
            ActionKind::Sample => self.state.try_sample(cost, margin)?,
            ActionKind::Transmit => {
                self.state
                    .try_transmit(cost, self.mission.max_memory, margin)?
            }
        };
        if let Some(log) = self.log.as_deref_mut() {
            log.profile.push(Step::Action {
                kind,
                node: self.state.position,
                cost,
            });
        }
        Ok(())
    }

    fn visit(&mut self, poi: NodeId) -> Result<(), StepFailure> {
        self.travel(poi)?;
        self.state = self.state.try_capture(self.mission.memory_per_visit)?;
        if self.mission.action_cost > 0.0 {
            self.act(ActionKind::Sample, self.mission.action_cost)?;
        }
        if let Some(cost) = self.mission.transmit_cost {
            self.act(ActionKind::Transmit, cost)?;
        }
        Ok(())
    }

    fn run(&mut self, tour: &[NodeId]) -> Result<(), StepFailure> {
        for &poi in tour {
            self.visit(poi)?;
        }
        if self.state.position != self.base {
            self.travel(self.base)?;
        }
        Ok(())
    }
}

fn replay<T>(
    state: &AgentState,
    tour: &[NodeId],
    tables: &T,
    mission: &MissionConfig,
    log: Option<&mut TripLog>,
) -> PlanResult<TripSummary>
where
    T: ResourceTables + ?Sized,
{
    check_tour(tour, tables)?;

    let mut replay = Replay {
        tables,
        mission,
        base: tables.base(),
        state: *state,
        total_cost: 0.0,
        log,
    };
    let failure = replay.run(tour).err();

    Ok(TripSummary {
        feasible: failure.is_none(),
        final_state: replay.state,
        total_cost: replay.total_cost,
        failure,
    })
}
