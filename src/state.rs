//! Agent resource state.
//!
//! `AgentState` is a small `Copy` value. Every step consumes a state and
//! yields the next one, so repeated or concurrent evaluations never share
//! anything mutable. The visited route lives in the trip outcome, not here.

use serde::{Deserialize, Serialize};

use crate::config::MissionConfig;
use crate::traits::NodeId;

/// Where the agent is in its trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentPhase {
    AtBase,
    /// Between nodes. Transient inside `try_move`; a returned state is
    /// always at a node.
    EnRoute,
    AtPoi,
}

/// Why a step was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepFailure {
    /// The step would leave less battery than the safety reserve.
    Battery,
    /// Not enough storage left for the data captured at a POI.
    Memory,
    /// The action is not allowed in the current phase.
    WrongPhase,
    /// No path exists for the requested leg.
    Unreachable { from: NodeId, to: NodeId },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub position: NodeId,
    pub phase: AgentPhase,
    /// Remaining battery, never negative.
    pub battery: f64,
    /// Remaining storage, never negative.
    pub memory: f64,
}

impl AgentState {
    /// Full battery and empty storage at the base.
    pub fn at_base(base: NodeId, mission: &MissionConfig) -> Self {
        Self {
            position: base,
            phase: AgentPhase::AtBase,
            battery: mission.max_battery,
            memory: mission.max_memory,
        }
    }

    pub fn can_spend(&self, cost: f64, safety_margin: f64) -> bool {
        cost <= self.battery - safety_margin
    }

    fn spend(mut self, cost: f64, safety_margin: f64) -> Result<Self, StepFailure> {
        if !self.can_spend(cost, safety_margin) {
            return Err(StepFailure::Battery);
        }
        self.battery -= cost;
        Ok(self)
    }

    /// Travels to `to`, arriving at the base or at a POI.
    pub fn try_move(
        self,
        to: NodeId,
        cost: f64,
        base: NodeId,
        safety_margin: f64,
    ) -> Result<Self, StepFailure> {
        let mut next = Self {
            phase: AgentPhase::EnRoute,
            ..self
        }
        .spend(cost, safety_margin)?;
        next.position = to;
        next.phase = if to == base {
            AgentPhase::AtBase
        } else {
            AgentPhase::AtPoi
        };
        Ok(next)
    }

    /// Stores the data captured at the current POI.
    pub fn try_capture(self, amount: f64) -> Result<Self, StepFailure> {
        if self.phase != AgentPhase::AtPoi {
            return Err(StepFailure::WrongPhase);
        }
        if amount > self.memory {
            return Err(StepFailure::Memory);
        }
        Ok(Self {
            memory: self.memory - amount,
            ..self
        })
    }

    pub fn try_sample(self, cost: f64, safety_margin: f64) -> Result<Self, StepFailure> {
        if self.phase != AgentPhase::AtPoi {
            return Err(StepFailure::WrongPhase);
        }
        self.spend(cost, safety_margin)
    }

    /// Offloads stored data from a POI, freeing all storage.
    pub fn try_transmit(
        self,
        cost: f64,
        max_memory: f64,
        safety_margin: f64,
    ) -> Result<Self, StepFailure> {
        if self.phase != AgentPhase::AtPoi {
            return Err(StepFailure::WrongPhase);
        }
        let mut next = self.spend(cost, safety_margin)?;
        next.memory = max_memory;
        Ok(next)
    }

    /// Refills the battery. Only possible at the base.
    pub fn recharge(self, max_battery: f64) -> Result<Self, StepFailure> {
        if self.phase != AgentPhase::AtBase {
            return Err(StepFailure::WrongPhase);
        }
        Ok(Self {
            battery: max_battery,
            ..self
        })
    }
}
