//! Mission and search configuration.

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, PlanResult};

/// Agent resource parameters for one mission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionConfig {
    /// Battery capacity; the agent starts full.
    pub max_battery: f64,
    /// Storage capacity; the agent starts empty.
    pub max_memory: f64,
    /// Storage consumed by the data captured at each POI.
    pub memory_per_visit: f64,
    /// Battery spent sampling at each POI. Zero disables sampling.
    pub action_cost: f64,
    /// Battery spent offloading data at each POI. `None` disables transmission.
    pub transmit_cost: Option<f64>,
    /// Battery that must stay in reserve after every step.
    pub safety_margin: f64,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            max_battery: 25.0,
            max_memory: 10.0,
            memory_per_visit: 1.0,
            action_cost: 0.0,
            transmit_cost: None,
            safety_margin: 0.0,
        }
    }
}

impl MissionConfig {
    pub fn validate(&self) -> PlanResult<()> {
        if !(self.max_battery.is_finite() && self.max_battery > 0.0) {
            return Err(invalid("max_battery must be a positive number"));
        }
        if !(self.max_memory.is_finite() && self.max_memory >= 0.0) {
            return Err(invalid("max_memory must be non-negative"));
        }
        if !(self.memory_per_visit.is_finite() && self.memory_per_visit >= 0.0) {
            return Err(invalid("memory_per_visit must be non-negative"));
        }
        if !(self.action_cost.is_finite() && self.action_cost >= 0.0) {
            return Err(invalid("action_cost must be non-negative"));
        }
        if let Some(cost) = self.transmit_cost {
            if !(cost.is_finite() && cost >= 0.0) {
                return Err(invalid("transmit_cost must be non-negative"));
            }
        }
        if !(self.safety_margin.is_finite() && self.safety_margin >= 0.0) {
            return Err(invalid("safety_margin must be non-negative"));
        }
        Ok(())
    }

    /// Battery spent at a POI beyond the travel legs.
    pub fn per_visit_overhead(&self) -> f64 {
        self.action_cost + self.transmit_cost.unwrap_or(0.0)
    }

    /// Battery the trip may spend while keeping the safety reserve.
    pub fn usable_battery(&self) -> f64 {
        self.max_battery - self.safety_margin
    }

    /// Whether `visits` captures fit in storage. With transmission each
    /// capture only has to fit on its own, since storage is emptied after
    /// every visit.
    pub fn fits_memory(&self, visits: usize) -> bool {
        match self.transmit_cost {
            Some(_) => visits == 0 || self.memory_per_visit <= self.max_memory,
            None => visits as f64 * self.memory_per_visit <= self.max_memory,
        }
    }
}

/// Branch-and-bound subset selector options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorOptions {
    /// Maximum number of search frames expanded before giving up.
    pub node_budget: usize,
}

impl Default for SelectorOptions {
    fn default() -> Self {
        Self {
            node_budget: 1_000_000,
        }
    }
}

impl SelectorOptions {
    pub fn validate(&self) -> PlanResult<()> {
        if self.node_budget == 0 {
            return Err(invalid("node_budget must be at least 1"));
        }
        Ok(())
    }
}

/// Population optimizer options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerOptions {
    pub population_size: usize,
    pub generations: usize,
    pub tournament_size: usize,
    /// Share of each generation copied unchanged; at least one individual.
    pub elite_fraction: f64,
    /// Probability that two parents are recombined rather than copied.
    pub crossover_rate: f64,
    /// Per-bit flip probability on the selection mask.
    pub bit_mutation_rate: f64,
    /// Probability of one random swap in the visiting order.
    pub swap_mutation_rate: f64,
    /// Reward per visited POI.
    pub alpha: f64,
    /// Weight of the trip cost.
    pub beta: f64,
    /// Offset applied to every infeasible plan.
    pub penalty: f64,
    pub seed: u64,
    /// Evaluate fitness on the rayon thread pool.
    pub parallel: bool,
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 200,
            tournament_size: 3,
            elite_fraction: 0.05,
            crossover_rate: 1.0,
            bit_mutation_rate: 0.05,
            swap_mutation_rate: 0.1,
            alpha: 100.0,
            beta: 1.0,
            penalty: 1e6,
            seed: 42,
            parallel: false,
        }
    }
}

impl OptimizerOptions {
    pub fn validate(&self) -> PlanResult<()> {
        if self.population_size < 2 {
            return Err(invalid("population_size must be at least 2"));
        }
        if self.tournament_size == 0 {
            return Err(invalid("tournament_size must be at least 1"));
        }
        for (name, value) in [
            ("elite_fraction", self.elite_fraction),
            ("crossover_rate", self.crossover_rate),
            ("bit_mutation_rate", self.bit_mutation_rate),
            ("swap_mutation_rate", self.swap_mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(&format!("{name} must be within [0, 1]")));
            }
        }
        if !(self.alpha.is_finite() && self.beta.is_finite() && self.penalty.is_finite()) {
            return Err(invalid("alpha, beta and penalty must be finite"));
        }
        Ok(())
    }

    /// Number of individuals carried over unchanged each generation.
    pub fn elite_count(&self) -> usize {
        ((self.population_size as f64 * self.elite_fraction) as usize)
            .max(1)
            .min(self.population_size)
    }
}

/// Complete planner configuration, loadable from JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub mission: MissionConfig,
    pub selector: SelectorOptions,
    pub optimizer: OptimizerOptions,
}

impl PlannerConfig {
    pub fn from_json(json: &str) -> PlanResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PlanResult<()> {
        self.mission.validate()?;
        self.selector.validate()?;
        self.optimizer.validate()
    }
}

fn invalid(message: &str) -> PlanError {
    PlanError::InvalidConfig(message.to_string())
}
