//! Population-based search over visit subsets and orders.
//!
//! Every candidate is judged by replaying its decoded tour in the trip
//! simulator. Offspring are repaired by dropping POIs until their tour is
//! feasible again, and the best individual ever evaluated is tracked across
//! generations.

use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::{MissionConfig, OptimizerOptions};
use crate::error::{PlanError, PlanResult};
use crate::genetic::{CandidatePool, Individual, crossover, mutate, tournament_select};
use crate::simulate::{TripOutcome, TripSummary, check_tour, evaluate, simulate};
use crate::state::AgentState;
use crate::traits::{NodeId, ResourceTables};

/// Best plan found by the optimizer.
#[derive(Debug, Clone)]
pub struct OptimizerResult {
    pub best: Individual,
    pub fitness: f64,
    /// Decoded visiting order of `best`.
    pub tour: Vec<NodeId>,
    /// Replay of `tour` with its action profile.
    pub outcome: TripOutcome,
    /// Best fitness seen so far, one entry per evaluated population.
    pub history: Vec<f64>,
}

/// Scores and repairs individuals against a fixed mission.
pub struct Evaluator<'a, T: ?Sized> {
    tables: &'a T,
    pool: &'a CandidatePool,
    mission: &'a MissionConfig,
    options: &'a OptimizerOptions,
    start: AgentState,
}

impl<'a, T> Evaluator<'a, T>
where
    T: ResourceTables + Sync + ?Sized,
{
    pub fn new(
        tables: &'a T,
        pool: &'a CandidatePool,
        mission: &'a MissionConfig,
        options: &'a OptimizerOptions,
    ) -> PlanResult<Self> {
        check_tour(pool.members(), tables)?;
        Ok(Self {
            tables,
            pool,
            mission,
            options,
            start: AgentState::at_base(tables.base(), mission),
        })
    }

    fn replay(&self, individual: &Individual) -> PlanResult<(usize, TripSummary)> {
        let tour = individual.decode(self.pool)?;
        let summary = evaluate(&self.start, &tour, self.tables, self.mission)?;
        Ok((tour.len(), summary))
    }

    /// `alpha * visits - beta * cost` for feasible tours, otherwise
    /// `-penalty - attempted_cost`.
    pub fn fitness(&self, individual: &Individual) -> PlanResult<f64> {
        let (visits, summary) = self.replay(individual)?;
        Ok(score(visits, &summary, self.options))
    }

    /// Fitness of every individual, in population order.
    pub fn fitness_all(&self, population: &[Individual]) -> PlanResult<Vec<f64>> {
        if self.options.parallel {
            population
                .par_iter()
                .map(|individual| self.fitness(individual))
                .collect()
        } else {
            population
                .iter()
                .map(|individual| self.fitness(individual))
                .collect()
        }
    }

    /// Drops selected POIs until the decoded tour is feasible or empty.
    ///
    /// Each round removes the POI whose removal cuts the attempted cost the
    /// most, taking the first removal that is feasible outright. Returns the
    /// number of POIs removed.
    pub fn repair(&self, individual: &mut Individual) -> PlanResult<usize> {
        let mut removed = 0;
        loop {
            let (visits, summary) = self.replay(individual)?;
            if summary.feasible || visits == 0 {
                return Ok(removed);
            }

            let mut choice: Option<(usize, f64)> = None;
            for position in individual.selected_positions() {
                individual.set_selected(position, false);
                let trial = self.replay(individual);
                individual.set_selected(position, true);
                let (_, trial) = trial?;

                if trial.feasible {
                    choice = Some((position, f64::INFINITY));
                    break;
                }
                let gain = cost_reduction(summary.total_cost, trial.total_cost);
                if choice.is_none_or(|(_, best)| gain > best) {
                    choice = Some((position, gain));
                }
            }

            let Some((position, _)) = choice else {
                return Ok(removed);
            };
            individual.set_selected(position, false);
            removed += 1;
        }
    }
}

fn score(visits: usize, summary: &TripSummary, options: &OptimizerOptions) -> f64 {
    if summary.feasible {
        options.alpha * visits as f64 - options.beta * summary.total_cost
    } else {
        -options.penalty - summary.total_cost
    }
}

/// How much cheaper the attempted trip got. Fixing an unreachable leg is the
/// largest possible gain; introducing one is the smallest.
fn cost_reduction(before: f64, after: f64) -> f64 {
    match (before.is_finite(), after.is_finite()) {
        (true, true) => before - after,
        (false, true) => f64::INFINITY,
        (true, false) => f64::NEG_INFINITY,
        (false, false) => 0.0,
    }
}

/// Evolves plans for `pool` and returns the best one ever evaluated.
///
/// `seed` optionally injects a known selection (e.g. from the subset
/// selector) as the first individual of the initial population.
pub fn optimize<T>(
    tables: &T,
    pool: &CandidatePool,
    mission: &MissionConfig,
    options: &OptimizerOptions,
    seed: Option<&[NodeId]>,
) -> PlanResult<OptimizerResult>
where
    T: ResourceTables + Sync + ?Sized,
{
    options.validate()?;
    let evaluator = Evaluator::new(tables, pool, mission, options)?;
    let mut rng = StdRng::seed_from_u64(options.seed);

    let mut population: Vec<Individual> = (0..options.population_size)
        .map(|_| Individual::random(pool.len(), &mut rng))
        .collect();
    if let Some(selection) = seed {
        population[0] = Individual::from_selection(selection, pool)?;
    }

    let mut best: Option<(Individual, f64)> = None;
    let mut history = Vec::with_capacity(options.generations + 1);
    let elite_count = options.elite_count();

    for generation in 0..=options.generations {
        let fitness = evaluator.fitness_all(&population)?;
        for (individual, &value) in population.iter().zip(&fitness) {
            if best.as_ref().is_none_or(|(_, best_value)| value > *best_value) {
                best = Some((individual.clone(), value));
            }
        }
        let best_value = best.as_ref().map_or(f64::NEG_INFINITY, |(_, value)| *value);
        history.push(best_value);
        debug!(generation, best = best_value, "population evaluated");

        if generation == options.generations {
            break;
        }

        let mut ranked: Vec<usize> = (0..population.len()).collect();
        ranked.sort_by(|&a, &b| fitness[b].total_cmp(&fitness[a]));

        let mut next: Vec<Individual> = ranked
            .iter()
            .take(elite_count)
            .map(|&index| population[index].clone())
            .collect();

        while next.len() < options.population_size {
            let first = &population[tournament_select(&fitness, options.tournament_size, &mut rng)];
            let second = &population[tournament_select(&fitness, options.tournament_size, &mut rng)];

            let (mut child_a, mut child_b) = if rng.gen_bool(options.crossover_rate) {
                crossover(first, second, &mut rng)
            } else {
                (first.clone(), second.clone())
            };

            for child in [&mut child_a, &mut child_b] {
                mutate(
                    child,
                    options.bit_mutation_rate,
                    options.swap_mutation_rate,
                    &mut rng,
                );
                evaluator.repair(child)?;
            }

            next.push(child_a);
            if next.len() < options.population_size {
                next.push(child_b);
            }
        }
        population = next;
    }

    let (best, fitness) = best.ok_or_else(|| {
        PlanError::InvalidConfig("population_size must be at least 2".to_string())
    })?;
    let tour = best.decode(pool)?;
    let outcome = simulate(&evaluator.start, &tour, tables, mission)?;

    info!(
        fitness,
        visits = tour.len(),
        feasible = outcome.feasible(),
        cost = outcome.total_cost(),
        "optimizer finished"
    );

    Ok(OptimizerResult {
        best,
        fitness,
        tour,
        outcome,
        history,
    })
}
