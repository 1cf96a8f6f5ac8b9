//! End-to-end mission scenarios
//!
//! Grid coverage, unreachable POIs, exact budgets and directed costs.

mod fixtures;

use mission_planner::ResourceTables;
use mission_planner::config::{MissionConfig, OptimizerOptions, SelectorOptions};
use mission_planner::csp::select_subset;
use mission_planner::estimate::estimate_tour_cost;
use mission_planner::genetic::CandidatePool;
use mission_planner::optimizer::optimize;
use mission_planner::planner::plan_mission;
use mission_planner::simulate::{Step, simulate};
use mission_planner::state::{AgentPhase, AgentState};
use mission_planner::tables::MatrixTables;
use mission_planner::terrain::{GridTables, TerrainGrid};

use fixtures::{config, corner_grid, mission, ring, walled_grid};

// ============================================================================
// Full grid coverage
// ============================================================================

#[test]
fn covers_every_corner_of_small_grid() {
    let (tables, pois) = corner_grid();
    // The cheapest loop is four straight legs of 2; the worst order costs
    // 2 + 2 + 2 * 2 * sqrt(2) < 10.
    let config = config(10.0, 100);

    let selection =
        select_subset(&tables, &pois, &config.mission, &config.selector).unwrap();
    assert_eq!(selection.pois.len(), 3);
    assert!(!selection.used_fallback);

    let plan = plan_mission(&tables, &pois, &config).unwrap();
    assert!(plan.feasible);
    assert_eq!(plan.tour.len(), 3);

    let start = AgentState::at_base(tables.base(), &config.mission);
    let direct = simulate(&start, &plan.tour, &tables, &config.mission).unwrap();
    assert!(direct.feasible());
    assert_eq!(plan.total_cost, direct.total_cost());
    assert_eq!(plan.final_battery, direct.remaining_battery());
}

#[test]
fn profile_ends_with_return_to_base() {
    let (tables, pois) = corner_grid();
    let plan = plan_mission(&tables, &pois, &config(10.0, 30)).unwrap();

    let moves: Vec<_> = plan
        .profile
        .iter()
        .filter_map(|step| match step {
            Step::Move { to, path, .. } => Some((*to, path.clone())),
            Step::Action { .. } => None,
        })
        .collect();
    assert_eq!(moves.len(), plan.tour.len() + 1);
    assert_eq!(moves.last().map(|(to, _)| *to), Some(tables.base()));
    for (to, path) in moves {
        let path = path.expect("grid legs carry waypoints");
        assert_eq!(path.nodes().last().copied(), Some(to));
    }
}

// ============================================================================
// Unreachable POIs
// ============================================================================

#[test]
fn isolated_poi_never_selected() {
    let (tables, pois, isolated) = walled_grid();
    let selection = select_subset(
        &tables,
        &pois,
        &mission(50.0),
        &SelectorOptions::default(),
    )
    .unwrap();
    assert!(!selection.pois.is_empty());
    assert!(!selection.pois.contains(&isolated));
}

#[test]
fn isolated_poi_never_in_optimized_plan() {
    let (tables, pois, isolated) = walled_grid();
    let pool = CandidatePool::new(pois.clone()).unwrap();
    let options = OptimizerOptions {
        population_size: 30,
        generations: 40,
        seed: 11,
        ..OptimizerOptions::default()
    };
    let result = optimize(&tables, &pool, &mission(50.0), &options, None).unwrap();
    assert!(result.outcome.feasible());
    assert!(!result.tour.contains(&isolated));
    assert_eq!(result.tour.len(), 3);

    let plan = plan_mission(&tables, &pois, &config(50.0, 20)).unwrap();
    assert!(plan.feasible);
    assert!(!plan.tour.contains(&isolated));
}

// ============================================================================
// Exact budgets
// ============================================================================

fn exact_budget_tables() -> MatrixTables {
    MatrixTables::new(0)
        .with_symmetric_edge(0, 1, 2.0)
        .with_symmetric_edge(0, 2, 3.0)
        .with_symmetric_edge(1, 2, 1.0)
}

#[test]
fn battery_for_one_round_trip_yields_singleton() {
    let tables = exact_budget_tables();
    let mission = mission(4.0);

    let selection =
        select_subset(&tables, &[1, 2], &mission, &SelectorOptions::default()).unwrap();
    assert_eq!(selection.pois, vec![1]);
    assert_eq!(selection.estimated_cost, 4.0);

    let start = AgentState::at_base(0, &mission);
    let outcome = simulate(&start, &selection.pois, &tables, &mission).unwrap();
    assert!(outcome.feasible());
    assert_eq!(outcome.remaining_battery(), 0.0);
}

#[test]
fn singleton_fallback_when_search_is_cut_short() {
    let tables = exact_budget_tables();
    let selection = select_subset(
        &tables,
        &[2, 1],
        &mission(4.0),
        &SelectorOptions { node_budget: 1 },
    )
    .unwrap();
    assert!(selection.used_fallback);
    assert_eq!(selection.pois, vec![1]);
}

#[test]
fn optimizer_never_beats_single_visit_under_tight_battery() {
    let tables = exact_budget_tables();
    let pool = CandidatePool::new(vec![1, 2]).unwrap();
    let options = OptimizerOptions {
        population_size: 20,
        generations: 30,
        ..OptimizerOptions::default()
    };
    let result = optimize(&tables, &pool, &mission(4.0), &options, None).unwrap();
    assert!(result.outcome.feasible());
    assert!(result.tour.len() <= 1);
    assert_eq!(result.tour, vec![1]);
}

// ============================================================================
// Directed costs
// ============================================================================

#[test]
fn costs_are_not_assumed_symmetric() {
    let grid = TerrainGrid::from_rows(&[".D"]).unwrap();
    let tables = GridTables::build(&grid, 0, &[1]).unwrap();

    let out = tables.distance(0, 1).unwrap();
    let back = tables.distance(1, 0).unwrap();
    assert_ne!(out, back);
    assert_eq!(estimate_tour_cost(0, &[1], &tables), out + back);

    // Enough for two flat legs but not for entering the dunes and returning.
    let mission = mission(3.0);
    let start = AgentState::at_base(0, &mission);
    assert!(!simulate(&start, &[1], &tables, &mission).unwrap().feasible());
}

#[test]
fn estimate_uses_directed_legs() {
    let forward = MatrixTables::new(0)
        .with_edge(0, 1, 1.0)
        .with_edge(1, 2, 1.0)
        .with_edge(2, 0, 1.0)
        .with_edge(0, 2, 5.0)
        .with_edge(2, 1, 5.0)
        .with_edge(1, 0, 5.0);
    assert_eq!(estimate_tour_cost(0, &[1, 2], &forward), 3.0);
    assert_eq!(estimate_tour_cost(0, &[2, 1], &forward), 3.0);
}

// ============================================================================
// Resource invariants
// ============================================================================

#[test]
fn feasible_trip_keeps_resources_non_negative() {
    let tables = ring(6, 2.0);
    let mission = MissionConfig {
        max_battery: 30.0,
        max_memory: 2.0,
        action_cost: 0.5,
        transmit_cost: Some(1.0),
        safety_margin: 1.0,
        ..MissionConfig::default()
    };
    let start = AgentState::at_base(0, &mission);
    let outcome = simulate(&start, &[1, 2, 3, 4, 5, 6], &tables, &mission).unwrap();
    assert!(outcome.feasible());

    let mut battery = mission.max_battery;
    for step in &outcome.profile {
        let cost = match step {
            Step::Move { cost, .. } | Step::Action { cost, .. } => *cost,
        };
        battery -= cost;
        assert!(battery >= mission.safety_margin);
    }
    let end = outcome.summary.final_state;
    assert_eq!(end.position, 0);
    assert_eq!(end.phase, AgentPhase::AtBase);
    assert!(end.memory >= 0.0);
    assert!((end.battery - battery).abs() < 1e-9);
}

#[test]
fn plan_serializes_for_downstream_tools() {
    let (tables, pois) = corner_grid();
    let plan = plan_mission(&tables, &pois, &config(10.0, 10)).unwrap();
    let json = serde_json::to_value(&plan).unwrap();

    assert_eq!(json["feasible"], serde_json::Value::Bool(true));
    assert_eq!(json["profile"][0]["type"], "move");
    assert!(json["profile"][0]["path"].is_object());
}
