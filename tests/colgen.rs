// These tests drive Gurobi and need a licensed installation.

use consistency::config::{ColGenConfig, PricerKind};
use consistency::error::ColGenError;
use consistency::model::{ColGenModel, MasterProblemModel};
use consistency::path::{PathPool, Route};
use consistency::pricing::{EnumerationPricer, MipPricer, Pricer};
use consistency::utils::ProblemInstance;

fn two_days() -> ProblemInstance {
    ProblemInstance::from_file("./data/two_days.json").unwrap()
}

fn four_days() -> ProblemInstance {
    ProblemInstance::from_file("./data/four_days.json").unwrap()
}

fn config(pricer: PricerKind) -> ColGenConfig {
    ColGenConfig { pricer, ..ColGenConfig::default() }
}

#[test]
fn test_master_on_driver_schedules() {
    let data = two_days();
    let paths = PathPool::from_driver_schedules(&data);

    let relaxed = MasterProblemModel::relaxed(&data, &paths, false).unwrap();
    assert!((relaxed.objective - 18.0).abs() < 1e-6);
    // every driver path is used at 1, so its duals add up to its cost
    for slot in 0..3 {
        assert!((relaxed.duals[(0, slot)] + relaxed.duals[(1, slot)] - 6.0).abs() < 1e-6);
    }
    assert!(relaxed.duals.iter().all(|(_, p)| p > -1e-9));

    let integer = MasterProblemModel::integer(&data, &paths, false).unwrap();
    assert_eq!(integer.objective, 18);
    assert_eq!(integer.selected.len(), 3);
}

#[test]
fn test_master_reports_infeasible_pool() {
    let data = two_days();
    let mut paths = PathPool::new();
    paths.push(vec![Route::from_schedule(&data, 0, 0), Route::from_schedule(&data, 1, 0)]);

    let result = MasterProblemModel::relaxed(&data, &paths, false);
    assert!(matches!(result, Err(ColGenError::InfeasibleModel(_))));
}

#[test]
fn test_two_day_scenario() {
    let data = two_days();
    let mut model = ColGenModel::from_driver_schedules(&data, ColGenConfig::default()).unwrap();
    let solution = model.solve().unwrap();

    // {1,2,3}+{1,2,9}, {4,5,6}+{4,6,7}, {7,8,9}+{3,5,8}
    assert_eq!(solution.objective, 13);
    assert!(solution.objective <= 18);
    assert!(solution.columns_generated > 0);
    assert_eq!(solution.pool_size, 3 + solution.columns_generated);
    assert_eq!(solution.selected.iter().map(|p| p.cost).sum::<usize>(), solution.objective);

    for (day, slot) in data.slots() {
        let covering = solution.selected.iter().filter(|p| p.covers(day, slot)).count();
        assert_eq!(covering, 1, "slot {slot} on day {day}");
    }
}

#[test]
fn test_degenerate_single_route() {
    let data = ProblemInstance::from_lists(1, &[vec![vec![1]]]).unwrap();
    let mut model = ColGenModel::from_driver_schedules(&data, ColGenConfig::default()).unwrap();
    let solution = model.solve().unwrap();

    assert_eq!(solution.iterations, 1);
    assert_eq!(solution.columns_generated, 0);
    assert_eq!(solution.objective, 1);
    assert_eq!(solution.selected.len(), 1);
    assert!(solution.last_reduced_cost >= -1e-5);
}

#[test]
fn test_relaxed_objective_never_increases() {
    for data in [two_days(), four_days()] {
        let mut model = ColGenModel::from_driver_schedules(&data, ColGenConfig::default()).unwrap();
        let solution = model.solve().unwrap();

        assert_eq!(solution.relaxed_objectives.len(), solution.iterations);
        for pair in solution.relaxed_objectives.windows(2) {
            assert!(pair[1] <= pair[0] + 1e-6, "{:?}", solution.relaxed_objectives);
        }
    }
}

#[test]
fn test_integer_objective_bounds_relaxation() {
    let data = four_days();
    let mut model = ColGenModel::from_driver_schedules(&data, ColGenConfig::default()).unwrap();
    let solution = model.solve().unwrap();

    let relaxed = solution.last_relaxed_objective().unwrap();
    assert!(solution.objective as f64 >= relaxed - 1e-6);
    assert!(solution.uncovered_slots(&data).is_empty());
}

#[test]
fn test_no_improving_path_left_at_convergence() {
    let data = four_days();
    let mut model = ColGenModel::from_driver_schedules(&data, ColGenConfig::default()).unwrap();
    model.solve().unwrap();

    let duals = model.last_duals.as_ref().unwrap();
    let best = EnumerationPricer::new(&data, duals).solve_pricing_problem().unwrap();
    assert!(best.reduced_cost >= -1e-5);
}

#[test]
fn test_mip_pricer_matches_enumeration() {
    let data = four_days();
    let paths = PathPool::from_driver_schedules(&data);
    let relaxed = MasterProblemModel::relaxed(&data, &paths, false).unwrap();

    let mip = MipPricer::new(&data, &relaxed.duals, false).solve_pricing_problem().unwrap();
    let enumerated = EnumerationPricer::new(&data, &relaxed.duals).solve_pricing_problem().unwrap();
    assert!((mip.reduced_cost - enumerated.reduced_cost).abs() < 1e-6);

    let mip_solution = ColGenModel::from_driver_schedules(&data, config(PricerKind::Mip))
        .unwrap()
        .solve()
        .unwrap();
    let enumerated_solution = ColGenModel::from_driver_schedules(&data, config(PricerKind::Enumeration))
        .unwrap()
        .solve()
        .unwrap();
    let a = mip_solution.last_relaxed_objective().unwrap();
    let b = enumerated_solution.last_relaxed_objective().unwrap();
    assert!((a - b).abs() < 1e-6);
}

#[test]
fn test_iteration_cap() {
    let data = two_days();
    let config = ColGenConfig { max_iterations: 1, ..ColGenConfig::default() };
    let mut model = ColGenModel::from_driver_schedules(&data, config).unwrap();

    let result = model.solve();
    assert!(matches!(result, Err(ColGenError::NonTermination { iterations: 1 })));
    assert_eq!(model.paths.len(), 4);
}
