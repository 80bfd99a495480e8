//! End-to-end searches on the seeded simulator.

use std::collections::BTreeSet;
use std::sync::Arc;

use qsum_adapter_sim::SimulatorBackend;
use qsum_core::{
    Encoding, GroverIterator, OptimizedOracle, ProblemInstance, RegisterLayout, SearchError,
    SearchStatus, SolverConfig, SubsetSumSolver, index_distribution, optimal_iterations,
};
use qsum_hal::StatevectorBackend;

fn solver(seed: u64, config: SolverConfig) -> SubsetSumSolver {
    SubsetSumSolver::new(Arc::new(SimulatorBackend::with_seed(seed)), config).unwrap()
}

fn peaks(status: &SearchStatus) -> BTreeSet<String> {
    match status {
        SearchStatus::Found { subsets } => subsets.iter().map(|s| s.bitstring.clone()).collect(),
        other => panic!("expected peaks, got {other:?}"),
    }
}

#[tokio::test]
async fn four_numbers_two_solutions() {
    let instance = ProblemInstance::new(vec![1, 2, 3, 4], 5).unwrap();
    let report = solver(11, SolverConfig::default())
        .solve(&instance)
        .await
        .unwrap();

    let count = report.count.as_ref().unwrap();
    assert_eq!(count.marked, 2);
    assert_eq!(report.counting_qubits, Some(6));
    assert_eq!(report.iterations, Some(2));

    let expected: BTreeSet<String> = ["1001", "0110"].iter().map(|s| s.to_string()).collect();
    assert_eq!(peaks(&report.status), expected);
    assert!(report.subsets().iter().all(|s| s.satisfies(&instance)));
    assert_eq!(report.histogram.total_shots(), 1024);
}

#[tokio::test]
async fn three_equal_pairs() {
    let instance = ProblemInstance::new(vec![2, 2, 2], 4).unwrap();
    let report = solver(5, SolverConfig::default())
        .solve(&instance)
        .await
        .unwrap();

    assert_eq!(report.count.as_ref().unwrap().marked, 3);
    assert_eq!(report.iterations, Some(1));

    let expected: BTreeSet<String> = ["110", "101", "011"].iter().map(|s| s.to_string()).collect();
    assert_eq!(peaks(&report.status), expected);
}

#[tokio::test]
async fn counting_tracks_classical_count() {
    let cases = [
        (vec![1, 1], 1),
        (vec![1, 2, 3], 3),
        (vec![3, 5, 6], 8),
        (vec![2, 2, 2], 4),
        (vec![1, 2, 3, 4], 5),
    ];
    let solver = solver(23, SolverConfig::default());
    for (numbers, target) in cases {
        let instance = ProblemInstance::new(numbers, target).unwrap();
        let estimate = solver.count(&instance).await.unwrap();
        assert_eq!(
            estimate.marked,
            instance.solution_count(),
            "{instance}: raw estimate {}",
            estimate.raw
        );
    }
}

#[tokio::test]
async fn counting_is_exact_for_five_and_six_numbers() {
    // C(5,2) = 10, C(6,1) = 6, C(6,2) = 15, C(6,3) = 20.
    let cases = [
        (vec![1; 5], 2, 10),
        (vec![1; 6], 1, 6),
        (vec![1; 6], 2, 15),
        (vec![1; 6], 3, 20),
    ];
    for seed in [1, 2] {
        let solver = solver(seed, SolverConfig::default());
        for (numbers, target, marked) in &cases {
            let instance = ProblemInstance::new(numbers.clone(), *target).unwrap();
            assert_eq!(instance.solution_count(), *marked);

            let estimate = solver.count(&instance).await.unwrap();
            assert_eq!(
                estimate.marked, *marked,
                "{instance} seed {seed}: outcome {} raw {}",
                estimate.outcome, estimate.raw
            );
        }
    }
}

#[tokio::test]
async fn unreachable_target_has_no_solution() {
    // Every subset of {2, 4} is even.
    let instance = ProblemInstance::new(vec![2, 4], 3).unwrap();
    let report = solver(3, SolverConfig::default())
        .solve(&instance)
        .await
        .unwrap();

    assert_eq!(report.status, SearchStatus::NoSolution);
    assert_eq!(report.count.as_ref().unwrap().marked, 0);
    assert!(report.iterations.is_none());
    assert!(report.histogram.is_empty());
}

#[tokio::test]
async fn every_subset_marked_is_degenerate() {
    let instance = ProblemInstance::new(vec![0, 0], 0).unwrap();
    let err = solver(3, SolverConfig::default())
        .solve(&instance)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SearchError::DegenerateCount {
            estimate: 4,
            search_space: 4
        }
    ));
}

#[test]
fn infeasible_instance_is_rejected_before_any_circuit() {
    let err = ProblemInstance::new(vec![5, 9], 100).unwrap_err();
    assert!(matches!(err, SearchError::InfeasibleInstance(_)));
}

#[tokio::test]
async fn unoptimized_encoding_finds_the_pair() {
    let instance = ProblemInstance::new(vec![1, 2], 3).unwrap();
    let config = SolverConfig {
        encoding: Encoding::Unoptimized,
        ..SolverConfig::default()
    };
    let report = solver(17, config).solve(&instance).await.unwrap();

    assert_eq!(report.encoding, Encoding::Unoptimized);
    assert_eq!(report.layout.operand_width(), 2);
    assert_eq!(report.count.as_ref().unwrap().marked, 1);
    assert_eq!(report.iterations, Some(1));

    let subsets = report.subsets();
    assert_eq!(subsets.len(), 1);
    assert_eq!(subsets[0].bitstring, "11");
    assert_eq!(subsets[0].count, 1024);
}

#[tokio::test]
async fn unoptimized_sample_instance_exceeds_simulator() {
    // 5 index + 5 sum + 5×4 operand = 30 work qubits, limit 24.
    let instance = ProblemInstance::new(vec![5, 7, 8, 9, 1], 16).unwrap();
    let config = SolverConfig {
        encoding: Encoding::Unoptimized,
        ..SolverConfig::default()
    };
    let solver = solver(7, config);

    let err = solver.solve(&instance).await.unwrap_err();
    match &err {
        SearchError::ExceedsExecutor {
            circuit,
            encoding,
            required,
            available,
            ..
        } => {
            assert_eq!(*circuit, "counting");
            assert_eq!(*encoding, Encoding::Unoptimized);
            assert_eq!(*required, 37);
            assert_eq!(*available, 24);
        }
        other => panic!("expected ExceedsExecutor, got {other:?}"),
    }
    let message = err.to_string();
    assert!(message.contains("unoptimized"), "{message}");
    assert!(message.contains("5 index + 5 sum + 5×4 operand + 7 counting"), "{message}");

    let err = solver.solve_with_iterations(&instance, 1).await.unwrap_err();
    assert!(matches!(
        err,
        SearchError::ExceedsExecutor {
            circuit: "search",
            required: 30,
            ..
        }
    ));
}

#[tokio::test]
async fn fixed_iterations_skip_counting() {
    let instance = ProblemInstance::new(vec![3, 5, 6], 8).unwrap();
    let report = solver(29, SolverConfig::default())
        .solve_with_iterations(&instance, 2)
        .await
        .unwrap();

    assert!(report.count.is_none());
    assert!(report.counting_qubits.is_none());
    assert_eq!(report.iterations, Some(2));
    let subsets = report.subsets();
    assert_eq!(subsets[0].bitstring, "110");
    assert_eq!(subsets[0].indices, vec![0, 1]);
}

#[tokio::test]
async fn zero_iterations_is_inconclusive() {
    let instance = ProblemInstance::new(vec![1, 2, 3, 4], 5).unwrap();
    let report = solver(31, SolverConfig::default())
        .solve_with_iterations(&instance, 0)
        .await
        .unwrap();

    assert!(matches!(report.status, SearchStatus::Inconclusive { .. }));
    assert!(report.subsets().is_empty());
    assert_eq!(report.histogram.total_shots(), 1024);
}

#[tokio::test]
async fn narrow_sum_register_overflows() {
    let instance = ProblemInstance::new(vec![1, 2, 3, 4], 5).unwrap();
    let config = SolverConfig {
        sum_width: Some(3),
        ..SolverConfig::default()
    };
    let err = solver(1, config).solve(&instance).await.unwrap_err();
    assert!(matches!(
        err,
        SearchError::RegisterOverflow {
            max_sum: 10,
            required: 4,
            available: 3
        }
    ));

    let layout = RegisterLayout::for_instance(&instance, Encoding::Optimized, Some(2));
    assert!(matches!(layout, Err(SearchError::RegisterOverflow { .. })));
}

#[test]
fn iteration_table() {
    let expected = [
        ((8, 1), 2),
        ((8, 2), 1),
        ((8, 4), 1),
        ((16, 1), 3),
        ((16, 2), 2),
        ((16, 4), 1),
        ((32, 1), 4),
        ((32, 2), 3),
        ((32, 4), 2),
    ];
    for ((n, m), k) in expected {
        assert_eq!(optimal_iterations(n, m), k, "N={n} M={m}");
    }
}

#[test]
fn amplified_state_concentrates_on_solutions() {
    let instance = ProblemInstance::new(vec![1, 2, 3, 4], 5).unwrap();
    let grover = GroverIterator::new(&OptimizedOracle::new(), &instance).unwrap();
    let backend = SimulatorBackend::new();

    let uniform = backend.statevector(&grover.state_circuit(0).unwrap()).unwrap();
    let uniform = index_distribution(&uniform, grover.layout());
    assert!(uniform.iter().all(|p| (p - 1.0 / 16.0).abs() < 1e-9));

    let amplified = backend.statevector(&grover.state_circuit(2).unwrap()).unwrap();
    let dist = index_distribution(&amplified, grover.layout());
    // sin²(5θ) with sin²θ = 2/16, split over two solutions.
    assert!((dist[0b1001] - 0.47276).abs() < 1e-3);
    assert!((dist[0b0110] - 0.47276).abs() < 1e-3);
    assert!((dist.iter().sum::<f64>() - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn same_seed_same_report() {
    let instance = ProblemInstance::new(vec![1, 2, 3], 3).unwrap();
    let a = solver(99, SolverConfig::default()).solve(&instance).await.unwrap();
    let b = solver(99, SolverConfig::default()).solve(&instance).await.unwrap();
    assert_eq!(a.histogram, b.histogram);
    assert_eq!(a.status, b.status);
}

#[tokio::test]
async fn report_serializes_with_status_tag() {
    let instance = ProblemInstance::new(vec![1, 2, 3, 4], 5).unwrap();
    let report = solver(11, SolverConfig::default())
        .solve(&instance)
        .await
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["status"], "found");
    assert_eq!(json["encoding"], "optimized");
    assert_eq!(json["count"]["marked"], 2);
    assert_eq!(json["subsets"].as_array().unwrap().len(), 2);
}
