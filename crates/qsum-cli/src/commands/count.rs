//! Count command implementation.

use anyhow::Result;
use console::style;
use serde::Serialize;

use qsum_core::{CountEstimate, SubsetSumSolver, optimal_iterations};

use super::common::{InstanceArgs, SolverArgs, print_header, print_json, spinner, wants_json};

#[derive(Serialize)]
struct CountReport<'a> {
    numbers: &'a [u64],
    target: u64,
    counting_qubits: u32,
    #[serde(flatten)]
    estimate: &'a CountEstimate,
    iterations: Option<u64>,
}

/// Execute the count command.
pub async fn execute(
    instance_args: &InstanceArgs,
    solver_args: &SolverArgs,
    format: &str,
) -> Result<()> {
    let json = wants_json(format)?;
    let instance = instance_args.build()?;
    let config = solver_args.load_config()?;
    let backend = solver_args.create_backend()?;
    let counting_qubits = config.counting_qubits_for(&instance);

    if !json {
        print_header("Counting", &instance, &config, config.counting_shots);
    }

    let solver = SubsetSumSolver::new(backend, config)?;
    let progress = if json {
        None
    } else {
        Some(spinner(format!(
            "Running phase estimation with {counting_qubits} counting qubits..."
        ))?)
    };
    let outcome = solver.count(&instance).await;
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }
    let estimate = outcome?;

    let iterations = estimate
        .has_solutions()
        .then(|| optimal_iterations(instance.search_space(), estimate.marked));

    if json {
        return print_json(&CountReport {
            numbers: instance.numbers(),
            target: instance.target(),
            counting_qubits,
            estimate: &estimate,
            iterations,
        });
    }

    println!(
        "\n{} Estimated solutions: {}",
        style("✓").green().bold(),
        style(estimate.marked).yellow().bold()
    );
    println!(
        "  Outcome {} of {} (phase {:.4}, {:.1}% of shots)",
        estimate.outcome,
        1u64 << counting_qubits,
        estimate.phase,
        estimate.support * 100.0
    );
    println!("  Unrounded estimate: {:.3}", estimate.raw);
    match iterations {
        Some(k) => println!("  Grover iterations: {}", style(k).yellow()),
        None => println!("  No solutions; no search needed"),
    }
    Ok(())
}
