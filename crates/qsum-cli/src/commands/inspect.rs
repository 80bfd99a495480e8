//! Inspect command implementation.

use anyhow::Result;
use console::style;
use serde::Serialize;

use qsum_core::{GroverIterator, QuantumCounter, RegisterLayout, optimal_iterations};
use qsum_hal::Backend;
use qsum_ir::Circuit;

use super::common::{InstanceArgs, SolverArgs, print_json, wants_json};

/// Largest list whose solutions are enumerated classically.
const MAX_ENUMERATED: usize = 20;

#[derive(Serialize)]
struct CircuitSize {
    qubits: usize,
    ops: usize,
    depth: usize,
}

impl From<&Circuit> for CircuitSize {
    fn from(circuit: &Circuit) -> Self {
        Self {
            qubits: circuit.num_qubits(),
            ops: circuit.num_ops(),
            depth: circuit.depth(),
        }
    }
}

#[derive(Serialize)]
struct Inspection {
    numbers: Vec<u64>,
    target: u64,
    encoding: String,
    layout: RegisterLayout,
    oracle: CircuitSize,
    grover: CircuitSize,
    counting_qubits: u32,
    counting: CircuitSize,
    executor_qubits: usize,
    fits_executor: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    solutions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    iterations: Option<u64>,
}

/// Execute the inspect command.
pub fn execute(instance_args: &InstanceArgs, solver_args: &SolverArgs, format: &str) -> Result<()> {
    let json = wants_json(format)?;
    let instance = instance_args.build()?;
    let config = solver_args.load_config()?;
    let executor_qubits = solver_args.create_backend()?.capabilities().num_qubits as usize;

    let builder = config.oracle_builder();
    let grover = GroverIterator::new(builder.as_ref(), &instance)?;
    grover.verify()?;

    let counting_qubits = config.counting_qubits_for(&instance);
    let counting = QuantumCounter::new(counting_qubits).circuit(&grover)?;

    let solutions = (instance.len() <= MAX_ENUMERATED).then(|| {
        instance
            .solutions()
            .into_iter()
            .map(|mask| instance.indicator(mask))
            .collect::<Vec<_>>()
    });
    let iterations = solutions
        .as_ref()
        .filter(|s| !s.is_empty())
        .map(|s| optimal_iterations(instance.search_space(), s.len() as u64));

    let inspection = Inspection {
        numbers: instance.numbers().to_vec(),
        target: instance.target(),
        encoding: grover.encoding().to_string(),
        layout: *grover.layout(),
        oracle: grover.oracle().into(),
        grover: grover.circuit().into(),
        counting_qubits,
        counting: (&counting).into(),
        executor_qubits,
        fits_executor: counting.num_qubits() <= executor_qubits,
        solutions,
        iterations,
    };

    if json {
        return print_json(&inspection);
    }

    println!(
        "{} {} ({})",
        style("Instance").cyan().bold(),
        style(&instance).green(),
        style(&inspection.encoding).yellow()
    );
    let layout = &inspection.layout;
    println!("  Index register:   {} qubits", layout.index_width());
    println!("  Sum register:     {} qubits", layout.sum_width());
    if layout.operand_width() > 0 {
        println!(
            "  Operand registers: {} × {} qubits",
            instance.len(),
            layout.operand_width()
        );
    }

    println!("\n{}", style("Circuits").cyan().bold());
    for (name, size) in [
        ("oracle", &inspection.oracle),
        ("grover", &inspection.grover),
        ("counting", &inspection.counting),
    ] {
        println!(
            "  {:<9} {:>3} qubits  {:>7} ops  depth {}",
            name, size.qubits, size.ops, size.depth
        );
    }
    println!("  Counting register: {counting_qubits} qubits");
    if !inspection.fits_executor {
        println!(
            "  {} counting circuit needs {} qubits ({} + {} counting), executor supports {}",
            style("!").yellow().bold(),
            inspection.counting.qubits,
            layout,
            counting_qubits,
            executor_qubits
        );
    }

    match &inspection.solutions {
        Some(solutions) if solutions.is_empty() => {
            println!("\n{} No subset sums to the target", style("✗").red().bold());
        }
        Some(solutions) => {
            println!(
                "\n{} {} exact solution{}:",
                style("✓").green().bold(),
                solutions.len(),
                if solutions.len() == 1 { "" } else { "s" }
            );
            for bitstring in solutions {
                println!("  {}", style(bitstring).cyan());
            }
            if let Some(k) = inspection.iterations {
                println!("  Optimal Grover iterations: {}", style(k).yellow());
            }
        }
        None => {
            println!(
                "\n  {} numbers: solutions not enumerated",
                style(instance.len()).dim()
            );
        }
    }
    Ok(())
}
