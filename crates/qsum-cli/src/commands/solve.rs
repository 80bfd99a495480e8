//! Solve command implementation.

use anyhow::Result;
use console::style;

use qsum_core::{ProblemInstance, SearchReport, SearchStatus, SubsetSumSolver};

use super::common::{
    InstanceArgs, SolverArgs, format_selection, print_header, print_histogram, print_json, spinner,
    wants_json,
};

/// Execute the solve command.
pub async fn execute(
    instance_args: &InstanceArgs,
    solver_args: &SolverArgs,
    iterations: Option<u64>,
    format: &str,
) -> Result<()> {
    let json = wants_json(format)?;
    let instance = instance_args.build()?;
    let config = solver_args.load_config()?;
    let backend = solver_args.create_backend()?;

    if !json {
        print_header("Solving", &instance, &config, config.shots);
    }

    let solver = SubsetSumSolver::new(backend, config)?;
    let progress = if json {
        None
    } else {
        Some(spinner(match iterations {
            Some(k) => format!("Running {k} Grover iterations..."),
            None => "Counting solutions and searching...".to_string(),
        })?)
    };

    let outcome = match iterations {
        Some(k) => solver.solve_with_iterations(&instance, k).await,
        None => solver.solve(&instance).await,
    };
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }
    let report = outcome?;

    if json {
        print_json(&report)
    } else {
        print_report(&report, &instance);
        Ok(())
    }
}

fn print_report(report: &SearchReport, instance: &ProblemInstance) {
    let layout = &report.layout;
    if layout.operand_width() > 0 {
        println!(
            "  Layout: {} index + {} sum + {}×{} operand qubits",
            layout.index_width(),
            layout.sum_width(),
            instance.len(),
            layout.operand_width()
        );
    } else {
        println!(
            "  Layout: {} index + {} sum qubits",
            layout.index_width(),
            layout.sum_width()
        );
    }

    if let (Some(count), Some(t)) = (&report.count, report.counting_qubits) {
        println!(
            "  Counting: {} solutions (t = {}, outcome {}, estimate {:.2})",
            style(count.marked).yellow(),
            t,
            count.outcome,
            count.raw
        );
    }
    if let Some(k) = report.iterations {
        println!("  Grover iterations: {}", style(k).yellow());
    }

    match &report.status {
        SearchStatus::Found { subsets } => {
            println!(
                "\n{} Histogram ({} shots):",
                style("✓").green().bold(),
                report.histogram.total_shots()
            );
            print_histogram(&report.histogram, 8);

            println!(
                "\n{} {} subset{} found:",
                style("✓").green().bold(),
                subsets.len(),
                if subsets.len() == 1 { "" } else { "s" }
            );
            for subset in subsets {
                let mark = if subset.satisfies(instance) {
                    style("=").green()
                } else {
                    style("≠").red()
                };
                println!(
                    "  {}: {} {} {}  ({:.1}%)",
                    style(&subset.bitstring).cyan(),
                    format_selection(instance, &subset.indices),
                    mark,
                    instance.subset_sum(subset.mask()),
                    subset.frequency * 100.0
                );
            }
        }
        SearchStatus::NoSolution => {
            println!(
                "\n{} No subset of {:?} sums to {}",
                style("✗").red().bold(),
                instance.numbers(),
                instance.target()
            );
        }
        SearchStatus::Inconclusive { reason } => {
            println!(
                "\n{} Histogram ({} shots):",
                style("?").yellow().bold(),
                report.histogram.total_shots()
            );
            print_histogram(&report.histogram, 8);
            println!("\n{} Inconclusive: {}", style("!").yellow().bold(), reason);
        }
    }
}
