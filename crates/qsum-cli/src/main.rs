//! qsum Command-Line Interface
//!
//! Solves subset-sum instances with Grover search on the built-in
//! statevector simulator.
//!
//! ```text
//! $ qsum solve --numbers 5,7,8,9,1 --target 16
//! → Solving [5, 7, 8, 9, 1] -> 16 (optimized, 1024 shots)
//!   Layout: 5 index + 5 sum qubits
//!   Counting: 2 solutions (t = 7, outcome 10, estimate 1.89)
//!   Grover iterations: 3
//!   ...
//! ✓ 2 subsets found:
//!   01010: {7, 9} = 16  (48.2%)
//!   01101: {7, 8, 1} = 16  (47.6%)
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::common::{InstanceArgs, SolverArgs};
use commands::{count, inspect, solve, version};

/// qsum - quantum subset-sum search with Grover amplification
#[derive(Parser)]
#[command(name = "qsum")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count the solutions, amplify them and decode the peaks
    Solve {
        #[command(flatten)]
        instance: InstanceArgs,

        #[command(flatten)]
        solver: SolverArgs,

        /// Fixed number of Grover iterations (skips counting)
        #[arg(short, long)]
        iterations: Option<u64>,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Estimate the number of solutions with quantum counting
    Count {
        #[command(flatten)]
        instance: InstanceArgs,

        #[command(flatten)]
        solver: SolverArgs,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Show register layout and circuit sizes without running anything
    Inspect {
        #[command(flatten)]
        instance: InstanceArgs,

        #[command(flatten)]
        solver: SolverArgs,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Solve {
            instance,
            solver,
            iterations,
            format,
        } => solve::execute(&instance, &solver, iterations, &format).await,

        Commands::Count {
            instance,
            solver,
            format,
        } => count::execute(&instance, &solver, &format).await,

        Commands::Inspect {
            instance,
            solver,
            format,
        } => inspect::execute(&instance, &solver, &format),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qsum_core::Encoding;

    #[test]
    fn test_parse_solve_defaults_to_sample_instance() {
        let cli = Cli::try_parse_from(["qsum", "solve"]).unwrap();
        match cli.command {
            Commands::Solve {
                instance,
                solver,
                iterations,
                format,
            } => {
                assert_eq!(instance.numbers, vec![5, 7, 8, 9, 1]);
                assert_eq!(instance.target, 16);
                assert_eq!(solver.backend, "simulator");
                assert!(solver.encoding.is_none());
                assert!(iterations.is_none());
                assert_eq!(format, "table");
            }
            _ => panic!("Expected Solve command"),
        }
    }

    #[test]
    fn test_parse_solve_with_all_args() {
        let cli = Cli::try_parse_from([
            "qsum",
            "solve",
            "-n",
            "1,2,3,4",
            "-t",
            "5",
            "--encoding",
            "unoptimized",
            "--shots",
            "2048",
            "--counting-shots",
            "256",
            "--counting-qubits",
            "6",
            "--sum-width",
            "5",
            "--seed",
            "42",
            "-i",
            "2",
            "-f",
            "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Solve {
                instance,
                solver,
                iterations,
                format,
            } => {
                assert_eq!(instance.numbers, vec![1, 2, 3, 4]);
                assert_eq!(instance.target, 5);
                assert_eq!(solver.encoding, Some(Encoding::Unoptimized));
                assert_eq!(solver.shots, Some(2048));
                assert_eq!(solver.counting_shots, Some(256));
                assert_eq!(solver.counting_qubits, Some(6));
                assert_eq!(solver.sum_width, Some(5));
                assert_eq!(solver.seed, Some(42));
                assert_eq!(iterations, Some(2));
                assert_eq!(format, "json");
            }
            _ => panic!("Expected Solve command"),
        }
    }

    #[test]
    fn test_parse_negative_numbers_reach_validation() {
        let cli = Cli::try_parse_from(["qsum", "count", "--numbers=-3,4", "--target", "1"]).unwrap();
        match cli.command {
            Commands::Count { instance, .. } => {
                assert_eq!(instance.numbers, vec![-3, 4]);
                assert!(instance.build().is_err());
            }
            _ => panic!("Expected Count command"),
        }
    }

    #[test]
    fn test_parse_unknown_encoding() {
        let result = Cli::try_parse_from(["qsum", "solve", "--encoding", "dense"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_inspect_with_config() {
        let cli = Cli::try_parse_from(["qsum", "inspect", "-c", "qsum.yaml"]).unwrap();
        match cli.command {
            Commands::Inspect { solver, .. } => {
                assert_eq!(solver.config.as_deref(), Some(std::path::Path::new("qsum.yaml")));
            }
            _ => panic!("Expected Inspect command"),
        }
    }

    #[test]
    fn test_parse_verbose_flag() {
        let cli = Cli::try_parse_from(["qsum", "-vv", "version"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn test_no_subcommand() {
        assert!(Cli::try_parse_from(["qsum"]).is_err());
    }
}
