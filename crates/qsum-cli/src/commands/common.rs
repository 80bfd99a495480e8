//! Shared arguments and helpers for CLI commands.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::debug;

use qsum_adapter_sim::SimulatorBackend;
use qsum_core::{Encoding, ProblemInstance, SolverConfig};
use qsum_hal::{Backend, Counts};

/// The instance to solve.
#[derive(Args, Debug, Clone)]
pub struct InstanceArgs {
    /// Comma-separated list of non-negative integers
    #[arg(
        short,
        long,
        value_delimiter = ',',
        allow_negative_numbers = true,
        default_values_t = [5i64, 7, 8, 9, 1]
    )]
    pub numbers: Vec<i64>,

    /// Target sum
    #[arg(short, long, default_value_t = 16, allow_negative_numbers = true)]
    pub target: i64,
}

impl InstanceArgs {
    /// Validate into a problem instance.
    pub fn build(&self) -> Result<ProblemInstance> {
        Ok(ProblemInstance::new(self.numbers.clone(), self.target)?)
    }
}

/// Solver and executor settings; flags override the config file and `QSUM_*`.
#[derive(Args, Debug, Clone)]
pub struct SolverArgs {
    /// Configuration file (YAML)
    #[arg(short, long, env = "QSUM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Oracle encoding (optimized, unoptimized); unoptimized adds one
    /// operand register per number, sized for the largest number
    #[arg(short, long)]
    pub encoding: Option<Encoding>,

    /// Shots for the amplified search
    #[arg(short, long)]
    pub shots: Option<u32>,

    /// Shots for the counting run
    #[arg(long)]
    pub counting_shots: Option<u32>,

    /// Counting register width
    #[arg(long)]
    pub counting_qubits: Option<u32>,

    /// Sum register width
    #[arg(long)]
    pub sum_width: Option<u32>,

    /// Backend to use
    #[arg(short, long, default_value = "simulator")]
    pub backend: String,

    /// Seed for the simulator's sampler
    #[arg(long)]
    pub seed: Option<u64>,
}

impl SolverArgs {
    /// Defaults, then the config file, then the environment, then flags.
    pub fn load_config(&self) -> Result<SolverConfig> {
        let mut config = SolverConfig::load(self.config.as_deref())
            .context("Failed to load configuration")?;

        if let Some(encoding) = self.encoding {
            config.encoding = encoding;
        }
        if let Some(shots) = self.shots {
            config.shots = shots;
        }
        if let Some(shots) = self.counting_shots {
            config.counting_shots = shots;
        }
        if let Some(t) = self.counting_qubits {
            config.counting_qubits = Some(t);
        }
        if let Some(width) = self.sum_width {
            config.sum_width = Some(width);
        }

        config.validate()?;
        debug!(?config, "resolved configuration");
        Ok(config)
    }

    /// The executor named by `--backend`.
    pub fn create_backend(&self) -> Result<Arc<dyn Backend>> {
        match self.backend.to_lowercase().as_str() {
            "simulator" | "sim" => {
                let backend = match self.seed {
                    Some(seed) => SimulatorBackend::with_seed(seed),
                    None => SimulatorBackend::new(),
                };
                Ok(Arc::new(backend))
            }
            other => {
                anyhow::bail!("Unknown backend: '{other}'. Available: simulator");
            }
        }
    }
}

/// Whether `format` selects JSON output.
pub fn wants_json(format: &str) -> Result<bool> {
    match format.to_lowercase().as_str() {
        "table" => Ok(false),
        "json" => Ok(true),
        other => anyhow::bail!("Unknown format: '{other}'. Available: table, json"),
    }
}

/// Pretty-print `value` as JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// A steady spinner with `message`.
pub fn spinner(message: impl Into<String>) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

/// Print the opening line shared by commands that execute circuits.
pub fn print_header(verb: &str, instance: &ProblemInstance, config: &SolverConfig, shots: u32) {
    println!(
        "{} {} {} ({}, {} shots)",
        style("→").cyan().bold(),
        verb,
        style(instance).green(),
        style(config.encoding).yellow(),
        shots
    );
}

/// Print a histogram with frequency bars, most frequent first.
#[allow(clippy::cast_precision_loss)]
pub fn print_histogram(counts: &Counts, limit: usize) {
    let sorted = counts.sorted();
    let total = counts.total_shots().max(1) as f64;

    for (bitstring, count) in sorted.iter().take(limit) {
        let prob = **count as f64 / total * 100.0;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let bar_len = (prob / 2.0).round() as usize;
        let bar: String = "█".repeat(bar_len);

        println!(
            "  {}: {:>6} ({:>5.2}%) {}",
            style(bitstring).cyan(),
            count,
            prob,
            style(bar).green()
        );
    }

    if sorted.len() > limit {
        println!("  ... and {} more outcomes", sorted.len() - limit);
    }
}

/// `{7, 9}` for the selected numbers of `indices`.
pub fn format_selection(instance: &ProblemInstance, indices: &[usize]) -> String {
    let values: Vec<String> = indices
        .iter()
        .filter_map(|&i| instance.numbers().get(i))
        .map(ToString::to_string)
        .collect();
    format!("{{{}}}", values.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn solver_args() -> SolverArgs {
        SolverArgs {
            config: None,
            encoding: None,
            shots: None,
            counting_shots: None,
            counting_qubits: None,
            sum_width: None,
            backend: "simulator".into(),
            seed: Some(1),
        }
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "encoding: unoptimized\nshots: 300\ncounting_shots: 100").unwrap();

        let args = SolverArgs {
            config: Some(file.path().to_path_buf()),
            shots: Some(500),
            ..solver_args()
        };
        let config = args.load_config().unwrap();
        assert_eq!(config.encoding, Encoding::Unoptimized);
        assert_eq!(config.shots, 500);
        assert_eq!(config.counting_shots, 100);
    }

    #[test]
    fn test_invalid_flag_fails_validation() {
        let args = SolverArgs {
            shots: Some(0),
            ..solver_args()
        };
        assert!(args.load_config().is_err());
    }

    #[test]
    fn test_backend_selection() {
        assert!(solver_args().create_backend().is_ok());
        let args = SolverArgs {
            backend: "SIM".into(),
            ..solver_args()
        };
        assert_eq!(args.create_backend().unwrap().name(), "simulator");
        let args = SolverArgs {
            backend: "iqm".into(),
            ..solver_args()
        };
        assert!(args.create_backend().is_err());
    }

    #[test]
    fn test_format_selection() {
        let instance = ProblemInstance::new(vec![5, 7, 8, 9, 1], 16).unwrap();
        assert_eq!(format_selection(&instance, &[1, 3]), "{7, 9}");
        assert_eq!(format_selection(&instance, &[]), "{}");
    }

    #[test]
    fn test_wants_json() {
        assert!(!wants_json("table").unwrap());
        assert!(wants_json("JSON").unwrap());
        assert!(wants_json("xml").is_err());
    }
}
