//! Error types for the subset-sum search.

use thiserror::Error;

use crate::config::ConfigError;
use crate::layout::Encoding;

/// Errors raised while building or running a search.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SearchError {
    /// The instance cannot have a solution, or is malformed.
    #[error("Infeasible instance: {0}")]
    InfeasibleInstance(String),

    /// The sum register cannot hold the largest reachable sum.
    #[error("Sum register of {available} qubits cannot hold sums up to {max_sum} ({required} qubits needed)")]
    RegisterOverflow {
        /// Largest sum the instance can reach.
        max_sum: u64,
        /// Qubits needed to hold `max_sum`.
        required: u32,
        /// Qubits that were configured.
        available: u32,
    },

    /// Counting concluded that every configuration is marked.
    #[error("Degenerate count: estimated {estimate} marked states out of {search_space}")]
    DegenerateCount {
        /// Rounded estimate of the number of marked states.
        estimate: u64,
        /// Size of the index search space.
        search_space: u64,
    },

    /// A circuit needs more qubits than the executor offers.
    #[error(
        "{circuit} circuit needs {required} qubits with the {encoding} encoding ({breakdown}) but the executor supports {available}"
    )]
    ExceedsExecutor {
        /// Which circuit was too wide.
        circuit: &'static str,
        /// Encoding that sized the work registers.
        encoding: Encoding,
        /// Per-register qubit counts.
        breakdown: String,
        /// Qubits the circuit needs.
        required: usize,
        /// Qubits the executor accepts.
        available: usize,
    },

    /// No measured bitstring stood out from the uniform floor.
    #[error("Ambiguous measurement: {0}")]
    AmbiguousMeasurement(String),

    /// Circuit construction failed.
    #[error("Circuit error: {0}")]
    Circuit(#[from] qsum_ir::IrError),

    /// The executor failed.
    #[error("Executor error: {0}")]
    Backend(#[from] qsum_hal::HalError),

    /// Invalid solver configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for search operations.
pub type SearchResult<T> = Result<T, SearchError>;
