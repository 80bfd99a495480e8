//! qsum Core: Quantum Subset-Sum Search
//!
//! Finds the index subsets of a list of non-negative integers that add up
//! to a target, using Grover amplitude amplification with the iteration
//! count chosen by quantum counting.
//!
//! # Pipeline
//!
//! ```text
//!   ProblemInstance
//!        │
//!        ▼
//!   OracleBuilder ──→ phase oracle  O = A · C · A⁻¹
//!        │                 │
//!        │            diffusion D
//!        ▼                 ▼
//!   GroverIterator   G = D · O
//!        │
//!        ├──→ QuantumCounter ──→ M̂ ──→ k*
//!        │
//!        └──→ search circuit (k* × G) ──→ MeasurementDecoder ──→ subsets
//! ```
//!
//! # Bit order
//!
//! Index qubit `i` stands for number `i`, and character `i` of every
//! bitstring this crate reports is index `i`. For `[5, 7, 8, 9, 1]` the
//! string `"01001"` selects the second and last numbers.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use qsum_adapter_sim::SimulatorBackend;
//! use qsum_core::{ProblemInstance, SolverConfig, SubsetSumSolver};
//!
//! let instance = ProblemInstance::new(vec![1, 2, 3, 4], 5)?;
//! let solver = SubsetSumSolver::new(
//!     Arc::new(SimulatorBackend::with_seed(7)),
//!     SolverConfig::default(),
//! )?;
//! let report = solver.solve(&instance).await?;
//! for subset in report.subsets() {
//!     println!("{} -> {:?}", subset.bitstring, subset.indices);
//! }
//! ```

pub mod arithmetic;
pub mod config;
pub mod counting;
pub mod decoder;
pub mod diffusion;
pub mod error;
pub mod grover;
pub mod instance;
pub mod layout;
pub mod oracle;
pub mod solver;

pub use arithmetic::{build_adder, load_operands, sum_circuit};
pub use config::{ConfigError, SolverConfig};
pub use counting::{CountEstimate, QuantumCounter, default_counting_qubits};
pub use decoder::{MeasurementDecoder, Subset};
pub use diffusion::diffusion;
pub use error::{SearchError, SearchResult};
pub use grover::{GroverIterator, optimal_iterations};
pub use instance::ProblemInstance;
pub use layout::{Encoding, RegisterLayout, Registers};
pub use oracle::{OptimizedOracle, OracleBuilder, UnoptimizedOracle, oracle_for, phase_oracle};
pub use solver::{SearchReport, SearchStatus, SubsetSumSolver, index_distribution};
