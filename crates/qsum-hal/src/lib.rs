//! qsum Executor Abstraction
//!
//! The search never talks to a simulator directly. It is handed an
//! executor implementing [`Backend`] (run a circuit for a number of shots,
//! get a histogram back) and, where exact amplitudes are needed for
//! verification, [`StatevectorBackend`].
//!
//! # Overview
//!
//! - [`Backend`]: async job lifecycle (`submit`, `status`, `result`, `wait`)
//!   with a provided [`Backend::run`] for the common submit-and-wait case
//! - [`Capabilities`]: qubit limit, shot limit and supported gates
//! - [`Counts`] / [`ExecutionResult`]: measured histograms
//! - [`Job`] / [`JobId`] / [`JobStatus`]: job state machine
//!
//! # Bitstrings
//!
//! Character `i` of every bitstring in [`Counts`] is classical bit `i`.
//! This is the reverse of the usual "most significant bit first" rendering
//! and lets a bitstring be read left to right as an index list.
//!
//! # Example
//!
//! ```ignore
//! use qsum_hal::Backend;
//! use qsum_adapter_sim::SimulatorBackend;
//! use qsum_ir::{Circuit, QubitId};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut circuit = Circuit::with_size("flip", 2, 2);
//!     circuit.x(QubitId(0))?;
//!     circuit.measure_all()?;
//!
//!     let backend = SimulatorBackend::new();
//!     let result = backend.run(&circuit, 100).await?;
//!     assert_eq!(result.counts.get("10"), 100);
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod capability;
pub mod error;
pub mod job;
pub mod result;

pub use backend::{Backend, BackendAvailability, StatevectorBackend, ValidationResult};
pub use capability::{Capabilities, GateSet};
pub use error::{HalError, HalResult};
pub use job::{Job, JobId, JobStatus};
pub use result::{Counts, ExecutionResult};
