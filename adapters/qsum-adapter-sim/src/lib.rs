//! qsum Local Statevector Executor
//!
//! Exact, noiseless simulation of the circuits built by the subset-sum
//! search. Every standard gate is supported with any number of extra
//! controls; a controlled gate costs one pass over the amplitudes, the same
//! as its uncontrolled base.
//!
//! # Sampling
//!
//! Measurements are treated as terminal. A job simulates the circuit once,
//! marginalises the final distribution onto the measured classical bits,
//! and draws all shots from that distribution. Seeded backends
//! ([`SimulatorBackend::with_seed`]) give reproducible histograms.
//!
//! # Performance
//!
//! | Qubits | Memory | Simulation Speed |
//! |--------|--------|------------------|
//! | 10 | ~16 KB | Instant |
//! | 15 | ~512 KB | Fast |
//! | 20 | ~16 MB | Moderate |
//! | 24 | ~256 MB | Slow |
//!
//! # Example
//!
//! ```ignore
//! use qsum_adapter_sim::SimulatorBackend;
//! use qsum_hal::Backend;
//! use qsum_ir::{Circuit, QubitId};
//!
//! let backend = SimulatorBackend::with_seed(7);
//! let mut circuit = Circuit::with_size("coin", 1, 1);
//! circuit.h(QubitId(0))?;
//! circuit.measure_all()?;
//! let result = backend.run(&circuit, 1000).await?;
//! ```

mod simulator;
mod statevector;

pub use simulator::SimulatorBackend;
pub use statevector::Statevector;
