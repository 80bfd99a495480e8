//! qsum Circuit Intermediate Representation
//!
//! Data structures for the reversible circuits built by the subset-sum
//! search: qubits and named registers, gates (including multi-controlled
//! variants of every standard gate), instructions, and a DAG-backed
//! [`Circuit`] builder.
//!
//! # Overview
//!
//! Circuits are stored as a DAG internally so that depth and operation
//! counts are cheap to report and wire integrity can be verified before a
//! circuit is handed to an executor. On top of the gate helpers the
//! [`Circuit`] type offers the composition primitives the search relies on:
//!
//! - [`Circuit::append`] places one circuit onto a subset of another's qubits
//! - [`Circuit::inverse`] produces the adjoint, used for uncomputation
//! - [`Circuit::control`] adds control qubits to every operation
//! - [`Circuit::qft`] builds the quantum Fourier transform
//!
//! # Bit order
//!
//! All register arithmetic is little-endian: qubit `k` of a register holds
//! the bit of weight `2^k`, and a basis-state index has bit `k` set exactly
//! when qubit `k` is `|1⟩`.
//!
//! # Example: Bell state
//!
//! ```rust
//! use qsum_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell_state", 2, 2);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//! circuit.measure_all().unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.depth(), 3);
//! ```
//!
//! # Example: uncomputation
//!
//! ```rust
//! use qsum_ir::{Circuit, QubitId};
//!
//! let mut forward = Circuit::with_size("forward", 2, 0);
//! forward.h(QubitId(0)).unwrap();
//! forward.cp(0.25, QubitId(0), QubitId(1)).unwrap();
//!
//! let backward = forward.inverse().unwrap();
//! assert_eq!(backward.dag().num_ops(), 2);
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `H` | 1 | Hadamard gate |
//! | `X`, `Y`, `Z` | 1 | Pauli gates |
//! | `S`, `Sdg`, `T`, `Tdg` | 1 | Phase fractions of Z |
//! | `Rx`, `Ry`, `Rz`, `P` | 1 | Rotation and phase gates |
//! | `CX`, `CY`, `CZ`, `CH`, `CP` | 2 | Singly-controlled gates |
//! | `Swap` | 2 | SWAP gate |
//! | `CCX`, `CSwap` | 3 | Toffoli and Fredkin gates |
//! | controlled | n + k | Any of the above with n extra controls |

pub mod circuit;
pub mod dag;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::Circuit;
pub use dag::{CircuitDag, NodeIndex, WireId};
pub use error::{IrError, IrResult};
pub use gate::{ControlledGate, Gate, GateKind, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use qubit::{Clbit, ClbitId, QuantumRegister, Qubit, QubitId};
