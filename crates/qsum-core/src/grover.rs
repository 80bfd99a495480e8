//! The Grover iterator and the search circuit built from it.

use std::f64::consts::PI;

use tracing::debug;

use qsum_ir::{Circuit, QubitId, StandardGate};

use crate::diffusion::diffusion;
use crate::error::SearchResult;
use crate::instance::ProblemInstance;
use crate::layout::{Encoding, RegisterLayout};
use crate::oracle::OracleBuilder;

/// Optimal number of Grover iterations, `round(π/4·√(N/M) − 1/2)`.
///
/// `marked` is clamped to `1..=search_space`.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn optimal_iterations(search_space: u64, marked: u64) -> u64 {
    let m = marked.clamp(1, search_space.max(1)) as f64;
    let n = search_space.max(1) as f64;
    (PI / 4.0 * (n / m).sqrt() - 0.5).round().max(0.0) as u64
}

/// `G = D · O` for one instance, together with its state preparation.
#[derive(Debug, Clone)]
pub struct GroverIterator {
    encoding: Encoding,
    layout: RegisterLayout,
    preparation: Circuit,
    oracle: Circuit,
    diffusion: Circuit,
    iteration: Circuit,
}

impl GroverIterator {
    /// Build the iterator for `instance` with `builder`'s encoding.
    pub fn new(builder: &dyn OracleBuilder, instance: &ProblemInstance) -> SearchResult<Self> {
        let layout = builder.layout(instance)?;
        let oracle = builder.build(instance)?;
        let diffusion = diffusion(layout.index_width())?;

        let (mut preparation, regs) = layout.circuit("prepare");
        preparation.append(&builder.prepare(instance)?, &regs.qubits())?;
        preparation.apply_to_register(&StandardGate::H, &regs.index)?;

        let (mut iteration, regs) = layout.circuit("grover");
        let index: Vec<QubitId> = regs.index.iter().collect();
        iteration.append(&oracle, &regs.qubits())?;
        iteration.append(&diffusion, &index)?;

        debug!(
            encoding = %builder.encoding(),
            qubits = layout.num_qubits(),
            ops = iteration.num_ops(),
            "built grover iterator"
        );

        Ok(Self {
            encoding: builder.encoding(),
            layout,
            preparation,
            oracle,
            diffusion,
            iteration,
        })
    }

    /// Encoding of the underlying oracle.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Register sizes of the work registers.
    pub fn layout(&self) -> &RegisterLayout {
        &self.layout
    }

    /// Operand loading followed by Hadamards on the index register.
    pub fn preparation(&self) -> &Circuit {
        &self.preparation
    }

    /// The phase oracle.
    pub fn oracle(&self) -> &Circuit {
        &self.oracle
    }

    /// The diffusion operator on the index register.
    pub fn diffusion(&self) -> &Circuit {
        &self.diffusion
    }

    /// One application of `G`.
    pub fn circuit(&self) -> &Circuit {
        &self.iteration
    }

    /// Check every component DAG before anything is executed.
    pub fn verify(&self) -> SearchResult<()> {
        for circuit in [&self.preparation, &self.oracle, &self.diffusion, &self.iteration] {
            circuit.dag().verify_integrity()?;
        }
        Ok(())
    }

    /// Preparation followed by `iterations` applications of `G`.
    pub fn state_circuit(&self, iterations: u64) -> SearchResult<Circuit> {
        let (mut circuit, regs) = self.layout.circuit(format!("grover_x{iterations}"));
        let work = regs.qubits();
        circuit.append(&self.preparation, &work)?;
        for _ in 0..iterations {
            circuit.append(&self.iteration, &work)?;
        }
        Ok(circuit)
    }

    /// [`Self::state_circuit`] with index qubit `i` measured into classical bit `i`.
    pub fn search_circuit(&self, iterations: u64) -> SearchResult<Circuit> {
        let mut circuit = self.state_circuit(iterations)?;
        let clbits = circuit.add_creg("c", self.layout.index_width());
        let index = (0..self.layout.index_width()).map(QubitId);
        for (q, c) in index.zip(clbits) {
            circuit.measure(q, c)?;
        }
        Ok(circuit)
    }
}
