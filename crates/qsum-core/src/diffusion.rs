//! Inversion about the mean.

use std::f64::consts::PI;

use qsum_ir::{Circuit, QubitId, StandardGate};

use crate::error::SearchResult;

/// `2|s⟩⟨s| − I` on `n` qubits, where `|s⟩` is the uniform superposition.
///
/// Built as `H X (multi-controlled Z) X H`, which gives `I − 2|s⟩⟨s|`, with
/// a global phase of `π` to fix the sign. The sign matters once the
/// operator is controlled: it decides whether phase estimation sees the
/// marked or the unmarked fraction.
pub fn diffusion(n: u32) -> SearchResult<Circuit> {
    let mut circuit = Circuit::new("diffusion");
    let reg = circuit.add_qreg("idx", n);
    let qubits: Vec<QubitId> = reg.iter().collect();

    circuit.apply_to_register(&StandardGate::H, &reg)?;
    circuit.apply_to_register(&StandardGate::X, &reg)?;
    if let Some((&last, rest)) = qubits.split_last() {
        circuit.mcz(rest, last)?;
    }
    circuit.apply_to_register(&StandardGate::X, &reg)?;
    circuit.apply_to_register(&StandardGate::H, &reg)?;
    circuit.add_global_phase(PI);

    Ok(circuit)
}
