//! Reversible addition in the Fourier basis.
//!
//! The sum register starts in `|0⟩`. A layer of Hadamards puts it in the
//! Fourier image of zero, each selected number is added as a set of phase
//! rotations, and an inverse QFT brings the total back to the computational
//! basis. Sums wrap modulo `2^d`; the layout guarantees `d` is wide enough
//! that they never do.

use std::f64::consts::PI;

use qsum_ir::{Circuit, Instruction, QuantumRegister, QubitId, StandardGate};

use crate::error::SearchResult;
use crate::instance::ProblemInstance;
use crate::layout::{RegisterLayout, Registers};

/// Phase rotations adding `value` to a Fourier-basis `sum` register.
///
/// Qubit `j` of the register is rotated by `2π·(value·2^j mod 2^d)/2^d`,
/// conditioned on every qubit in `controls`. Rotations that are a multiple
/// of `2π` are left out, so the sequence may be empty.
pub fn build_adder(value: u64, controls: &[QubitId], sum: &QuantumRegister) -> Vec<Instruction> {
    let width = sum.len() as u32;
    let modulus = 1u128 << width;
    let reduced = u128::from(value) % modulus;

    sum.iter()
        .enumerate()
        .filter_map(|(j, target)| {
            let step = (reduced << j) % modulus;
            if step == 0 {
                return None;
            }
            #[allow(clippy::cast_precision_loss)]
            let angle = 2.0 * PI * (step as f64) / (modulus as f64);
            Some(Instruction::controlled_gate(
                StandardGate::P(angle),
                controls.iter().copied(),
                [target],
            ))
        })
        .collect()
}

/// Circuit that adds the selected numbers into the sum register.
///
/// Acts on the work registers of `layout` and leaves the index and operand
/// registers unchanged. With operand registers present, bit `b` of number
/// `i` is added as `2^b` under the joint control of index qubit `i` and
/// operand qubit `b`; otherwise number `i` is added directly under index
/// qubit `i`.
pub fn sum_circuit(instance: &ProblemInstance, layout: &RegisterLayout) -> SearchResult<Circuit> {
    let (mut circuit, regs) = layout.circuit("add");
    circuit.apply_to_register(&StandardGate::H, &regs.sum)?;

    for (i, (&value, x)) in instance.numbers().iter().zip(regs.index.iter()).enumerate() {
        match regs.operands.get(i) {
            None => {
                circuit.extend(build_adder(value, &[x], &regs.sum))?;
            }
            Some(operand) => {
                for (b, a) in operand.iter().enumerate() {
                    circuit.extend(build_adder(1u64 << b, &[x, a], &regs.sum))?;
                }
            }
        }
    }

    let iqft = Circuit::qft(layout.sum_width())?.inverse()?;
    let sum_qubits: Vec<QubitId> = regs.sum.iter().collect();
    circuit.append(&iqft, &sum_qubits)?;

    Ok(circuit)
}

/// Basis-state preparation that writes each number into its operand register.
///
/// Empty for layouts without operand registers.
pub fn load_operands(instance: &ProblemInstance, layout: &RegisterLayout) -> SearchResult<Circuit> {
    let (mut circuit, regs) = layout.circuit("load");
    write_operands(&mut circuit, instance, &regs)?;
    Ok(circuit)
}

fn write_operands(
    circuit: &mut Circuit,
    instance: &ProblemInstance,
    regs: &Registers,
) -> SearchResult<()> {
    for (&value, operand) in instance.numbers().iter().zip(&regs.operands) {
        for (b, a) in operand.iter().enumerate() {
            if (value >> b) & 1 == 1 {
                circuit.x(a)?;
            }
        }
    }
    Ok(())
}
