//! Statevector simulation engine.

use num_complex::Complex64;
use rand::Rng;
use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rustc_hash::FxHashMap;
use std::f64::consts::{FRAC_1_SQRT_2, PI};

use qsum_hal::{Counts, HalError, HalResult};
use qsum_ir::{Circuit, GateKind, Instruction, InstructionKind, QubitId, StandardGate};

/// 2x2 unitary in row-major order.
type Matrix2 = [[Complex64; 2]; 2];

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// A statevector representing a quantum state.
///
/// Amplitude index bit `k` is qubit `k`.
#[derive(Debug, Clone)]
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let mut amplitudes = vec![ZERO; 1 << num_qubits];
        amplitudes[0] = ONE;
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Run every gate of `circuit` on `|0…0⟩`, global phase included.
    pub fn simulate(circuit: &Circuit) -> Self {
        let mut sv = Self::new(circuit.num_qubits());
        for (_, inst) in circuit.dag().topological_ops() {
            sv.apply(inst);
        }
        sv.apply_global_phase(circuit.global_phase());
        sv
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Borrow the amplitudes.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Take ownership of the amplitudes.
    pub fn into_amplitudes(self) -> Vec<Complex64> {
        self.amplitudes
    }

    /// Born-rule probability of every basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex64::norm_sqr).collect()
    }

    /// Apply an instruction to the statevector.
    ///
    /// Measurements and barriers leave the state untouched; sampling happens
    /// once at the end of the circuit.
    pub fn apply(&mut self, instruction: &Instruction) {
        if let InstructionKind::Gate(gate) = &instruction.kind {
            self.apply_gate(&gate.kind, &instruction.qubits);
        }
    }

    fn apply_gate(&mut self, kind: &GateKind, qubits: &[QubitId]) {
        let (base, num_ctrl) = kind.base();
        let (controls, operands) = qubits.split_at(num_ctrl as usize);
        let mut ctrl = controls.iter().fold(0usize, |m, q| m | bit(*q));
        let q = |k: usize| operands[k].index();

        match base {
            StandardGate::I => {}
            StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::S
            | StandardGate::Sdg
            | StandardGate::T
            | StandardGate::Tdg
            | StandardGate::Rx(_)
            | StandardGate::Ry(_)
            | StandardGate::Rz(_)
            | StandardGate::P(_) => {
                if let Some(m) = single_qubit_matrix(base) {
                    self.apply_single(&m, q(0), ctrl);
                }
            }
            StandardGate::CX
            | StandardGate::CY
            | StandardGate::CZ
            | StandardGate::CH
            | StandardGate::CP(_) => {
                ctrl |= 1 << q(0);
                if let Some(m) = controlled_target_matrix(base) {
                    self.apply_single(&m, q(1), ctrl);
                }
            }
            StandardGate::Swap => self.apply_swap(q(0), q(1), ctrl),
            StandardGate::CCX => {
                ctrl |= (1 << q(0)) | (1 << q(1));
                self.apply_single(&pauli_x(), q(2), ctrl);
            }
            StandardGate::CSwap => {
                ctrl |= 1 << q(0);
                self.apply_swap(q(1), q(2), ctrl);
            }
        }
    }

    /// Apply `m` to `target` on every basis state whose `ctrl` bits are all set.
    fn apply_single(&mut self, m: &Matrix2, target: usize, ctrl: usize) {
        let tgt_mask = 1 << target;
        let diagonal = m[0][1] == ZERO && m[1][0] == ZERO;

        if diagonal {
            let (d0, d1) = (m[0][0], m[1][1]);
            for (i, amp) in self.amplitudes.iter_mut().enumerate() {
                if i & ctrl != ctrl {
                    continue;
                }
                *amp *= if i & tgt_mask == 0 { d0 } else { d1 };
            }
            return;
        }

        for i in 0..self.amplitudes.len() {
            if i & tgt_mask != 0 || i & ctrl != ctrl {
                continue;
            }
            let j = i | tgt_mask;
            let a = self.amplitudes[i];
            let b = self.amplitudes[j];
            self.amplitudes[i] = m[0][0] * a + m[0][1] * b;
            self.amplitudes[j] = m[1][0] * a + m[1][1] * b;
        }
    }

    fn apply_swap(&mut self, q1: usize, q2: usize, ctrl: usize) {
        let mask1 = 1 << q1;
        let mask2 = 1 << q2;
        for i in 0..self.amplitudes.len() {
            if i & ctrl != ctrl {
                continue;
            }
            if i & mask1 != 0 && i & mask2 == 0 {
                let j = (i & !mask1) | mask2;
                self.amplitudes.swap(i, j);
            }
        }
    }

    fn apply_global_phase(&mut self, phase: f64) {
        if phase == 0.0 {
            return;
        }
        let factor = Complex64::from_polar(1.0, phase);
        for amp in &mut self.amplitudes {
            *amp *= factor;
        }
    }

    /// Draw `shots` samples of the measured classical bits.
    ///
    /// `measured` lists `(qubit, clbit)` pairs; the bitstring has `num_clbits`
    /// characters with character `c` holding classical bit `c`.
    pub fn sample_counts<R: Rng + ?Sized>(
        &self,
        measured: &[(usize, usize)],
        num_clbits: usize,
        shots: u32,
        rng: &mut R,
    ) -> HalResult<Counts> {
        let mut marginal: FxHashMap<usize, f64> = FxHashMap::default();
        for (i, amp) in self.amplitudes.iter().enumerate() {
            let p = amp.norm_sqr();
            if p == 0.0 {
                continue;
            }
            let outcome = measured
                .iter()
                .filter(|&&(q, _)| (i >> q) & 1 == 1)
                .fold(0usize, |acc, &(_, c)| acc | (1usize << c));
            *marginal.entry(outcome).or_insert(0.0) += p;
        }

        let mut outcomes: Vec<(usize, f64)> = marginal.into_iter().collect();
        outcomes.sort_unstable_by_key(|(o, _)| *o);

        let dist = WeightedIndex::new(outcomes.iter().map(|(_, p)| *p))
            .map_err(|e| HalError::Backend(format!("cannot sample final state: {e}")))?;

        let mut tallies = vec![0u64; outcomes.len()];
        for _ in 0..shots {
            tallies[dist.sample(rng)] += 1;
        }

        let mut counts = Counts::new();
        for ((outcome, _), n) in outcomes.iter().zip(tallies) {
            if n > 0 {
                counts.insert(outcome_to_bitstring(*outcome, num_clbits), n);
            }
        }
        Ok(counts)
    }
}

#[inline]
fn bit(q: QubitId) -> usize {
    1 << q.index()
}

/// Render `outcome` with bit `c` as character `c`.
pub(crate) fn outcome_to_bitstring(outcome: usize, width: usize) -> String {
    (0..width)
        .map(|c| if (outcome >> c) & 1 == 1 { '1' } else { '0' })
        .collect()
}

fn pauli_x() -> Matrix2 {
    [[ZERO, ONE], [ONE, ZERO]]
}

fn phase(theta: f64) -> Matrix2 {
    [[ONE, ZERO], [ZERO, Complex64::from_polar(1.0, theta)]]
}

fn single_qubit_matrix(gate: &StandardGate) -> Option<Matrix2> {
    let i = Complex64::i();
    let m = match gate {
        StandardGate::I => [[ONE, ZERO], [ZERO, ONE]],
        StandardGate::X => pauli_x(),
        StandardGate::Y => [[ZERO, -i], [i, ZERO]],
        StandardGate::Z => phase(PI),
        StandardGate::H => {
            let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
            [[h, h], [h, -h]]
        }
        StandardGate::S => phase(PI / 2.0),
        StandardGate::Sdg => phase(-PI / 2.0),
        StandardGate::T => phase(PI / 4.0),
        StandardGate::Tdg => phase(-PI / 4.0),
        StandardGate::Rx(theta) => {
            let c = Complex64::new((theta / 2.0).cos(), 0.0);
            let s = Complex64::new(0.0, -(theta / 2.0).sin());
            [[c, s], [s, c]]
        }
        StandardGate::Ry(theta) => {
            let c = Complex64::new((theta / 2.0).cos(), 0.0);
            let s = Complex64::new((theta / 2.0).sin(), 0.0);
            [[c, -s], [s, c]]
        }
        StandardGate::Rz(theta) => [
            [Complex64::from_polar(1.0, -theta / 2.0), ZERO],
            [ZERO, Complex64::from_polar(1.0, theta / 2.0)],
        ],
        StandardGate::P(theta) => phase(*theta),
        _ => return None,
    };
    Some(m)
}

/// Target matrix of a singly-controlled standard gate.
fn controlled_target_matrix(gate: &StandardGate) -> Option<Matrix2> {
    match gate {
        StandardGate::CX => single_qubit_matrix(&StandardGate::X),
        StandardGate::CY => single_qubit_matrix(&StandardGate::Y),
        StandardGate::CZ => single_qubit_matrix(&StandardGate::Z),
        StandardGate::CH => single_qubit_matrix(&StandardGate::H),
        StandardGate::CP(theta) => Some(phase(*theta)),
        _ => None,
    }
}
