//! Quantum counting: phase estimation on the Grover iterator.
//!
//! On the plane spanned by the marked and unmarked superpositions, `G` has
//! eigenvalues `e^{±2πiφ}` with `sin²(πφ) = M/N`. The uniform index state
//! lies in that plane, so phase estimation with a counting register of `t`
//! qubits reads out `y ≈ φ·2^t` or `y ≈ (1−φ)·2^t`, with equal weight.
//!
//! ```text
//!   count[i] ──H──●(2^i times)── QFT⁻¹ ── measure → clbit i
//!                 │
//!   work     ─prep─G─────────────────────
//! ```

use std::collections::BTreeMap;
use std::f64::consts::PI;

use serde::Serialize;
use tracing::{debug, info};

use qsum_hal::Counts;
use qsum_ir::{Circuit, QubitId, StandardGate};

use crate::error::{SearchError, SearchResult};
use crate::grover::GroverIterator;

/// Default counting register width for `n` numbers: `n + 2`.
///
/// Reading the nearest outcome misses the phase by at most half a step, so
/// `M̂` is off by at most `π·N/2^(t+1)`. With `2^t ≥ π·N` that stays below
/// one half and the rounded estimate is exact for every `M`.
pub fn default_counting_qubits(n: u32) -> u32 {
    n + 2
}

/// Outcome of one counting run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountEstimate {
    /// Folded counting outcome `min(y, 2^t − y)` that was selected.
    pub outcome: u64,
    /// Estimated eigenphase `outcome / 2^t`.
    pub phase: f64,
    /// Unrounded estimate `N·sin²(π·phase)`.
    pub raw: f64,
    /// Estimated number of marked states; zero means none.
    pub marked: u64,
    /// Fraction of shots behind the selected outcome.
    pub support: f64,
}

impl CountEstimate {
    /// Whether counting found any marked state.
    pub fn has_solutions(&self) -> bool {
        self.marked > 0
    }
}

/// Builds counting circuits and interprets their histograms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantumCounter {
    counting_qubits: u32,
}

impl QuantumCounter {
    /// A counter with `counting_qubits` qubits of phase precision.
    pub fn new(counting_qubits: u32) -> Self {
        Self { counting_qubits }
    }

    /// Width of the counting register.
    pub fn counting_qubits(&self) -> u32 {
        self.counting_qubits
    }

    /// Phase estimation circuit for `grover`.
    ///
    /// The counting register occupies qubits `0..t` and is measured into
    /// classical bits `0..t`; the work registers follow it.
    pub fn circuit(&self, grover: &GroverIterator) -> SearchResult<Circuit> {
        let t = self.counting_qubits;
        let mut circuit = Circuit::new("counting");
        let count = circuit.add_qreg("count", t);
        let regs = grover.layout().allocate(&mut circuit);
        let work = regs.qubits();

        circuit.append(grover.preparation(), &work)?;
        circuit.apply_to_register(&StandardGate::H, &count)?;

        let controlled = grover.circuit().control(1)?;
        for (i, c) in count.iter().enumerate() {
            let mapping: Vec<QubitId> = std::iter::once(c).chain(work.iter().copied()).collect();
            for _ in 0..(1u64 << i) {
                circuit.append(&controlled, &mapping)?;
            }
        }

        let count_qubits: Vec<QubitId> = count.iter().collect();
        circuit.append(&Circuit::qft(t)?.inverse()?, &count_qubits)?;

        let clbits = circuit.add_creg("c", t);
        for (q, c) in count.iter().zip(clbits) {
            circuit.measure(q, c)?;
        }

        debug!(
            counting_qubits = t,
            qubits = circuit.num_qubits(),
            ops = circuit.num_ops(),
            "built counting circuit"
        );
        Ok(circuit)
    }

    /// Estimate the number of marked states from a counting histogram.
    ///
    /// `y` and `2^t − y` describe the same eigenphase and are tallied
    /// together; the most frequent folded outcome is used. A rounded
    /// estimate of zero yields an estimate without solutions, an estimate
    /// of `search_space` is a [`SearchError::DegenerateCount`], anything
    /// else is clamped to `1..search_space`.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn estimate(&self, counts: &Counts, search_space: u64) -> SearchResult<CountEstimate> {
        let t = self.counting_qubits as usize;
        let period = 1u64 << t;

        let mut folded: BTreeMap<u64, u64> = BTreeMap::new();
        for (bits, &n) in counts.iter() {
            let y = parse_outcome(bits, t)?;
            *folded.entry(y.min(period - y)).or_insert(0) += n;
        }

        // Highest count wins; ties go to the smaller phase.
        let (outcome, hits) = folded
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map(|(&y, &n)| (y, n))
            .ok_or_else(|| SearchError::AmbiguousMeasurement("counting histogram is empty".into()))?;

        let phase = outcome as f64 / period as f64;
        let raw = search_space as f64 * (PI * phase).sin().powi(2);
        let rounded = raw.round() as u64;

        if rounded >= search_space {
            return Err(SearchError::DegenerateCount {
                estimate: rounded,
                search_space,
            });
        }
        let marked = if rounded == 0 {
            0
        } else {
            rounded.clamp(1, search_space - 1)
        };

        let estimate = CountEstimate {
            outcome,
            phase,
            raw,
            marked,
            support: hits as f64 / counts.total_shots().max(1) as f64,
        };
        info!(outcome, raw, marked, "counting estimate");
        Ok(estimate)
    }
}

/// Read a counting bitstring, character `i` being bit `i`.
fn parse_outcome(bits: &str, width: usize) -> SearchResult<u64> {
    if bits.len() != width {
        return Err(SearchError::AmbiguousMeasurement(format!(
            "counting outcome '{bits}' has {} bits, expected {width}",
            bits.len()
        )));
    }
    bits.chars().enumerate().try_fold(0u64, |acc, (i, ch)| match ch {
        '0' => Ok(acc),
        '1' => Ok(acc | (1u64 << i)),
        other => Err(SearchError::AmbiguousMeasurement(format!(
            "unexpected character '{other}' in counting outcome"
        ))),
    })
}
