//! Phase oracles marking index configurations that hit the target.
//!
//! Every oracle has the shape `A · C · A⁻¹`: `A` adds the selected numbers
//! into the sum register, `C` flips the phase of the sum register's `|T⟩`
//! state, and `A⁻¹` returns the sum register to `|0⟩`. The inverse is
//! produced by [`Circuit::inverse`], not by repeating gates.

use qsum_ir::{Circuit, QubitId};

use crate::arithmetic::{load_operands, sum_circuit};
use crate::error::SearchResult;
use crate::instance::ProblemInstance;
use crate::layout::{Encoding, RegisterLayout};

/// Builds the oracle for one register encoding.
///
/// Implementations share one contract: on any index basis state `|x⟩`,
/// with the work registers as left by [`OracleBuilder::prepare`], the oracle
/// multiplies the amplitude by `-1` exactly when the numbers selected by
/// `x` sum to the target, and changes nothing else.
pub trait OracleBuilder: Send + Sync {
    /// The encoding this builder implements.
    fn encoding(&self) -> Encoding;

    /// Register sizes used for `instance`.
    fn layout(&self, instance: &ProblemInstance) -> SearchResult<RegisterLayout>;

    /// State preparation for the non-index work registers.
    fn prepare(&self, instance: &ProblemInstance) -> SearchResult<Circuit> {
        let layout = self.layout(instance)?;
        load_operands(instance, &layout)
    }

    /// The oracle circuit over the work registers of [`OracleBuilder::layout`].
    fn build(&self, instance: &ProblemInstance) -> SearchResult<Circuit> {
        let layout = self.layout(instance)?;
        phase_oracle(instance, &layout)
    }
}

/// Numbers folded into the adder's rotation angles.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptimizedOracle {
    sum_width: Option<u32>,
}

impl OptimizedOracle {
    /// Create a builder with a computed sum register width.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed sum register width.
    #[must_use]
    pub fn with_sum_width(mut self, width: Option<u32>) -> Self {
        self.sum_width = width;
        self
    }
}

impl OracleBuilder for OptimizedOracle {
    fn encoding(&self) -> Encoding {
        Encoding::Optimized
    }

    fn layout(&self, instance: &ProblemInstance) -> SearchResult<RegisterLayout> {
        RegisterLayout::for_instance(instance, Encoding::Optimized, self.sum_width)
    }
}

/// Numbers held in operand registers and added bit by bit.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnoptimizedOracle {
    sum_width: Option<u32>,
}

impl UnoptimizedOracle {
    /// Create a builder with a computed sum register width.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed sum register width.
    #[must_use]
    pub fn with_sum_width(mut self, width: Option<u32>) -> Self {
        self.sum_width = width;
        self
    }
}

impl OracleBuilder for UnoptimizedOracle {
    fn encoding(&self) -> Encoding {
        Encoding::Unoptimized
    }

    fn layout(&self, instance: &ProblemInstance) -> SearchResult<RegisterLayout> {
        RegisterLayout::for_instance(instance, Encoding::Unoptimized, self.sum_width)
    }
}

/// The builder for `encoding`.
pub fn oracle_for(encoding: Encoding, sum_width: Option<u32>) -> Box<dyn OracleBuilder> {
    match encoding {
        Encoding::Optimized => Box::new(OptimizedOracle::new().with_sum_width(sum_width)),
        Encoding::Unoptimized => Box::new(UnoptimizedOracle::new().with_sum_width(sum_width)),
    }
}

/// `A · C · A⁻¹` over the work registers of `layout`.
pub fn phase_oracle(instance: &ProblemInstance, layout: &RegisterLayout) -> SearchResult<Circuit> {
    let add = sum_circuit(instance, layout)?;
    let undo = add.inverse()?;

    let (mut circuit, regs) = layout.circuit("oracle");
    let work = regs.qubits();
    let sum: Vec<QubitId> = regs.sum.iter().collect();

    circuit.append(&add, &work)?;
    append_equality_flip(&mut circuit, &sum, instance.target())?;
    circuit.append(&undo, &work)?;

    Ok(circuit)
}

/// Flip the phase of `|target⟩` on `sum`, little-endian.
fn append_equality_flip(circuit: &mut Circuit, sum: &[QubitId], target: u64) -> SearchResult<()> {
    let zeros: Vec<QubitId> = sum
        .iter()
        .enumerate()
        .filter(|(b, _)| (target >> b) & 1 == 0)
        .map(|(_, &q)| q)
        .collect();

    for &q in &zeros {
        circuit.x(q)?;
    }
    if let Some((&last, rest)) = sum.split_last() {
        circuit.mcz(rest, last)?;
    }
    for &q in &zeros {
        circuit.x(q)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_report_encoding() {
        assert_eq!(OptimizedOracle::new().encoding(), Encoding::Optimized);
        assert_eq!(
            oracle_for(Encoding::Unoptimized, None).encoding(),
            Encoding::Unoptimized
        );
    }

    #[test]
    fn test_oracle_spans_layout() {
        let inst = ProblemInstance::new(vec![1, 2, 3, 4], 5).unwrap();
        for encoding in [Encoding::Optimized, Encoding::Unoptimized] {
            let builder = oracle_for(encoding, None);
            let layout = builder.layout(&inst).unwrap();
            let oracle = builder.build(&inst).unwrap();
            assert_eq!(oracle.num_qubits(), layout.num_qubits());
            assert!(oracle.dag().verify_integrity().is_ok());
        }
    }

    #[test]
    fn test_equality_flip_shape() {
        let mut circuit = Circuit::with_size("flip", 3, 0);
        let sum: Vec<QubitId> = (0..3).map(QubitId).collect();
        // 5 = 101: only the middle bit is zero.
        append_equality_flip(&mut circuit, &sum, 5).unwrap();

        let counts = circuit.dag().count_ops();
        assert_eq!(counts.get("x"), Some(&2));
        assert_eq!(counts.get("c2_z"), Some(&1));
    }

    #[test]
    fn test_sum_width_override_propagates() {
        let inst = ProblemInstance::new(vec![1, 2], 3).unwrap();
        let builder = OptimizedOracle::new().with_sum_width(Some(4));
        assert_eq!(builder.build(&inst).unwrap().num_qubits(), 6);
    }
}
