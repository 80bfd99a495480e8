//! Register layout of the search circuits.
//!
//! Work qubits are allocated in a fixed order:
//!
//! ```text
//!   index[0..N] | sum[0..d] | operand_0[0..w] | … | operand_{N-1}[0..w]
//! ```
//!
//! Operand registers exist only in the unoptimized encoding. The counting
//! circuit places its counting register in front of this block.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use qsum_ir::{Circuit, QuantumRegister, QubitId};

use crate::error::{SearchError, SearchResult};
use crate::instance::{ProblemInstance, bit_width};

/// How the numbers enter the adder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Encoding {
    /// Numbers are folded into the rotation angles; only index and sum qubits.
    #[default]
    Optimized,
    /// Each number is loaded into its own operand register first.
    Unoptimized,
}

impl Encoding {
    /// Lowercase name used in configuration and output.
    pub fn as_str(self) -> &'static str {
        match self {
            Encoding::Optimized => "optimized",
            Encoding::Unoptimized => "unoptimized",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "optimized" => Ok(Encoding::Optimized),
            "unoptimized" => Ok(Encoding::Unoptimized),
            other => Err(format!(
                "unknown encoding '{other}', expected 'optimized' or 'unoptimized'"
            )),
        }
    }
}

/// Register sizes for one instance and encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegisterLayout {
    index_width: u32,
    sum_width: u32,
    operand_width: u32,
}

impl RegisterLayout {
    /// Size the registers for `instance`.
    ///
    /// `sum_width` overrides the computed sum register width; it must be
    /// large enough for the largest reachable sum.
    pub fn for_instance(
        instance: &ProblemInstance,
        encoding: Encoding,
        sum_width: Option<u32>,
    ) -> SearchResult<Self> {
        let required = instance.sum_width();
        let sum_width = match sum_width {
            Some(w) if w < required => {
                return Err(SearchError::RegisterOverflow {
                    max_sum: instance.max_sum(),
                    required,
                    available: w,
                });
            }
            Some(w) => w,
            None => required,
        };

        let operand_width = match encoding {
            Encoding::Optimized => 0,
            Encoding::Unoptimized => {
                let largest = instance.numbers().iter().copied().max().unwrap_or(0);
                bit_width(largest).max(1)
            }
        };

        Ok(Self {
            index_width: instance.index_width(),
            sum_width,
            operand_width,
        })
    }

    /// Width of the index register.
    pub fn index_width(&self) -> u32 {
        self.index_width
    }

    /// Width of the sum register.
    pub fn sum_width(&self) -> u32 {
        self.sum_width
    }

    /// Width of each operand register; zero when there are none.
    pub fn operand_width(&self) -> u32 {
        self.operand_width
    }

    /// Total number of work qubits.
    pub fn num_qubits(&self) -> usize {
        (self.index_width + self.sum_width + self.index_width * self.operand_width) as usize
    }

    /// Add the registers to `circuit`, in layout order.
    pub fn allocate(&self, circuit: &mut Circuit) -> Registers {
        let index = circuit.add_qreg("idx", self.index_width);
        let sum = circuit.add_qreg("sum", self.sum_width);
        let operands = if self.operand_width == 0 {
            Vec::new()
        } else {
            (0..self.index_width)
                .map(|i| circuit.add_qreg(format!("num{i}"), self.operand_width))
                .collect()
        };
        Registers {
            index,
            sum,
            operands,
        }
    }

    /// A fresh circuit holding only the work registers.
    pub fn circuit(&self, name: impl Into<String>) -> (Circuit, Registers) {
        let mut circuit = Circuit::new(name);
        let registers = self.allocate(&mut circuit);
        (circuit, registers)
    }
}

impl fmt::Display for RegisterLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} index + {} sum", self.index_width, self.sum_width)?;
        if self.operand_width > 0 {
            write!(f, " + {}×{} operand", self.index_width, self.operand_width)?;
        }
        Ok(())
    }
}

/// Registers allocated on a particular circuit.
#[derive(Debug, Clone)]
pub struct Registers {
    /// One qubit per number.
    pub index: QuantumRegister,
    /// Accumulates the selected sum.
    pub sum: QuantumRegister,
    /// Operand registers of the unoptimized encoding.
    pub operands: Vec<QuantumRegister>,
}

impl Registers {
    /// All work qubits in layout order.
    ///
    /// Used as the mapping when a work-space circuit is appended elsewhere.
    pub fn qubits(&self) -> Vec<QubitId> {
        self.index
            .iter()
            .chain(self.sum.iter())
            .chain(self.operands.iter().flat_map(QuantumRegister::iter))
            .collect()
    }
}
