//! Quantum gate types.

use serde::{Deserialize, Serialize};

/// Standard gates with known semantics.
///
/// Rotation and phase angles are concrete radians; every circuit the search
/// builds is fully determined by the problem instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    // Single-qubit Pauli gates
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Single-qubit Clifford gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,

    // Single-qubit rotation gates
    /// Rotation around X axis.
    Rx(f64),
    /// Rotation around Y axis.
    Ry(f64),
    /// Rotation around Z axis.
    Rz(f64),
    /// Phase gate diag(1, e^{iθ}).
    P(f64),

    // Two-qubit gates
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Y gate.
    CY,
    /// Controlled-Z gate.
    CZ,
    /// Controlled-Hadamard gate.
    CH,
    /// Controlled phase gate.
    CP(f64),
    /// SWAP gate.
    Swap,

    // Three-qubit gates
    /// Toffoli gate (CCX).
    CCX,
    /// Fredkin gate (CSWAP).
    CSwap,
}

impl StandardGate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::P(_) => "p",
            StandardGate::CX => "cx",
            StandardGate::CY => "cy",
            StandardGate::CZ => "cz",
            StandardGate::CH => "ch",
            StandardGate::CP(_) => "cp",
            StandardGate::Swap => "swap",
            StandardGate::CCX => "ccx",
            StandardGate::CSwap => "cswap",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::I
            | StandardGate::X
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
            | StandardGate::P(_) => 1,

            StandardGate::CX
            | StandardGate::CY
            | StandardGate::CZ
            | StandardGate::CH
            | StandardGate::CP(_)
            | StandardGate::Swap => 2,

            StandardGate::CCX | StandardGate::CSwap => 3,
        }
    }

    /// The adjoint of this gate.
    pub fn inverse(&self) -> StandardGate {
        match self {
            StandardGate::S => StandardGate::Sdg,
            StandardGate::Sdg => StandardGate::S,
            StandardGate::T => StandardGate::Tdg,
            StandardGate::Tdg => StandardGate::T,
            StandardGate::Rx(theta) => StandardGate::Rx(-theta),
            StandardGate::Ry(theta) => StandardGate::Ry(-theta),
            StandardGate::Rz(theta) => StandardGate::Rz(-theta),
            StandardGate::P(theta) => StandardGate::P(-theta),
            StandardGate::CP(theta) => StandardGate::CP(-theta),
            // Hermitian gates are their own inverse.
            other => other.clone(),
        }
    }

    /// Check if this gate is diagonal in the computational basis.
    pub fn is_diagonal(&self) -> bool {
        matches!(
            self,
            StandardGate::I
                | StandardGate::Z
                | StandardGate::S
                | StandardGate::Sdg
                | StandardGate::T
                | StandardGate::Tdg
                | StandardGate::Rz(_)
                | StandardGate::P(_)
                | StandardGate::CZ
                | StandardGate::CP(_)
        )
    }
}

/// A standard gate with additional control qubits.
///
/// The gate fires only on basis states where every control qubit is `|1⟩`.
/// Operands are ordered controls first, then the base gate's own operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlledGate {
    /// The gate applied when all controls are set.
    pub base: StandardGate,
    /// Number of control qubits in front of the base operands.
    pub num_ctrl_qubits: u32,
    name: String,
}

impl ControlledGate {
    /// Wrap `base` with `num_ctrl_qubits` controls.
    pub fn new(base: StandardGate, num_ctrl_qubits: u32) -> Self {
        let name = format!("c{num_ctrl_qubits}_{}", base.name());
        Self {
            base,
            num_ctrl_qubits,
            name,
        }
    }

    /// Gate name, e.g. `c3_x` for an X with three controls.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total number of qubits, controls included.
    pub fn num_qubits(&self) -> u32 {
        self.num_ctrl_qubits + self.base.num_qubits()
    }

    /// The adjoint, which keeps the controls and inverts the base.
    pub fn inverse(&self) -> ControlledGate {
        ControlledGate::new(self.base.inverse(), self.num_ctrl_qubits)
    }
}

/// A quantum gate, either standard or controlled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GateKind {
    /// A standard gate with known semantics.
    Standard(StandardGate),
    /// A standard gate under extra controls.
    Controlled(ControlledGate),
}

impl GateKind {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            GateKind::Standard(g) => g.name(),
            GateKind::Controlled(g) => g.name(),
        }
    }

    /// Get the number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            GateKind::Standard(g) => g.num_qubits(),
            GateKind::Controlled(g) => g.num_qubits(),
        }
    }

    /// Split into the underlying standard gate and its extra control count.
    pub fn base(&self) -> (&StandardGate, u32) {
        match self {
            GateKind::Standard(g) => (g, 0),
            GateKind::Controlled(g) => (&g.base, g.num_ctrl_qubits),
        }
    }
}

/// A gate with associated metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    /// The kind of gate.
    pub kind: GateKind,
    /// Optional label for the gate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Gate {
    /// Create a new gate from a standard gate.
    pub fn standard(gate: StandardGate) -> Self {
        Self {
            kind: GateKind::Standard(gate),
            label: None,
        }
    }

    /// Create a multi-controlled gate.
    ///
    /// Zero controls yields the plain standard gate.
    pub fn multi_controlled(base: StandardGate, num_ctrl_qubits: u32) -> Self {
        if num_ctrl_qubits == 0 {
            return Self::standard(base);
        }
        Self {
            kind: GateKind::Controlled(ControlledGate::new(base, num_ctrl_qubits)),
            label: None,
        }
    }

    /// Add a label to the gate.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Get the name of this gate.
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.kind.num_qubits()
    }

    /// Add `n` more controls in front of the existing operands.
    #[must_use]
    pub fn controlled(&self, n: u32) -> Gate {
        let (base, existing) = self.kind.base();
        let mut gate = Gate::multi_controlled(base.clone(), existing + n);
        gate.label.clone_from(&self.label);
        gate
    }

    /// The adjoint of this gate.
    #[must_use]
    pub fn inverse(&self) -> Gate {
        let kind = match &self.kind {
            GateKind::Standard(g) => GateKind::Standard(g.inverse()),
            GateKind::Controlled(g) => GateKind::Controlled(g.inverse()),
        };
        Gate {
            kind,
            label: self.label.clone(),
        }
    }
}

impl From<StandardGate> for Gate {
    fn from(gate: StandardGate) -> Self {
        Gate::standard(gate)
    }
}

impl From<ControlledGate> for Gate {
    fn from(gate: ControlledGate) -> Self {
        Gate {
            kind: GateKind::Controlled(gate),
            label: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_standard_gate_properties() {
        assert_eq!(StandardGate::H.num_qubits(), 1);
        assert_eq!(StandardGate::CX.num_qubits(), 2);
        assert_eq!(StandardGate::CCX.num_qubits(), 3);

        assert!(StandardGate::P(PI).is_diagonal());
        assert!(!StandardGate::H.is_diagonal());
    }

    #[test]
    fn test_gate_inverse() {
        assert_eq!(StandardGate::S.inverse(), StandardGate::Sdg);
        assert_eq!(StandardGate::H.inverse(), StandardGate::H);
        assert_eq!(StandardGate::CP(0.3).inverse(), StandardGate::CP(-0.3));

        let g = Gate::multi_controlled(StandardGate::P(1.5), 2).inverse();
        assert_eq!(g.kind.base(), (&StandardGate::P(-1.5), 2));
    }

    #[test]
    fn test_controlled_stacks() {
        let x = Gate::standard(StandardGate::X);
        let cx = x.controlled(1);
        assert_eq!(cx.num_qubits(), 2);
        assert_eq!(cx.name(), "c1_x");

        let cccx = cx.controlled(2);
        assert_eq!(cccx.num_qubits(), 4);
        assert_eq!(cccx.kind.base(), (&StandardGate::X, 3));
    }

    #[test]
    fn test_zero_controls_is_plain_gate() {
        let g = Gate::multi_controlled(StandardGate::Z, 0);
        assert_eq!(g.kind, GateKind::Standard(StandardGate::Z));
        assert_eq!(g.name(), "z");
    }
}
