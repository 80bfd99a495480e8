//! High-level circuit builder API.

use std::f64::consts::PI;

use crate::dag::CircuitDag;
use crate::error::{IrError, IrResult};
use crate::gate::{Gate, StandardGate};
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{Clbit, ClbitId, QuantumRegister, Qubit, QubitId};

/// A quantum circuit.
///
/// This provides a high-level API for building quantum circuits,
/// with convenient methods for common gates and the composition
/// operations (append, inverse, control) used to assemble oracles.
#[derive(Debug, Clone)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Qubits in the circuit.
    qubits: Vec<Qubit>,
    /// Classical bits in the circuit.
    clbits: Vec<Clbit>,
    /// The underlying DAG representation.
    dag: CircuitDag,
    /// Counter for generating qubit IDs.
    next_qubit_id: u32,
    /// Counter for generating classical bit IDs.
    next_clbit_id: u32,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: vec![],
            clbits: vec![],
            dag: CircuitDag::new(),
            next_qubit_id: 0,
            next_clbit_id: 0,
        }
    }

    /// Create a circuit with a given number of qubits and classical bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        for _ in 0..num_qubits {
            circuit.add_qubit();
        }
        for _ in 0..num_clbits {
            circuit.add_clbit();
        }
        circuit
    }

    /// Add a single qubit to the circuit.
    pub fn add_qubit(&mut self) -> QubitId {
        let id = QubitId(self.next_qubit_id);
        self.next_qubit_id += 1;
        self.qubits.push(Qubit::new(id));
        self.dag.add_qubit(id);
        id
    }

    /// Add a quantum register with multiple qubits.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> QuantumRegister {
        let name = name.into();
        let mut ids = Vec::with_capacity(size as usize);
        for i in 0..size {
            let id = QubitId(self.next_qubit_id);
            self.next_qubit_id += 1;
            self.qubits.push(Qubit::with_register(id, &name, i));
            self.dag.add_qubit(id);
            ids.push(id);
        }
        QuantumRegister::new(name, ids)
    }

    /// Add a single classical bit to the circuit.
    pub fn add_clbit(&mut self) -> ClbitId {
        let id = ClbitId(self.next_clbit_id);
        self.next_clbit_id += 1;
        self.clbits.push(Clbit::new(id));
        self.dag.add_clbit(id);
        id
    }

    /// Add a classical register with multiple bits.
    pub fn add_creg(&mut self, name: impl Into<String>, size: u32) -> Vec<ClbitId> {
        let name = name.into();
        let mut ids = Vec::with_capacity(size as usize);
        for i in 0..size {
            let id = ClbitId(self.next_clbit_id);
            self.next_clbit_id += 1;
            self.clbits.push(Clbit::with_register(id, &name, i));
            self.dag.add_clbit(id);
            ids.push(id);
        }
        ids
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::H, qubit)
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::X, qubit)
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::Y, qubit)
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::Z, qubit)
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::S, qubit)
    }

    /// Apply T gate.
    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::T, qubit)
    }

    /// Apply Rx rotation gate.
    pub fn rx(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::Rx(theta), qubit)
    }

    /// Apply Ry rotation gate.
    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::Ry(theta), qubit)
    }

    /// Apply Rz rotation gate.
    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::Rz(theta), qubit)
    }

    /// Apply phase gate.
    pub fn p(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::P(theta), qubit)
    }

    fn single(&mut self, gate: StandardGate, qubit: QubitId) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::single_qubit_gate(gate, qubit))?;
        Ok(self)
    }

    /// Apply a single-qubit gate to every qubit of a register.
    pub fn apply_to_register(
        &mut self,
        gate: &StandardGate,
        register: &QuantumRegister,
    ) -> IrResult<&mut Self> {
        for q in register.iter() {
            self.dag
                .apply(Instruction::single_qubit_gate(gate.clone(), q))?;
        }
        Ok(self)
    }

    // =========================================================================
    // Multi-qubit gates
    // =========================================================================

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::two_qubit_gate(
            StandardGate::CX,
            control,
            target,
        ))?;
        Ok(self)
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::two_qubit_gate(
            StandardGate::CZ,
            control,
            target,
        ))?;
        Ok(self)
    }

    /// Apply controlled-phase gate.
    pub fn cp(&mut self, theta: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::two_qubit_gate(
            StandardGate::CP(theta),
            control,
            target,
        ))?;
        Ok(self)
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.dag
            .apply(Instruction::two_qubit_gate(StandardGate::Swap, q1, q2))?;
        Ok(self)
    }

    /// Apply Toffoli (CCX) gate.
    pub fn ccx(&mut self, c1: QubitId, c2: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.dag
            .apply(Instruction::gate(StandardGate::CCX, [c1, c2, target]))?;
        Ok(self)
    }

    /// Apply an X gate controlled on every qubit in `controls`.
    pub fn mcx(&mut self, controls: &[QubitId], target: QubitId) -> IrResult<&mut Self> {
        self.multi_controlled(StandardGate::X, controls, target)
    }

    /// Apply a Z gate controlled on every qubit in `controls`.
    pub fn mcz(&mut self, controls: &[QubitId], target: QubitId) -> IrResult<&mut Self> {
        self.multi_controlled(StandardGate::Z, controls, target)
    }

    /// Apply a phase gate controlled on every qubit in `controls`.
    pub fn mcp(&mut self, theta: f64, controls: &[QubitId], target: QubitId) -> IrResult<&mut Self> {
        self.multi_controlled(StandardGate::P(theta), controls, target)
    }

    fn multi_controlled(
        &mut self,
        gate: StandardGate,
        controls: &[QubitId],
        target: QubitId,
    ) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::controlled_gate(
            gate,
            controls.iter().copied(),
            [target],
        ))?;
        Ok(self)
    }

    // =========================================================================
    // Other operations
    // =========================================================================

    /// Apply an arbitrary gate.
    pub fn gate(
        &mut self,
        gate: impl Into<Gate>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::gate(gate, qubits))?;
        Ok(self)
    }

    /// Measure a qubit to a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::measure(qubit, clbit))?;
        Ok(self)
    }

    /// Measure all qubits to corresponding classical bits.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        while self.clbits.len() < self.qubits.len() {
            self.add_clbit();
        }

        let qubits: Vec<_> = self.qubits.iter().map(|q| q.id).collect();
        let clbits: Vec<_> = self
            .clbits
            .iter()
            .map(|c| c.id)
            .take(qubits.len())
            .collect();

        self.dag.apply(Instruction::measure_all(qubits, clbits)?)?;
        Ok(self)
    }

    /// Apply a barrier to specified qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::barrier(qubits))?;
        Ok(self)
    }

    /// Apply a sequence of prepared instructions.
    pub fn extend(&mut self, instructions: impl IntoIterator<Item = Instruction>) -> IrResult<&mut Self> {
        for inst in instructions {
            self.dag.apply(inst)?;
        }
        Ok(self)
    }

    /// Shift the global phase by `phase` radians.
    pub fn add_global_phase(&mut self, phase: f64) -> &mut Self {
        let current = self.dag.global_phase();
        self.dag.set_global_phase(current + phase);
        self
    }

    // =========================================================================
    // Composition
    // =========================================================================

    /// Place `other` onto this circuit.
    ///
    /// Qubit `k` of `other` lands on `mapping[k]`. Classical bits keep their
    /// ids and must exist here. The global phase of `other` is added.
    pub fn append(&mut self, other: &Circuit, mapping: &[QubitId]) -> IrResult<&mut Self> {
        if mapping.len() != other.num_qubits() {
            return Err(IrError::MappingMismatch {
                circuit: other.name.clone(),
                expected: other.num_qubits(),
                got: mapping.len(),
            });
        }

        for (_, inst) in other.dag.topological_ops() {
            let mut placed = Vec::with_capacity(inst.qubits.len());
            for q in &inst.qubits {
                let target = mapping.get(q.index()).copied().ok_or(IrError::QubitNotFound {
                    qubit: *q,
                    gate_name: Some(inst.name().to_string()),
                })?;
                placed.push(target);
            }
            self.dag.apply(Instruction {
                kind: inst.kind.clone(),
                qubits: placed,
                clbits: inst.clbits.clone(),
            })?;
        }

        self.add_global_phase(other.global_phase());
        Ok(self)
    }

    /// Return the adjoint circuit.
    ///
    /// Operations are reversed and each gate is replaced by its inverse.
    /// Fails on circuits containing measurements.
    pub fn inverse(&self) -> IrResult<Circuit> {
        let mut inv = self.empty_like(format!("{}_dg", self.name));

        let ops: Vec<_> = self.dag.topological_ops().map(|(_, inst)| inst).collect();
        for inst in ops.into_iter().rev() {
            let kind = match &inst.kind {
                InstructionKind::Gate(gate) => InstructionKind::Gate(gate.inverse()),
                InstructionKind::Barrier => InstructionKind::Barrier,
                InstructionKind::Measure => {
                    return Err(IrError::NonUnitary {
                        circuit: self.name.clone(),
                        operation: inst.name().to_string(),
                    });
                }
            };
            inv.dag.apply(Instruction {
                kind,
                qubits: inst.qubits.clone(),
                clbits: inst.clbits.clone(),
            })?;
        }

        inv.dag.set_global_phase(-self.global_phase());
        Ok(inv)
    }

    /// Return this circuit with `num_controls` control qubits added.
    ///
    /// The controls become qubits `0..num_controls` of the result and the
    /// original qubits are shifted up by `num_controls`. Every gate fires only
    /// when all controls are `|1⟩`, and the global phase turns into a relative
    /// phase on the controls.
    pub fn control(&self, num_controls: u32) -> IrResult<Circuit> {
        let mut controlled = Circuit::new(format!("c{num_controls}_{}", self.name));
        let controls = controlled.add_qreg("ctrl", num_controls);
        for qubit in &self.qubits {
            let id = controlled.add_qubit();
            if let (Some(reg), Some(idx)) = (&qubit.register, qubit.index) {
                controlled.qubits[id.index()] = Qubit::with_register(id, reg, idx);
            }
        }
        for clbit in &self.clbits {
            let id = controlled.add_clbit();
            controlled.clbits[id.index()] = Clbit {
                id,
                ..clbit.clone()
            };
        }

        let shift = |q: QubitId| QubitId(q.0 + num_controls);
        for (_, inst) in self.dag.topological_ops() {
            match &inst.kind {
                InstructionKind::Gate(gate) => {
                    let qubits = controls.iter().chain(inst.qubits.iter().map(|&q| shift(q)));
                    controlled
                        .dag
                        .apply(Instruction::gate(gate.controlled(num_controls), qubits))?;
                }
                InstructionKind::Barrier => {
                    controlled.dag.apply(inst.remap(shift))?;
                }
                InstructionKind::Measure => {
                    return Err(IrError::NonUnitary {
                        circuit: self.name.clone(),
                        operation: inst.name().to_string(),
                    });
                }
            }
        }

        let phase = self.global_phase();
        match controls.qubits.split_last() {
            Some((&last, rest)) if phase != 0.0 => {
                controlled.mcp(phase, rest, last)?;
            }
            Some(_) => {}
            None => controlled.dag.set_global_phase(phase),
        }

        Ok(controlled)
    }

    fn empty_like(&self, name: String) -> Circuit {
        let mut dag = CircuitDag::new();
        for q in &self.qubits {
            dag.add_qubit(q.id);
        }
        for c in &self.clbits {
            dag.add_clbit(c.id);
        }
        Circuit {
            name,
            qubits: self.qubits.clone(),
            clbits: self.clbits.clone(),
            dag,
            next_qubit_id: self.next_qubit_id,
            next_clbit_id: self.next_clbit_id,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.clbits.len()
    }

    /// Get the number of operations.
    pub fn num_ops(&self) -> usize {
        self.dag.num_ops()
    }

    /// Get the circuit depth.
    pub fn depth(&self) -> usize {
        self.dag.depth()
    }

    /// Get the global phase in radians.
    pub fn global_phase(&self) -> f64 {
        self.dag.global_phase()
    }

    /// Get a reference to the underlying DAG.
    pub fn dag(&self) -> &CircuitDag {
        &self.dag
    }

    /// Get the qubits in the circuit.
    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    /// Get the classical bits in the circuit.
    pub fn clbits(&self) -> &[Clbit] {
        &self.clbits
    }

    /// Whether the circuit contains any measurement.
    pub fn has_measurements(&self) -> bool {
        self.dag.topological_ops().any(|(_, inst)| inst.is_measure())
    }

    // =========================================================================
    // Pre-built circuits
    // =========================================================================

    /// Create a quantum Fourier transform on `n` qubits.
    ///
    /// Little-endian: on basis state `|v⟩` the output is
    /// `Σ_k e^{2πi·v·k/2^n} |k⟩ / √2^n`, so qubit `j` carries the phase
    /// `2π·v·2^j/2^n`. No measurements are added.
    #[allow(clippy::cast_precision_loss)]
    pub fn qft(n: u32) -> IrResult<Self> {
        let mut circuit = Self::new("qft");
        let q = circuit.add_qreg("q", n).qubits;
        let n = q.len();

        for j in (0..n).rev() {
            circuit.h(q[j])?;
            for k in (0..j).rev() {
                let angle = PI / (1u64 << (j - k)) as f64;
                circuit.cp(angle, q[k], q[j])?;
            }
        }

        for i in 0..n / 2 {
            circuit.swap(q[i], q[n - 1 - i])?;
        }

        Ok(circuit)
    }
}
