//! Dependency graph of circuit operations.
//!
//! Every node is an operation. An edge `a -> b` labelled with a wire means
//! `b` is the next operation to touch that wire after `a`. Wires without
//! operations have no nodes at all.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex as PetNodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{ClbitId, QubitId};

/// Node index type for the circuit DAG.
pub type NodeIndex = PetNodeIndex<u32>;

/// A quantum or classical wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireId {
    /// A quantum wire.
    Qubit(QubitId),
    /// A classical wire.
    Clbit(ClbitId),
}

impl From<QubitId> for WireId {
    fn from(q: QubitId) -> Self {
        WireId::Qubit(q)
    }
}

impl From<ClbitId> for WireId {
    fn from(c: ClbitId) -> Self {
        WireId::Clbit(c)
    }
}

/// Operations of a circuit linked by the wires they share.
///
/// Operations are appended only, so node order is a valid execution order.
#[derive(Debug, Clone, Default)]
pub struct CircuitDag {
    graph: DiGraph<Instruction, WireId, u32>,
    wires: FxHashSet<WireId>,
    /// Most recent operation on each wire.
    frontier: FxHashMap<WireId, NodeIndex>,
    global_phase: f64,
}

impl CircuitDag {
    /// Create an empty DAG.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a qubit wire. Registering twice is a no-op.
    pub fn add_qubit(&mut self, qubit: QubitId) {
        self.wires.insert(WireId::Qubit(qubit));
    }

    /// Register a classical wire. Registering twice is a no-op.
    pub fn add_clbit(&mut self, clbit: ClbitId) {
        self.wires.insert(WireId::Clbit(clbit));
    }

    /// Append an operation after everything already on its wires.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<NodeIndex> {
        self.check_operands(&instruction)?;

        let wires: Vec<WireId> = instruction
            .qubits
            .iter()
            .copied()
            .map(WireId::from)
            .chain(instruction.clbits.iter().copied().map(WireId::from))
            .collect();

        let node = self.graph.add_node(instruction);
        for wire in wires {
            if let Some(prev) = self.frontier.insert(wire, node) {
                self.graph.add_edge(prev, node, wire);
            }
        }
        Ok(node)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn check_operands(&self, instruction: &Instruction) -> IrResult<()> {
        let gate_name = match &instruction.kind {
            InstructionKind::Gate(gate) => Some(gate.name().to_string()),
            _ => None,
        };

        if let InstructionKind::Gate(gate) = &instruction.kind {
            let expected = gate.num_qubits() as usize;
            if instruction.qubits.len() != expected {
                return Err(IrError::QubitCountMismatch {
                    gate_name: gate.name().to_string(),
                    expected: expected as u32,
                    got: instruction.qubits.len() as u32,
                });
            }
        }

        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if !self.wires.contains(&WireId::Qubit(qubit)) {
                return Err(IrError::QubitNotFound {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
        }
        for &clbit in &instruction.clbits {
            if !self.wires.contains(&WireId::Clbit(clbit)) {
                return Err(IrError::ClbitNotFound {
                    clbit,
                    gate_name: gate_name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Operations in execution order.
    pub fn topological_ops(&self) -> impl Iterator<Item = (NodeIndex, &Instruction)> {
        self.graph
            .node_indices()
            .map(|idx| (idx, &self.graph[idx]))
    }

    /// Number of operations.
    #[inline]
    pub fn num_ops(&self) -> usize {
        self.graph.node_count()
    }

    /// Length of the longest chain of dependent operations.
    pub fn depth(&self) -> usize {
        let mut layer = vec![0usize; self.graph.node_count()];
        for node in self.graph.node_indices() {
            layer[node.index()] = 1 + self
                .graph
                .neighbors_directed(node, Direction::Incoming)
                .map(|prev| layer[prev.index()])
                .max()
                .unwrap_or(0);
        }
        layer.into_iter().max().unwrap_or(0)
    }

    /// Count operations by instruction name.
    pub fn count_ops(&self) -> FxHashMap<String, usize> {
        let mut counts = FxHashMap::default();
        for inst in self.graph.node_weights() {
            *counts.entry(inst.name().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Get the global phase.
    pub fn global_phase(&self) -> f64 {
        self.global_phase
    }

    /// Set the global phase.
    pub fn set_global_phase(&mut self, phase: f64) {
        self.global_phase = phase;
    }

    /// Check that the graph is a well-formed wire dependency graph.
    ///
    /// Edges must point forward in insertion order, each operation may have
    /// at most one predecessor and one successor per wire, and each edge's
    /// wire must be an operand of both endpoints.
    pub fn verify_integrity(&self) -> IrResult<()> {
        for edge in self.graph.edge_references() {
            let (from, to, wire) = (edge.source(), edge.target(), *edge.weight());
            if from.index() >= to.index() {
                return Err(IrError::InvalidDag(format!(
                    "edge on {wire:?} points backwards ({} -> {})",
                    from.index(),
                    to.index()
                )));
            }
            for node in [from, to] {
                if !touches(&self.graph[node], wire) {
                    return Err(IrError::InvalidDag(format!(
                        "operation {} does not act on {wire:?}",
                        node.index()
                    )));
                }
            }
        }

        for node in self.graph.node_indices() {
            for direction in [Direction::Incoming, Direction::Outgoing] {
                let mut seen = FxHashSet::default();
                for edge in self.graph.edges_directed(node, direction) {
                    if !seen.insert(*edge.weight()) {
                        return Err(IrError::InvalidDag(format!(
                            "wire {:?} forks at operation {}",
                            edge.weight(),
                            node.index()
                        )));
                    }
                }
            }
        }

        for (wire, &last) in &self.frontier {
            if !self.wires.contains(wire) {
                return Err(IrError::InvalidDag(format!("unregistered wire {wire:?}")));
            }
            if !touches(&self.graph[last], *wire) {
                return Err(IrError::InvalidDag(format!(
                    "frontier of {wire:?} is not an operation on it"
                )));
            }
        }
        Ok(())
    }
}

fn touches(instruction: &Instruction, wire: WireId) -> bool {
    match wire {
        WireId::Qubit(q) => instruction.qubits.contains(&q),
        WireId::Clbit(c) => instruction.clbits.contains(&c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::StandardGate;

    fn dag_with(qubits: u32, clbits: u32) -> CircuitDag {
        let mut dag = CircuitDag::new();
        for q in 0..qubits {
            dag.add_qubit(QubitId(q));
        }
        for c in 0..clbits {
            dag.add_clbit(ClbitId(c));
        }
        dag
    }

    #[test]
    fn test_empty_dag_has_no_depth() {
        let dag = dag_with(3, 0);
        assert_eq!(dag.num_ops(), 0);
        assert_eq!(dag.depth(), 0);
        dag.verify_integrity().unwrap();
    }

    #[test]
    fn test_hadamard_layer_then_mcz() {
        let mut dag = dag_with(3, 0);
        for q in 0..3 {
            dag.apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(q)))
                .unwrap();
        }
        assert_eq!(dag.depth(), 1);

        dag.apply(Instruction::controlled_gate(
            StandardGate::Z,
            [QubitId(0), QubitId(1)],
            [QubitId(2)],
        ))
        .unwrap();
        assert_eq!(dag.num_ops(), 4);
        assert_eq!(dag.depth(), 2);
        dag.verify_integrity().unwrap();
    }

    #[test]
    fn test_ops_keep_insertion_order() {
        let mut dag = dag_with(3, 0);
        dag.apply(Instruction::single_qubit_gate(StandardGate::X, QubitId(2)))
            .unwrap();
        dag.apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(0)))
            .unwrap();
        dag.apply(Instruction::controlled_gate(
            StandardGate::Z,
            [QubitId(0), QubitId(2)],
            [QubitId(1)],
        ))
        .unwrap();

        let names: Vec<_> = dag.topological_ops().map(|(_, i)| i.name()).collect();
        assert_eq!(names, vec!["x", "h", "c2_z"]);
        assert_eq!(dag.count_ops()["h"], 1);
    }

    #[test]
    fn test_gate_arity_mismatch() {
        let mut dag = dag_with(2, 0);
        match dag.apply(Instruction::gate(StandardGate::CX, [QubitId(0)])) {
            Err(IrError::QubitCountMismatch {
                gate_name,
                expected,
                got,
            }) => {
                assert_eq!(gate_name, "cx");
                assert_eq!(expected, 2);
                assert_eq!(got, 1);
            }
            other => panic!("Expected QubitCountMismatch, got {other:?}"),
        }
        assert_eq!(dag.num_ops(), 0);
    }

    #[test]
    fn test_unknown_qubit_names_the_gate() {
        let mut dag = dag_with(1, 0);
        let inst = Instruction::two_qubit_gate(StandardGate::CX, QubitId(0), QubitId(9));
        match dag.apply(inst) {
            Err(IrError::QubitNotFound { qubit, gate_name }) => {
                assert_eq!(qubit, QubitId(9));
                assert_eq!(gate_name.as_deref(), Some("cx"));
            }
            other => panic!("Expected QubitNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_clbit_rejected() {
        let mut dag = dag_with(1, 0);
        let result = dag.apply(Instruction::measure(QubitId(0), ClbitId(0)));
        assert!(matches!(result, Err(IrError::ClbitNotFound { .. })));
    }

    #[test]
    fn test_duplicate_control_rejected() {
        let mut dag = dag_with(2, 0);
        let inst = Instruction::controlled_gate(
            StandardGate::X,
            [QubitId(0), QubitId(0)],
            [QubitId(1)],
        );
        assert!(matches!(
            dag.apply(inst),
            Err(IrError::DuplicateQubit { .. })
        ));
    }

    #[test]
    fn test_measurement_extends_index_wires() {
        let mut dag = dag_with(2, 2);
        dag.apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(0)))
            .unwrap();
        dag.apply(Instruction::two_qubit_gate(
            StandardGate::CX,
            QubitId(0),
            QubitId(1),
        ))
        .unwrap();
        dag.apply(
            Instruction::measure_all([QubitId(0), QubitId(1)], [ClbitId(0), ClbitId(1)]).unwrap(),
        )
        .unwrap();

        dag.verify_integrity().unwrap();
        assert_eq!(dag.depth(), 3);
    }
}
