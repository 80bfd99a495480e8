//! Property tests for the Fourier-basis adder.

use proptest::prelude::*;

use qsum_adapter_sim::SimulatorBackend;
use qsum_core::{
    Encoding, ProblemInstance, RegisterLayout, build_adder, load_operands, sum_circuit,
};
use qsum_hal::StatevectorBackend;
use qsum_ir::{Circuit, QubitId, StandardGate};

fn basis_state(amplitudes: &[num_complex::Complex64]) -> usize {
    let (index, amp) = amplitudes
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.norm_sqr().total_cmp(&b.1.norm_sqr()))
        .unwrap();
    assert!((amp.norm_sqr() - 1.0).abs() < 1e-9, "state is not a basis state");
    index
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn sum_register_holds_selected_total(
        numbers in prop::collection::vec(0i64..4, 1..=3),
        mask in 0u64..8,
        unoptimized in any::<bool>(),
    ) {
        let instance = ProblemInstance::new(numbers, 0).unwrap();
        let mask = mask & (instance.search_space() - 1);
        let encoding = if unoptimized { Encoding::Unoptimized } else { Encoding::Optimized };
        let layout = RegisterLayout::for_instance(&instance, encoding, None).unwrap();
        let backend = SimulatorBackend::new();

        let (mut circuit, regs) = layout.circuit("props");
        let work = regs.qubits();
        for (i, q) in regs.index.iter().enumerate() {
            if (mask >> i) & 1 == 1 {
                circuit.x(q).unwrap();
            }
        }
        circuit.append(&load_operands(&instance, &layout).unwrap(), &work).unwrap();
        let before = basis_state(&backend.statevector(&circuit).unwrap());

        circuit.append(&sum_circuit(&instance, &layout).unwrap(), &work).unwrap();
        let after = basis_state(&backend.statevector(&circuit).unwrap());

        let total = instance.subset_sum(mask) as usize;
        prop_assert_eq!(after, before | (total << layout.index_width()));
    }

    #[test]
    fn adder_wraps_modulo_register(
        start in 0u64..16,
        value in 0u64..64,
    ) {
        let mut circuit = Circuit::new("wrap");
        let sum = circuit.add_qreg("sum", 4);
        for (b, q) in sum.iter().enumerate() {
            if (start >> b) & 1 == 1 {
                circuit.x(q).unwrap();
            }
        }
        let qubits: Vec<QubitId> = sum.iter().collect();
        circuit.append(&Circuit::qft(4).unwrap(), &qubits).unwrap();
        circuit.extend(build_adder(value, &[], &sum)).unwrap();
        circuit.append(&Circuit::qft(4).unwrap().inverse().unwrap(), &qubits).unwrap();

        let backend = SimulatorBackend::new();
        let result = basis_state(&backend.statevector(&circuit).unwrap());
        prop_assert_eq!(result as u64, (start + value) % 16);
    }
}

#[test]
fn controlled_adder_respects_control() {
    let backend = SimulatorBackend::new();
    for control_set in [false, true] {
        let mut circuit = Circuit::new("ctrl");
        let ctrl = circuit.add_qreg("ctrl", 1);
        let sum = circuit.add_qreg("sum", 3);
        let c = ctrl.get(0).unwrap();
        if control_set {
            circuit.x(c).unwrap();
        }
        circuit.apply_to_register(&StandardGate::H, &sum).unwrap();
        circuit.extend(build_adder(5, &[c], &sum)).unwrap();
        let qubits: Vec<QubitId> = sum.iter().collect();
        circuit.append(&Circuit::qft(3).unwrap().inverse().unwrap(), &qubits).unwrap();

        let state = basis_state(&backend.statevector(&circuit).unwrap());
        let expected = if control_set { 1 | (5 << 1) } else { 0 };
        assert_eq!(state, expected);
    }
}
