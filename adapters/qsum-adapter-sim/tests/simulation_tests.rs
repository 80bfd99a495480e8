//! End-to-end checks of the simulator against closed-form states.

use std::f64::consts::PI;

use num_complex::Complex64;
use qsum_adapter_sim::SimulatorBackend;
use qsum_hal::{Backend, StatevectorBackend};
use qsum_ir::{Circuit, QubitId};

fn basis_state(n: u32, value: u64) -> Circuit {
    let mut circuit = Circuit::with_size("prep", n, 0);
    for k in 0..n {
        if (value >> k) & 1 == 1 {
            circuit.x(QubitId(k)).unwrap();
        }
    }
    circuit
}

#[test]
fn qft_matches_discrete_fourier_transform() {
    let backend = SimulatorBackend::new();
    let n = 4u32;
    let dim = 1usize << n;
    let qft = Circuit::qft(n).unwrap();
    let all: Vec<QubitId> = (0..n).map(QubitId).collect();

    for v in [0u64, 1, 5, 11] {
        let mut circuit = basis_state(n, v);
        circuit.append(&qft, &all).unwrap();
        let amps = backend.statevector(&circuit).unwrap();

        let norm = 1.0 / (dim as f64).sqrt();
        for (k, amp) in amps.iter().enumerate() {
            let angle = 2.0 * PI * (v as f64) * (k as f64) / dim as f64;
            let expected = Complex64::from_polar(norm, angle);
            assert!(
                (amp - expected).norm() < 1e-9,
                "v={v} k={k}: got {amp}, expected {expected}"
            );
        }
    }
}

#[test]
fn inverse_undoes_qft() {
    let backend = SimulatorBackend::new();
    let n = 3u32;
    let qft = Circuit::qft(n).unwrap();
    let all: Vec<QubitId> = (0..n).map(QubitId).collect();

    let mut circuit = basis_state(n, 6);
    circuit.append(&qft, &all).unwrap();
    circuit.append(&qft.inverse().unwrap(), &all).unwrap();

    let amps = backend.statevector(&circuit).unwrap();
    assert!((amps[6].norm() - 1.0).abs() < 1e-9);
}

#[test]
fn controlled_circuit_respects_global_phase() {
    // A bare global phase of π acts as Z on the control once controlled.
    let mut body = Circuit::with_size("minus_identity", 1, 0);
    body.add_global_phase(PI);
    let controlled = body.control(1).unwrap();

    let mut circuit = Circuit::with_size("kickback", 2, 0);
    circuit.h(QubitId(0)).unwrap();
    circuit.append(&controlled, &[QubitId(0), QubitId(1)]).unwrap();
    circuit.h(QubitId(0)).unwrap();

    let amps = SimulatorBackend::new().statevector(&circuit).unwrap();
    assert!((amps[1].norm() - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn run_samples_uniform_superposition() {
    let n = 3u32;
    let mut circuit = Circuit::with_size("uniform", n, n);
    for k in 0..n {
        circuit.h(QubitId(k)).unwrap();
    }
    circuit.measure_all().unwrap();

    let result = SimulatorBackend::with_seed(42)
        .run(&circuit, 8000)
        .await
        .unwrap();
    assert_eq!(result.counts.len(), 8);
    for (bits, count) in result.counts.iter() {
        assert!((800..=1200).contains(count), "{bits} drawn {count} times");
    }
}
