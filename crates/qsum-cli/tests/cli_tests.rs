//! End-to-end tests that run the `qsum` binary.

use std::process::{Command, Output};

fn qsum(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_qsum"))
        .args(args)
        .env_remove("QSUM_CONFIG")
        .env_remove("QSUM_SHOTS")
        .env_remove("QSUM_ENCODING")
        .output()
        .expect("failed to run qsum")
}

fn json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "qsum failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

#[test]
fn inspect_reports_layout_and_solutions() {
    let value = json(&qsum(&["inspect", "-n", "1,2,3,4", "-t", "5", "-f", "json"]));

    assert_eq!(value["encoding"], "optimized");
    assert_eq!(value["layout"]["index_width"], 4);
    assert_eq!(value["layout"]["sum_width"], 4);
    assert_eq!(value["counting_qubits"], 6);
    assert_eq!(value["iterations"], 2);
    let solutions: Vec<&str> = value["solutions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s.as_str().unwrap())
        .collect();
    assert_eq!(solutions, vec!["0110", "1001"]);
}

#[test]
fn inspect_unoptimized_adds_operand_registers() {
    let value = json(&qsum(&[
        "inspect",
        "-n",
        "1,2",
        "-t",
        "3",
        "--encoding",
        "unoptimized",
        "-f",
        "json",
    ]));
    assert_eq!(value["encoding"], "unoptimized");
    assert_eq!(value["layout"]["operand_width"], 2);
    assert_eq!(value["oracle"]["qubits"], 8);
}

#[test]
fn inspect_flags_circuits_wider_than_the_simulator() {
    let value = json(&qsum(&["inspect", "--encoding", "unoptimized", "-f", "json"]));
    assert_eq!(value["oracle"]["qubits"], 30);
    assert_eq!(value["counting_qubits"], 7);
    assert_eq!(value["counting"]["qubits"], 37);
    assert_eq!(value["executor_qubits"], 24);
    assert_eq!(value["fits_executor"], false);

    let value = json(&qsum(&["inspect", "-f", "json"]));
    assert_eq!(value["fits_executor"], true);
}

#[test]
fn solve_names_the_qubit_cost_of_the_encoding() {
    let output = qsum(&["solve", "--encoding", "unoptimized"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("37 qubits"), "{stderr}");
    assert!(stderr.contains("unoptimized encoding"), "{stderr}");
    assert!(stderr.contains("5×4 operand"), "{stderr}");
}

#[test]
fn solve_finds_both_pairs() {
    let value = json(&qsum(&[
        "solve", "-n", "1,2,3,4", "-t", "5", "--seed", "11", "-f", "json",
    ]));

    assert_eq!(value["status"], "found");
    assert_eq!(value["count"]["marked"], 2);
    assert_eq!(value["iterations"], 2);
    let mut peaks: Vec<&str> = value["subsets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["bitstring"].as_str().unwrap())
        .collect();
    peaks.sort_unstable();
    assert_eq!(peaks, vec!["0110", "1001"]);
}

#[test]
fn count_reports_estimate() {
    let value = json(&qsum(&[
        "count", "-n", "2,2,2", "-t", "4", "--seed", "5", "-f", "json",
    ]));
    assert_eq!(value["marked"], 3);
    assert_eq!(value["iterations"], 1);
}

#[test]
fn infeasible_instance_exits_with_error() {
    let output = qsum(&["solve", "-n", "5,9", "-t", "100"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"));
    assert!(stderr.contains("100"));
}

#[test]
fn unknown_format_is_rejected() {
    let output = qsum(&["inspect", "-f", "xml"]);
    assert!(!output.status.success());
}

#[test]
fn version_names_the_tool() {
    let output = qsum(&["version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("qsum"));
}
