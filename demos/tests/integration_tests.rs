//! End-to-end runs of the demo driver.

use std::fs;

use approx::assert_relative_eq;
use qflow::RunConfig;
use qflow::config::{OptimizerConfig, ProblemConfig};
use qflow_demos::run;

const H2_FCI: f64 = -1.137_269_84;

/// H2 with the default natural-gradient optimizer lowers the energy and
/// never dips below the exact ground state.
#[test]
fn test_h2_run_descends_toward_full_ci() {
    let mut optimizer = OptimizerConfig::from_name("qng2").unwrap();
    optimizer.set_stepsize(0.1);
    let config = RunConfig {
        optimizer,
        steps: 20,
        seed: Some(0),
        ..Default::default()
    };
    let report = run(&config, |_, _| {}).unwrap();
    assert_relative_eq!(report.min_energy, H2_FCI, epsilon = 1e-6);
    assert!(report.result.best_cost() < report.result.initial_cost);
    assert!(report.energy_error() >= -1e-9);
    assert_eq!(report.num_qubits, 4);
}

/// Every optimizer kind can drive a Max-Cut run.
#[test]
fn test_all_optimizers_run_maxcut() {
    for name in ["qng2", "qng", "adam", "gradient-descent"] {
        let config = RunConfig {
            problem: ProblemConfig::from_name("maxcut").unwrap(),
            optimizer: OptimizerConfig::from_name(name).unwrap(),
            steps: 3,
            seed: Some(1),
            ..Default::default()
        };
        let report = run(&config, |_, _| {}).unwrap();
        assert_eq!(report.result.num_steps(), 3, "{name}");
        assert!(report.approximation_ratio().is_some(), "{name}");
    }
}

/// A YAML run file drives the barren-plateau problem.
#[test]
fn test_yaml_file_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bp.yaml");
    fs::write(
        &path,
        "problem:\n  kind: barren-plateau\n  num_layers: 2\n  num_qubits: 4\noptimizer:\n  kind: adam\n  stepsize: 0.05\nsteps: 4\nseed: 2\n",
    )
    .unwrap();
    let config = RunConfig::from_file(&path).unwrap();
    let report = run(&config, |_, _| {}).unwrap();
    assert_eq!(report.problem, "barren-plateau");
    assert_eq!(report.num_params, 8);
    assert_eq!(report.result.optimizer, "adam");
    assert_relative_eq!(report.min_energy, -1.0, epsilon = 1e-12);
}

/// The report serializes with the optimization history inline.
#[test]
fn test_report_serializes_to_json() {
    let config = RunConfig {
        problem: ProblemConfig::from_name("maxcut").unwrap(),
        steps: 2,
        seed: Some(0),
        ..Default::default()
    };
    let report = run(&config, |_, _| {}).unwrap();
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["problem"], "maxcut");
    assert_eq!(value["result"]["cost_history"].as_array().unwrap().len(), 2);
    assert!(value["max_energy"].is_number());
}

/// A molecule whose integrals are missing fails with a readable error.
#[test]
fn test_missing_integrals_fail() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig {
        problem: ProblemConfig::from_name("lih").unwrap(),
        integrals_dir: Some(dir.path().to_path_buf()),
        steps: 1,
        ..Default::default()
    };
    let err = run(&config, |_, _| {}).unwrap_err();
    assert!(!err.to_string().is_empty());
}
