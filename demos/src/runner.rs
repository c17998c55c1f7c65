//! Drive one configured optimization run end to end.

use qflow::config::ProblemConfig;
use qflow::hamiltonian::min_max_eigenvalue;
use qflow::utils::approximation_ratio;
use qflow::{Ansatz, OptimizationResult, QflowResult, RunConfig};
use serde::Serialize;
use tracing::info;

/// Outcome of [`run`], with the problem facts needed to judge it.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub problem: String,
    pub ansatz: String,
    pub num_qubits: usize,
    pub num_params: usize,
    pub n_terms: usize,
    /// Exact ground-state energy.
    pub min_energy: f64,
    /// Largest eigenvalue; only computed for Max-Cut.
    pub max_energy: Option<f64>,
    pub result: OptimizationResult,
}

impl RunReport {
    /// Distance of the final cost above the ground state.
    pub fn energy_error(&self) -> f64 {
        self.result.final_cost() - self.min_energy
    }

    /// Approximation ratio of the final cost, when the spectrum is known.
    pub fn approximation_ratio(&self) -> Option<f64> {
        self.max_energy
            .map(|e_max| approximation_ratio(self.result.final_cost(), self.min_energy, e_max))
    }
}

/// Build the configured problem and optimizer, then minimize.
///
/// `on_step(step, cost)` is called after every optimizer update.
pub fn run<F>(config: &RunConfig, on_step: F) -> QflowResult<RunReport>
where
    F: FnMut(usize, f64),
{
    config.validate()?;
    let example = config.build_example()?;
    let objective = example.objective()?.with_diff_method(config.diff_method);
    let mut optimizer = config.build_optimizer()?;
    let params = example.circuit.init(config.seed);

    let max_energy = match config.problem {
        ProblemConfig::Maxcut { .. } => Some(min_max_eigenvalue(&example.hamiltonian)?.1),
        _ => None,
    };
    info!(
        problem = config.problem.name(),
        ansatz = example.circuit.name(),
        num_qubits = example.circuit.num_qubits(),
        min_energy = example.min_energy,
        "problem built"
    );

    let result = qflow::optimizer::minimize_with_callback(
        optimizer.as_mut(),
        &objective,
        params,
        config.steps,
        on_step,
    )?;

    Ok(RunReport {
        problem: config.problem.name().to_string(),
        ansatz: example.circuit.name().to_string(),
        num_qubits: example.circuit.num_qubits(),
        num_params: example.circuit.num_params(),
        n_terms: example.hamiltonian.n_terms(),
        min_energy: example.min_energy,
        max_energy,
        result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use qflow::config::OptimizerConfig;

    fn maxcut_config(steps: usize) -> RunConfig {
        RunConfig {
            problem: ProblemConfig::from_name("maxcut").unwrap(),
            optimizer: OptimizerConfig::from_name("qng2").unwrap(),
            steps,
            seed: Some(0),
            ..Default::default()
        }
    }

    #[test]
    fn test_run_reports_every_step() {
        let mut seen = Vec::new();
        let report = run(&maxcut_config(5), |step, cost| seen.push((step, cost))).unwrap();
        assert_eq!(report.result.num_steps(), 5);
        assert_eq!(seen.len(), 5);
        assert_eq!(seen[4].1, report.result.final_cost());
        assert_eq!(report.problem, "maxcut");
        assert_eq!(report.num_qubits, 4);
        assert_eq!(report.num_params, 2);
    }

    #[test]
    fn test_ratio_only_for_maxcut() {
        let report = run(&maxcut_config(2), |_, _| {}).unwrap();
        let r = report.approximation_ratio().unwrap();
        assert!((0.0..=1.0).contains(&r));
        assert!(report.energy_error() >= -1e-9);

        let config = RunConfig {
            steps: 1,
            seed: Some(0),
            ..Default::default()
        };
        let report = run(&config, |_, _| {}).unwrap();
        assert!(report.approximation_ratio().is_none());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = RunConfig {
            steps: 0,
            ..Default::default()
        };
        assert!(run(&config, |_, _| {}).is_err());
    }
}
