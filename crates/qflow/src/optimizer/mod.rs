//! Gradient-based optimizers for variational circuits.
//!
//! All optimizers implement [`Optimizer`] and are driven by [`minimize`],
//! which records the cost after every step.
//!
//! - [`Qng2Optimizer`]: quantum natural gradient with a least-squares solve
//!   and a cached metric tensor
//! - [`QngOptimizer`]: quantum natural gradient with a fresh, regularized
//!   metric every step
//! - [`AdamOptimizer`] and [`GradientDescentOptimizer`] as first-order
//!   baselines

mod adam;
mod gd;
mod qng;
mod qng2;

pub use adam::AdamOptimizer;
pub use gd::GradientDescentOptimizer;
pub use qng::QngOptimizer;
pub use qng2::{Qng2Optimizer, Qng2Settings};

use std::time::Instant;

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{QflowError, QflowResult};
use crate::objective::Objective;

/// One update rule over a flat parameter vector.
pub trait Optimizer: Send {
    fn name(&self) -> &str;

    /// Parameters after one update.
    fn step(&mut self, objective: &dyn Objective, params: &Array1<f64>) -> QflowResult<Array1<f64>>;

    /// Parameters after one update and the cost evaluated at them.
    fn step_and_cost(
        &mut self,
        objective: &dyn Objective,
        params: &Array1<f64>,
    ) -> QflowResult<(Array1<f64>, f64)> {
        let next = self.step(objective, params)?;
        let cost = objective.cost(as_slice(&next))?;
        Ok((next, cost))
    }

    /// Forget any state accumulated across steps.
    fn reset(&mut self) {}
}

impl<O: Optimizer + ?Sized> Optimizer for Box<O> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn step(&mut self, objective: &dyn Objective, params: &Array1<f64>) -> QflowResult<Array1<f64>> {
        (**self).step(objective, params)
    }

    fn step_and_cost(
        &mut self,
        objective: &dyn Objective,
        params: &Array1<f64>,
    ) -> QflowResult<(Array1<f64>, f64)> {
        (**self).step_and_cost(objective, params)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Outcome of an optimization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Optimizer that produced the run.
    pub optimizer: String,
    /// Final parameters.
    pub params: Vec<f64>,
    /// Cost at the initial parameters.
    pub initial_cost: f64,
    /// Cost after each step.
    pub cost_history: Vec<f64>,
    /// Wall-clock time in milliseconds.
    pub elapsed_ms: u64,
}

impl OptimizationResult {
    /// Cost after the last step, or the initial cost for a zero-step run.
    pub fn final_cost(&self) -> f64 {
        self.cost_history.last().copied().unwrap_or(self.initial_cost)
    }

    /// Lowest cost seen, including the starting point.
    pub fn best_cost(&self) -> f64 {
        self.cost_history
            .iter()
            .copied()
            .fold(self.initial_cost, f64::min)
    }

    pub fn num_steps(&self) -> usize {
        self.cost_history.len()
    }
}

/// Run `steps` updates of `optimizer` from `params`.
pub fn minimize<O: Optimizer + ?Sized>(
    optimizer: &mut O,
    objective: &dyn Objective,
    params: Array1<f64>,
    steps: usize,
) -> QflowResult<OptimizationResult> {
    minimize_with_callback(optimizer, objective, params, steps, |_, _| {})
}

/// Like [`minimize`], calling `callback(step, cost)` after every update.
pub fn minimize_with_callback<O, F>(
    optimizer: &mut O,
    objective: &dyn Objective,
    mut params: Array1<f64>,
    steps: usize,
    mut callback: F,
) -> QflowResult<OptimizationResult>
where
    O: Optimizer + ?Sized,
    F: FnMut(usize, f64),
{
    if params.len() != objective.num_params() {
        return Err(QflowError::ParameterCount {
            expected: objective.num_params(),
            got: params.len(),
        });
    }
    let start = Instant::now();
    let initial_cost = objective.cost(as_slice(&params))?;
    info!(
        optimizer = optimizer.name(),
        steps,
        n_params = params.len(),
        initial_cost,
        "starting optimization"
    );

    let mut cost_history = Vec::with_capacity(steps);
    for step in 0..steps {
        let (next, cost) = optimizer.step_and_cost(objective, &params)?;
        params = next;
        debug!(step, cost, "optimizer step");
        cost_history.push(cost);
        callback(step, cost);
    }

    let result = OptimizationResult {
        optimizer: optimizer.name().to_string(),
        params: params.to_vec(),
        initial_cost,
        cost_history,
        elapsed_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        optimizer = optimizer.name(),
        final_cost = result.final_cost(),
        elapsed_ms = result.elapsed_ms,
        "optimization finished"
    );
    Ok(result)
}

/// Parameter vectors are built by the optimizers and always contiguous.
pub(crate) fn as_slice(params: &Array1<f64>) -> &[f64] {
    params.as_slice().unwrap_or_default()
}

pub(crate) fn check_stepsize(stepsize: f64) -> QflowResult<f64> {
    if !(stepsize.is_finite() && stepsize > 0.0) {
        return Err(QflowError::InvalidArgument(format!(
            "stepsize must be positive and finite, got {stepsize}"
        )));
    }
    Ok(stepsize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::ExpvalCost;
    use qflow_ir::{Circuit, ParameterExpression, QubitId};
    use qflow_sim::hamiltonian::{Hamiltonian, HamiltonianTerm};

    pub(crate) fn ry_z() -> ExpvalCost {
        let mut circuit = Circuit::with_size("ry", 1);
        circuit.ry(ParameterExpression::param(0), QubitId(0)).unwrap();
        let h = Hamiltonian::from_terms(vec![HamiltonianTerm::z(0, 1.0)]);
        ExpvalCost::from_circuit(circuit, h).unwrap()
    }

    #[test]
    fn test_minimize_records_history() {
        let mut opt = GradientDescentOptimizer::new(0.4).unwrap();
        let mut seen = Vec::new();
        let result = minimize_with_callback(
            &mut opt,
            &ry_z(),
            Array1::from_vec(vec![0.5]),
            20,
            |step, cost| seen.push((step, cost)),
        )
        .unwrap();
        assert_eq!(result.num_steps(), 20);
        assert_eq!(seen.len(), 20);
        assert_eq!(seen[19].1, result.final_cost());
        assert!(result.final_cost() < result.initial_cost);
        assert!(result.best_cost() <= result.final_cost());
    }

    #[test]
    fn test_zero_steps() {
        let mut opt = AdamOptimizer::default();
        let result = minimize(&mut opt, &ry_z(), Array1::from_vec(vec![0.5]), 0).unwrap();
        assert_eq!(result.final_cost(), result.initial_cost);
        assert_eq!(result.params, vec![0.5]);
    }

    #[test]
    fn test_boxed_optimizer() {
        let mut opt: Box<dyn Optimizer> = Box::new(Qng2Optimizer::default());
        assert_eq!(opt.name(), "qng2");
        let result = minimize(&mut opt, &ry_z(), Array1::from_vec(vec![0.5]), 3).unwrap();
        assert_eq!(result.optimizer, "qng2");
    }

    #[test]
    fn test_wrong_parameter_count() {
        let mut opt = GradientDescentOptimizer::default();
        let err = minimize(&mut opt, &ry_z(), Array1::zeros(2), 1);
        assert!(matches!(err, Err(QflowError::ParameterCount { .. })));
    }

    #[test]
    fn test_stepsize_validation() {
        assert!(check_stepsize(0.1).is_ok());
        assert!(check_stepsize(0.0).is_err());
        assert!(check_stepsize(f64::NAN).is_err());
    }
}
