use nalgebra::{DMatrix, DVector};
use ndarray::Array1;
use qflow_sim::linalg::solve;
use qflow_sim::metric::MetricApprox;
use tracing::debug;

use super::{Optimizer, as_slice, check_stepsize};
use crate::error::{QflowError, QflowResult};
use crate::objective::Objective;

/// Quantum natural gradient with the metric re-evaluated at every step.
///
/// The update is `θ ← θ − η (F + λI)⁻¹ ∇E`, solved directly. A singular
/// metric is an error unless `λ > 0`; [`Qng2Optimizer`](super::Qng2Optimizer)
/// handles that case with a least-squares solve.
#[derive(Debug, Clone)]
pub struct QngOptimizer {
    stepsize: f64,
    approx: MetricApprox,
    lam: f64,
    metric: Option<DMatrix<f64>>,
}

impl QngOptimizer {
    pub fn new(stepsize: f64, approx: MetricApprox) -> QflowResult<Self> {
        Ok(Self {
            stepsize: check_stepsize(stepsize)?,
            approx,
            lam: 0.0,
            metric: None,
        })
    }

    /// Tikhonov regularization added to the metric diagonal.
    pub fn with_lam(mut self, lam: f64) -> QflowResult<Self> {
        if !(lam.is_finite() && lam >= 0.0) {
            return Err(QflowError::InvalidArgument(format!(
                "regularization must be non-negative, got {lam}"
            )));
        }
        self.lam = lam;
        Ok(self)
    }

    pub fn stepsize(&self) -> f64 {
        self.stepsize
    }

    pub fn lam(&self) -> f64 {
        self.lam
    }

    /// Regularized metric of the last step.
    pub fn metric(&self) -> Option<&DMatrix<f64>> {
        self.metric.as_ref()
    }
}

impl Default for QngOptimizer {
    fn default() -> Self {
        Self {
            stepsize: 0.01,
            approx: MetricApprox::default(),
            lam: 0.0,
            metric: None,
        }
    }
}

impl Optimizer for QngOptimizer {
    fn name(&self) -> &str {
        "qng"
    }

    fn step(&mut self, objective: &dyn Objective, params: &Array1<f64>) -> QflowResult<Array1<f64>> {
        let x = as_slice(params);
        let n = x.len();
        let metric = objective.metric_tensor(x, self.approx)? + DMatrix::identity(n, n) * self.lam;
        let grad = objective.gradient(x)?;
        let nat_grad = solve(&metric, &DVector::from_column_slice(&grad))?;
        debug!(lam = self.lam, n_params = n, "regularized natural gradient solved");
        self.metric = Some(metric);
        let nat_grad = Array1::from_iter(nat_grad.iter().copied());
        Ok(params - &(nat_grad * self.stepsize))
    }

    fn reset(&mut self) {
        self.metric = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::tests::ry_z;
    use approx::assert_relative_eq;

    #[test]
    fn test_regularized_step() {
        // (1/4 + λ)⁻¹ with λ = 0.25 doubles the gradient.
        let mut opt = QngOptimizer::new(0.1, MetricApprox::Diag)
            .unwrap()
            .with_lam(0.25)
            .unwrap();
        let next = opt.step(&ry_z(), &Array1::from_vec(vec![0.5])).unwrap();
        assert_relative_eq!(next[0], 0.5 + 0.2 * 0.5_f64.sin(), epsilon = 1e-10);
        assert_relative_eq!(opt.metric().unwrap()[(0, 0)], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_metric_needs_regularization() {
        use crate::objective::ExpvalCost;
        use qflow_ir::{Circuit, ParameterExpression, QubitId};
        use qflow_sim::hamiltonian::{Hamiltonian, HamiltonianTerm};

        // θ1 is declared but drives no gate, so its metric row is exactly zero.
        let mut circuit = Circuit::with_size("unused-parameter", 1);
        circuit.ry(ParameterExpression::param(0), QubitId(0)).unwrap();
        circuit.declare_parameters(2);
        let cost = ExpvalCost::from_circuit(
            circuit,
            Hamiltonian::from_terms(vec![HamiltonianTerm::z(0, 1.0)]),
        )
        .unwrap();
        let start = Array1::from_vec(vec![0.3, 0.0]);

        let err = QngOptimizer::new(0.1, MetricApprox::BlockDiag)
            .unwrap()
            .step(&cost, &start)
            .unwrap_err();
        assert!(matches!(err, QflowError::Sim(_)));

        let mut regularized = QngOptimizer::new(0.1, MetricApprox::BlockDiag)
            .unwrap()
            .with_lam(0.5)
            .unwrap();
        assert!(regularized.step(&cost, &start).is_ok());
    }

    #[test]
    fn test_metric_recomputed() {
        let cost = ry_z();
        let mut opt = QngOptimizer::default();
        let p = opt.step(&cost, &Array1::from_vec(vec![0.5])).unwrap();
        opt.step(&cost, &p).unwrap();
        assert!(opt.metric().is_some());
        opt.reset();
        assert!(opt.metric().is_none());
        assert!(QngOptimizer::default().with_lam(-1.0).is_err());
    }
}
