use nalgebra::{DMatrix, DVector};
use ndarray::Array1;
use qflow_sim::linalg::lstsq;
use qflow_sim::metric::MetricApprox;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Optimizer, as_slice, check_stepsize};
use crate::error::{QflowError, QflowResult};
use crate::objective::Objective;

/// Quantum natural gradient descent solved by least squares
/// (Stokes et al., arXiv:1909.02108).
///
/// Each step solves `F · δ = ∇E` for the natural gradient `δ` with an SVD
/// cutoff of `rcond · σ_max` and moves `θ ← θ − η δ`. Singular metrics are
/// handled by the cutoff instead of an explicit regularizer. By default the
/// metric is evaluated once, at the first step, and reused until [`reset`].
///
/// [`reset`]: Optimizer::reset
#[derive(Debug, Clone)]
pub struct Qng2Optimizer {
    stepsize: f64,
    approx: MetricApprox,
    rcond: f64,
    reuse_metric: bool,
    metric: Option<DMatrix<f64>>,
    last_gradient: Option<Array1<f64>>,
    last_natural_gradient: Option<Array1<f64>>,
}

impl Qng2Optimizer {
    pub const DEFAULT_STEPSIZE: f64 = 0.01;
    pub const DEFAULT_RCOND: f64 = 1e-7;

    pub fn new(stepsize: f64, approx: MetricApprox) -> QflowResult<Self> {
        Ok(Self {
            stepsize: check_stepsize(stepsize)?,
            approx,
            rcond: Self::DEFAULT_RCOND,
            reuse_metric: true,
            metric: None,
            last_gradient: None,
            last_natural_gradient: None,
        })
    }

    pub fn with_rcond(mut self, rcond: f64) -> Self {
        self.rcond = rcond;
        self
    }

    /// Recompute the metric at every step instead of caching the first one.
    pub fn with_reuse_metric(mut self, reuse_metric: bool) -> Self {
        self.reuse_metric = reuse_metric;
        self
    }

    pub fn stepsize(&self) -> f64 {
        self.stepsize
    }

    pub fn approx(&self) -> MetricApprox {
        self.approx
    }

    /// The metric tensor used by the last step.
    pub fn metric(&self) -> Option<&DMatrix<f64>> {
        self.metric.as_ref()
    }

    pub fn last_gradient(&self) -> Option<&Array1<f64>> {
        self.last_gradient.as_ref()
    }

    pub fn last_natural_gradient(&self) -> Option<&Array1<f64>> {
        self.last_natural_gradient.as_ref()
    }
}

impl Default for Qng2Optimizer {
    fn default() -> Self {
        Self {
            stepsize: Self::DEFAULT_STEPSIZE,
            approx: MetricApprox::default(),
            rcond: Self::DEFAULT_RCOND,
            reuse_metric: true,
            metric: None,
            last_gradient: None,
            last_natural_gradient: None,
        }
    }
}

impl Optimizer for Qng2Optimizer {
    fn name(&self) -> &str {
        "qng2"
    }

    fn step(&mut self, objective: &dyn Objective, params: &Array1<f64>) -> QflowResult<Array1<f64>> {
        let x = as_slice(params);
        let stale = match &self.metric {
            Some(m) => !self.reuse_metric || m.nrows() != x.len(),
            None => true,
        };
        if stale {
            self.metric = Some(objective.metric_tensor(x, self.approx)?);
        }
        let metric = self
            .metric
            .as_ref()
            .ok_or_else(|| QflowError::InvalidArgument("metric tensor unavailable".into()))?;

        let grad = objective.gradient(x)?;
        let nat_grad = lstsq(metric, &DVector::from_column_slice(&grad), self.rcond)?;
        let nat_grad = Array1::from_iter(nat_grad.iter().copied());
        debug!(
            recomputed_metric = stale,
            grad_norm = grad.iter().map(|g| g * g).sum::<f64>().sqrt(),
            "natural gradient solved"
        );

        let next = params - &(&nat_grad * self.stepsize);
        self.last_gradient = Some(Array1::from_vec(grad));
        self.last_natural_gradient = Some(nat_grad);
        Ok(next)
    }

    fn reset(&mut self) {
        self.metric = None;
        self.last_gradient = None;
        self.last_natural_gradient = None;
    }
}

/// Serializable settings for [`Qng2Optimizer`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Qng2Settings {
    pub stepsize: f64,
    pub approx: MetricApprox,
    pub rcond: f64,
    pub reuse_metric: bool,
}

impl Default for Qng2Settings {
    fn default() -> Self {
        Self {
            stepsize: Qng2Optimizer::DEFAULT_STEPSIZE,
            approx: MetricApprox::default(),
            rcond: Qng2Optimizer::DEFAULT_RCOND,
            reuse_metric: true,
        }
    }
}

impl Qng2Settings {
    pub fn build(&self) -> QflowResult<Qng2Optimizer> {
        Ok(Qng2Optimizer::new(self.stepsize, self.approx)?
            .with_rcond(self.rcond)
            .with_reuse_metric(self.reuse_metric))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::ExpvalCost;
    use crate::optimizer::tests::ry_z;
    use crate::templates::{Ansatz, TemplateCircuit};
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let opt = Qng2Optimizer::default();
        assert_eq!(opt.stepsize(), 0.01);
        assert_eq!(opt.approx(), MetricApprox::BlockDiag);
        assert!(opt.metric().is_none());
        assert!(Qng2Optimizer::new(-1.0, MetricApprox::Diag).is_err());
    }

    #[test]
    fn test_single_step() {
        // F = 1/4 and ∂E/∂θ = −sin θ, so θ' = θ + 4 η sin θ.
        let mut opt = Qng2Optimizer::new(0.1, MetricApprox::BlockDiag).unwrap();
        let (next, cost) = opt.step_and_cost(&ry_z(), &Array1::from_vec(vec![0.5])).unwrap();
        let expected = 0.5 + 0.4 * 0.5_f64.sin();
        assert_relative_eq!(next[0], expected, epsilon = 1e-10);
        assert_relative_eq!(cost, expected.cos(), epsilon = 1e-10);
        assert_relative_eq!(opt.metric().unwrap()[(0, 0)], 0.25, epsilon = 1e-12);
        assert_relative_eq!(opt.last_natural_gradient().unwrap()[0], -4.0 * 0.5_f64.sin(), epsilon = 1e-10);
    }

    #[test]
    fn test_metric_cached_until_reset() {
        let cost = ry_z();
        let mut opt = Qng2Optimizer::default();
        let p1 = opt.step(&cost, &Array1::from_vec(vec![0.5])).unwrap();
        let first = opt.metric().unwrap().clone();
        opt.step(&cost, &p1).unwrap();
        assert_eq!(opt.metric().unwrap(), &first);
        opt.reset();
        assert!(opt.metric().is_none());
        assert!(opt.last_gradient().is_none());
    }

    #[test]
    fn test_singular_metric_leaves_params() {
        // No trainable gate: F = 0 and ∇E = 0, the least-squares solve is 0.
        let t = TemplateCircuit::new(3).unwrap();
        let cost = ExpvalCost::new(&t, t.hamiltonian()).unwrap();
        let params = t.init(Some(0));
        let mut opt = Qng2Optimizer::default();
        let (next, _) = opt.step_and_cost(&cost, &params).unwrap();
        assert_eq!(next, params);
    }

    #[test]
    fn test_settings_build() {
        let settings = Qng2Settings {
            reuse_metric: false,
            ..Default::default()
        };
        let opt = settings.build().unwrap();
        assert!(!opt.reuse_metric);
        assert_eq!(opt.rcond, 1e-7);
    }
}
