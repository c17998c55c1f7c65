use ndarray::Array1;

use super::{Optimizer, as_slice, check_stepsize};
use crate::error::QflowResult;
use crate::objective::Objective;

/// Vanilla gradient descent, `θ ← θ − η ∇E`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientDescentOptimizer {
    stepsize: f64,
}

impl GradientDescentOptimizer {
    pub fn new(stepsize: f64) -> QflowResult<Self> {
        Ok(Self {
            stepsize: check_stepsize(stepsize)?,
        })
    }

    pub fn stepsize(&self) -> f64 {
        self.stepsize
    }
}

impl Default for GradientDescentOptimizer {
    fn default() -> Self {
        Self { stepsize: 0.01 }
    }
}

impl Optimizer for GradientDescentOptimizer {
    fn name(&self) -> &str {
        "gradient-descent"
    }

    fn step(&mut self, objective: &dyn Objective, params: &Array1<f64>) -> QflowResult<Array1<f64>> {
        let grad = Array1::from_vec(objective.gradient(as_slice(params))?);
        Ok(params - &(grad * self.stepsize))
    }
}
