use ndarray::Array1;

use super::{Optimizer, as_slice, check_stepsize};
use crate::error::QflowResult;
use crate::objective::Objective;

/// Adam with bias correction folded into the step size
/// (Kingma and Ba, arXiv:1412.6980).
#[derive(Debug, Clone)]
pub struct AdamOptimizer {
    stepsize: f64,
    beta1: f64,
    beta2: f64,
    eps: f64,
    first_moment: Option<Array1<f64>>,
    second_moment: Option<Array1<f64>>,
    t: i32,
}

impl AdamOptimizer {
    pub fn new(stepsize: f64) -> QflowResult<Self> {
        Ok(Self {
            stepsize: check_stepsize(stepsize)?,
            ..Self::default()
        })
    }

    pub fn with_betas(mut self, beta1: f64, beta2: f64) -> Self {
        self.beta1 = beta1;
        self.beta2 = beta2;
        self
    }

    pub fn stepsize(&self) -> f64 {
        self.stepsize
    }

    /// Number of steps taken since construction or the last reset.
    pub fn iterations(&self) -> usize {
        self.t as usize
    }
}

impl Default for AdamOptimizer {
    fn default() -> Self {
        Self {
            stepsize: 0.01,
            beta1: 0.9,
            beta2: 0.99,
            eps: 1e-8,
            first_moment: None,
            second_moment: None,
            t: 0,
        }
    }
}

impl Optimizer for AdamOptimizer {
    fn name(&self) -> &str {
        "adam"
    }

    fn step(&mut self, objective: &dyn Objective, params: &Array1<f64>) -> QflowResult<Array1<f64>> {
        let grad = Array1::from_vec(objective.gradient(as_slice(params))?);
        self.t += 1;

        let m = match self.first_moment.take() {
            Some(m) if m.len() == grad.len() => m * self.beta1 + &grad * (1.0 - self.beta1),
            _ => &grad * (1.0 - self.beta1),
        };
        let v = match self.second_moment.take() {
            Some(v) if v.len() == grad.len() => v * self.beta2 + grad.mapv(|g| g * g) * (1.0 - self.beta2),
            _ => grad.mapv(|g| g * g) * (1.0 - self.beta2),
        };

        let lr = self.stepsize * (1.0 - self.beta2.powi(self.t)).sqrt() / (1.0 - self.beta1.powi(self.t));
        let update = ndarray::Zip::from(&m)
            .and(&v)
            .map_collect(|&m, &v| lr * m / (v.sqrt() + self.eps));
        self.first_moment = Some(m);
        self.second_moment = Some(v);
        Ok(params - &update)
    }

    fn reset(&mut self) {
        self.first_moment = None;
        self.second_moment = None;
        self.t = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::minimize;
    use crate::optimizer::tests::ry_z;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_step_is_sign_step() {
        // After bias correction the first update is ≈ stepsize · sign(g).
        let mut opt = AdamOptimizer::new(0.1).unwrap();
        let next = opt.step(&ry_z(), &Array1::from_vec(vec![0.5])).unwrap();
        let lr = 0.1 * (1.0 - 0.99_f64).sqrt() / (1.0 - 0.9);
        let g = -0.5_f64.sin();
        let m = 0.1 * g;
        let v = 0.01 * g * g;
        assert_relative_eq!(next[0], 0.5 - lr * m / (v.sqrt() + 1e-8), epsilon = 1e-12);
        assert_eq!(opt.iterations(), 1);
    }

    #[test]
    fn test_converges_on_single_rotation() {
        let mut opt = AdamOptimizer::new(0.1).unwrap();
        let result = minimize(&mut opt, &ry_z(), Array1::from_vec(vec![0.5]), 200).unwrap();
        assert!(result.final_cost() < -0.99);
        opt.reset();
        assert_eq!(opt.iterations(), 0);
    }
}
