//! Variational circuit templates and initial-state preparation.
//!
//! An [`Ansatz`] builds one symbolic [`Circuit`] whose rotation angles refer
//! to entries of a flat parameter vector; the same circuit is reused for
//! every parameter value during optimization.

mod barren_plateau;
mod initial_state;
mod molecular;
mod qaoa;
mod template;

pub use barren_plateau::{BarrenPlateauCircuit, RotationAxis};
pub use initial_state::{BasisState, DickeState, InitialState, Plus};
pub use molecular::{MolecularBasicEntangler, MolecularStrongEntangler};
pub use qaoa::QaoaCircuit;
pub use template::TemplateCircuit;

use ndarray::Array1;
use qflow_ir::Circuit;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{QflowError, QflowResult};

/// A parameterized circuit family.
pub trait Ansatz: Send + Sync {
    /// Human-readable template name.
    fn name(&self) -> &str;

    /// Width of the register.
    fn num_qubits(&self) -> usize;

    /// Wires the template acts on.
    fn wires(&self) -> Vec<u32> {
        (0..self.num_qubits() as u32).collect()
    }

    /// Number of repeated layers.
    fn num_layers(&self) -> usize;

    /// Logical shape of the parameters; the flat vector is its row-major
    /// flattening.
    fn params_shape(&self) -> Vec<usize>;

    /// Length of the flat parameter vector.
    fn num_params(&self) -> usize {
        self.params_shape().iter().product()
    }

    /// Initial parameters. Equal seeds give equal parameters; `None` draws
    /// from system entropy.
    fn init(&self, seed: Option<u64>) -> Array1<f64>;

    /// The circuit, with angles referring to the flat parameter vector.
    fn circuit(&self) -> QflowResult<Circuit>;

    /// Check that `params` has the expected length.
    fn check_params(&self, params: &[f64]) -> QflowResult<()> {
        let expected = self.num_params();
        if params.len() != expected {
            return Err(QflowError::ParameterCount {
                expected,
                got: params.len(),
            });
        }
        Ok(())
    }
}

pub(crate) fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// `len` independent draws from `U[low, high)`.
pub(crate) fn uniform_params(rng: &mut StdRng, len: usize, low: f64, high: f64) -> Array1<f64> {
    let dist = Uniform::new(low, high);
    Array1::from_iter((0..len).map(|_| dist.sample(rng)))
}

pub(crate) fn require_layers(num_layers: usize) -> QflowResult<()> {
    if num_layers == 0 {
        return Err(QflowError::InvalidArgument(
            "an ansatz needs at least one layer".into(),
        ));
    }
    Ok(())
}
