use std::f64::consts::PI;

use ndarray::Array1;
use qflow_ir::{Circuit, QubitId};
use qflow_sim::hamiltonian::{Hamiltonian, HamiltonianTerm};

use super::{Ansatz, rng_from, uniform_params};
use crate::error::{QflowError, QflowResult};

/// Minimal template used to exercise the optimizer plumbing: `RY(π/4)` on
/// wire 0 and `n` declared but unused parameters.
///
/// Every gradient is zero, so any optimizer must leave the parameters fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateCircuit {
    num_qubits: usize,
}

impl TemplateCircuit {
    pub fn new(num_qubits: usize) -> QflowResult<Self> {
        if num_qubits < 2 {
            return Err(QflowError::InvalidArgument(format!(
                "the Z0 Z1 cost needs at least 2 qubits, got {num_qubits}"
            )));
        }
        Ok(Self { num_qubits })
    }

    /// The cost observable `Z0 Z1`.
    pub fn hamiltonian(&self) -> Hamiltonian {
        Hamiltonian::from_terms(vec![HamiltonianTerm::zz(0, 1, 1.0)])
    }
}

impl Ansatz for TemplateCircuit {
    fn name(&self) -> &str {
        "template"
    }

    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn num_layers(&self) -> usize {
        1
    }

    fn params_shape(&self) -> Vec<usize> {
        vec![self.num_qubits]
    }

    fn init(&self, seed: Option<u64>) -> Array1<f64> {
        uniform_params(&mut rng_from(seed), self.num_params(), 0.0, 2.0 * PI)
    }

    fn circuit(&self) -> QflowResult<Circuit> {
        let mut circuit = Circuit::with_size(self.name(), self.num_qubits as u32);
        circuit.ry(PI / 4.0, QubitId(0))?;
        circuit.declare_parameters(self.num_qubits);
        Ok(circuit)
    }
}
