//! Random-rotation circuit that exhibits barren plateaus
//! (McClean et al., arXiv:1803.11173).

use std::f64::consts::PI;

use ndarray::Array1;
use qflow_ir::{Circuit, ParameterExpression, QubitId};
use qflow_sim::hamiltonian::{Hamiltonian, HamiltonianTerm};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Ansatz, require_layers, rng_from, uniform_params};
use crate::error::{QflowError, QflowResult};

/// Axis of a randomly chosen single-qubit rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationAxis {
    X,
    Y,
    Z,
}

/// `RY(π/4)` on every wire, then per layer a rotation about a random axis on
/// every wire followed by a CZ ladder. The cost observable is `Z0 Z1`.
///
/// Axes are drawn once from `gate_seed`, so the circuit structure is fixed
/// while the parameters vary.
#[derive(Debug, Clone)]
pub struct BarrenPlateauCircuit {
    num_layers: usize,
    num_qubits: usize,
    gate_seed: u64,
    axes: Vec<RotationAxis>,
}

impl BarrenPlateauCircuit {
    pub fn new(num_layers: usize, num_qubits: usize) -> QflowResult<Self> {
        Self::with_gate_seed(num_layers, num_qubits, 0)
    }

    pub fn with_gate_seed(num_layers: usize, num_qubits: usize, gate_seed: u64) -> QflowResult<Self> {
        require_layers(num_layers)?;
        if num_qubits < 2 {
            return Err(QflowError::InvalidArgument(format!(
                "the Z0 Z1 cost needs at least 2 qubits, got {num_qubits}"
            )));
        }
        let mut rng = StdRng::seed_from_u64(gate_seed);
        let axes = (0..num_layers * num_qubits)
            .map(|_| match rng.gen_range(0..3) {
                0 => RotationAxis::X,
                1 => RotationAxis::Y,
                _ => RotationAxis::Z,
            })
            .collect();
        Ok(Self {
            num_layers,
            num_qubits,
            gate_seed,
            axes,
        })
    }

    pub fn gate_seed(&self) -> u64 {
        self.gate_seed
    }

    /// Rotation axes, row-major over `(layer, qubit)`.
    pub fn axes(&self) -> &[RotationAxis] {
        &self.axes
    }

    /// The cost observable `Z0 Z1`.
    pub fn hamiltonian(&self) -> Hamiltonian {
        Hamiltonian::from_terms(vec![HamiltonianTerm::zz(0, 1, 1.0)])
    }
}

impl Ansatz for BarrenPlateauCircuit {
    fn name(&self) -> &str {
        "barren_plateau"
    }

    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn num_layers(&self) -> usize {
        self.num_layers
    }

    fn params_shape(&self) -> Vec<usize> {
        vec![self.num_layers, self.num_qubits]
    }

    /// Uniform on `[0, 2π)`.
    fn init(&self, seed: Option<u64>) -> Array1<f64> {
        uniform_params(&mut rng_from(seed), self.num_params(), 0.0, 2.0 * PI)
    }

    fn circuit(&self) -> QflowResult<Circuit> {
        let n = self.num_qubits;
        let mut circuit = Circuit::with_size(self.name(), n as u32);
        for q in 0..n {
            circuit.ry(PI / 4.0, QubitId::from(q))?;
        }
        for layer in 0..self.num_layers {
            for q in 0..n {
                let k = layer * n + q;
                let theta = ParameterExpression::param(k);
                let qubit = QubitId::from(q);
                match self.axes[k] {
                    RotationAxis::X => circuit.rx(theta, qubit)?,
                    RotationAxis::Y => circuit.ry(theta, qubit)?,
                    RotationAxis::Z => circuit.rz(theta, qubit)?,
                };
            }
            for q in 0..n - 1 {
                circuit.cz(QubitId::from(q), QubitId::from(q + 1))?;
            }
        }
        Ok(circuit)
    }
}
