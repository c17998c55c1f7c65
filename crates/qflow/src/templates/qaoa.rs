//! Quantum Approximate Optimization Algorithm circuits.

use std::f64::consts::PI;
use std::sync::Arc;

use ndarray::Array1;
use qflow_ir::{Circuit, ParameterExpression};
use qflow_sim::hamiltonian::Hamiltonian;
use qflow_sim::synthesis::append_time_evolution;

use super::{Ansatz, InitialState, Plus, require_layers, rng_from, uniform_params};
use crate::error::{QflowError, QflowResult};
use crate::mixers::x_mixer;

/// Alternating cost and mixer evolutions on top of an initial state.
///
/// The flat parameter vector is `[γ_1 … γ_p, β_1 … β_p]`; layer `k` applies
/// `exp(−i γ_k H_C)` then `exp(−i β_k H_M)`, each as a single Trotter step.
#[derive(Debug, Clone)]
pub struct QaoaCircuit {
    cost: Hamiltonian,
    mixer: Hamiltonian,
    initial_state: Arc<dyn InitialState>,
    num_layers: usize,
    num_qubits: usize,
}

impl QaoaCircuit {
    /// The standard QAOA: `|+⟩` start and X mixer.
    pub fn new(cost: Hamiltonian, num_layers: usize) -> QflowResult<Self> {
        let n = cost.num_qubits() as usize;
        Self::with_mixer(cost, x_mixer(n), Arc::new(Plus::new(n)), num_layers)
    }

    /// QAOA with a custom mixer and initial state. The mixer must act on
    /// exactly the wires of the cost Hamiltonian.
    pub fn with_mixer(
        cost: Hamiltonian,
        mixer: Hamiltonian,
        initial_state: Arc<dyn InitialState>,
        num_layers: usize,
    ) -> QflowResult<Self> {
        require_layers(num_layers)?;
        let (cost_wires, mixer_wires) = (cost.wires(), mixer.wires());
        if cost_wires != mixer_wires {
            return Err(QflowError::WireMismatch {
                mixer: mixer_wires,
                cost: cost_wires,
            });
        }
        let num_qubits = cost.num_qubits() as usize;
        if initial_state.num_qubits() != num_qubits {
            return Err(QflowError::InvalidArgument(format!(
                "initial state prepares {} qubits, cost acts on {num_qubits}",
                initial_state.num_qubits()
            )));
        }
        Ok(Self {
            cost,
            mixer,
            initial_state,
            num_layers,
            num_qubits,
        })
    }

    pub fn cost(&self) -> &Hamiltonian {
        &self.cost
    }

    pub fn mixer(&self) -> &Hamiltonian {
        &self.mixer
    }

    /// Split a flat parameter vector into `(γ, β)`.
    pub fn split_params(&self, params: &[f64]) -> QflowResult<(Vec<f64>, Vec<f64>)> {
        self.check_params(params)?;
        let (gammas, betas) = params.split_at(self.num_layers);
        Ok((gammas.to_vec(), betas.to_vec()))
    }
}

impl Ansatz for QaoaCircuit {
    fn name(&self) -> &str {
        "qaoa"
    }

    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn wires(&self) -> Vec<u32> {
        self.cost.wires()
    }

    fn num_layers(&self) -> usize {
        self.num_layers
    }

    fn params_shape(&self) -> Vec<usize> {
        vec![2 * self.num_layers]
    }

    /// `γ ~ U[0, 2π)`, `β ~ U[0, π)`.
    fn init(&self, seed: Option<u64>) -> Array1<f64> {
        let mut rng = rng_from(seed);
        let gammas = uniform_params(&mut rng, self.num_layers, 0.0, 2.0 * PI);
        let betas = uniform_params(&mut rng, self.num_layers, 0.0, PI);
        gammas.into_iter().chain(betas).collect()
    }

    fn circuit(&self) -> QflowResult<Circuit> {
        let mut circuit = Circuit::with_size(self.name(), self.num_qubits as u32);
        self.initial_state.apply(&mut circuit)?;
        for k in 0..self.num_layers {
            let gamma = ParameterExpression::param(k);
            let beta = ParameterExpression::param(self.num_layers + k);
            append_time_evolution(&mut circuit, &self.cost, &gamma, 1)?;
            append_time_evolution(&mut circuit, &self.mixer, &beta, 1)?;
        }
        Ok(circuit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::cycle;
    use crate::hamiltonian::maxcut;
    use crate::mixers::{circular_xy_mixer, x_mixer};
    use crate::templates::DickeState;
    use approx::assert_relative_eq;
    use ndarray::s;
    use qflow_sim::execution::expectation;
    use qflow_sim::hamiltonian::HamiltonianTerm;

    fn square() -> Hamiltonian {
        maxcut(&cycle(4)).unwrap()
    }

    #[test]
    fn test_layout() {
        let qaoa = QaoaCircuit::new(square(), 2).unwrap();
        assert_eq!(qaoa.num_qubits(), 4);
        assert_eq!(qaoa.num_params(), 4);
        assert_eq!(qaoa.circuit().unwrap().num_parameters(), 4);
        let (g, b) = qaoa.split_params(&[0.1, 0.2, 0.3, 0.4]).unwrap();
        assert_eq!(g, vec![0.1, 0.2]);
        assert_eq!(b, vec![0.3, 0.4]);
        assert!(qaoa.split_params(&[0.1]).is_err());
    }

    #[test]
    fn test_init_ranges() {
        let qaoa = QaoaCircuit::new(square(), 3).unwrap();
        let p = qaoa.init(Some(0));
        assert_eq!(p.len(), 6);
        assert!(p.slice(s![..3]).iter().all(|&g| (0.0..2.0 * PI).contains(&g)));
        assert!(p.slice(s![3..]).iter().all(|&b| (0.0..PI).contains(&b)));
        assert_eq!(p, qaoa.init(Some(0)));
    }

    #[test]
    fn test_zero_angles_leave_plus_state() {
        // |+⟩^⊗4 has ⟨Z_u Z_v⟩ = 0, so the cost is −½ per edge.
        let qaoa = QaoaCircuit::new(square(), 1).unwrap();
        let e = expectation(&qaoa.circuit().unwrap(), qaoa.cost(), &[0.0, 0.0]).unwrap();
        assert_relative_eq!(e, -2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_single_edge_reaches_max_cut() {
        // One edge: γ = π/2, β = π/8 leaves no weight on a superposition: |⟨Z0Z1⟩| = 1.
        let cost = Hamiltonian::from_terms(vec![HamiltonianTerm::zz(0, 1, 0.5)]);
        let qaoa = QaoaCircuit::new(cost, 1).unwrap();
        let circuit = qaoa.circuit().unwrap();
        let e = expectation(&circuit, qaoa.cost(), &[PI / 2.0, PI / 8.0]).unwrap();
        assert_relative_eq!(e.abs(), 0.5, epsilon = 1e-10);
    }

    #[test]
    fn test_mixer_wire_mismatch() {
        let err = QaoaCircuit::with_mixer(square(), x_mixer(3), Arc::new(Plus::new(4)), 1);
        assert!(matches!(err, Err(QflowError::WireMismatch { .. })));
    }

    #[test]
    fn test_xy_mixer_with_dicke_state() {
        let dicke = DickeState::new(4, 2).unwrap();
        let qaoa =
            QaoaCircuit::with_mixer(square(), circular_xy_mixer(4), Arc::new(dicke), 2).unwrap();
        let circuit = qaoa.circuit().unwrap();
        // The XY mixer and ZZ cost preserve Hamming weight.
        let params = qaoa.init(Some(1));
        let sv = qflow_sim::execution::run(&circuit, params.as_slice().unwrap()).unwrap();
        for (i, p) in sv.probabilities().iter().enumerate() {
            if i.count_ones() != 2 {
                assert!(*p < 1e-12);
            }
        }
    }
}
