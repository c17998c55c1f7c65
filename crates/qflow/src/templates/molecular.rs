//! Hardware-efficient ansätze for molecular Hamiltonians, starting from a
//! basis-state reference such as Hartree-Fock.

use std::f64::consts::PI;

use ndarray::Array1;
use qflow_ir::{Circuit, ParameterExpression, QubitId};

use super::{Ansatz, BasisState, InitialState, require_layers, rng_from, uniform_params};
use crate::error::{QflowError, QflowResult};

fn check_reference(num_qubits: usize, reference: &BasisState) -> QflowResult<()> {
    if reference.num_qubits() != num_qubits {
        return Err(QflowError::InvalidArgument(format!(
            "initial state has {} bits for {num_qubits} qubits",
            reference.num_qubits()
        )));
    }
    Ok(())
}

/// Layers of RY rotations followed by a ring of CNOTs.
///
/// Parameters have shape `(num_layers, num_qubits)`. Two wires get a single
/// CNOT, one wire none.
#[derive(Debug, Clone)]
pub struct MolecularBasicEntangler {
    num_layers: usize,
    num_qubits: usize,
    initial_state: BasisState,
}

impl MolecularBasicEntangler {
    pub fn new(num_layers: usize, num_qubits: usize, initial_state: BasisState) -> QflowResult<Self> {
        require_layers(num_layers)?;
        check_reference(num_qubits, &initial_state)?;
        Ok(Self {
            num_layers,
            num_qubits,
            initial_state,
        })
    }

    pub fn initial_state(&self) -> &BasisState {
        &self.initial_state
    }
}

impl Ansatz for MolecularBasicEntangler {
    fn name(&self) -> &str {
        "molecular_basic_entangler"
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

    /// Uniform on `[0, π)`.
    fn init(&self, seed: Option<u64>) -> Array1<f64> {
        uniform_params(&mut rng_from(seed), self.num_params(), 0.0, PI)
    }

    fn circuit(&self) -> QflowResult<Circuit> {
        let n = self.num_qubits;
        let mut circuit = Circuit::with_size(self.name(), n as u32);
        self.initial_state.apply(&mut circuit)?;
        for layer in 0..self.num_layers {
            for q in 0..n {
                circuit.ry(ParameterExpression::param(layer * n + q), QubitId::from(q))?;
            }
            match n {
                0 | 1 => {}
                2 => {
                    circuit.cx(QubitId(0), QubitId(1))?;
                }
                _ => {
                    for q in 0..n {
                        circuit.cx(QubitId::from(q), QubitId::from((q + 1) % n))?;
                    }
                }
            }
        }
        Ok(circuit)
    }
}

/// Layers of general rotations `Rot(φ, θ, ω)` followed by CNOTs of range
/// `r = l mod (n − 1) + 1` in layer `l`.
///
/// Parameters have shape `(num_layers, num_qubits, 3)`.
#[derive(Debug, Clone)]
pub struct MolecularStrongEntangler {
    num_layers: usize,
    num_qubits: usize,
    initial_state: BasisState,
}

impl MolecularStrongEntangler {
    pub fn new(num_layers: usize, num_qubits: usize, initial_state: BasisState) -> QflowResult<Self> {
        require_layers(num_layers)?;
        check_reference(num_qubits, &initial_state)?;
        Ok(Self {
            num_layers,
            num_qubits,
            initial_state,
        })
    }

    /// Entangling range of `layer`.
    pub fn range(&self, layer: usize) -> usize {
        if self.num_qubits > 1 {
            layer % (self.num_qubits - 1) + 1
        } else {
            0
        }
    }
}

impl Ansatz for MolecularStrongEntangler {
    fn name(&self) -> &str {
        "molecular_strong_entangler"
    }

    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn num_layers(&self) -> usize {
        self.num_layers
    }

    fn params_shape(&self) -> Vec<usize> {
        vec![self.num_layers, self.num_qubits, 3]
    }

    /// Uniform on `[0, π)`.
    fn init(&self, seed: Option<u64>) -> Array1<f64> {
        uniform_params(&mut rng_from(seed), self.num_params(), 0.0, PI)
    }

    fn circuit(&self) -> QflowResult<Circuit> {
        let n = self.num_qubits;
        let mut circuit = Circuit::with_size(self.name(), n as u32);
        self.initial_state.apply(&mut circuit)?;
        for layer in 0..self.num_layers {
            for q in 0..n {
                let base = 3 * (layer * n + q);
                circuit.rot(
                    ParameterExpression::param(base),
                    ParameterExpression::param(base + 1),
                    ParameterExpression::param(base + 2),
                    QubitId::from(q),
                )?;
            }
            if n > 1 {
                let r = self.range(layer);
                for q in 0..n {
                    circuit.cx(QubitId::from(q), QubitId::from((q + r) % n))?;
                }
            }
        }
        Ok(circuit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qflow_ir::StandardGate;

    fn hf(n: usize) -> BasisState {
        BasisState::hartree_fock(n / 2, n).unwrap()
    }

    #[test]
    fn test_basic_entangler_shape() {
        let ansatz = MolecularBasicEntangler::new(2, 4, hf(4)).unwrap();
        assert_eq!(ansatz.params_shape(), vec![2, 4]);
        assert_eq!(ansatz.num_params(), 8);
        let circuit = ansatz.circuit().unwrap();
        assert_eq!(circuit.num_parameters(), 8);
        // 2 X for the reference, then 2 × (4 RY + 4 CX).
        assert_eq!(circuit.len(), 2 + 16);
    }

    #[test]
    fn test_basic_entangler_two_wires() {
        let ansatz = MolecularBasicEntangler::new(1, 2, hf(2)).unwrap();
        let circuit = ansatz.circuit().unwrap();
        let cx = circuit
            .instructions()
            .iter()
            .filter(|i| i.as_gate() == Some(&StandardGate::CX))
            .count();
        assert_eq!(cx, 1);
    }

    #[test]
    fn test_strong_entangler_ranges() {
        let ansatz = MolecularStrongEntangler::new(4, 4, hf(4)).unwrap();
        assert_eq!(ansatz.num_params(), 48);
        assert_eq!((0..4).map(|l| ansatz.range(l)).collect::<Vec<_>>(), vec![1, 2, 3, 1]);
        assert_eq!(ansatz.circuit().unwrap().num_parameters(), 48);
    }

    #[test]
    fn test_init_is_seeded() {
        let ansatz = MolecularStrongEntangler::new(1, 4, hf(4)).unwrap();
        assert_eq!(ansatz.init(Some(0)), ansatz.init(Some(0)));
        assert_ne!(ansatz.init(Some(0)), ansatz.init(Some(1)));
        assert!(ansatz.init(Some(0)).iter().all(|&x| (0.0..PI).contains(&x)));
    }

    #[test]
    fn test_reference_width_mismatch() {
        assert!(MolecularBasicEntangler::new(1, 4, hf(2)).is_err());
        assert!(MolecularBasicEntangler::new(0, 2, hf(2)).is_err());
    }
}
