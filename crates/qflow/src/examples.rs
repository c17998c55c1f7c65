//! Ready-made problems: an ansatz, its Hamiltonian and the exact minimum.
//!
//! Molecular examples take the [`ElectronicStructureSolver`] that supplies
//! the integrals, so they run offline against FCIDUMP files or the built-in
//! H2 data.

use qflow_chem::{ElectronicStructureSolver, MolecularHamiltonian};
use qflow_sim::hamiltonian::Hamiltonian;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::QflowResult;
use crate::graph::maxcut_graph;
use crate::hamiltonian::{self, maxcut, min_max_eigenvalue};
use crate::objective::ExpvalCost;
use crate::templates::{
    Ansatz, BarrenPlateauCircuit, BasisState, MolecularBasicEntangler, MolecularStrongEntangler,
    QaoaCircuit,
};

/// A variational problem instance.
pub struct Example {
    /// The ansatz to optimize.
    pub circuit: Box<dyn Ansatz>,
    /// Observable whose expectation is minimized.
    pub hamiltonian: Hamiltonian,
    /// Exact ground-state energy.
    pub min_energy: f64,
}

impl Example {
    /// Expectation-value objective of this example.
    pub fn objective(&self) -> QflowResult<ExpvalCost> {
        ExpvalCost::new(self.circuit.as_ref(), self.hamiltonian.clone())
    }
}

impl std::fmt::Debug for Example {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Example")
            .field("circuit", &self.circuit.name())
            .field("num_qubits", &self.circuit.num_qubits())
            .field("num_params", &self.circuit.num_params())
            .field("n_terms", &self.hamiltonian.n_terms())
            .field("min_energy", &self.min_energy)
            .finish()
    }
}

/// Hardware-efficient ansatz family for molecular examples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Entangler {
    /// [`MolecularBasicEntangler`].
    #[default]
    Basic,
    /// [`MolecularStrongEntangler`].
    Strong,
}

fn molecular_example(
    mol: MolecularHamiltonian,
    active_electrons: usize,
    num_layers: usize,
    entangler: Entangler,
) -> QflowResult<Example> {
    let reference = BasisState::hartree_fock(active_electrons, mol.num_qubits)?;
    let circuit: Box<dyn Ansatz> = match entangler {
        Entangler::Basic => Box::new(MolecularBasicEntangler::new(
            num_layers,
            mol.num_qubits,
            reference,
        )?),
        Entangler::Strong => Box::new(MolecularStrongEntangler::new(
            num_layers,
            mol.num_qubits,
            reference,
        )?),
    };
    Ok(Example {
        circuit,
        hamiltonian: mol.hamiltonian,
        min_energy: mol.reference_energy,
    })
}

/// H2 with a basic entangler over `|1100⟩`.
pub fn h2_vqe_example(
    num_layers: usize,
    distance: f64,
    solver: &dyn ElectronicStructureSolver,
) -> QflowResult<Example> {
    let mol = hamiltonian::h2(distance, solver)?;
    molecular_example(mol, 2, num_layers, Entangler::Basic)
}

pub fn h4_vqe_basic_entangler_example(
    num_layers: usize,
    distance: f64,
    angle: f64,
    solver: &dyn ElectronicStructureSolver,
) -> QflowResult<Example> {
    let mol = hamiltonian::h4(distance, angle, solver)?;
    molecular_example(mol, 4, num_layers, Entangler::Basic)
}

pub fn h4_vqe_strong_entangler_example(
    num_layers: usize,
    distance: f64,
    angle: f64,
    solver: &dyn ElectronicStructureSolver,
) -> QflowResult<Example> {
    let mol = hamiltonian::h4(distance, angle, solver)?;
    molecular_example(mol, 4, num_layers, Entangler::Strong)
}

pub fn lih_vqe_basic_entangler_example(
    num_layers: usize,
    distance: f64,
    solver: &dyn ElectronicStructureSolver,
) -> QflowResult<Example> {
    let mol = hamiltonian::lih(distance, solver)?;
    molecular_example(mol, 2, num_layers, Entangler::Basic)
}

pub fn lih_vqe_strong_entangler_example(
    num_layers: usize,
    distance: f64,
    solver: &dyn ElectronicStructureSolver,
) -> QflowResult<Example> {
    let mol = hamiltonian::lih(distance, solver)?;
    molecular_example(mol, 2, num_layers, Entangler::Strong)
}

pub fn h2o_vqe_basic_entangler_example(
    num_layers: usize,
    distance: f64,
    angle: f64,
    solver: &dyn ElectronicStructureSolver,
) -> QflowResult<Example> {
    let mol = hamiltonian::h2o(distance, angle, solver)?;
    molecular_example(mol, 8, num_layers, Entangler::Basic)
}

pub fn h2o_vqe_strong_entangler_example(
    num_layers: usize,
    distance: f64,
    angle: f64,
    solver: &dyn ElectronicStructureSolver,
) -> QflowResult<Example> {
    let mol = hamiltonian::h2o(distance, angle, solver)?;
    molecular_example(mol, 8, num_layers, Entangler::Strong)
}

/// Standard QAOA on a seeded random graph with `num_nodes` nodes.
pub fn maxcut_qaoa_example(num_layers: usize, num_nodes: usize, seed: u64) -> QflowResult<Example> {
    let graph = maxcut_graph(num_nodes, seed)?;
    let cost = maxcut(&graph)?;
    let (min_energy, _) = min_max_eigenvalue(&cost)?;
    info!(
        num_nodes,
        n_edges = graph.edge_count(),
        min_energy,
        "max-cut problem ready"
    );
    let circuit = QaoaCircuit::new(cost.clone(), num_layers)?;
    Ok(Example {
        circuit: Box::new(circuit),
        hamiltonian: cost,
        min_energy,
    })
}

/// Random-rotation circuit measured on `Z0 Z1`, whose minimum is `−1`.
pub fn barren_plateau_example(num_layers: usize, num_qubits: usize) -> QflowResult<Example> {
    let circuit = BarrenPlateauCircuit::new(num_layers, num_qubits)?;
    let hamiltonian = circuit.hamiltonian();
    let (min_energy, _) = min_max_eigenvalue(&hamiltonian)?;
    Ok(Example {
        circuit: Box::new(circuit),
        hamiltonian,
        min_energy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use qflow_chem::BuiltinSolver;
    use crate::objective::Objective;
    use qflow_chem::solver::H2_BOND_LENGTH;

    #[test]
    fn test_h2_example() {
        let ex = h2_vqe_example(2, H2_BOND_LENGTH, &BuiltinSolver).unwrap();
        assert_eq!(ex.circuit.num_qubits(), 4);
        assert_eq!(ex.circuit.params_shape(), vec![2, 4]);
        assert_relative_eq!(ex.min_energy, -1.13726984, epsilon = 1e-6);
        // Any trial state sits above the exact energy.
        let cost = ex.objective().unwrap();
        let params = ex.circuit.init(Some(0));
        let e = cost.cost(params.as_slice().unwrap()).unwrap();
        assert!(e >= ex.min_energy - 1e-9);
    }

    #[test]
    fn test_h4_without_integrals_fails() {
        assert!(h4_vqe_basic_entangler_example(1, 1.0, 90.0, &BuiltinSolver).is_err());
    }

    #[test]
    fn test_maxcut_example() {
        let ex = maxcut_qaoa_example(2, 4, 0).unwrap();
        assert_eq!(ex.circuit.num_qubits(), 4);
        assert_eq!(ex.circuit.num_params(), 4);
        assert!(ex.min_energy <= -1.0);
        assert_relative_eq!(ex.min_energy, ex.min_energy.round(), epsilon = 1e-9);
    }

    #[test]
    fn test_barren_plateau_example() {
        let ex = barren_plateau_example(3, 2).unwrap();
        assert_eq!(ex.circuit.params_shape(), vec![3, 2]);
        assert_relative_eq!(ex.min_energy, -1.0, epsilon = 1e-12);
        assert!(format!("{ex:?}").contains("barren_plateau"));
    }
}
