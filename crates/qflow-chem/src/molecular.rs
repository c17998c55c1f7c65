//! Qubit Hamiltonians of molecules, with an exact reference energy and
//! orbital occupations.

use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::Array1;
use num_complex::Complex64;
use qflow_sim::hamiltonian::Hamiltonian;
use qflow_sim::spectrum::{SectorGroundState, sector_ground_state};
use qflow_sim::statevector::MAX_QUBITS;
use qflow_sim::SimError;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::active::ActiveSpace;
use crate::error::ChemResult;
use crate::integrals::ElectronicIntegrals;
use crate::mapping::{Ladder, QubitOperator, jordan_wigner, ladder_product};
use crate::molecule::Molecule;
use crate::solver::ElectronicStructureSolver;

/// Active-space and frozen-core choices for [`molecular_hamiltonian`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MolecularOptions {
    /// Electrons kept in the qubit Hamiltonian; all when `None`.
    pub active_electrons: Option<usize>,
    /// Orbitals kept in the qubit Hamiltonian; all non-core when `None`.
    pub active_orbitals: Option<usize>,
    /// Lowest orbitals frozen for the reference calculation.
    pub frozen: usize,
}

impl MolecularOptions {
    pub fn active(electrons: usize, orbitals: usize) -> Self {
        Self {
            active_electrons: Some(electrons),
            active_orbitals: Some(orbitals),
            frozen: 0,
        }
    }

    #[must_use]
    pub fn with_frozen(mut self, frozen: usize) -> Self {
        self.frozen = frozen;
        self
    }
}

/// A molecule's qubit Hamiltonian and reference data.
#[derive(Debug, Clone)]
pub struct MolecularHamiltonian {
    pub hamiltonian: Hamiltonian,
    pub num_qubits: usize,
    /// Exact ground-state energy with `frozen` core orbitals.
    pub reference_energy: f64,
    /// Diagonal of the spin-summed one-particle density matrix, per orbital.
    pub hf_occupations: Array1<f64>,
    /// Natural-orbital occupations, descending.
    pub natural_occupations: Array1<f64>,
}

/// Build the Jordan-Wigner Hamiltonian of `molecule` over the selected active
/// space.
pub fn molecular_hamiltonian(
    molecule: &Molecule,
    solver: &dyn ElectronicStructureSolver,
    options: &MolecularOptions,
) -> ChemResult<MolecularHamiltonian> {
    molecule.validate()?;
    let ints = solver.integrals(molecule)?;
    info!(
        molecule = %molecule.name,
        solver = solver.name(),
        n_orbitals = ints.n_orbitals,
        n_electrons = ints.n_electrons,
        "loaded molecular integrals"
    );

    let space = ActiveSpace::new(
        ints.n_electrons,
        ints.n_orbitals,
        molecule.multiplicity,
        options.active_electrons,
        options.active_orbitals,
    )?;
    let hamiltonian = jordan_wigner(&ints.restrict(&space.core, &space.active)?);

    let reference = ActiveSpace::frozen_core(ints.n_orbitals, options.frozen);
    let reference_ints = ints.restrict(&reference.core, &reference.active)?;
    let ground = reference_ground_state(&reference_ints)?;
    let rdm = one_rdm(&ground, reference_ints.n_orbitals);

    let frozen = reference.core.len();
    let hf_occupations: Array1<f64> = std::iter::repeat_n(2.0, frozen)
        .chain(rdm.diagonal().iter().copied())
        .collect();
    let mut natural: Vec<f64> = std::iter::repeat_n(2.0, frozen)
        .chain(SymmetricEigen::new(rdm).eigenvalues.iter().copied())
        .collect();
    natural.sort_by(|a, b| b.total_cmp(a));

    info!(
        molecule = %molecule.name,
        num_qubits = space.num_qubits(),
        n_terms = hamiltonian.n_terms(),
        reference_energy = ground.energy,
        "built molecular Hamiltonian"
    );
    Ok(MolecularHamiltonian {
        hamiltonian,
        num_qubits: space.num_qubits(),
        reference_energy: ground.energy,
        hf_occupations,
        natural_occupations: Array1::from(natural),
    })
}

fn reference_ground_state(ints: &ElectronicIntegrals) -> ChemResult<SectorGroundState> {
    let n_qubits = 2 * ints.n_orbitals;
    if n_qubits > MAX_QUBITS {
        return Err(SimError::TooManyQubits(n_qubits).into());
    }
    let h = jordan_wigner(ints);
    debug!(n_qubits, particles = ints.n_electrons, "reference eigensolve");
    Ok(sector_ground_state(&h, n_qubits, ints.n_electrons)?)
}

/// Expectation of a qubit operator in a sector eigenvector.
fn sector_expectation(
    state: &SectorGroundState,
    position: &FxHashMap<usize, usize>,
    op: &QubitOperator,
) -> Complex64 {
    let mut total = Complex64::new(0.0, 0.0);
    for (pauli, coeff) in op {
        let masks = pauli.masks();
        let phase = masks.y_phase() * coeff;
        for (col, &basis_state) in state.basis.iter().enumerate() {
            if let Some(&row) = position.get(&(basis_state ^ masks.x_mask)) {
                total += state.amplitudes[row].conj()
                    * phase
                    * masks.sign(basis_state)
                    * state.amplitudes[col];
            }
        }
    }
    total
}

/// Spin-summed 1-RDM `γ_pq = Σ_σ ⟨a†_pσ a_qσ⟩`.
fn one_rdm(state: &SectorGroundState, n_orbitals: usize) -> DMatrix<f64> {
    let position: FxHashMap<usize, usize> = state
        .basis
        .iter()
        .enumerate()
        .map(|(k, &s)| (s, k))
        .collect();
    let mut rdm = DMatrix::zeros(n_orbitals, n_orbitals);
    for p in 0..n_orbitals {
        for q in p..n_orbitals {
            let mut value = 0.0;
            for spin in 0..2 {
                let op = ladder_product(&[
                    Ladder::create((2 * p + spin) as u32),
                    Ladder::annihilate((2 * q + spin) as u32),
                ]);
                value += sector_expectation(state, &position, &op).re;
            }
            rdm[(p, q)] = value;
            rdm[(q, p)] = value;
        }
    }
    rdm
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{BuiltinSolver, H2_BOND_LENGTH};
    use approx::assert_relative_eq;

    fn h2() -> Molecule {
        Molecule::new(
            "h2",
            ["H", "H"],
            vec![[0.0, 0.0, 0.0], [0.0, 0.0, H2_BOND_LENGTH]],
        )
    }

    #[test]
    fn test_h2_reference_energy() {
        let mol = molecular_hamiltonian(&h2(), &BuiltinSolver, &MolecularOptions::default()).unwrap();
        assert_eq!(mol.num_qubits, 4);
        assert_relative_eq!(mol.reference_energy, -1.137_269_84, epsilon = 1e-6);
    }

    #[test]
    fn test_h2_occupations() {
        let mol = molecular_hamiltonian(&h2(), &BuiltinSolver, &MolecularOptions::default()).unwrap();
        assert_relative_eq!(mol.hf_occupations.sum(), 2.0, epsilon = 1e-8);
        assert_relative_eq!(mol.natural_occupations.sum(), 2.0, epsilon = 1e-8);
        // Correlation moves a little weight into the antibonding orbital.
        assert!(mol.hf_occupations[0] > 1.9 && mol.hf_occupations[0] < 2.0);
        assert!(mol.natural_occupations[0] >= mol.natural_occupations[1]);
    }

    #[test]
    fn test_frozen_reference_is_closed_shell() {
        let opts = MolecularOptions::default().with_frozen(1);
        let mol = molecular_hamiltonian(&h2(), &BuiltinSolver, &opts).unwrap();
        // Both electrons frozen: the reference collapses to Hartree-Fock.
        assert_relative_eq!(mol.reference_energy, -1.116_684_39, epsilon = 1e-7);
        assert_eq!(mol.hf_occupations.to_vec(), vec![2.0, 0.0]);
        // The qubit Hamiltonian is unaffected by the reference choice.
        assert_eq!(mol.num_qubits, 4);
    }

    #[test]
    fn test_invalid_active_space() {
        let opts = MolecularOptions::active(3, 2);
        assert!(molecular_hamiltonian(&h2(), &BuiltinSolver, &opts).is_err());
    }
}
