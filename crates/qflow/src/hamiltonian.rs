//! Problem Hamiltonians: spin models, Max-Cut and small molecules.

use qflow_chem::{
    ElectronicStructureSolver, MolecularHamiltonian, MolecularOptions, Molecule,
    molecular_hamiltonian,
};
use qflow_sim::hamiltonian::{Hamiltonian, HamiltonianTerm, PauliOp, PauliString};
use qflow_sim::spectrum;
use tracing::info;

use crate::error::{QflowError, QflowResult};
use crate::graph::{Graph, edge_list, grid_2d};

/// Transverse-field Ising chain with periodic boundaries,
/// `H = −Σ Z_i Z_{i+1} − field · Σ X_i`.
///
/// A single spin couples to itself, contributing the constant `−1`.
pub fn transverse_field_ising(n_spins: usize, field: f64) -> QflowResult<Hamiltonian> {
    if n_spins == 0 {
        return Err(QflowError::InvalidSpinCount(n_spins));
    }
    if field < 0.0 {
        return Err(QflowError::NegativeField(field));
    }
    let n = n_spins as u32;
    let couplings = (0..n).map(|i| {
        let (_, pauli) = PauliString::single(i, PauliOp::Z)
            .multiply(&PauliString::single((i + 1) % n, PauliOp::Z));
        HamiltonianTerm::new(-1.0, pauli)
    });
    let transverse = (0..n).map(|i| HamiltonianTerm::x(i, -field));
    Ok(couplings.chain(transverse).collect())
}

/// Heisenberg model on an `n × n` square lattice, `H = Σ_⟨ij⟩ X_iX_j + Y_iY_j + Z_iZ_j`.
pub fn heisenberg(n: usize) -> QflowResult<Hamiltonian> {
    if n == 0 {
        return Err(QflowError::InvalidSpinCount(n));
    }
    Ok(edge_list(&grid_2d(n, n))
        .into_iter()
        .flat_map(|(u, v)| {
            [PauliOp::X, PauliOp::Y, PauliOp::Z]
                .map(|op| HamiltonianTerm::new(1.0, PauliString::from_ops([(u, op), (v, op)])))
        })
        .collect())
}

/// Max-Cut cost `H = Σ_(u,v) ½ (Z_u Z_v − 1)`; its ground energy is minus the
/// maximum cut size.
pub fn maxcut(graph: &Graph) -> QflowResult<Hamiltonian> {
    let edges = edge_list(graph);
    if edges.is_empty() {
        return Err(QflowError::EmptyGraph);
    }
    let zz = edges.iter().map(|&(u, v)| HamiltonianTerm::zz(u, v, 0.5));
    let constant = HamiltonianTerm::constant(-0.5 * edges.len() as f64);
    Ok(zz.chain([constant]).collect())
}

/// Eigenvalues of `h`, ascending.
pub fn eigenvalues(h: &Hamiltonian) -> QflowResult<Vec<f64>> {
    Ok(spectrum::eigenvalues(h)?)
}

/// Smallest and largest eigenvalue of `h`.
pub fn min_max_eigenvalue(h: &Hamiltonian) -> QflowResult<(f64, f64)> {
    let values = eigenvalues(h)?;
    match (values.first(), values.last()) {
        (Some(&lo), Some(&hi)) => Ok((lo, hi)),
        _ => Err(qflow_sim::SimError::EmptyHamiltonian.into()),
    }
}

fn build(
    molecule: Molecule,
    solver: &dyn ElectronicStructureSolver,
    options: MolecularOptions,
) -> QflowResult<MolecularHamiltonian> {
    let mol = molecular_hamiltonian(&molecule, solver, &options)?;
    info!(
        molecule = %molecule.name,
        num_qubits = mol.num_qubits,
        min_energy = mol.reference_energy,
        "molecular problem ready"
    );
    Ok(mol)
}

/// Planar `[x, ±y]` offsets for a bond of `distance` opening `angle` degrees.
fn half_angle_offsets(distance: f64, angle: f64) -> (f64, f64) {
    let half = angle.to_radians() / 2.0;
    (distance * half.cos(), distance * half.sin())
}

/// H2 along z with all orbitals active.
pub fn h2(distance: f64, solver: &dyn ElectronicStructureSolver) -> QflowResult<MolecularHamiltonian> {
    let molecule = Molecule::new("h2", ["H", "H"], vec![[0.0, 0.0, 0.0], [0.0, 0.0, distance]]);
    build(molecule, solver, MolecularOptions::active(2, 2))
}

/// Planar H4 rhombus, 4 electrons in 4 orbitals.
pub fn h4(
    distance: f64,
    angle: f64,
    solver: &dyn ElectronicStructureSolver,
) -> QflowResult<MolecularHamiltonian> {
    let (x, y) = half_angle_offsets(distance, angle);
    let molecule = Molecule::new(
        "h4",
        ["H", "H", "H", "H"],
        vec![[x, y, 0.0], [x, -y, 0.0], [-x, -y, 0.0], [-x, y, 0.0]],
    );
    build(molecule, solver, MolecularOptions::active(4, 4))
}

/// LiH along z, 2 electrons in 5 orbitals over a frozen 1s core.
pub fn lih(distance: f64, solver: &dyn ElectronicStructureSolver) -> QflowResult<MolecularHamiltonian> {
    let molecule = Molecule::new("lih", ["Li", "H"], vec![[0.0, 0.0, 0.0], [0.0, 0.0, distance]]);
    build(molecule, solver, MolecularOptions::active(2, 5).with_frozen(1))
}

/// Water in the xy plane with O at the origin, 8 electrons in 6 orbitals.
pub fn h2o(
    distance: f64,
    angle: f64,
    solver: &dyn ElectronicStructureSolver,
) -> QflowResult<MolecularHamiltonian> {
    let (x, y) = half_angle_offsets(distance, angle);
    let molecule = Molecule::new(
        "h2o",
        ["O", "H", "H"],
        vec![[0.0, 0.0, 0.0], [x, y, 0.0], [x, -y, 0.0]],
    );
    build(molecule, solver, MolecularOptions::active(8, 6).with_frozen(1))
}
