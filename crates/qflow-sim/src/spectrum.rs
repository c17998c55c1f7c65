//! Exact spectra of Pauli Hamiltonians.
//!
//! Matrices are dense and indexed like the statevector: row `i` is the basis
//! state whose bit `q` is the value of wire `q`.

use nalgebra::{DMatrix, SymmetricEigen};
use num_complex::Complex64;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::hamiltonian::Hamiltonian;

/// Largest register a dense matrix is built for.
pub const MAX_DENSE_QUBITS: usize = 14;

fn check_width(hamiltonian: &Hamiltonian, n_qubits: usize) -> SimResult<()> {
    let needed = hamiltonian.num_qubits();
    if needed as usize > n_qubits {
        return Err(SimError::QubitOutOfRange {
            qubit: needed - 1,
            n_qubits: n_qubits as u32,
        });
    }
    if n_qubits > MAX_DENSE_QUBITS {
        return Err(SimError::MatrixTooLarge {
            n_qubits,
            max: MAX_DENSE_QUBITS,
        });
    }
    Ok(())
}

/// Dense Hermitian matrix of `hamiltonian` on `n_qubits` wires.
pub fn hamiltonian_matrix(hamiltonian: &Hamiltonian, n_qubits: usize) -> SimResult<DMatrix<Complex64>> {
    check_width(hamiltonian, n_qubits)?;
    let dim = 1_usize << n_qubits;
    let mut m = DMatrix::<Complex64>::zeros(dim, dim);
    for term in hamiltonian.terms() {
        let masks = term.pauli.masks();
        let phase = masks.y_phase() * term.coeff;
        for col in 0..dim {
            m[(col ^ masks.x_mask, col)] += phase * masks.sign(col);
        }
    }
    Ok(m)
}

/// All eigenvalues of `hamiltonian`, sorted ascending.
///
/// Hamiltonians made only of I and Z are read off the diagonal directly.
pub fn eigenvalues(hamiltonian: &Hamiltonian) -> SimResult<Vec<f64>> {
    let n_qubits = hamiltonian.num_qubits() as usize;
    let mut values = if hamiltonian.is_diagonal() {
        diagonal(hamiltonian, n_qubits)
    } else {
        let m = hamiltonian_matrix(hamiltonian, n_qubits)?;
        debug!(dim = m.nrows(), n_terms = hamiltonian.n_terms(), "dense Hermitian eigensolve");
        SymmetricEigen::new(m).eigenvalues.iter().copied().collect()
    };
    values.sort_by(f64::total_cmp);
    Ok(values)
}

/// Lowest eigenvalue of `hamiltonian`.
pub fn ground_energy(hamiltonian: &Hamiltonian) -> SimResult<f64> {
    eigenvalues(hamiltonian)?
        .first()
        .copied()
        .ok_or(SimError::EmptyHamiltonian)
}

fn diagonal(hamiltonian: &Hamiltonian, n_qubits: usize) -> Vec<f64> {
    let dim = 1_usize << n_qubits;
    let mut diag = vec![0.0; dim];
    for term in hamiltonian.terms() {
        let masks = term.pauli.masks();
        for (i, d) in diag.iter_mut().enumerate() {
            *d += term.coeff * masks.sign(i);
        }
    }
    diag
}

/// Basis states of `n_qubits` wires with exactly `particles` bits set, ascending.
pub fn sector_basis(n_qubits: usize, particles: usize) -> SimResult<Vec<usize>> {
    if particles > n_qubits {
        return Err(SimError::EmptySector {
            particles,
            n_qubits,
        });
    }
    Ok((0_usize..1 << n_qubits)
        .filter(|i| i.count_ones() as usize == particles)
        .collect())
}

/// Matrix of `hamiltonian` restricted to a particle-number sector.
///
/// Amplitude leaving the sector is dropped, which is exact for Hamiltonians
/// that conserve particle number.
pub fn sector_matrix(
    hamiltonian: &Hamiltonian,
    n_qubits: usize,
    particles: usize,
) -> SimResult<(Vec<usize>, DMatrix<Complex64>)> {
    let needed = hamiltonian.num_qubits();
    if needed as usize > n_qubits {
        return Err(SimError::QubitOutOfRange {
            qubit: needed - 1,
            n_qubits: n_qubits as u32,
        });
    }
    let basis = sector_basis(n_qubits, particles)?;
    let position: FxHashMap<usize, usize> =
        basis.iter().enumerate().map(|(k, &state)| (state, k)).collect();

    let dim = basis.len();
    let mut m = DMatrix::<Complex64>::zeros(dim, dim);
    for term in hamiltonian.terms() {
        let masks = term.pauli.masks();
        let phase = masks.y_phase() * term.coeff;
        for (col, &state) in basis.iter().enumerate() {
            if let Some(&row) = position.get(&(state ^ masks.x_mask)) {
                m[(row, col)] += phase * masks.sign(state);
            }
        }
    }
    Ok((basis, m))
}

/// Ground state within a particle-number sector.
#[derive(Debug, Clone)]
pub struct SectorGroundState {
    /// Lowest eigenvalue in the sector.
    pub energy: f64,
    /// Basis states spanning the sector.
    pub basis: Vec<usize>,
    /// Eigenvector amplitudes, aligned with `basis`.
    pub amplitudes: Vec<Complex64>,
}

/// Diagonalize `hamiltonian` in the sector with `particles` set bits.
pub fn sector_ground_state(
    hamiltonian: &Hamiltonian,
    n_qubits: usize,
    particles: usize,
) -> SimResult<SectorGroundState> {
    let (basis, m) = sector_matrix(hamiltonian, n_qubits, particles)?;
    debug!(n_qubits, particles, dim = basis.len(), "sector eigensolve");
    let eig = SymmetricEigen::new(m);
    let (k, &energy) = eig
        .eigenvalues
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .ok_or(SimError::EmptySector {
            particles,
            n_qubits,
        })?;
    Ok(SectorGroundState {
        energy,
        basis,
        amplitudes: eig.eigenvectors.column(k).iter().copied().collect(),
    })
}
