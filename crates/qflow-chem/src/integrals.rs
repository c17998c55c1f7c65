//! Molecular-orbital integrals.
//!
//! Two-electron integrals use chemist notation, `(pq|rs) = ∫∫ φp(1)φq(1) r₁₂⁻¹
//! φr(2)φs(2)`, with real orbitals and therefore 8-fold permutational symmetry.

use ndarray::{Array2, Array4};
use serde::{Deserialize, Serialize};

use crate::error::{ChemError, ChemResult};

/// One- and two-electron integrals over spatial molecular orbitals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectronicIntegrals {
    /// Number of spatial orbitals.
    pub n_orbitals: usize,
    /// Number of electrons.
    pub n_electrons: usize,
    /// `2·S_z` of the reference state.
    pub ms2: i32,
    /// Constant energy: nuclear repulsion plus any frozen-core contribution.
    pub core_energy: f64,
    /// `h[p, q]`.
    pub one_body: Array2<f64>,
    /// `(pq|rs)` stored at `[p, q, r, s]`.
    pub two_body: Array4<f64>,
}

impl ElectronicIntegrals {
    /// All-zero integrals for `n_orbitals` orbitals.
    pub fn zeros(n_orbitals: usize, n_electrons: usize) -> Self {
        Self {
            n_orbitals,
            n_electrons,
            ms2: 0,
            core_energy: 0.0,
            one_body: Array2::zeros((n_orbitals, n_orbitals)),
            two_body: Array4::zeros((n_orbitals, n_orbitals, n_orbitals, n_orbitals)),
        }
    }

    /// Set `h[p, q]` and `h[q, p]`.
    pub fn set_one_body(&mut self, p: usize, q: usize, value: f64) {
        self.one_body[[p, q]] = value;
        self.one_body[[q, p]] = value;
    }

    /// Set `(pq|rs)` and its seven symmetry images.
    pub fn set_two_body(&mut self, p: usize, q: usize, r: usize, s: usize, value: f64) {
        for [a, b, c, d] in [
            [p, q, r, s],
            [q, p, r, s],
            [p, q, s, r],
            [q, p, s, r],
            [r, s, p, q],
            [s, r, p, q],
            [r, s, q, p],
            [s, r, q, p],
        ] {
            self.two_body[[a, b, c, d]] = value;
        }
    }

    /// Energy of the closed-shell determinant occupying the lowest
    /// `n_electrons / 2` orbitals.
    pub fn closed_shell_energy(&self) -> f64 {
        let occ = self.n_electrons / 2;
        let mut e = self.core_energy;
        for i in 0..occ {
            e += 2.0 * self.one_body[[i, i]];
            for j in 0..occ {
                e += 2.0 * self.two_body[[i, i, j, j]] - self.two_body[[i, j, j, i]];
            }
        }
        e
    }

    /// Fold the `core` orbitals into an effective Hamiltonian over `active`.
    ///
    /// Each core orbital is doubly occupied:
    ///
    ///   E'  = E + Σ_c 2 h_cc + Σ_cd (2 (cc|dd) − (cd|dc))
    ///   h'_pq = h_pq + Σ_c (2 (pq|cc) − (pc|cq))
    pub fn restrict(&self, core: &[usize], active: &[usize]) -> ChemResult<Self> {
        if let Some(&bad) = core.iter().chain(active).find(|&&o| o >= self.n_orbitals) {
            return Err(ChemError::InvalidActiveSpace(format!(
                "orbital {bad} out of range for {} orbitals",
                self.n_orbitals
            )));
        }
        if 2 * core.len() > self.n_electrons {
            return Err(ChemError::InvalidActiveSpace(format!(
                "{} core orbitals hold more than {} electrons",
                core.len(),
                self.n_electrons
            )));
        }
        let (h, eri) = (&self.one_body, &self.two_body);

        let mut core_energy = self.core_energy;
        for &c in core {
            core_energy += 2.0 * h[[c, c]];
            for &d in core {
                core_energy += 2.0 * eri[[c, c, d, d]] - eri[[c, d, d, c]];
            }
        }

        let n = active.len();
        let mut one_body = Array2::zeros((n, n));
        for (i, &p) in active.iter().enumerate() {
            for (j, &q) in active.iter().enumerate() {
                let mut v = h[[p, q]];
                for &c in core {
                    v += 2.0 * eri[[p, q, c, c]] - eri[[p, c, c, q]];
                }
                one_body[[i, j]] = v;
            }
        }

        let mut two_body = Array4::zeros((n, n, n, n));
        for (i, &p) in active.iter().enumerate() {
            for (j, &q) in active.iter().enumerate() {
                for (k, &r) in active.iter().enumerate() {
                    for (l, &s) in active.iter().enumerate() {
                        two_body[[i, j, k, l]] = eri[[p, q, r, s]];
                    }
                }
            }
        }

        Ok(Self {
            n_orbitals: n,
            n_electrons: self.n_electrons - 2 * core.len(),
            ms2: self.ms2,
            core_energy,
            one_body,
            two_body,
        })
    }
}

/// STO-3G integrals of H2 at 0.7414 Å in the RHF molecular-orbital basis.
pub fn h2_sto3g() -> ElectronicIntegrals {
    let mut ints = ElectronicIntegrals::zeros(2, 2);
    ints.core_energy = 0.713_753_993_6;
    ints.set_one_body(0, 0, -1.252_463_573_5);
    ints.set_one_body(1, 1, -0.475_948_715_2);
    ints.set_two_body(0, 0, 0, 0, 0.674_488_766_3);
    ints.set_two_body(1, 1, 1, 1, 0.697_397_949_4);
    ints.set_two_body(0, 0, 1, 1, 0.663_634_047_8);
    ints.set_two_body(0, 1, 0, 1, 0.181_287_535_8);
    ints
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_symmetry_images() {
        let ints = h2_sto3g();
        assert_eq!(ints.two_body[[1, 0, 1, 0]], 0.181_287_535_8);
        assert_eq!(ints.two_body[[1, 0, 0, 1]], 0.181_287_535_8);
        assert_eq!(ints.two_body[[1, 1, 0, 0]], 0.663_634_047_8);
        assert_eq!(ints.two_body[[0, 1, 1, 0]], 0.181_287_535_8);
    }

    #[test]
    fn test_hartree_fock_energy() {
        assert_relative_eq!(h2_sto3g().closed_shell_energy(), -1.116_684_39, epsilon = 1e-7);
    }

    #[test]
    fn test_freezing_core_preserves_closed_shell_energy() {
        let ints = h2_sto3g();
        let frozen = ints.restrict(&[0], &[1]).unwrap();
        assert_eq!(frozen.n_electrons, 0);
        assert_eq!(frozen.n_orbitals, 1);
        // With no active electrons the determinant energy is the core energy.
        assert_relative_eq!(frozen.core_energy, ints.closed_shell_energy(), epsilon = 1e-12);
        // h'_11 = h_11 + 2(11|00) − (10|01)
        assert_relative_eq!(
            frozen.one_body[[0, 0]],
            -0.475_948_715_2 + 2.0 * 0.663_634_047_8 - 0.181_287_535_8,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_restrict_rejects_bad_orbitals() {
        let ints = h2_sto3g();
        assert!(matches!(
            ints.restrict(&[], &[0, 2]),
            Err(ChemError::InvalidActiveSpace(_))
        ));
        assert!(ints.restrict(&[0, 1], &[]).is_err());
    }
}
