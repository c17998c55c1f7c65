//! Jordan-Wigner mapping of the second-quantized electronic Hamiltonian.
//!
//! Spin orbitals are interleaved: spatial orbital `p` maps to qubit `2p`
//! (spin up) and `2p + 1` (spin down).

use num_complex::Complex64;
use qflow_sim::hamiltonian::{Hamiltonian, HamiltonianTerm, PauliOp, PauliString};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::integrals::ElectronicIntegrals;

/// Coefficients below this magnitude are dropped from the qubit operator.
pub const DROP_TOLERANCE: f64 = 1e-10;

/// Imaginary parts above this magnitude are reported before being discarded.
const IMAG_TOLERANCE: f64 = 1e-8;

/// A linear combination of Pauli strings with complex coefficients.
pub type QubitOperator = FxHashMap<PauliString, Complex64>;

/// A fermionic ladder operator: spin-orbital index and whether it creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ladder {
    /// Spin-orbital (qubit) index.
    pub mode: u32,
    /// `true` for `a†`, `false` for `a`.
    pub dagger: bool,
}

impl Ladder {
    /// `a†_mode`.
    pub fn create(mode: u32) -> Self {
        Self { mode, dagger: true }
    }

    /// `a_mode`.
    pub fn annihilate(mode: u32) -> Self {
        Self { mode, dagger: false }
    }

    /// `½ (X ∓ iY) Z_{<mode}` as two weighted Pauli strings.
    fn to_paulis(self) -> [(Complex64, PauliString); 2] {
        let string = |op| {
            PauliString::from_ops((0..self.mode).map(|k| (k, PauliOp::Z)).chain([(self.mode, op)]))
        };
        let y = if self.dagger { -0.5 } else { 0.5 };
        [
            (Complex64::new(0.5, 0.0), string(PauliOp::X)),
            (Complex64::new(0.0, y), string(PauliOp::Y)),
        ]
    }
}

/// Expand a product of ladder operators, leftmost first, into Pauli strings.
pub fn ladder_product(ops: &[Ladder]) -> QubitOperator {
    let mut acc: Vec<(Complex64, PauliString)> =
        vec![(Complex64::new(1.0, 0.0), PauliString::identity())];
    for op in ops {
        let factors = op.to_paulis();
        acc = acc
            .iter()
            .flat_map(|(c1, s1)| {
                factors.iter().map(move |(c2, s2)| {
                    let (phase, s) = s1.multiply(s2);
                    (c1 * c2 * phase, s)
                })
            })
            .collect();
    }
    let mut out = QubitOperator::default();
    for (c, s) in acc {
        *out.entry(s).or_default() += c;
    }
    out
}

fn accumulate(target: &mut QubitOperator, source: QubitOperator, weight: f64) {
    for (s, c) in source {
        *target.entry(s).or_default() += c * weight;
    }
}

/// Map the electronic Hamiltonian
///
///   H = E_core + Σ h_pq a†_pσ a_qσ + ½ Σ (pq|rs) a†_pσ a†_rτ a_sτ a_qσ
///
/// onto qubits. Terms are ordered by weight, then lexicographically.
pub fn jordan_wigner(ints: &ElectronicIntegrals) -> Hamiltonian {
    let n = ints.n_orbitals;
    let mode = |orbital: usize, spin: usize| (2 * orbital + spin) as u32;
    let mut op = QubitOperator::default();
    op.insert(PauliString::identity(), Complex64::new(ints.core_energy, 0.0));

    for p in 0..n {
        for q in 0..n {
            let h = ints.one_body[[p, q]];
            if h == 0.0 {
                continue;
            }
            for spin in 0..2 {
                let product =
                    ladder_product(&[Ladder::create(mode(p, spin)), Ladder::annihilate(mode(q, spin))]);
                accumulate(&mut op, product, h);
            }
        }
    }

    for ((p, q, r, s), &v) in ints.two_body.indexed_iter() {
        if v == 0.0 {
            continue;
        }
        for sigma in 0..2 {
            for tau in 0..2 {
                let (a, b, c, d) = (mode(p, sigma), mode(r, tau), mode(s, tau), mode(q, sigma));
                if a == b || c == d {
                    continue;
                }
                let product = ladder_product(&[
                    Ladder::create(a),
                    Ladder::create(b),
                    Ladder::annihilate(c),
                    Ladder::annihilate(d),
                ]);
                accumulate(&mut op, product, 0.5 * v);
            }
        }
    }

    let hamiltonian = to_hamiltonian(op);
    debug!(
        n_qubits = 2 * n,
        n_terms = hamiltonian.n_terms(),
        "Jordan-Wigner mapping complete"
    );
    hamiltonian
}

/// Drop negligible terms and keep the real part of the rest.
pub fn to_hamiltonian(op: QubitOperator) -> Hamiltonian {
    let mut terms: Vec<(PauliString, Complex64)> = op
        .into_iter()
        .filter(|(_, c)| c.norm() >= DROP_TOLERANCE)
        .collect();
    terms.sort_by(|(a, _), (b, _)| a.ops().len().cmp(&b.ops().len()).then_with(|| a.cmp(b)));
    terms
        .into_iter()
        .map(|(pauli, c)| {
            if c.im.abs() > IMAG_TOLERANCE {
                warn!(term = %pauli, imag = c.im, "discarding imaginary coefficient");
            }
            HamiltonianTerm::new(c.re, pauli)
        })
        .filter(|t| t.coeff.abs() >= DROP_TOLERANCE)
        .collect()
}
