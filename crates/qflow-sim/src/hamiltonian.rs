//! Hamiltonian data structures.
//!
//! A Hamiltonian is a sum of weighted Pauli strings:
//!
//!   H = Σ_k  c_k · P_k
//!
//! where each P_k is a tensor product of single-qubit Pauli operators
//! (I, X, Y, Z) and c_k ∈ ℝ.
//!
//! # Example
//!
//! ```rust
//! use qflow_sim::hamiltonian::{Hamiltonian, HamiltonianTerm, PauliOp, PauliString};
//!
//! // H = -1.0·Z₀Z₁  +  0.5·X₀
//! let h = Hamiltonian::from_terms(vec![
//!     HamiltonianTerm::new(-1.0, PauliString::from_ops(vec![(0, PauliOp::Z), (1, PauliOp::Z)])),
//!     HamiltonianTerm::new( 0.5, PauliString::from_ops(vec![(0, PauliOp::X)])),
//! ]);
//! assert_eq!(h.n_terms(), 2);
//! assert_eq!(h.num_qubits(), 2);
//! ```

use num_complex::Complex64;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coefficients below this magnitude are dropped by [`Hamiltonian::simplify`].
pub const COEFF_TOLERANCE: f64 = 1e-12;

/// Single-qubit Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PauliOp {
    /// Identity.
    I,
    /// Pauli-X.
    X,
    /// Pauli-Y.
    Y,
    /// Pauli-Z.
    Z,
}

impl PauliOp {
    /// Product `self · other` as `(phase, op)`.
    pub fn multiply(self, other: PauliOp) -> (Complex64, PauliOp) {
        let one = Complex64::new(1.0, 0.0);
        let i = Complex64::new(0.0, 1.0);
        match (self, other) {
            (PauliOp::I, p) | (p, PauliOp::I) => (one, p),
            (a, b) if a == b => (one, PauliOp::I),
            (PauliOp::X, PauliOp::Y) => (i, PauliOp::Z),
            (PauliOp::Y, PauliOp::X) => (-i, PauliOp::Z),
            (PauliOp::Y, PauliOp::Z) => (i, PauliOp::X),
            (PauliOp::Z, PauliOp::Y) => (-i, PauliOp::X),
            (PauliOp::Z, PauliOp::X) => (i, PauliOp::Y),
            (PauliOp::X, PauliOp::Z) => (-i, PauliOp::Y),
            _ => unreachable!("all Pauli pairs are covered"),
        }
    }

    /// Single-letter label.
    pub fn label(self) -> char {
        match self {
            PauliOp::I => 'I',
            PauliOp::X => 'X',
            PauliOp::Y => 'Y',
            PauliOp::Z => 'Z',
        }
    }
}

/// A tensor product of Pauli operators on named qubits.
///
/// Stored as a sorted `Vec<(qubit_index, PauliOp)>` with Identity terms
/// omitted.  Qubits not listed are implicitly I.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PauliString {
    /// Non-identity terms, sorted by qubit index ascending.
    ops: Vec<(u32, PauliOp)>,
}

/// Bitmask form of a Pauli string, used by the statevector kernels.
///
/// `P|i⟩ = i^{n_y} · (-1)^{popcount(i & z_mask)} · |i ⊕ x_mask⟩`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauliMasks {
    /// Qubits carrying X or Y.
    pub x_mask: usize,
    /// Qubits carrying Y or Z.
    pub z_mask: usize,
    /// Number of Y factors.
    pub n_y: u32,
}

impl PauliMasks {
    /// The global phase `i^{n_y}`.
    pub fn y_phase(&self) -> Complex64 {
        match self.n_y % 4 {
            0 => Complex64::new(1.0, 0.0),
            1 => Complex64::new(0.0, 1.0),
            2 => Complex64::new(-1.0, 0.0),
            _ => Complex64::new(0.0, -1.0),
        }
    }

    /// Sign `(-1)^{popcount(index & z_mask)}`.
    #[inline]
    pub fn sign(&self, index: usize) -> f64 {
        if (index & self.z_mask).count_ones() % 2 == 0 {
            1.0
        } else {
            -1.0
        }
    }
}

impl PauliString {
    /// Construct a PauliString from an iterator of (qubit, op) pairs.
    ///
    /// Identity operators are dropped; the remaining ops are sorted by qubit.
    /// Qubits must be distinct; use [`PauliString::multiply`] to combine
    /// operators acting on the same qubit.
    pub fn from_ops(ops: impl IntoIterator<Item = (u32, PauliOp)>) -> Self {
        let mut v: Vec<(u32, PauliOp)> = ops
            .into_iter()
            .filter(|(_, op)| *op != PauliOp::I)
            .collect();
        v.sort_by_key(|(q, _)| *q);
        debug_assert!(
            v.windows(2).all(|w| w[0].0 != w[1].0),
            "duplicate qubit in Pauli string"
        );
        Self { ops: v }
    }

    /// The identity string.
    pub fn identity() -> Self {
        Self { ops: vec![] }
    }

    /// A single Pauli operator on one qubit.
    pub fn single(qubit: u32, op: PauliOp) -> Self {
        Self::from_ops([(qubit, op)])
    }

    /// Construct a Z⊗Z⊗...⊗Z string spanning the given qubits.
    pub fn zz(qubits: impl IntoIterator<Item = u32>) -> Self {
        Self::from_ops(qubits.into_iter().map(|q| (q, PauliOp::Z)))
    }

    /// Return the non-identity (qubit, op) pairs, sorted by qubit index.
    pub fn ops(&self) -> &[(u32, PauliOp)] {
        &self.ops
    }

    /// True if there are no non-identity operators (pure global phase).
    pub fn is_identity(&self) -> bool {
        self.ops.is_empty()
    }

    /// True if every factor is I or Z.
    pub fn is_diagonal(&self) -> bool {
        self.ops.iter().all(|(_, op)| *op == PauliOp::Z)
    }

    /// The highest qubit index referenced, or `None` for an identity string.
    pub fn max_qubit(&self) -> Option<u32> {
        self.ops.last().map(|(q, _)| *q)
    }

    /// Product `self · other` as `(phase, string)`.
    pub fn multiply(&self, other: &PauliString) -> (Complex64, PauliString) {
        let mut phase = Complex64::new(1.0, 0.0);
        let mut ops = Vec::with_capacity(self.ops.len() + other.ops.len());
        let (mut i, mut j) = (0, 0);
        while i < self.ops.len() || j < other.ops.len() {
            match (self.ops.get(i), other.ops.get(j)) {
                (Some(&(qa, a)), Some(&(qb, b))) if qa == qb => {
                    let (p, op) = a.multiply(b);
                    phase *= p;
                    if op != PauliOp::I {
                        ops.push((qa, op));
                    }
                    i += 1;
                    j += 1;
                }
                (Some(&(qa, a)), Some(&(qb, _))) if qa < qb => {
                    ops.push((qa, a));
                    i += 1;
                }
                (Some(&(qa, a)), None) => {
                    ops.push((qa, a));
                    i += 1;
                }
                (_, Some(&(qb, b))) => {
                    ops.push((qb, b));
                    j += 1;
                }
                (None, None) => break,
            }
        }
        (phase, Self { ops })
    }

    /// Bitmask form for the statevector kernels.
    pub fn masks(&self) -> PauliMasks {
        let mut masks = PauliMasks {
            x_mask: 0,
            z_mask: 0,
            n_y: 0,
        };
        for &(q, op) in &self.ops {
            let bit = 1_usize << q;
            match op {
                PauliOp::X => masks.x_mask |= bit,
                PauliOp::Y => {
                    masks.x_mask |= bit;
                    masks.z_mask |= bit;
                    masks.n_y += 1;
                }
                PauliOp::Z => masks.z_mask |= bit,
                PauliOp::I => {}
            }
        }
        masks
    }
}

impl fmt::Display for PauliString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ops.is_empty() {
            return write!(f, "I");
        }
        for (i, (q, op)) in self.ops.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}{}", op.label(), q)?;
        }
        Ok(())
    }
}

/// A single weighted Pauli term: `coeff · pauli`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HamiltonianTerm {
    /// Real coefficient.
    pub coeff: f64,
    /// The Pauli string.
    pub pauli: PauliString,
}

impl HamiltonianTerm {
    /// Create a new term.
    pub fn new(coeff: f64, pauli: PauliString) -> Self {
        Self { coeff, pauli }
    }

    /// Shorthand: constant (identity) term.
    pub fn constant(coeff: f64) -> Self {
        Self::new(coeff, PauliString::identity())
    }

    /// Shorthand: single-qubit Z term.
    pub fn z(qubit: u32, coeff: f64) -> Self {
        Self::new(coeff, PauliString::single(qubit, PauliOp::Z))
    }

    /// Shorthand: ZZ coupling term.
    pub fn zz(q0: u32, q1: u32, coeff: f64) -> Self {
        Self::new(
            coeff,
            PauliString::from_ops([(q0, PauliOp::Z), (q1, PauliOp::Z)]),
        )
    }

    /// Shorthand: single-qubit X term.
    pub fn x(qubit: u32, coeff: f64) -> Self {
        Self::new(coeff, PauliString::single(qubit, PauliOp::X))
    }
}

impl fmt::Display for HamiltonianTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.coeff >= 0.0 {
            write!(f, "+{:.6} {}", self.coeff, self.pauli)
        } else {
            write!(f, "{:.6} {}", self.coeff, self.pauli)
        }
    }
}

/// A sum-of-Pauli-strings Hamiltonian.
///
/// H = Σ_k  c_k · P_k
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Hamiltonian {
    terms: Vec<HamiltonianTerm>,
}

impl Hamiltonian {
    /// Create from a list of terms.
    pub fn from_terms(terms: Vec<HamiltonianTerm>) -> Self {
        Self { terms }
    }

    /// All terms.
    pub fn terms(&self) -> &[HamiltonianTerm] {
        &self.terms
    }

    /// Number of terms.
    pub fn n_terms(&self) -> usize {
        self.terms.len()
    }

    /// True if there are no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Spectral norm upper bound: Σ |c_k|.
    pub fn lambda(&self) -> f64 {
        self.terms.iter().map(|t| t.coeff.abs()).sum()
    }

    /// Sum of the identity coefficients.
    pub fn constant(&self) -> f64 {
        self.terms
            .iter()
            .filter(|t| t.pauli.is_identity())
            .map(|t| t.coeff)
            .sum()
    }

    /// Sorted, de-duplicated qubits acted on by a non-identity operator.
    pub fn wires(&self) -> Vec<u32> {
        let mut wires: Vec<u32> = self
            .terms
            .iter()
            .flat_map(|t| t.pauli.ops().iter().map(|(q, _)| *q))
            .collect();
        wires.sort_unstable();
        wires.dedup();
        wires
    }

    /// The minimum number of qubits required to represent this Hamiltonian.
    ///
    /// Returns 0 if the Hamiltonian is empty or purely identity.
    pub fn num_qubits(&self) -> u32 {
        self.terms
            .iter()
            .filter_map(|t| t.pauli.max_qubit())
            .max()
            .map_or(0, |q| q + 1)
    }

    /// True if every term is diagonal in the computational basis.
    pub fn is_diagonal(&self) -> bool {
        self.terms.iter().all(|t| t.pauli.is_diagonal())
    }

    /// Merge terms with equal Pauli strings and drop negligible coefficients.
    ///
    /// The first occurrence of each string fixes its position.
    #[must_use]
    pub fn simplify(&self) -> Self {
        let mut index: FxHashMap<&PauliString, usize> = FxHashMap::default();
        let mut merged: Vec<HamiltonianTerm> = Vec::new();
        for term in &self.terms {
            match index.get(&term.pauli) {
                Some(&k) => merged[k].coeff += term.coeff,
                None => {
                    index.insert(&term.pauli, merged.len());
                    merged.push(term.clone());
                }
            }
        }
        merged.retain(|t| t.coeff.abs() > COEFF_TOLERANCE);
        Self { terms: merged }
    }

    /// Sum a collection of Hamiltonians.
    pub fn sum(parts: impl IntoIterator<Item = Hamiltonian>) -> Self {
        parts.into_iter().fold(Self::default(), |acc, h| acc + h)
    }
}

impl FromIterator<HamiltonianTerm> for Hamiltonian {
    fn from_iter<T: IntoIterator<Item = HamiltonianTerm>>(iter: T) -> Self {
        Self {
            terms: iter.into_iter().collect(),
        }
    }
}

impl std::ops::Add for Hamiltonian {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self::Output {
        self.terms.extend(rhs.terms);
        self
    }
}

impl std::ops::Mul<f64> for Hamiltonian {
    type Output = Self;

    fn mul(mut self, rhs: f64) -> Self::Output {
        for t in &mut self.terms {
            t.coeff *= rhs;
        }
        self
    }
}

impl fmt::Display for Hamiltonian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Hamiltonian ({} terms, {} qubits):",
            self.n_terms(),
            self.num_qubits()
        )?;
        for term in &self.terms {
            writeln!(f, "  {term}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_single_qubit_products() {
        assert_eq!(PauliOp::X.multiply(PauliOp::Y), (c(0.0, 1.0), PauliOp::Z));
        assert_eq!(PauliOp::Y.multiply(PauliOp::X), (c(0.0, -1.0), PauliOp::Z));
        assert_eq!(PauliOp::Z.multiply(PauliOp::Z), (c(1.0, 0.0), PauliOp::I));
        assert_eq!(PauliOp::I.multiply(PauliOp::Y), (c(1.0, 0.0), PauliOp::Y));
    }

    #[test]
    fn test_string_product() {
        // (X0 Z1) · (Y0 Z2) = (XY)0 Z1 Z2 = i Z0 Z1 Z2
        let a = PauliString::from_ops([(0, PauliOp::X), (1, PauliOp::Z)]);
        let b = PauliString::from_ops([(0, PauliOp::Y), (2, PauliOp::Z)]);
        let (phase, p) = a.multiply(&b);
        assert_eq!(phase, c(0.0, 1.0));
        assert_eq!(p, PauliString::zz([0, 1, 2]));
    }

    #[test]
    fn test_string_self_product_is_identity() {
        let a = PauliString::from_ops([(0, PauliOp::X), (3, PauliOp::Y)]);
        let (phase, p) = a.multiply(&a);
        assert_eq!(phase, c(1.0, 0.0));
        assert!(p.is_identity());
    }

    #[test]
    fn test_masks() {
        let p = PauliString::from_ops([(0, PauliOp::X), (1, PauliOp::Y), (2, PauliOp::Z)]);
        let m = p.masks();
        assert_eq!(m.x_mask, 0b011);
        assert_eq!(m.z_mask, 0b110);
        assert_eq!(m.n_y, 1);
        assert_eq!(m.y_phase(), c(0.0, 1.0));
    }

    #[test]
    fn test_display() {
        let h = Hamiltonian::from_terms(vec![
            HamiltonianTerm::zz(0, 1, 0.5),
            HamiltonianTerm::constant(-0.5),
        ]);
        assert_eq!(
            h.to_string(),
            "Hamiltonian (2 terms, 2 qubits):\n  +0.500000 Z0 Z1\n  -0.500000 I\n"
        );
    }

    #[test]
    fn test_simplify_merges_and_drops() {
        let h = Hamiltonian::from_terms(vec![
            HamiltonianTerm::zz(0, 1, -1.0),
            HamiltonianTerm::x(0, 0.3),
            HamiltonianTerm::zz(1, 0, -1.0),
            HamiltonianTerm::x(0, -0.3),
        ])
        .simplify();
        assert_eq!(h.n_terms(), 1);
        assert_eq!(h.terms()[0].coeff, -2.0);
    }

    #[test]
    fn test_wires_and_constant() {
        let h = Hamiltonian::from_terms(vec![
            HamiltonianTerm::zz(1, 3, 0.5),
            HamiltonianTerm::constant(-0.5),
            HamiltonianTerm::constant(-0.25),
        ]);
        assert_eq!(h.wires(), vec![1, 3]);
        assert_eq!(h.num_qubits(), 4);
        assert_eq!(h.constant(), -0.75);
        assert!(h.is_diagonal());
    }

    #[test]
    fn test_arithmetic() {
        let a = Hamiltonian::from_terms(vec![HamiltonianTerm::z(0, 1.0)]);
        let b = Hamiltonian::from_terms(vec![HamiltonianTerm::x(1, 2.0)]);
        let h = (a.clone() + b) * 0.5;
        assert_eq!(h.n_terms(), 2);
        assert_eq!(h.terms()[1].coeff, 1.0);
        assert!(!h.is_diagonal());
        assert_eq!(Hamiltonian::sum([a.clone(), a]).n_terms(), 2);
    }
}
