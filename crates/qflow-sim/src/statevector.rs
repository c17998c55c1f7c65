//! Statevector simulation engine.
//!
//! Amplitude index `i` addresses the basis state whose bit `q` is the value of
//! wire `q` (little-endian). Every gate kernel walks the index space with
//! bitmasks and updates amplitude pairs in place.

use num_complex::Complex64;
use std::f64::consts::FRAC_1_SQRT_2;

use qflow_ir::{Generator, Instruction, InstructionKind, StandardGate};

use crate::error::{SimError, SimResult};
use crate::hamiltonian::{Hamiltonian, PauliString};

/// Largest register the dense simulator accepts.
pub const MAX_QUBITS: usize = 24;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// A statevector representing a quantum state.
#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> SimResult<Self> {
        if num_qubits > MAX_QUBITS {
            return Err(SimError::TooManyQubits(num_qubits));
        }
        let mut amplitudes = vec![ZERO; 1 << num_qubits];
        amplitudes[0] = ONE;
        Ok(Self {
            amplitudes,
            num_qubits,
        })
    }

    /// Wrap an amplitude vector whose length is a power of two.
    pub fn from_amplitudes(amplitudes: Vec<Complex64>) -> SimResult<Self> {
        let dim = amplitudes.len();
        if !dim.is_power_of_two() {
            return Err(SimError::DimensionMismatch {
                expected: dim.next_power_of_two(),
                got: dim,
            });
        }
        let num_qubits = dim.trailing_zeros() as usize;
        if num_qubits > MAX_QUBITS {
            return Err(SimError::TooManyQubits(num_qubits));
        }
        Ok(Self {
            amplitudes,
            num_qubits,
        })
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Hilbert-space dimension `2^n`.
    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    /// The amplitudes.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Mutable access to the amplitudes.
    pub fn amplitudes_mut(&mut self) -> &mut [Complex64] {
        &mut self.amplitudes
    }

    /// Consume the statevector, returning its amplitudes.
    pub fn into_amplitudes(self) -> Vec<Complex64> {
        self.amplitudes
    }

    /// Apply an instruction whose rotation angle (if any) is already bound.
    ///
    /// `angle` is ignored for non-rotation gates.
    pub fn apply(&mut self, instruction: &Instruction, angle: f64) -> SimResult<()> {
        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let qubits = self.operands(instruction)?;
                self.apply_gate(gate, &qubits, angle);
            }
            InstructionKind::Initialize(amps) => {
                if amps.len() != self.amplitudes.len() {
                    return Err(SimError::DimensionMismatch {
                        expected: self.amplitudes.len(),
                        got: amps.len(),
                    });
                }
                self.amplitudes.copy_from_slice(amps);
            }
        }
        Ok(())
    }

    /// Apply the adjoint of a gate instruction.
    ///
    /// Returns `false` for state initialization, which has no inverse.
    pub fn apply_inverse(&mut self, instruction: &Instruction, angle: f64) -> SimResult<bool> {
        let InstructionKind::Gate(gate) = &instruction.kind else {
            return Ok(false);
        };
        let qubits = self.operands(instruction)?;
        match gate {
            StandardGate::S => self.apply_phase(qubits[0], -1.0),
            StandardGate::Sdg => self.apply_phase(qubits[0], 1.0),
            StandardGate::Rx(_) | StandardGate::Ry(_) | StandardGate::Rz(_) => {
                self.apply_gate(gate, &qubits, -angle);
            }
            _ => self.apply_gate(gate, &qubits, angle),
        }
        Ok(true)
    }

    fn operands(&self, instruction: &Instruction) -> SimResult<Vec<usize>> {
        instruction
            .qubits
            .iter()
            .map(|q| {
                let idx = q.index();
                if idx >= self.num_qubits {
                    Err(SimError::QubitOutOfRange {
                        qubit: q.0,
                        n_qubits: self.num_qubits as u32,
                    })
                } else {
                    Ok(idx)
                }
            })
            .collect()
    }

    /// Apply a standard gate with a bound rotation angle.
    pub fn apply_gate(&mut self, gate: &StandardGate, qubits: &[usize], angle: f64) {
        match gate {
            StandardGate::X => self.apply_x(qubits[0]),
            StandardGate::H => self.apply_h(qubits[0]),
            StandardGate::S => self.apply_phase(qubits[0], 1.0),
            StandardGate::Sdg => self.apply_phase(qubits[0], -1.0),
            StandardGate::Rx(_) => self.apply_rx(qubits[0], angle),
            StandardGate::Ry(_) => self.apply_ry(qubits[0], angle),
            StandardGate::Rz(_) => self.apply_rz(qubits[0], angle),
            StandardGate::CX => self.apply_cx(qubits[0], qubits[1]),
            StandardGate::CZ => self.apply_cz(qubits[0], qubits[1]),
        }
    }

    /// Apply the Pauli operator that generates a rotation.
    pub fn apply_generator(&mut self, generator: Generator, qubit: usize) {
        match generator {
            Generator::X => self.apply_x(qubit),
            Generator::Y => self.apply_y(qubit),
            Generator::Z => self.apply_z(qubit),
        }
    }

    // =========================================================================
    // Single-qubit gate implementations
    // =========================================================================

    fn apply_x(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                self.amplitudes.swap(i, i | mask);
            }
        }
    }

    fn apply_y(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        let i_val = Complex64::new(0.0, 1.0);
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let tmp = self.amplitudes[i];
                self.amplitudes[i] = -i_val * self.amplitudes[j];
                self.amplitudes[j] = i_val * tmp;
            }
        }
    }

    fn apply_z(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask != 0 {
                *amp = -*amp;
            }
        }
    }

    fn apply_h(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = FRAC_1_SQRT_2 * (a + b);
                self.amplitudes[j] = FRAC_1_SQRT_2 * (a - b);
            }
        }
    }

    /// Multiply the |1⟩ component by `±i` (S when `sign` is 1, S† when -1).
    fn apply_phase(&mut self, qubit: usize, sign: f64) {
        let mask = 1 << qubit;
        let phase = Complex64::new(0.0, sign);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask != 0 {
                *amp *= phase;
            }
        }
    }

    fn apply_rx(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let c = (theta / 2.0).cos();
        let neg_i_s = Complex64::new(0.0, -(theta / 2.0).sin());
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a + neg_i_s * b;
                self.amplitudes[j] = neg_i_s * a + c * b;
            }
        }
    }

    fn apply_ry(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a - s * b;
                self.amplitudes[j] = s * a + c * b;
            }
        }
    }

    fn apply_rz(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let phase_0 = Complex64::from_polar(1.0, -theta / 2.0);
        let phase_1 = Complex64::from_polar(1.0, theta / 2.0);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask == 0 {
                *amp *= phase_0;
            } else {
                *amp *= phase_1;
            }
        }
    }

    // =========================================================================
    // Two-qubit gate implementations
    // =========================================================================

    fn apply_cx(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                self.amplitudes.swap(i, i | tgt_mask);
            }
        }
    }

    fn apply_cz(&mut self, control: usize, target: usize) {
        let both = (1 << control) | (1 << target);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & both == both {
                *amp = -*amp;
            }
        }
    }

    // =========================================================================
    // Observables
    // =========================================================================

    fn check_observable(&self, max_qubit: Option<u32>) -> SimResult<()> {
        match max_qubit {
            Some(q) if q as usize >= self.num_qubits => Err(SimError::QubitOutOfRange {
                qubit: q,
                n_qubits: self.num_qubits as u32,
            }),
            _ => Ok(()),
        }
    }

    /// Return `P|ψ⟩` for a Pauli string `P`.
    pub fn apply_pauli_string(&self, pauli: &PauliString) -> SimResult<Statevector> {
        self.check_observable(pauli.max_qubit())?;
        let masks = pauli.masks();
        let phase = masks.y_phase();
        let mut out = vec![ZERO; self.amplitudes.len()];
        for (i, amp) in self.amplitudes.iter().enumerate() {
            out[i ^ masks.x_mask] = phase * masks.sign(i) * *amp;
        }
        Ok(Self {
            amplitudes: out,
            num_qubits: self.num_qubits,
        })
    }

    /// Return `H|ψ⟩`.
    pub fn apply_hamiltonian(&self, hamiltonian: &Hamiltonian) -> SimResult<Statevector> {
        self.check_observable(hamiltonian.num_qubits().checked_sub(1))?;
        let mut out = vec![ZERO; self.amplitudes.len()];
        for term in hamiltonian.terms() {
            let masks = term.pauli.masks();
            let phase = masks.y_phase() * term.coeff;
            for (i, amp) in self.amplitudes.iter().enumerate() {
                out[i ^ masks.x_mask] += phase * masks.sign(i) * *amp;
            }
        }
        Ok(Self {
            amplitudes: out,
            num_qubits: self.num_qubits,
        })
    }

    /// `⟨ψ|H|ψ⟩`, accumulated term by term without building `H|ψ⟩`.
    pub fn expectation(&self, hamiltonian: &Hamiltonian) -> SimResult<f64> {
        self.check_observable(hamiltonian.num_qubits().checked_sub(1))?;
        let mut total = 0.0;
        for term in hamiltonian.terms() {
            let masks = term.pauli.masks();
            let phase = masks.y_phase();
            let mut acc = ZERO;
            for (i, amp) in self.amplitudes.iter().enumerate() {
                acc += self.amplitudes[i ^ masks.x_mask].conj() * masks.sign(i) * *amp;
            }
            total += term.coeff * (phase * acc).re;
        }
        Ok(total)
    }

    /// `⟨self|other⟩`.
    pub fn inner(&self, other: &Statevector) -> SimResult<Complex64> {
        if self.amplitudes.len() != other.amplitudes.len() {
            return Err(SimError::DimensionMismatch {
                expected: self.amplitudes.len(),
                got: other.amplitudes.len(),
            });
        }
        Ok(self
            .amplitudes
            .iter()
            .zip(&other.amplitudes)
            .map(|(a, b)| a.conj() * b)
            .sum())
    }

    /// `⟨ψ|ψ⟩`.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(Complex64::norm_sqr).sum()
    }

    /// Get measurement probabilities.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex64::norm_sqr).collect()
    }

    /// Multiply every amplitude by `factor`.
    pub fn scale(&mut self, factor: Complex64) {
        for amp in &mut self.amplitudes {
            *amp *= factor;
        }
    }
}
