use std::fmt;

use num_complex::Complex64;
use qflow_ir::{Circuit, QubitId};

use crate::error::{QflowError, QflowResult};

/// Prepares a fixed state on a fresh register.
pub trait InitialState: fmt::Debug + Send + Sync {
    fn num_qubits(&self) -> usize;

    /// Append the preparation to `circuit`, which must be empty for
    /// amplitude-encoded states.
    fn apply(&self, circuit: &mut Circuit) -> QflowResult<()>;
}

/// `|+⟩^⊗n` via a Hadamard on every wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plus {
    num_qubits: usize,
}

impl Plus {
    pub fn new(num_qubits: usize) -> Self {
        Self { num_qubits }
    }
}

impl InitialState for Plus {
    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn apply(&self, circuit: &mut Circuit) -> QflowResult<()> {
        for q in 0..self.num_qubits {
            circuit.h(QubitId::from(q))?;
        }
        Ok(())
    }
}

/// Equal superposition of every basis state with `hamming_weight` ones.
#[derive(Debug, Clone, PartialEq)]
pub struct DickeState {
    num_qubits: usize,
    hamming_weight: usize,
    amplitudes: Vec<Complex64>,
}

impl DickeState {
    pub fn new(num_qubits: usize, hamming_weight: usize) -> QflowResult<Self> {
        if hamming_weight > num_qubits {
            return Err(QflowError::InvalidArgument(format!(
                "Hamming weight {hamming_weight} exceeds {num_qubits} qubits"
            )));
        }
        if num_qubits > qflow_sim::statevector::MAX_QUBITS {
            return Err(qflow_sim::SimError::TooManyQubits(num_qubits).into());
        }
        let dim = 1_usize << num_qubits;
        let support: Vec<usize> = (0..dim)
            .filter(|i| i.count_ones() as usize == hamming_weight)
            .collect();
        let amp = Complex64::new(1.0 / (support.len() as f64).sqrt(), 0.0);
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); dim];
        for i in support {
            amplitudes[i] = amp;
        }
        Ok(Self {
            num_qubits,
            hamming_weight,
            amplitudes,
        })
    }

    pub fn hamming_weight(&self) -> usize {
        self.hamming_weight
    }

    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }
}

impl InitialState for DickeState {
    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn apply(&self, circuit: &mut Circuit) -> QflowResult<()> {
        circuit.initialize(self.amplitudes.clone())?;
        Ok(())
    }
}

/// A computational basis state, e.g. a Hartree-Fock occupation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasisState {
    bits: Vec<u8>,
}

impl BasisState {
    pub fn new(bits: Vec<u8>) -> QflowResult<Self> {
        if let Some(bad) = bits.iter().find(|&&b| b > 1) {
            return Err(QflowError::InvalidArgument(format!(
                "basis state entries must be 0 or 1, found {bad}"
            )));
        }
        Ok(Self { bits })
    }

    /// The first `n_electrons` of `num_qubits` spin orbitals occupied.
    pub fn hartree_fock(n_electrons: usize, num_qubits: usize) -> QflowResult<Self> {
        if n_electrons > num_qubits {
            return Err(QflowError::InvalidArgument(format!(
                "{n_electrons} electrons do not fit in {num_qubits} spin orbitals"
            )));
        }
        Self::new((0..num_qubits).map(|q| u8::from(q < n_electrons)).collect())
    }

    pub fn bits(&self) -> &[u8] {
        &self.bits
    }
}

impl InitialState for BasisState {
    fn num_qubits(&self) -> usize {
        self.bits.len()
    }

    fn apply(&self, circuit: &mut Circuit) -> QflowResult<()> {
        circuit.basis_state(&self.bits)?;
        Ok(())
    }
}
