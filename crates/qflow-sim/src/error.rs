//! Error types for the sim crate.

use thiserror::Error;

/// Errors produced by Hamiltonian construction, simulation and differentiation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// Hamiltonian contains no terms.
    #[error("Hamiltonian is empty: no terms")]
    EmptyHamiltonian,

    /// A Pauli string references a qubit index that is out of range.
    #[error("Pauli string references qubit {qubit} but the register only has {n_qubits} qubits")]
    QubitOutOfRange {
        /// The offending qubit index.
        qubit: u32,
        /// Number of qubits in the register.
        n_qubits: u32,
    },

    /// Register too large for dense simulation.
    #[error("{0} qubits exceed the dense simulation limit of {max} qubits", max = crate::statevector::MAX_QUBITS)]
    TooManyQubits(usize),

    /// Register too large for a dense matrix.
    #[error("{n_qubits} qubits exceed the dense matrix limit of {max} qubits")]
    MatrixTooLarge {
        /// Requested register width.
        n_qubits: usize,
        /// Largest supported width.
        max: usize,
    },

    /// Statevector dimensions disagree.
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        got: usize,
    },

    /// A rotation angle is not affine in the trainable parameters.
    #[error("Angle '{angle}' of instruction {instruction} is not affine in the parameters")]
    NonLinearParameter {
        /// Position of the instruction in the circuit.
        instruction: usize,
        /// The offending angle expression.
        angle: String,
    },

    /// An initialization that is not the first instruction cannot be undone.
    #[error("Instruction {0} cannot be inverted")]
    NonInvertible(usize),

    /// Parameter vector has the wrong length.
    #[error("Circuit expects {expected} parameters, got {got}")]
    ParameterCountMismatch {
        /// Parameters the circuit references.
        expected: usize,
        /// Parameters supplied.
        got: usize,
    },

    /// n_steps must be ≥ 1.
    #[error("n_steps must be at least 1, got {0}")]
    InvalidSteps(usize),

    /// Particle-number sector is empty or out of range.
    #[error("No basis states with {particles} particles on {n_qubits} qubits")]
    EmptySector {
        /// Requested particle number.
        particles: usize,
        /// Register width.
        n_qubits: usize,
    },

    /// A dense linear-algebra routine failed.
    #[error("Linear algebra failure: {0}")]
    LinearAlgebra(String),

    /// Circuit builder returned an error.
    #[error("Circuit IR error: {0}")]
    Ir(#[from] qflow_ir::IrError),
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;
