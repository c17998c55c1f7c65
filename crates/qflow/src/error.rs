//! Error types for the variational layer.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while building problems, ansätze and optimizers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QflowError {
    /// A spin model needs at least one spin.
    #[error("Number of spins must be positive, got {0}")]
    InvalidSpinCount(usize),

    /// Transverse field strengths are non-negative.
    #[error("Transverse field strength must be non-negative, got {0}")]
    NegativeField(f64),

    /// Max-Cut needs at least one edge.
    #[error("Graph has no edges")]
    EmptyGraph,

    /// Flat parameter vector has the wrong length.
    #[error("Expected {expected} parameters, got {got}")]
    ParameterCount {
        /// Length the ansatz requires.
        expected: usize,
        /// Length supplied.
        got: usize,
    },

    /// QAOA mixer and cost Hamiltonian act on different wires.
    #[error("Mixer acts on wires {mixer:?} but the cost Hamiltonian on {cost:?}")]
    WireMismatch {
        /// Wires of the mixer Hamiltonian.
        mixer: Vec<u32>,
        /// Wires of the cost Hamiltonian.
        cost: Vec<u32>,
    },

    /// Any other out-of-range argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Run configuration is malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Circuit construction failed.
    #[error("Circuit error: {0}")]
    Ir(#[from] qflow_ir::IrError),

    /// Simulation or differentiation failed.
    #[error("Simulation error: {0}")]
    Sim(#[from] qflow_sim::SimError),

    /// Molecular Hamiltonian construction failed.
    #[error("Chemistry error: {0}")]
    Chem(#[from] qflow_chem::ChemError),
}

/// Result type for qflow operations.
pub type QflowResult<T> = Result<T, QflowError>;
