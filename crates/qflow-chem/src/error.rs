//! Error types for the chemistry crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while preparing molecular Hamiltonians.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChemError {
    /// Integral file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Malformed FCIDUMP content.
    #[error("FCIDUMP parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// A required FCIDUMP header field is absent.
    #[error("FCIDUMP header is missing {0}")]
    MissingField(&'static str),

    /// Element symbol not in the supported table.
    #[error("Unknown element symbol: {0}")]
    UnknownElement(String),

    /// Molecule definition is inconsistent.
    #[error("Invalid molecule: {0}")]
    InvalidMolecule(String),

    /// Active-space selection is inconsistent with the molecule.
    #[error("Invalid active space: {0}")]
    InvalidActiveSpace(String),

    /// Integrals do not describe the requested molecule.
    #[error("Integrals for {n_orbitals} orbitals and {n_electrons} electrons do not match {molecule}")]
    IntegralMismatch {
        /// Molecule name.
        molecule: String,
        /// Orbitals in the integral set.
        n_orbitals: usize,
        /// Electrons in the integral set.
        n_electrons: usize,
    },

    /// The solver has no integrals for this molecule.
    #[error("Solver '{solver}' cannot provide integrals for {molecule}")]
    Unsupported {
        /// Solver name.
        solver: String,
        /// Molecule description.
        molecule: String,
    },

    /// Simulation layer failure (spectrum, qubit range).
    #[error("Simulation error: {0}")]
    Sim(#[from] qflow_sim::SimError),
}

/// Result type for chemistry operations.
pub type ChemResult<T> = Result<T, ChemError>;
