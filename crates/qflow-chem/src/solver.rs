//! Sources of molecular-orbital integrals.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ChemError, ChemResult};
use crate::fcidump;
use crate::integrals::{ElectronicIntegrals, h2_sto3g};
use crate::molecule::Molecule;

/// Bond length, in ångström, of the tabulated H2 integrals.
pub const H2_BOND_LENGTH: f64 = 0.7414;

/// Produces one- and two-electron integrals for a molecule.
pub trait ElectronicStructureSolver: Send + Sync {
    /// Solver name for logs and errors.
    fn name(&self) -> &str;

    /// Integrals over the molecular orbitals of `molecule`.
    fn integrals(&self, molecule: &Molecule) -> ChemResult<ElectronicIntegrals>;
}

/// Reads `<directory>/<molecule name>.fcidump`, as written by an external
/// Hartree-Fock code.
#[derive(Debug, Clone)]
pub struct FcidumpSolver {
    directory: PathBuf,
}

impl FcidumpSolver {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the integral file for `molecule`.
    pub fn path_for(&self, molecule: &Molecule) -> PathBuf {
        self.directory.join(format!("{}.fcidump", molecule.name))
    }
}

impl ElectronicStructureSolver for FcidumpSolver {
    fn name(&self) -> &str {
        "fcidump"
    }

    fn integrals(&self, molecule: &Molecule) -> ChemResult<ElectronicIntegrals> {
        let path = self.path_for(molecule);
        debug!(molecule = %molecule.name, path = %path.display(), "reading integrals");
        let ints = fcidump::read(&path)?;
        let expected = molecule.n_electrons()?;
        if ints.n_electrons != expected {
            return Err(ChemError::IntegralMismatch {
                molecule: molecule.name.clone(),
                n_orbitals: ints.n_orbitals,
                n_electrons: ints.n_electrons,
            });
        }
        Ok(ints)
    }
}

/// Tabulated integrals; currently H2 in STO-3G at its equilibrium bond length.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSolver;

impl ElectronicStructureSolver for BuiltinSolver {
    fn name(&self) -> &str {
        "builtin"
    }

    fn integrals(&self, molecule: &Molecule) -> ChemResult<ElectronicIntegrals> {
        let is_h2 = molecule.n_atoms() == 2
            && molecule.symbols.iter().all(|s| s.eq_ignore_ascii_case("H"))
            && molecule.charge == 0
            && molecule.multiplicity == 1
            && molecule.basis.eq_ignore_ascii_case("sto-3g")
            && (molecule.distance(0, 1) - H2_BOND_LENGTH).abs() < 1e-3;
        if !is_h2 {
            return Err(ChemError::Unsupported {
                solver: self.name().to_string(),
                molecule: molecule.name.clone(),
            });
        }
        Ok(h2_sto3g())
    }
}
