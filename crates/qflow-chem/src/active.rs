//! Active-space selection.

use crate::error::{ChemError, ChemResult};

/// Partition of the molecular orbitals into doubly occupied core and active sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSpace {
    /// Frozen, doubly occupied orbitals.
    pub core: Vec<usize>,
    /// Orbitals mapped onto qubits.
    pub active: Vec<usize>,
}

impl ActiveSpace {
    /// Choose core and active orbitals.
    ///
    /// Without `active_electrons` no orbital is frozen. Without
    /// `active_orbitals` every non-core orbital is active.
    pub fn new(
        n_electrons: usize,
        n_orbitals: usize,
        multiplicity: u32,
        active_electrons: Option<usize>,
        active_orbitals: Option<usize>,
    ) -> ChemResult<Self> {
        let invalid = |msg: String| Err(ChemError::InvalidActiveSpace(msg));

        let ncore = match active_electrons {
            None => 0,
            Some(0) => return invalid("the number of active electrons must be positive".into()),
            Some(ae) if ae > n_electrons => {
                return invalid(format!(
                    "{ae} active electrons exceed the {n_electrons} electrons of the molecule"
                ));
            }
            Some(ae) if (n_electrons - ae) % 2 != 0 => {
                return invalid(format!(
                    "{ae} active electrons leave an odd number of core electrons"
                ));
            }
            Some(ae) => (n_electrons - ae) / 2,
        };

        let unpaired = multiplicity.saturating_sub(1) as usize;
        let active = match active_orbitals {
            None => (ncore..n_orbitals).collect(),
            Some(0) => return invalid("the number of active orbitals must be positive".into()),
            Some(ao) if ncore + ao > n_orbitals => {
                return invalid(format!(
                    "{ncore} core plus {ao} active orbitals exceed the {n_orbitals} available"
                ));
            }
            Some(ao) if unpaired > ao => {
                return invalid(format!(
                    "{ao} active orbitals cannot hold {unpaired} unpaired electrons"
                ));
            }
            Some(ao) if 2 * (ncore + ao) < n_electrons + unpaired => {
                return invalid(format!(
                    "{ao} active orbitals cannot hold the remaining electrons"
                ));
            }
            Some(ao) => (ncore..ncore + ao).collect(),
        };

        Ok(Self {
            core: (0..ncore).collect(),
            active,
        })
    }

    /// Freeze the lowest `frozen` orbitals and keep the rest active.
    pub fn frozen_core(n_orbitals: usize, frozen: usize) -> Self {
        Self {
            core: (0..frozen.min(n_orbitals)).collect(),
            active: (frozen.min(n_orbitals)..n_orbitals).collect(),
        }
    }

    /// Number of qubits: two spin orbitals per active orbital.
    pub fn num_qubits(&self) -> usize {
        2 * self.active.len()
    }
}
