//! Molecular geometry.

use serde::{Deserialize, Serialize};

use crate::error::{ChemError, ChemResult};

/// Element symbols H through Ne, indexed by nuclear charge minus one.
const ELEMENTS: [&str; 10] = ["H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne"];

/// Nuclear charge of an element symbol (case-insensitive).
pub fn atomic_number(symbol: &str) -> ChemResult<u32> {
    ELEMENTS
        .iter()
        .position(|e| e.eq_ignore_ascii_case(symbol))
        .map(|i| i as u32 + 1)
        .ok_or_else(|| ChemError::UnknownElement(symbol.to_string()))
}

/// A molecule: atoms, Cartesian coordinates in ångström, charge and spin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Molecule {
    /// Identifier, also the stem of its FCIDUMP file.
    pub name: String,
    /// Element symbols.
    pub symbols: Vec<String>,
    /// One `[x, y, z]` per atom, in ångström.
    pub coordinates: Vec<[f64; 3]>,
    /// Net charge.
    #[serde(default)]
    pub charge: i32,
    /// Spin multiplicity `2S + 1`.
    #[serde(default = "default_multiplicity")]
    pub multiplicity: u32,
    /// Basis set label.
    #[serde(default = "default_basis")]
    pub basis: String,
}

fn default_multiplicity() -> u32 {
    1
}

fn default_basis() -> String {
    "sto-3g".to_string()
}

impl Molecule {
    /// Neutral singlet in the STO-3G basis.
    pub fn new(
        name: impl Into<String>,
        symbols: impl IntoIterator<Item = impl Into<String>>,
        coordinates: Vec<[f64; 3]>,
    ) -> Self {
        Self {
            name: name.into(),
            symbols: symbols.into_iter().map(Into::into).collect(),
            coordinates,
            charge: 0,
            multiplicity: default_multiplicity(),
            basis: default_basis(),
        }
    }

    /// Set the basis set label.
    #[must_use]
    pub fn with_basis(mut self, basis: impl Into<String>) -> Self {
        self.basis = basis.into();
        self
    }

    /// Set charge and multiplicity.
    #[must_use]
    pub fn with_charge(mut self, charge: i32, multiplicity: u32) -> Self {
        self.charge = charge;
        self.multiplicity = multiplicity;
        self
    }

    /// Number of atoms.
    pub fn n_atoms(&self) -> usize {
        self.symbols.len()
    }

    /// Total electron count: nuclear charges minus the net charge.
    pub fn n_electrons(&self) -> ChemResult<usize> {
        let nuclear: i64 = self
            .symbols
            .iter()
            .map(|s| atomic_number(s).map(i64::from))
            .sum::<ChemResult<i64>>()?;
        usize::try_from(nuclear - i64::from(self.charge)).map_err(|_| {
            ChemError::InvalidMolecule(format!(
                "charge {} exceeds the nuclear charge {nuclear}",
                self.charge
            ))
        })
    }

    /// Distance between two atoms in ångström.
    pub fn distance(&self, a: usize, b: usize) -> f64 {
        let (p, q) = (self.coordinates[a], self.coordinates[b]);
        ((p[0] - q[0]).powi(2) + (p[1] - q[1]).powi(2) + (p[2] - q[2]).powi(2)).sqrt()
    }

    /// Check that the geometry and spin state are consistent.
    pub fn validate(&self) -> ChemResult<()> {
        if self.symbols.is_empty() {
            return Err(ChemError::InvalidMolecule("no atoms".into()));
        }
        if self.symbols.len() != self.coordinates.len() {
            return Err(ChemError::InvalidMolecule(format!(
                "{} symbols but {} coordinates",
                self.symbols.len(),
                self.coordinates.len()
            )));
        }
        if self.coordinates.iter().flatten().any(|c| !c.is_finite()) {
            return Err(ChemError::InvalidMolecule("non-finite coordinate".into()));
        }
        if self.multiplicity == 0 {
            return Err(ChemError::InvalidMolecule("multiplicity must be at least 1".into()));
        }
        let electrons = self.n_electrons()?;
        let unpaired = self.multiplicity as usize - 1;
        if unpaired > electrons || (electrons - unpaired) % 2 != 0 {
            return Err(ChemError::InvalidMolecule(format!(
                "{electrons} electrons cannot form multiplicity {}",
                self.multiplicity
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water() -> Molecule {
        Molecule::new(
            "h2o",
            ["O", "H", "H"],
            vec![[0.0, 0.0, 0.0], [0.8, 0.6, 0.0], [0.8, -0.6, 0.0]],
        )
    }

    #[test]
    fn test_electron_count() {
        assert_eq!(water().n_electrons().unwrap(), 10);
        assert_eq!(water().with_charge(1, 2).n_electrons().unwrap(), 9);
    }

    #[test]
    fn test_distance() {
        assert!((water().distance(0, 1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_validate() {
        water().validate().unwrap();
        assert!(matches!(
            water().with_charge(0, 2).validate(),
            Err(ChemError::InvalidMolecule(_))
        ));
        let mut bad = water();
        bad.coordinates.pop();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_unknown_element() {
        let m = Molecule::new("x", ["Xx"], vec![[0.0; 3]]);
        assert!(matches!(m.n_electrons(), Err(ChemError::UnknownElement(_))));
    }
}
