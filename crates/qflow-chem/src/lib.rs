//! `qflow-chem` — molecular qubit Hamiltonians.
//!
//! Integrals come from an [`ElectronicStructureSolver`]: FCIDUMP files
//! written by an external Hartree-Fock code, or the built-in H2 table. They
//! are restricted to an [`ActiveSpace`], mapped to qubits with
//! [`jordan_wigner`], and accompanied by an exact frozen-core reference
//! energy and orbital occupations.
//!
//! ```rust
//! use qflow_chem::{molecular_hamiltonian, BuiltinSolver, Molecule, MolecularOptions};
//!
//! let h2 = Molecule::new("h2", ["H", "H"], vec![[0.0, 0.0, 0.0], [0.0, 0.0, 0.7414]]);
//! let mol = molecular_hamiltonian(&h2, &BuiltinSolver, &MolecularOptions::default()).unwrap();
//! assert_eq!(mol.num_qubits, 4);
//! assert!((mol.reference_energy + 1.1372698).abs() < 1e-6);
//! ```

pub mod active;
pub mod error;
pub mod fcidump;
pub mod integrals;
pub mod mapping;
pub mod molecular;
pub mod molecule;
pub mod solver;

pub use active::ActiveSpace;
pub use error::{ChemError, ChemResult};
pub use integrals::ElectronicIntegrals;
pub use mapping::jordan_wigner;
pub use molecular::{MolecularHamiltonian, MolecularOptions, molecular_hamiltonian};
pub use molecule::Molecule;
pub use solver::{BuiltinSolver, ElectronicStructureSolver, FcidumpSolver};
