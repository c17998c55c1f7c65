//! `qflow-sim` — Pauli Hamiltonians and exact statevector evaluation.
//!
//! Everything the variational layer needs from a simulator:
//!
//! - **Hamiltonians**: weighted sums of Pauli strings with arithmetic and
//!   simplification ([`hamiltonian`])
//! - **Synthesis**: `exp(-i·c·t·P)` and first-order Trotter products appended
//!   to a [`qflow_ir::Circuit`] ([`synthesis`])
//! - **Execution**: little-endian statevector simulation and expectation
//!   values ([`statevector`], [`execution`])
//! - **Differentiation**: parameter-shift and adjoint gradients
//!   ([`gradient`]) and the Fubini-Study metric tensor ([`metric`])
//! - **Spectra**: dense and particle-number restricted diagonalization
//!   ([`spectrum`])
//!
//! # Quick start
//!
//! ```rust
//! use qflow_ir::{Circuit, ParameterExpression, QubitId};
//! use qflow_sim::gradient::{gradient, DiffMethod};
//! use qflow_sim::hamiltonian::{Hamiltonian, HamiltonianTerm};
//! use qflow_sim::execution::expectation;
//!
//! let mut circuit = Circuit::with_size("ry", 1);
//! circuit.ry(ParameterExpression::param(0), QubitId(0)).unwrap();
//! let h = Hamiltonian::from_terms(vec![HamiltonianTerm::z(0, 1.0)]);
//!
//! let energy = expectation(&circuit, &h, &[0.5]).unwrap();
//! let grad = gradient(&circuit, &h, &[0.5], DiffMethod::Adjoint).unwrap();
//! assert!((energy - 0.5_f64.cos()).abs() < 1e-12);
//! assert!((grad[0] + 0.5_f64.sin()).abs() < 1e-12);
//! ```

pub mod error;
pub mod execution;
pub mod gradient;
pub mod hamiltonian;
pub mod linalg;
pub mod metric;
pub mod spectrum;
pub mod statevector;
pub mod synthesis;

pub use error::{SimError, SimResult};
pub use gradient::DiffMethod;
pub use hamiltonian::{Hamiltonian, HamiltonianTerm, PauliOp, PauliString};
pub use metric::MetricApprox;
pub use statevector::Statevector;
