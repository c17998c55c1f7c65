//! qflow circuit intermediate representation
//!
//! This crate provides the data structures the rest of qflow uses to describe
//! variational circuits: qubits, gates, parameter expressions and a
//! builder-style [`Circuit`].
//!
//! # Core Components
//!
//! - **Qubits**: [`QubitId`] addresses a wire of the register
//! - **Gates**: [`StandardGate`] for the gate set the simulator executes
//! - **Parameters**: [`ParameterExpression`] for angles that depend on the
//!   trainable parameter vector
//! - **Instructions**: [`Instruction`] combining gates with their operands
//! - **Circuit**: [`Circuit`] high-level builder API
//!
//! # Example: Parameterized Circuit
//!
//! ```rust
//! use qflow_ir::{Circuit, ParameterExpression, QubitId};
//! use std::f64::consts::PI;
//!
//! let mut circuit = Circuit::with_size("ansatz", 2);
//!
//! // θ0 drives the first rotation, the second rotation is fixed
//! circuit.ry(ParameterExpression::param(0), QubitId(0)).unwrap();
//! circuit.ry(PI / 4.0, QubitId(1)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//!
//! assert_eq!(circuit.num_parameters(), 1);
//! assert_eq!(circuit.depth(), 2);
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `H` | 1 | Hadamard gate |
//! | `X`, `Y`, `Z` | 1 | Pauli gates |
//! | `S`, `Sdg` | 1 | S and S-dagger gates |
//! | `Rx`, `Ry`, `Rz` | 1 | Rotation gates `exp(-iθG/2)` |
//! | `CX` | 2 | Controlled-NOT (CNOT) |
//! | `CZ` | 2 | Controlled-Z |
//! | `Swap` | 2 | SWAP gate |

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod parameter;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::{Generator, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use parameter::{Affine, ParameterExpression};
pub use qubit::QubitId;
