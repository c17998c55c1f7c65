//! `qflow` — variational quantum algorithms with quantum natural gradients.
//!
//! This crate assembles VQE and QAOA problems on top of the exact simulator in
//! [`qflow_sim`] and optimizes them:
//!
//! - **Problems**: spin models, Max-Cut and small molecules
//!   ([`hamiltonian`], [`graph`]), plus QAOA mixers ([`mixers`])
//! - **Ansätze**: molecular entanglers, QAOA and barren-plateau circuits
//!   ([`templates`])
//! - **Optimization**: an expectation-value [`objective`] driven by the
//!   [`optimizer`]s, headed by the least-squares natural gradient
//!   [`Qng2Optimizer`]
//! - **Examples**: ready-made problem instances ([`examples`]) and
//!   file/environment run configuration ([`config`])
//!
//! # Quick start
//!
//! ```rust
//! use qflow::Ansatz;
//! use qflow::examples::maxcut_qaoa_example;
//! use qflow::optimizer::{Qng2Optimizer, minimize};
//!
//! let example = maxcut_qaoa_example(1, 4, 0).unwrap();
//! let objective = example.objective().unwrap();
//! let params = example.circuit.init(Some(0));
//!
//! let mut optimizer = Qng2Optimizer::default();
//! let result = minimize(&mut optimizer, &objective, params, 10).unwrap();
//! assert!(result.final_cost() >= example.min_energy - 1e-9);
//! ```

pub mod config;
pub mod error;
pub mod examples;
pub mod graph;
pub mod hamiltonian;
pub mod mixers;
pub mod objective;
pub mod optimizer;
pub mod templates;
pub mod utils;

pub use config::RunConfig;
pub use error::{QflowError, QflowResult};
pub use examples::Example;
pub use objective::{ExpvalCost, Objective};
pub use optimizer::{
    AdamOptimizer, GradientDescentOptimizer, OptimizationResult, Optimizer, Qng2Optimizer,
    QngOptimizer, minimize,
};
pub use templates::{Ansatz, InitialState};
