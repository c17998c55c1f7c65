//! Cost functions the optimizers minimize.

use nalgebra::DMatrix;
use qflow_ir::Circuit;
use qflow_sim::execution::expectation;
use qflow_sim::gradient::{DiffMethod, gradient};
use qflow_sim::hamiltonian::Hamiltonian;
use qflow_sim::metric::{MetricApprox, metric_tensor};

use crate::error::{QflowError, QflowResult};
use crate::templates::Ansatz;

/// A differentiable scalar function of a flat parameter vector whose
/// geometry is described by a metric tensor.
pub trait Objective: Send + Sync {
    fn num_params(&self) -> usize;

    fn cost(&self, params: &[f64]) -> QflowResult<f64>;

    fn gradient(&self, params: &[f64]) -> QflowResult<Vec<f64>>;

    fn metric_tensor(&self, params: &[f64], approx: MetricApprox) -> QflowResult<DMatrix<f64>>;
}

/// `⟨ψ(θ)|H|ψ(θ)⟩` for a fixed circuit and Hamiltonian.
#[derive(Debug, Clone)]
pub struct ExpvalCost {
    circuit: Circuit,
    hamiltonian: Hamiltonian,
    num_params: usize,
    diff_method: DiffMethod,
}

impl ExpvalCost {
    /// Build the ansatz circuit and pair it with `hamiltonian`, which must fit
    /// on the ansatz register.
    pub fn new(ansatz: &dyn Ansatz, hamiltonian: Hamiltonian) -> QflowResult<Self> {
        let circuit = ansatz.circuit()?;
        let mut cost = Self::from_circuit(circuit, hamiltonian)?;
        cost.num_params = cost.num_params.max(ansatz.num_params());
        Ok(cost)
    }

    pub fn from_circuit(circuit: Circuit, hamiltonian: Hamiltonian) -> QflowResult<Self> {
        let width = circuit.num_qubits();
        if hamiltonian.num_qubits() as usize > width {
            return Err(QflowError::InvalidArgument(format!(
                "Hamiltonian acts on {} qubits, circuit has {width}",
                hamiltonian.num_qubits()
            )));
        }
        Ok(Self {
            num_params: circuit.num_parameters(),
            circuit,
            hamiltonian,
            diff_method: DiffMethod::default(),
        })
    }

    pub fn with_diff_method(mut self, diff_method: DiffMethod) -> Self {
        self.diff_method = diff_method;
        self
    }

    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    pub fn hamiltonian(&self) -> &Hamiltonian {
        &self.hamiltonian
    }

    pub fn diff_method(&self) -> DiffMethod {
        self.diff_method
    }

    fn check(&self, params: &[f64]) -> QflowResult<()> {
        if params.len() != self.num_params {
            return Err(QflowError::ParameterCount {
                expected: self.num_params,
                got: params.len(),
            });
        }
        Ok(())
    }
}

impl Objective for ExpvalCost {
    fn num_params(&self) -> usize {
        self.num_params
    }

    fn cost(&self, params: &[f64]) -> QflowResult<f64> {
        self.check(params)?;
        Ok(expectation(&self.circuit, &self.hamiltonian, params)?)
    }

    fn gradient(&self, params: &[f64]) -> QflowResult<Vec<f64>> {
        self.check(params)?;
        Ok(gradient(
            &self.circuit,
            &self.hamiltonian,
            params,
            self.diff_method,
        )?)
    }

    fn metric_tensor(&self, params: &[f64], approx: MetricApprox) -> QflowResult<DMatrix<f64>> {
        self.check(params)?;
        Ok(metric_tensor(&self.circuit, params, approx)?)
    }
}
