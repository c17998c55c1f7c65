//! Fubini-Study metric tensor of a parameterized circuit.
//!
//! For every trainable rotation `g` the derivative state is
//!
//!   |∂g ψ⟩ = U_{>g} · (−i/2 · G_g) · U_{≤g} |0⟩
//!
//! and the gate-level tensor is
//!
//!   G[g, h] = Re(⟨∂g ψ|∂h ψ⟩ − ⟨∂g ψ|ψ⟩⟨ψ|∂h ψ⟩).
//!
//! The parameter-space metric is `F = Jᵀ G J` with `J[g, k] = ∂φ_g/∂θ_k`.

use nalgebra::DMatrix;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::debug;

use qflow_ir::Circuit;

use crate::error::SimResult;
use crate::execution::bind_angles;
use crate::gradient::{TrainableGate, trainable_gates};
use crate::statevector::Statevector;

/// Which blocks of the metric tensor are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetricApprox {
    /// Every pair of trainable gates.
    Full,
    /// Pairs of gates in the same parametrized layer.
    #[default]
    BlockDiag,
    /// Only the diagonal.
    Diag,
}

impl MetricApprox {
    fn keeps(self, layers: &[usize], g: usize, h: usize) -> bool {
        match self {
            MetricApprox::Full => true,
            MetricApprox::BlockDiag => layers[g] == layers[h],
            MetricApprox::Diag => g == h,
        }
    }
}

/// Layer index of every trainable gate, in program order.
///
/// Trainable gates are grouped greedily: a gate joins the current layer
/// unless its causal past contains a gate of that layer, in which case it
/// opens the next one. Gates sharing a layer therefore act on disjoint wires
/// and do not depend on each other.
pub fn parametrized_layers(circuit: &Circuit) -> Vec<usize> {
    // Whether the causal past of each wire touches the current layer.
    let mut touches_current = vec![false; circuit.num_qubits()];
    let mut current = 1_usize;
    let mut layers = Vec::new();
    for inst in circuit.instructions() {
        let depends = inst.qubits.iter().any(|q| touches_current[q.index()]);
        if inst.is_parameterized() {
            if depends {
                current += 1;
                touches_current.iter_mut().for_each(|t| *t = false);
            }
            layers.push(current);
            for q in &inst.qubits {
                touches_current[q.index()] = true;
            }
        } else {
            for q in &inst.qubits {
                touches_current[q.index()] = depends;
            }
        }
    }
    layers
}

/// Metric tensor with respect to the flat parameter vector.
pub fn metric_tensor(
    circuit: &Circuit,
    params: &[f64],
    approx: MetricApprox,
) -> SimResult<DMatrix<f64>> {
    let gates = trainable_gates(circuit)?;
    let layers = parametrized_layers(circuit);
    let angles = bind_angles(circuit, params)?;
    let (psi, derivs) = derivative_states(circuit, &angles, &gates)?;

    let n = gates.len();
    // ⟨∂g ψ|ψ⟩
    let overlaps: Vec<Complex64> = derivs
        .iter()
        .map(|d| d.inner(&psi))
        .collect::<SimResult<_>>()?;
    let mut gate_metric = DMatrix::<f64>::zeros(n, n);
    for g in 0..n {
        for h in g..n {
            if !approx.keeps(&layers, g, h) {
                continue;
            }
            let value = (derivs[g].inner(&derivs[h])? - overlaps[g] * overlaps[h].conj()).re;
            gate_metric[(g, h)] = value;
            gate_metric[(h, g)] = value;
        }
    }

    let mut jacobian = DMatrix::<f64>::zeros(n, params.len());
    for (g, gate) in gates.iter().enumerate() {
        for &(k, c) in &gate.jacobian {
            jacobian[(g, k)] = c;
        }
    }
    debug!(
        ?approx,
        n_gates = n,
        n_params = params.len(),
        n_layers = layers.iter().max().copied().unwrap_or(0),
        "metric tensor evaluated"
    );
    Ok(jacobian.transpose() * gate_metric * jacobian)
}

/// Final state and the derivative state of every trainable gate.
///
/// Runs a single forward sweep, branching a derivative state off at each
/// trainable gate and carrying all branches through the rest of the circuit.
fn derivative_states(
    circuit: &Circuit,
    angles: &[f64],
    gates: &[TrainableGate],
) -> SimResult<(Statevector, Vec<Statevector>)> {
    let mut psi = Statevector::new(circuit.num_qubits())?;
    let mut derivs: Vec<Statevector> = Vec::with_capacity(gates.len());
    let mut next = gates.iter().peekable();
    let minus_half_i = Complex64::new(0.0, -0.5);

    for (idx, inst) in circuit.instructions().iter().enumerate() {
        psi.apply(inst, angles[idx])?;
        for d in &mut derivs {
            d.apply(inst, angles[idx])?;
        }
        if let Some(gate) = next.next_if(|g| g.instruction == idx) {
            let mut d = psi.clone();
            d.apply_generator(gate.generator, gate.qubit);
            d.scale(minus_half_i);
            derivs.push(d);
        }
    }
    Ok((psi, derivs))
}
