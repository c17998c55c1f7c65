//! Analytic gradients of `⟨ψ(θ)|H|ψ(θ)⟩`.
//!
//! Every trainable gate is a Pauli rotation `exp(-i φ G / 2)` whose angle is
//! affine in the parameter vector, `φ = Σ_k c_k θ_k + b`. Gradients are taken
//! with respect to the gate angles and contracted with the Jacobian rows
//! `∂φ/∂θ_k = c_k`.

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use tracing::trace;

use qflow_ir::{Circuit, Generator};

use crate::error::{SimError, SimResult};
use crate::execution::{bind_angles, run_prefix};
use crate::hamiltonian::Hamiltonian;

/// How the gradient of an expectation value is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiffMethod {
    /// Two circuit evaluations per trainable gate, shifted by ±π/2.
    ParameterShift,
    /// One forward and one backward sweep over the statevector.
    #[default]
    Adjoint,
}

/// A rotation gate whose angle depends on trainable parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainableGate {
    /// Position of the instruction in the circuit.
    pub instruction: usize,
    /// Pauli generator of the rotation.
    pub generator: Generator,
    /// Wire the rotation acts on.
    pub qubit: usize,
    /// Non-zero `∂φ/∂θ_k` entries as `(k, c_k)`.
    pub jacobian: Vec<(usize, f64)>,
}

/// Collect the trainable rotation gates of a circuit in program order.
pub fn trainable_gates(circuit: &Circuit) -> SimResult<Vec<TrainableGate>> {
    let mut gates = Vec::new();
    for (idx, inst) in circuit.instructions().iter().enumerate() {
        let Some(gate) = inst.as_gate() else {
            continue;
        };
        let (Some(angle), Some(generator)) = (gate.angle(), gate.generator()) else {
            continue;
        };
        if !angle.is_trainable() {
            continue;
        }
        let affine = angle.affine().ok_or_else(|| SimError::NonLinearParameter {
            instruction: idx,
            angle: angle.to_string(),
        })?;
        gates.push(TrainableGate {
            instruction: idx,
            generator,
            qubit: inst.qubits[0].index(),
            jacobian: affine.coeffs,
        });
    }
    Ok(gates)
}

/// Gradient of `⟨H⟩` with respect to the flat parameter vector.
pub fn gradient(
    circuit: &Circuit,
    hamiltonian: &Hamiltonian,
    params: &[f64],
    method: DiffMethod,
) -> SimResult<Vec<f64>> {
    let gates = trainable_gates(circuit)?;
    let angles = bind_angles(circuit, params)?;
    let per_gate = match method {
        DiffMethod::ParameterShift => parameter_shift(circuit, hamiltonian, &angles, &gates)?,
        DiffMethod::Adjoint => adjoint(circuit, hamiltonian, &angles, &gates)?,
    };
    trace!(?method, n_gates = gates.len(), "gate-angle gradient evaluated");

    let mut grad = vec![0.0; params.len()];
    for (gate, d_angle) in gates.iter().zip(per_gate) {
        for &(k, c) in &gate.jacobian {
            grad[k] += c * d_angle;
        }
    }
    Ok(grad)
}

/// `∂E/∂φ_g = (E(φ_g + π/2) − E(φ_g − π/2)) / 2`.
fn parameter_shift(
    circuit: &Circuit,
    hamiltonian: &Hamiltonian,
    angles: &[f64],
    gates: &[TrainableGate],
) -> SimResult<Vec<f64>> {
    let mut shifted = angles.to_vec();
    let energy = |shifted: &[f64]| -> SimResult<f64> {
        run_prefix(circuit, shifted, circuit.len())?.expectation(hamiltonian)
    };
    gates
        .iter()
        .map(|gate| {
            let i = gate.instruction;
            shifted[i] = angles[i] + FRAC_PI_2;
            let plus = energy(&shifted)?;
            shifted[i] = angles[i] - FRAC_PI_2;
            let minus = energy(&shifted)?;
            shifted[i] = angles[i];
            Ok((plus - minus) / 2.0)
        })
        .collect()
}

/// Adjoint differentiation.
///
/// With `φ` the state after gate `g` and `λ` the back-propagated `H|ψ⟩`,
/// `∂E/∂φ_g = Im⟨λ|G_g|φ⟩`. Both states are un-computed gate by gate.
fn adjoint(
    circuit: &Circuit,
    hamiltonian: &Hamiltonian,
    angles: &[f64],
    gates: &[TrainableGate],
) -> SimResult<Vec<f64>> {
    let mut phi = run_prefix(circuit, angles, circuit.len())?;
    let mut lambda = phi.apply_hamiltonian(hamiltonian)?;
    let mut grads = vec![0.0; gates.len()];
    let mut pending = gates.iter().enumerate().rev().peekable();

    for (idx, inst) in circuit.instructions().iter().enumerate().rev() {
        if let Some((slot, gate)) = pending.next_if(|(_, g)| g.instruction == idx) {
            let mut g_phi = phi.clone();
            g_phi.apply_generator(gate.generator, gate.qubit);
            grads[slot] = lambda.inner(&g_phi)?.im;
        }
        if pending.peek().is_none() {
            break;
        }
        let undone = phi.apply_inverse(inst, angles[idx])?;
        if !undone {
            return Err(SimError::NonInvertible(idx));
        }
        lambda.apply_inverse(inst, angles[idx])?;
    }
    Ok(grads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hamiltonian::{HamiltonianTerm, PauliOp, PauliString};
    use approx::assert_relative_eq;
    use qflow_ir::{ParameterExpression, QubitId};

    fn p(k: usize) -> ParameterExpression {
        ParameterExpression::param(k)
    }

    fn hamiltonian() -> Hamiltonian {
        Hamiltonian::from_terms(vec![
            HamiltonianTerm::zz(0, 1, 0.7),
            HamiltonianTerm::x(1, -0.4),
            HamiltonianTerm::new(
                0.25,
                PauliString::from_ops([(0, PauliOp::Y), (1, PauliOp::X)]),
            ),
            HamiltonianTerm::constant(0.1),
        ])
    }

    fn circuit() -> Circuit {
        let mut c = Circuit::with_size("grad", 2);
        c.h(QubitId(0)).unwrap();
        c.rx(p(0), QubitId(0)).unwrap();
        c.ry(2.0 * p(1) + ParameterExpression::constant(0.3), QubitId(1))
            .unwrap();
        c.cx(QubitId(0), QubitId(1)).unwrap();
        c.rz(p(0) - p(2), QubitId(1)).unwrap();
        c.s(QubitId(0)).unwrap();
        c.ry(p(2), QubitId(0)).unwrap();
        c
    }

    fn finite_difference(c: &Circuit, h: &Hamiltonian, params: &[f64]) -> Vec<f64> {
        let eps = 1e-6;
        (0..params.len())
            .map(|k| {
                let mut plus = params.to_vec();
                let mut minus = params.to_vec();
                plus[k] += eps;
                minus[k] -= eps;
                let ep = run_prefix(c, &bind_angles(c, &plus).unwrap(), c.len())
                    .unwrap()
                    .expectation(h)
                    .unwrap();
                let em = run_prefix(c, &bind_angles(c, &minus).unwrap(), c.len())
                    .unwrap()
                    .expectation(h)
                    .unwrap();
                (ep - em) / (2.0 * eps)
            })
            .collect()
    }

    #[test]
    fn test_trainable_gates_jacobian() {
        let gates = trainable_gates(&circuit()).unwrap();
        assert_eq!(gates.len(), 4);
        assert_eq!(gates[1].jacobian, vec![(1, 2.0)]);
        assert_eq!(gates[2].jacobian, vec![(0, 1.0), (2, -1.0)]);
        assert_eq!(gates[2].generator, Generator::Z);
    }

    #[test]
    fn test_nonlinear_parameter_rejected() {
        let mut c = Circuit::with_size("nl", 1);
        c.rx(p(0) * p(0), QubitId(0)).unwrap();
        assert!(matches!(
            trainable_gates(&c),
            Err(SimError::NonLinearParameter { instruction: 0, .. })
        ));
    }

    #[test]
    fn test_methods_agree() {
        let params = [0.3, -0.8, 1.2];
        let h = hamiltonian();
        let shift = gradient(&circuit(), &h, &params, DiffMethod::ParameterShift).unwrap();
        let adj = gradient(&circuit(), &h, &params, DiffMethod::Adjoint).unwrap();
        for (a, b) in shift.iter().zip(&adj) {
            assert!((a - b).abs() < 1e-7, "{a} vs {b}");
        }
    }

    #[test]
    fn test_matches_finite_difference() {
        let params = [1.1, 0.2, -0.5];
        let h = hamiltonian();
        let grad = gradient(&circuit(), &h, &params, DiffMethod::Adjoint).unwrap();
        let fd = finite_difference(&circuit(), &h, &params);
        for (a, b) in grad.iter().zip(&fd) {
            assert_relative_eq!(*a, *b, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_single_rotation() {
        // d/dθ cos θ = −sin θ
        let mut c = Circuit::with_size("ry", 1);
        c.ry(p(0), QubitId(0)).unwrap();
        let h = Hamiltonian::from_terms(vec![HamiltonianTerm::z(0, 1.0)]);
        let g = gradient(&c, &h, &[0.6], DiffMethod::Adjoint).unwrap();
        assert_relative_eq!(g[0], -(0.6_f64).sin(), epsilon = 1e-12);
    }

    #[test]
    fn test_diff_method_serde_names() {
        let m: DiffMethod = serde_json::from_str("\"parameter-shift\"").unwrap();
        assert_eq!(m, DiffMethod::ParameterShift);
        assert_eq!(DiffMethod::default(), DiffMethod::Adjoint);
    }
}
