//! Circuit execution against a flat parameter vector.

use qflow_ir::Circuit;

use crate::error::{SimError, SimResult};
use crate::hamiltonian::Hamiltonian;
use crate::statevector::Statevector;

/// Resolve the rotation angle of every instruction.
///
/// Entry `i` is the angle of instruction `i`, or `0.0` for instructions that
/// carry no angle.
pub fn bind_angles(circuit: &Circuit, params: &[f64]) -> SimResult<Vec<f64>> {
    let expected = circuit.num_parameters();
    if params.len() != expected {
        return Err(SimError::ParameterCountMismatch {
            expected,
            got: params.len(),
        });
    }
    circuit
        .instructions()
        .iter()
        .map(|inst| match inst.as_gate().and_then(|g| g.angle()) {
            Some(angle) => Ok(angle.eval(params)?),
            None => Ok(0.0),
        })
        .collect()
}

/// Apply the circuit prefix `instructions[..end]` to |0…0⟩.
pub(crate) fn run_prefix(circuit: &Circuit, angles: &[f64], end: usize) -> SimResult<Statevector> {
    let mut sv = Statevector::new(circuit.num_qubits())?;
    for (inst, &angle) in circuit.instructions()[..end].iter().zip(angles) {
        sv.apply(inst, angle)?;
    }
    Ok(sv)
}

/// Simulate the circuit from |0…0⟩.
pub fn run(circuit: &Circuit, params: &[f64]) -> SimResult<Statevector> {
    let angles = bind_angles(circuit, params)?;
    run_prefix(circuit, &angles, circuit.len())
}

/// `⟨ψ(params)|H|ψ(params)⟩`.
pub fn expectation(circuit: &Circuit, hamiltonian: &Hamiltonian, params: &[f64]) -> SimResult<f64> {
    run(circuit, params)?.expectation(hamiltonian)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hamiltonian::HamiltonianTerm;
    use approx::assert_relative_eq;
    use qflow_ir::{ParameterExpression, QubitId};

    fn single_ry() -> Circuit {
        let mut c = Circuit::with_size("ry", 1);
        c.ry(ParameterExpression::param(0), QubitId(0)).unwrap();
        c
    }

    #[test]
    fn test_bind_angles() {
        let mut c = Circuit::with_size("c", 2);
        c.h(QubitId(0)).unwrap();
        c.rz(2.0 * ParameterExpression::param(1), QubitId(1)).unwrap();
        c.rx(ParameterExpression::param(0) + ParameterExpression::pi(), QubitId(0))
            .unwrap();
        let angles = bind_angles(&c, &[0.5, 0.25]).unwrap();
        assert_eq!(angles.len(), 3);
        assert_eq!(angles[0], 0.0);
        assert_relative_eq!(angles[1], 0.5);
        assert_relative_eq!(angles[2], 0.5 + std::f64::consts::PI);
    }

    #[test]
    fn test_parameter_count_mismatch() {
        assert!(matches!(
            run(&single_ry(), &[0.1, 0.2]),
            Err(SimError::ParameterCountMismatch { expected: 1, got: 2 })
        ));
    }

    #[test]
    fn test_expectation_cosine() {
        // ⟨Z⟩ after Ry(θ) is cos θ
        let h = Hamiltonian::from_terms(vec![HamiltonianTerm::z(0, 1.0)]);
        for theta in [0.0, 0.4, 1.7, 3.0] {
            let e = expectation(&single_ry(), &h, &[theta]).unwrap();
            assert_relative_eq!(e, theta.cos(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_initialize_then_gates() {
        use num_complex::Complex64;
        let s = std::f64::consts::FRAC_1_SQRT_2;
        let mut c = Circuit::with_size("init", 1);
        c.initialize(vec![Complex64::new(s, 0.0), Complex64::new(s, 0.0)])
            .unwrap();
        c.h(QubitId(0)).unwrap();
        let sv = run(&c, &[]).unwrap();
        assert_relative_eq!(sv.probabilities()[0], 1.0, epsilon = 1e-12);
    }
}
