//! Pauli-string exponentiation.
//!
//! Implements the standard gate synthesis for
//!
//!   exp(-i · coeff · t · P)
//!
//! where P is a tensor product of Pauli operators, using the circuit identity:
//!
//!   exp(-i θ/2 · Z⊗Z⊗...⊗Z) = CNOT_ladder · Rz(θ) · CNOT_ladder†
//!
//! with basis rotations applied before/after to handle X and Y factors:
//!   X → H · Z · H
//!   Y → Sdg · H · Z · H · S
//!   Z → identity
//!
//! The evolution time is a [`ParameterExpression`], so a QAOA layer can put a
//! trainable angle inside the exponent and still differentiate through it.

use qflow_ir::{Circuit, ParameterExpression, QubitId};
use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::hamiltonian::{Hamiltonian, HamiltonianTerm, PauliOp};

/// Append the circuit for `exp(-i · coeff · t · P)` to `circuit`.
///
/// Single-qubit strings become one Rx/Ry/Rz gate. If the Pauli string is the
/// identity operator the function is a no-op (global phase, unobservable).
pub fn append_exp_pauli(
    circuit: &mut Circuit,
    term: &HamiltonianTerm,
    t: &ParameterExpression,
) -> SimResult<()> {
    let ops = term.pauli.ops();
    if ops.is_empty() {
        return Ok(());
    }

    let n_qubits = circuit.num_qubits() as u32;
    for &(q, _) in ops {
        if q >= n_qubits {
            return Err(SimError::QubitOutOfRange { qubit: q, n_qubits });
        }
    }

    // θ = 2 · coeff · t  (Rz(θ) implements exp(-i θ/2 Z))
    let theta = (ParameterExpression::constant(2.0 * term.coeff) * t.clone()).simplify();

    if let [(q, op)] = ops {
        let qid = QubitId(*q);
        match op {
            PauliOp::X => {
                circuit.rx(theta, qid)?;
            }
            PauliOp::Y => {
                circuit.ry(theta, qid)?;
            }
            PauliOp::Z => {
                circuit.rz(theta, qid)?;
            }
            PauliOp::I => {}
        }
        return Ok(());
    }

    basis_change(circuit, ops, false)?;

    let qubits: Vec<u32> = ops.iter().map(|(q, _)| *q).collect();
    cnot_ladder(circuit, &qubits)?;

    // Parity now sits on the last qubit of the ladder.
    let target = QubitId(qubits[qubits.len() - 1]);
    circuit.rz(theta, target)?;

    cnot_ladder_reverse(circuit, &qubits)?;
    basis_change(circuit, ops, true)?;

    Ok(())
}

/// Append a first-order Trotter approximation of `exp(-i · H · t)`.
///
/// Each of the `n_steps` slices applies every term once with time step
/// `t / n_steps`. QAOA uses a single slice, which is exact for commuting terms.
pub fn append_time_evolution(
    circuit: &mut Circuit,
    hamiltonian: &Hamiltonian,
    t: &ParameterExpression,
    n_steps: usize,
) -> SimResult<()> {
    if hamiltonian.is_empty() {
        return Err(SimError::EmptyHamiltonian);
    }
    if n_steps == 0 {
        return Err(SimError::InvalidSteps(0));
    }
    debug!(
        n_terms = hamiltonian.n_terms(),
        n_steps,
        n_qubits = circuit.num_qubits(),
        time = %t,
        "synthesising first-order Trotter evolution"
    );

    let step_t = if n_steps == 1 {
        t.clone()
    } else {
        (t.clone() / ParameterExpression::constant(n_steps as f64)).simplify()
    };
    for _ in 0..n_steps {
        for term in hamiltonian.terms() {
            append_exp_pauli(circuit, term, &step_t)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Apply basis-change gates for each Pauli operator.
///
/// Forward: X → H, Y → Sdg · H. Reverse: X → H, Y → H · S.
fn basis_change(circuit: &mut Circuit, ops: &[(u32, PauliOp)], undo: bool) -> SimResult<()> {
    for &(q, op) in ops {
        let qid = QubitId(q);
        match (op, undo) {
            (PauliOp::X, _) => {
                circuit.h(qid)?;
            }
            (PauliOp::Y, false) => {
                circuit.sdg(qid)?.h(qid)?;
            }
            (PauliOp::Y, true) => {
                circuit.h(qid)?.s(qid)?;
            }
            (PauliOp::Z | PauliOp::I, _) => {}
        }
    }
    Ok(())
}

/// CX(q[0],q[1]), CX(q[1],q[2]), …, CX(q[k-2], q[k-1]).
fn cnot_ladder(circuit: &mut Circuit, qubits: &[u32]) -> SimResult<()> {
    for window in qubits.windows(2) {
        circuit.cx(QubitId(window[0]), QubitId(window[1]))?;
    }
    Ok(())
}

fn cnot_ladder_reverse(circuit: &mut Circuit, qubits: &[u32]) -> SimResult<()> {
    for window in qubits.windows(2).rev() {
        circuit.cx(QubitId(window[0]), QubitId(window[1]))?;
    }
    Ok(())
}
