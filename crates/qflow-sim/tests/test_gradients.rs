//! Cross-checks of the differentiation layer on a hardware-efficient circuit.

use num_complex::Complex64;
use qflow_ir::{Circuit, ParameterExpression, QubitId};
use qflow_sim::execution::{expectation, run};
use qflow_sim::gradient::{DiffMethod, gradient};
use qflow_sim::hamiltonian::{Hamiltonian, HamiltonianTerm, PauliOp, PauliString};
use qflow_sim::metric::{MetricApprox, metric_tensor};
use qflow_sim::synthesis::append_time_evolution;

fn p(k: usize) -> ParameterExpression {
    ParameterExpression::param(k)
}

/// Two layers of Rot on three wires with a CNOT ring, plus a shared angle.
fn ansatz() -> Circuit {
    let mut c = Circuit::with_size("hea", 3);
    let mut k = 0;
    for _ in 0..2 {
        for q in 0..3 {
            c.rot(p(k), p(k + 1), p(k + 2), QubitId(q)).unwrap();
            k += 3;
        }
        for q in 0..3 {
            c.cx(QubitId(q), QubitId((q + 1) % 3)).unwrap();
        }
    }
    c.rx(0.5 * p(0) + ParameterExpression::constant(0.1), QubitId(2))
        .unwrap();
    c
}

fn heisenberg_chain() -> Hamiltonian {
    let mut terms = Vec::new();
    for (a, b) in [(0, 1), (1, 2)] {
        for op in [PauliOp::X, PauliOp::Y, PauliOp::Z] {
            terms.push(HamiltonianTerm::new(1.0, PauliString::from_ops([(a, op), (b, op)])));
        }
    }
    terms.push(HamiltonianTerm::z(0, 0.3));
    Hamiltonian::from_terms(terms)
}

fn params(n: usize) -> Vec<f64> {
    (0..n).map(|i| 0.37 * i as f64 - 1.1).collect()
}

#[test]
fn adjoint_and_parameter_shift_agree() {
    let c = ansatz();
    let h = heisenberg_chain();
    let theta = params(c.num_parameters());
    let adj = gradient(&c, &h, &theta, DiffMethod::Adjoint).unwrap();
    let shift = gradient(&c, &h, &theta, DiffMethod::ParameterShift).unwrap();
    assert_eq!(adj.len(), 18);
    for (a, b) in adj.iter().zip(&shift) {
        assert!((a - b).abs() < 1e-7, "{a} vs {b}");
    }
}

#[test]
fn gradient_matches_finite_difference() {
    let c = ansatz();
    let h = heisenberg_chain();
    let theta = params(c.num_parameters());
    let grad = gradient(&c, &h, &theta, DiffMethod::Adjoint).unwrap();
    let eps = 1e-6;
    for k in 0..theta.len() {
        let mut plus = theta.clone();
        let mut minus = theta.clone();
        plus[k] += eps;
        minus[k] -= eps;
        let fd = (expectation(&c, &h, &plus).unwrap() - expectation(&c, &h, &minus).unwrap())
            / (2.0 * eps);
        assert!((grad[k] - fd).abs() < 1e-6, "param {k}: {} vs {fd}", grad[k]);
    }
}

#[test]
fn gradient_through_time_evolution() {
    // One QAOA-style layer: exp(−iγ·ZZ) then exp(−iβ·ΣX).
    let cost = Hamiltonian::from_terms(vec![
        HamiltonianTerm::zz(0, 1, 0.5),
        HamiltonianTerm::zz(1, 2, 0.5),
        HamiltonianTerm::constant(-1.0),
    ]);
    let mixer: Hamiltonian = (0..3).map(|q| HamiltonianTerm::x(q, 1.0)).collect();
    let mut c = Circuit::with_size("qaoa", 3);
    for q in 0..3 {
        c.h(QubitId(q)).unwrap();
    }
    append_time_evolution(&mut c, &cost, &p(0), 1).unwrap();
    append_time_evolution(&mut c, &mixer, &p(1), 1).unwrap();

    let theta = [0.8, 0.3];
    let adj = gradient(&c, &cost, &theta, DiffMethod::Adjoint).unwrap();
    let shift = gradient(&c, &cost, &theta, DiffMethod::ParameterShift).unwrap();
    for (a, b) in adj.iter().zip(&shift) {
        assert!((a - b).abs() < 1e-7);
    }
}

#[test]
fn full_metric_matches_state_derivatives() {
    let c = ansatz();
    let theta = params(c.num_parameters());
    let metric = metric_tensor(&c, &theta, MetricApprox::Full).unwrap();

    let psi = run(&c, &theta).unwrap();
    let eps = 1e-5;
    let derivs: Vec<Vec<Complex64>> = (0..theta.len())
        .map(|k| {
            let mut plus = theta.clone();
            let mut minus = theta.clone();
            plus[k] += eps;
            minus[k] -= eps;
            let a = run(&c, &plus).unwrap();
            let b = run(&c, &minus).unwrap();
            a.amplitudes()
                .iter()
                .zip(b.amplitudes())
                .map(|(x, y)| (*x - *y) / (2.0 * eps))
                .collect()
        })
        .collect();
    let inner = |u: &[Complex64], v: &[Complex64]| -> Complex64 {
        u.iter().zip(v).map(|(a, b)| a.conj() * *b).sum()
    };
    for i in 0..theta.len() {
        for j in 0..theta.len() {
            let expected = (inner(&derivs[i], &derivs[j])
                - inner(&derivs[i], psi.amplitudes()) * inner(psi.amplitudes(), &derivs[j]))
            .re;
            assert!(
                (metric[(i, j)] - expected).abs() < 1e-6,
                "({i}, {j}): {} vs {expected}",
                metric[(i, j)]
            );
        }
    }
}
