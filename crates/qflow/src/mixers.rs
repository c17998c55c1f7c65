//! QAOA mixer Hamiltonians.
//!
//! The XY mixers conserve Hamming weight and pair naturally with a
//! [`DickeState`](crate::templates::DickeState) initial state; the X mixer
//! pairs with [`Plus`](crate::templates::Plus).

use qflow_sim::hamiltonian::{Hamiltonian, HamiltonianTerm, PauliOp, PauliString};

use crate::graph::{Graph, edge_list, from_edges};
use crate::utils::pairwise;

/// `Σ_i X_i` over `n_qubits` wires.
pub fn x_mixer(n_qubits: usize) -> Hamiltonian {
    (0..n_qubits as u32).map(|q| HamiltonianTerm::x(q, 1.0)).collect()
}

/// `Σ_(u,v) ½ (X_u X_v + Y_u Y_v)` over the edges of `graph`.
pub fn xy_mixer(graph: &Graph) -> Hamiltonian {
    edge_list(graph)
        .into_iter()
        .flat_map(|(u, v)| {
            [PauliOp::X, PauliOp::Y]
                .map(|op| HamiltonianTerm::new(0.5, PauliString::from_ops([(u, op), (v, op)])))
        })
        .collect()
}

/// XY mixer on the union of two pairings: `(0,1), (2,3), …` and
/// `(1,2), (3,4), …` closing back to 0. For even `n_qubits` this is the ring.
pub fn circular_xy_mixer(n_qubits: usize) -> Hamiltonian {
    let wires: Vec<u32> = (0..n_qubits as u32).collect();
    let mut rolled = wires.clone();
    rolled.rotate_left(1.min(wires.len()));
    xy_mixer(&from_edges(pairwise(&wires).into_iter().chain(pairwise(&rolled))))
}

/// Side of the square grid spanned by `n_qubits` wires.
fn grid_side(n_qubits: usize) -> u32 {
    n_qubits.isqrt() as u32
}

/// XY mixer along the periodic rows of an `N × N` grid, `N = ⌊√n⌋`.
pub fn row_mixer(n_qubits: usize) -> Hamiltonian {
    let n = grid_side(n_qubits);
    let edges = (0..n).flat_map(|j| (0..n).map(move |i| (i + j * n, (i + 1) % n + j * n)));
    xy_mixer(&from_edges(edges))
}

/// XY mixer along the open rows of an `N × N` grid, `N = ⌊√n⌋`.
pub fn row_mixer_2(n_qubits: usize) -> Hamiltonian {
    xy_mixer(&from_edges(open_rows(grid_side(n_qubits)).into_iter().flatten()))
}

/// One XY mixer per open row of an `N × N` grid, `N = ⌊√n⌋`.
pub fn row_flex_mixer(n_qubits: usize) -> Vec<Hamiltonian> {
    open_rows(grid_side(n_qubits))
        .into_iter()
        .map(|row| xy_mixer(&from_edges(row)))
        .collect()
}

fn open_rows(n: u32) -> Vec<Vec<(u32, u32)>> {
    (0..n)
        .map(|j| (0..n.saturating_sub(1)).map(|i| (i + j * n, i + 1 + j * n)).collect())
        .collect()
}
