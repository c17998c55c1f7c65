//! Problem graphs for Max-Cut, lattice models and mixers.

use petgraph::graphmap::UnGraphMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::{QflowError, QflowResult};

/// Undirected, unweighted graph on integer node labels.
pub type Graph = UnGraphMap<u32, ()>;

/// Resampling cap for [`maxcut_graph`]; reaching it needs astronomically bad luck.
const MAX_RESAMPLES: usize = 10_000;

/// Build a graph from an edge list. Self-loops are dropped and duplicate
/// edges collapse.
pub fn from_edges(edges: impl IntoIterator<Item = (u32, u32)>) -> Graph {
    let mut graph = Graph::new();
    for (u, v) in edges {
        if u != v {
            graph.add_edge(u, v, ());
        }
    }
    graph
}

/// Edges as `(min, max)` pairs, sorted.
pub fn edge_list(graph: &Graph) -> Vec<(u32, u32)> {
    let mut edges: Vec<(u32, u32)> = graph
        .all_edges()
        .map(|(u, v, _)| (u.min(v), u.max(v)))
        .collect();
    edges.sort_unstable();
    edges
}

/// Random G(n, ½) graph in which every node has at least one edge.
///
/// Graphs with isolated nodes are redrawn from the same generator, so the
/// result is a pure function of `num_nodes` and `seed`.
pub fn maxcut_graph(num_nodes: usize, seed: u64) -> QflowResult<Graph> {
    if num_nodes < 2 {
        return Err(QflowError::InvalidArgument(format!(
            "a Max-Cut graph needs at least 2 nodes, got {num_nodes}"
        )));
    }
    let n = num_nodes as u32;
    let mut rng = StdRng::seed_from_u64(seed);
    for attempt in 0..MAX_RESAMPLES {
        let mut graph = Graph::new();
        for u in 0..n {
            graph.add_node(u);
        }
        for u in 0..n {
            for v in u + 1..n {
                if rng.gen_bool(0.5) {
                    graph.add_edge(u, v, ());
                }
            }
        }
        if graph.nodes().all(|u| graph.neighbors(u).next().is_some()) {
            debug!(num_nodes, seed, attempt, edges = graph.edge_count(), "sampled Max-Cut graph");
            return Ok(graph);
        }
    }
    Err(QflowError::InvalidArgument(format!(
        "no graph without isolated nodes after {MAX_RESAMPLES} draws"
    )))
}

/// `rows × cols` square lattice. Node `(r, c)` is labelled `r·cols + c`.
pub fn grid_2d(rows: usize, cols: usize) -> Graph {
    let label = |r: usize, c: usize| (r * cols + c) as u32;
    let mut graph = Graph::new();
    for r in 0..rows {
        for c in 0..cols {
            graph.add_node(label(r, c));
            if r + 1 < rows {
                graph.add_edge(label(r, c), label(r + 1, c), ());
            }
            if c + 1 < cols {
                graph.add_edge(label(r, c), label(r, c + 1), ());
            }
        }
    }
    graph
}

/// Ring on `n` nodes.
pub fn cycle(n: usize) -> Graph {
    let n = n as u32;
    let mut graph = from_edges((0..n).map(|i| (i, (i + 1) % n)));
    for i in 0..n {
        graph.add_node(i);
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maxcut_graph_is_seeded() {
        let a = maxcut_graph(6, 0).unwrap();
        let b = maxcut_graph(6, 0).unwrap();
        assert_eq!(edge_list(&a), edge_list(&b));
        assert_eq!(a.node_count(), 6);
        assert!(a.nodes().all(|u| a.neighbors(u).count() > 0));
    }

    #[test]
    fn test_maxcut_graph_seeds_differ() {
        let graphs: Vec<_> = (0..8).map(|s| edge_list(&maxcut_graph(7, s).unwrap())).collect();
        assert!(graphs.iter().any(|g| *g != graphs[0]));
    }

    #[test]
    fn test_maxcut_graph_too_small() {
        assert!(matches!(maxcut_graph(1, 0), Err(QflowError::InvalidArgument(_))));
    }

    #[test]
    fn test_grid() {
        let g = grid_2d(2, 3);
        assert_eq!(g.node_count(), 6);
        assert_eq!(
            edge_list(&g),
            vec![(0, 1), (0, 3), (1, 2), (1, 4), (2, 5), (3, 4), (4, 5)]
        );
    }

    #[test]
    fn test_cycle_and_dedup() {
        assert_eq!(edge_list(&cycle(4)), vec![(0, 1), (0, 3), (1, 2), (2, 3)]);
        // Two nodes: (0,1) and (1,0) collapse.
        assert_eq!(edge_list(&cycle(2)), vec![(0, 1)]);
        assert_eq!(cycle(1).edge_count(), 0);
        assert_eq!(edge_list(&from_edges([(0, 0), (1, 2), (2, 1)])), vec![(1, 2)]);
    }
}
