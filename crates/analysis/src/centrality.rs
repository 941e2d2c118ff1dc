//! Weighted betweenness (Brandes) and eigenvector (power iteration) centrality.
//!
//! Both functions return one score per node, indexed by `NodeIndex::index()`.

use chatpulse_core::constants::{EIGENVECTOR_MAX_ITERATIONS, EIGENVECTOR_TOLERANCE};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::debug;

/// Heap entry for Dijkstra: smallest distance first.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    distance: f64,
    node: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // min-heap on distance
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Weighted betweenness centrality with edge weights as distances.
///
/// Scores are normalized by `1 / ((n - 1)(n - 2))` for graphs with more than
/// two nodes and left raw otherwise.
pub fn betweenness_centrality<N>(graph: &DiGraph<N, f64>) -> Vec<f64> {
    let n = graph.node_count();
    let mut scores = vec![0.0_f64; n];

    for source in 0..n {
        let mut order: Vec<usize> = Vec::with_capacity(n);
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0_f64; n];
        let mut distance: Vec<Option<f64>> = vec![None; n];
        let mut settled = vec![false; n];
        let mut delta = vec![0.0_f64; n];

        sigma[source] = 1.0;
        distance[source] = Some(0.0);
        let mut heap = BinaryHeap::new();
        heap.push(Candidate {
            distance: 0.0,
            node: source,
        });

        while let Some(Candidate { distance: dist, node: v }) = heap.pop() {
            if settled[v] {
                continue;
            }
            settled[v] = true;
            order.push(v);

            for edge in graph.edges(NodeIndex::new(v)) {
                let w = edge.target().index();
                if settled[w] {
                    continue;
                }
                let through_v = dist + *edge.weight();
                match distance[w] {
                    Some(known) if through_v == known => {
                        sigma[w] += sigma[v];
                        predecessors[w].push(v);
                    }
                    Some(known) if through_v > known => {}
                    _ => {
                        distance[w] = Some(through_v);
                        sigma[w] = sigma[v];
                        predecessors[w] = vec![v];
                        heap.push(Candidate {
                            distance: through_v,
                            node: w,
                        });
                    }
                }
            }
        }

        // Accumulate dependencies in reverse settle order.
        while let Some(w) = order.pop() {
            for &v in &predecessors[w] {
                delta[v] += (sigma[v] / sigma[w]) * (1.0 + delta[w]);
            }
            if w != source {
                scores[w] += delta[w];
            }
        }
    }

    if n > 2 {
        let scale = 1.0 / ((n - 1) as f64 * (n - 2) as f64);
        for score in scores.iter_mut() {
            *score *= scale;
        }
    }
    scores
}

/// Weighted eigenvector centrality over incoming edges.
///
/// Iterates `x <- (A^T + I) x` with L2 normalization from a uniform start.
/// Stops once the L1 change drops below `n * tolerance`. If the iteration
/// does not converge, or degenerates to a zero or non-finite vector, every
/// node scores 0.0.
pub fn eigenvector_centrality<N>(graph: &DiGraph<N, f64>) -> Vec<f64> {
    let n = graph.node_count();
    if n == 0 {
        return Vec::new();
    }

    let mut x = vec![1.0 / n as f64; n];
    for iteration in 0..EIGENVECTOR_MAX_ITERATIONS {
        let previous = x.clone();
        for edge in graph.edge_references() {
            x[edge.target().index()] += previous[edge.source().index()] * *edge.weight();
        }

        let norm = x.iter().map(|value| value * value).sum::<f64>().sqrt();
        if norm == 0.0 || !norm.is_finite() {
            debug!("Eigenvector centrality degenerated at iteration {}", iteration);
            return vec![0.0; n];
        }
        for value in x.iter_mut() {
            *value /= norm;
        }

        let change: f64 = x
            .iter()
            .zip(&previous)
            .map(|(current, last)| (current - last).abs())
            .sum();
        if change < n as f64 * EIGENVECTOR_TOLERANCE {
            return x;
        }
    }

    debug!(
        "Eigenvector centrality did not converge within {} iterations",
        EIGENVECTOR_MAX_ITERATIONS
    );
    vec![0.0; n]
}
