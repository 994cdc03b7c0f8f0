//! Current-flow (electrical network) centralities
//!
//! Edge weights act as conductances. Both metrics derive from the inverse of
//! the Laplacian with one node grounded: removing the ground's row and column
//! leaves a positive definite matrix for any connected graph.

use super::common::GraphView;
use crate::components::ensure_connected;
use crate::error::{AlgoError, AlgoResult};
use nalgebra::DMatrix;

/// Inverse of the grounded Laplacian, padded back to N x N with a zero row
/// and column at the ground (node 0).
struct GroundedInverse {
    c: DMatrix<f64>,
}

impl GroundedInverse {
    fn new(view: &GraphView) -> AlgoResult<Self> {
        let n = view.node_count;
        let mut c = DMatrix::<f64>::zeros(n, n);
        if n < 2 {
            return Ok(Self { c });
        }

        let mut laplacian = DMatrix::<f64>::zeros(n - 1, n - 1);
        for u in 1..n {
            for (v, w) in view.adjacent(u) {
                laplacian[(u - 1, u - 1)] += w;
                if v > 0 {
                    laplacian[(u - 1, v - 1)] -= w;
                }
            }
        }

        let inverse = laplacian
            .cholesky()
            .ok_or(AlgoError::SingularLaplacian)?
            .inverse();

        c.view_mut((1, 1), (n - 1, n - 1)).copy_from(&inverse);
        Ok(Self { c })
    }

    /// Effective resistance between two nodes
    fn resistance(&self, u: usize, v: usize) -> f64 {
        self.c[(u, u)] + self.c[(v, v)] - 2.0 * self.c[(u, v)]
    }
}

/// Current-flow closeness (information centrality)
///
/// `1 / sum_v R(u, v)` where `R` is the effective resistance. A lone node
/// scores 0.
pub fn current_flow_closeness(view: &GraphView) -> AlgoResult<Vec<f64>> {
    ensure_connected(view)?;
    let n = view.node_count;
    if n < 2 {
        return Ok(vec![0.0; n]);
    }

    let inverse = GroundedInverse::new(view)?;
    Ok((0..n)
        .map(|u| {
            let total: f64 = (0..n).map(|v| inverse.resistance(u, v)).sum();
            1.0 / total
        })
        .collect())
}

/// Current-flow betweenness, normalized by `(n - 1)(n - 2) / 2` unordered pairs.
///
/// For every edge the current it carries for a unit `s -> t` flow is
/// `w_e (p_s - p_t)` with potentials read off the grounded inverse. Sorting
/// each edge's per-source currents lets the sum of absolute currents over
/// all pairs be taken in O(n log n) per edge. Flow through a pair's own
/// endpoints is removed before normalizing. Graphs with fewer than three
/// nodes score 0.
pub fn current_flow_betweenness(view: &GraphView) -> AlgoResult<Vec<f64>> {
    ensure_connected(view)?;
    let n = view.node_count;
    if n < 3 {
        return Ok(vec![0.0; n]);
    }

    let inverse = GroundedInverse::new(view)?;
    let mut throughput = vec![0.0; n];
    let mut row = vec![0.0; n];

    for (u, v, w) in view.edges() {
        for (i, value) in row.iter_mut().enumerate() {
            *value = w * (inverse.c[(u, i)] - inverse.c[(v, i)]);
        }
        row.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        // sum_{i<j} |x_j - x_i| over the sorted currents
        let mut pair_sum = 0.0;
        for (rank, value) in row.iter().enumerate() {
            pair_sum += value * (2.0 * rank as f64 - (n - 1) as f64);
        }
        throughput[u] += pair_sum;
        throughput[v] += pair_sum;
    }

    let endpoints = (n - 1) as f64;
    let scale = ((n - 1) * (n - 2)) as f64;
    Ok(throughput
        .into_iter()
        .map(|total| (total - endpoints) / scale)
        .collect())
}
