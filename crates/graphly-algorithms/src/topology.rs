//! Graph topology analysis algorithms
//!
//! Local triangle structure: the weighted clustering coefficient.

use super::common::GraphView;

/// Weighted clustering coefficient of every node.
///
/// Uses the geometric mean of edge weights normalized by the largest weight
/// in the graph:
///
/// `c_u = 1 / (deg(u) (deg(u) - 1)) * sum_{v,w} (w_uv * w_uw * w_vw)^(1/3)`
///
/// over ordered neighbor pairs. Nodes with degree below 2 score 0.
pub fn weighted_clustering(view: &GraphView) -> Vec<f64> {
    let max_weight = view
        .weights
        .iter()
        .copied()
        .fold(0.0_f64, f64::max);
    let max_weight = if max_weight > 0.0 { max_weight } else { 1.0 };

    (0..view.node_count)
        .map(|u| {
            let neighbors = view.neighbors(u);
            let weights = view.weights(u);
            let degree = neighbors.len();
            if degree < 2 {
                return 0.0;
            }

            let mut triangles = 0.0;
            for a in 0..degree {
                let v = neighbors[a];
                let w_uv = weights[a] / max_weight;
                for b in (a + 1)..degree {
                    let w = neighbors[b];
                    if let Some(w_vw) = view.edge_weight(v, w) {
                        let w_uw = weights[b] / max_weight;
                        triangles += (w_uv * w_uw * (w_vw / max_weight)).cbrt();
                    }
                }
            }

            2.0 * triangles / (degree * (degree - 1)) as f64
        })
        .collect()
}
