//! Node centrality metrics
//!
//! Degree, closeness and harmonic centrality ignore weights. Betweenness
//! and load centrality treat weights as path lengths.

use super::common::GraphView;
use crate::components::ensure_connected;
use crate::current_flow::{current_flow_betweenness, current_flow_closeness};
use crate::error::AlgoResult;
use crate::pathfinding::{bfs_distances, dijkstra_dag};
use crate::topology::weighted_clustering;
use serde::{Deserialize, Serialize};

/// Degree divided by `n - 1`. A lone node scores 1.
pub fn degree_centrality(view: &GraphView) -> Vec<f64> {
    let n = view.node_count;
    if n <= 1 {
        return vec![1.0; n];
    }
    let scale = 1.0 / (n - 1) as f64;
    (0..n).map(|idx| view.degree(idx) as f64 * scale).collect()
}

/// Closeness centrality over hop distances.
///
/// `(r - 1) / sum(d)` scaled by `(r - 1) / (n - 1)`, where `r` counts the
/// nodes reachable from `u` (itself included).
pub fn closeness_centrality(view: &GraphView) -> Vec<f64> {
    let n = view.node_count;
    (0..n)
        .map(|u| {
            let dist = bfs_distances(view, u);
            let reached: Vec<usize> = dist.iter().flatten().copied().collect();
            let total: usize = reached.iter().sum();
            let r = reached.len();
            if total == 0 || n <= 1 {
                return 0.0;
            }
            let closeness = (r - 1) as f64 / total as f64;
            closeness * (r - 1) as f64 / (n - 1) as f64
        })
        .collect()
}

/// Harmonic centrality: sum of reciprocal hop distances to every other node
pub fn harmonic_centrality(view: &GraphView) -> Vec<f64> {
    (0..view.node_count)
        .map(|u| {
            bfs_distances(view, u)
                .into_iter()
                .flatten()
                .filter(|&d| d > 0)
                .map(|d| 1.0 / d as f64)
                .sum::<f64>()
        })
        .collect()
}

/// Brandes betweenness with weighted shortest paths, normalized by
/// `1 / ((n - 1)(n - 2))`. Graphs with at most two nodes are left unscaled.
pub fn betweenness_centrality(view: &GraphView) -> Vec<f64> {
    let n = view.node_count;
    let mut betweenness = vec![0.0; n];
    let mut delta = vec![0.0; n];

    for source in 0..n {
        let dag = dijkstra_dag(view, source);
        delta.iter_mut().for_each(|d| *d = 0.0);

        for &w in dag.order.iter().rev() {
            let coeff = (1.0 + delta[w]) / dag.sigma[w];
            for &v in &dag.predecessors[w] {
                delta[v] += dag.sigma[v] * coeff;
            }
            if w != source {
                betweenness[w] += delta[w];
            }
        }
    }

    if n > 2 {
        let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
        betweenness.iter_mut().for_each(|b| *b *= scale);
    }
    betweenness
}

/// Load centrality (Newman's variant of betweenness).
///
/// Each source sends one unit of load to every reachable node; load arriving
/// at a node is split evenly between its shortest-path predecessors, walking
/// nodes from farthest to nearest. Normalized like betweenness.
pub fn load_centrality(view: &GraphView) -> Vec<f64> {
    let n = view.node_count;
    let mut load = vec![0.0; n];

    for source in 0..n {
        let dag = dijkstra_dag(view, source);

        let mut farthest_first: Vec<usize> = dag
            .order
            .iter()
            .copied()
            .filter(|&v| dag.distance[v] > 0.0)
            .collect();
        farthest_first.sort_by(|&a, &b| {
            dag.distance[b]
                .partial_cmp(&dag.distance[a])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.cmp(&a))
        });

        let mut between = vec![0.0; n];
        for &v in &dag.order {
            between[v] = 1.0;
        }

        for v in farthest_first {
            let preds = &dag.predecessors[v];
            let share = between[v] / preds.len() as f64;
            for &x in preds {
                if x == source {
                    break;
                }
                between[x] += share;
            }
        }

        for &v in &dag.order {
            load[v] += between[v] - 1.0;
        }
    }

    if n > 2 {
        let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
        load.iter_mut().for_each(|l| *l *= scale);
    }
    load
}

/// All per-node metrics, aligned with the dense order of the view
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CentralityMetrics {
    pub degree: Vec<f64>,
    pub clustering: Vec<f64>,
    pub closeness: Vec<f64>,
    pub current_flow_closeness: Vec<f64>,
    pub betweenness: Vec<f64>,
    pub current_flow_betweenness: Vec<f64>,
    pub load: Vec<f64>,
    pub harmonic: Vec<f64>,
}

impl CentralityMetrics {
    /// Compute every metric. The graph must be connected.
    pub fn compute(view: &GraphView) -> AlgoResult<Self> {
        ensure_connected(view)?;

        Ok(Self {
            degree: degree_centrality(view),
            clustering: weighted_clustering(view),
            closeness: closeness_centrality(view),
            current_flow_closeness: current_flow_closeness(view)?,
            betweenness: betweenness_centrality(view),
            current_flow_betweenness: current_flow_betweenness(view)?,
            load: load_centrality(view),
            harmonic: harmonic_centrality(view),
        })
    }

    pub fn len(&self) -> usize {
        self.degree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.degree.is_empty()
    }
}
