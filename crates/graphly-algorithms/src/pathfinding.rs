//! Single-source shortest paths
//!
//! BFS for hop distances and a Dijkstra variant that records the full
//! shortest-path DAG (predecessors and path counts) needed by the
//! path-based centralities.

use super::common::GraphView;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

/// Hop distances from `source` (unweighted). Unreachable nodes are `None`.
pub fn bfs_distances(view: &GraphView, source: usize) -> Vec<Option<usize>> {
    let mut dist = vec![None; view.node_count];
    let mut queue = VecDeque::new();

    dist[source] = Some(0);
    queue.push_back(source);

    while let Some(current_idx) = queue.pop_front() {
        let next_dist = dist[current_idx].map(|d| d + 1);
        for &next_idx in view.neighbors(current_idx) {
            if dist[next_idx].is_none() {
                dist[next_idx] = next_dist;
                queue.push_back(next_idx);
            }
        }
    }

    dist
}

/// Shortest-path DAG rooted at a source
#[derive(Debug, Clone)]
pub struct ShortestPathDag {
    pub source: usize,
    /// Nodes in the order they were settled (non-decreasing distance)
    pub order: Vec<usize>,
    /// Predecessors on shortest paths, in discovery order
    pub predecessors: Vec<Vec<usize>>,
    /// Number of shortest paths from the source
    pub sigma: Vec<f64>,
    /// Distance from the source; `f64::INFINITY` when unreachable
    pub distance: Vec<f64>,
}

/// State for Dijkstra priority queue
#[derive(Copy, Clone, PartialEq)]
struct State {
    cost: f64,
    seq: usize,
    node_idx: usize,
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Compare costs reversed for min-heap, then insertion order
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Dijkstra's Algorithm recording every shortest path.
///
/// Edge weights are treated as distances. Equal-length paths are detected
/// with exact float equality.
pub fn dijkstra_dag(view: &GraphView, source: usize) -> ShortestPathDag {
    let n = view.node_count;
    let mut distance = vec![f64::INFINITY; n];
    let mut settled = vec![false; n];
    let mut sigma = vec![0.0; n];
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut order = Vec::with_capacity(n);
    let mut heap = BinaryHeap::new();
    let mut seq = 0;

    distance[source] = 0.0;
    sigma[source] = 1.0;
    heap.push(State { cost: 0.0, seq, node_idx: source });

    while let Some(State { cost, node_idx, .. }) = heap.pop() {
        if settled[node_idx] {
            continue;
        }
        settled[node_idx] = true;
        order.push(node_idx);

        for (next_idx, weight) in view.adjacent(node_idx) {
            if settled[next_idx] {
                continue;
            }
            let next_cost = cost + weight;

            if next_cost < distance[next_idx] {
                distance[next_idx] = next_cost;
                sigma[next_idx] = sigma[node_idx];
                predecessors[next_idx].clear();
                predecessors[next_idx].push(node_idx);
                seq += 1;
                heap.push(State { cost: next_cost, seq, node_idx: next_idx });
            } else if next_cost == distance[next_idx] {
                sigma[next_idx] += sigma[node_idx];
                predecessors[next_idx].push(node_idx);
            }
        }
    }

    ShortestPathDag {
        source,
        order,
        predecessors,
        sigma,
        distance,
    }
}
