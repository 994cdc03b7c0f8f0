//! Shared utilities for graph algorithms
//!
//! Provides a read-only, optimized view of an undirected weighted graph for algorithm execution.

use crate::error::{AlgoError, AlgoResult};
use std::collections::HashMap;

/// Node Identifier type (u64)
pub type NodeId = u64;

/// A dense, integer-indexed view of an undirected weighted graph using Compressed Sparse Row (CSR) format.
///
/// Every edge {u, v} is stored in both endpoint rows. Rows are sorted by
/// neighbor index so that iteration order never depends on insertion order.
#[derive(Debug, Clone)]
pub struct GraphView {
    /// Number of nodes
    pub node_count: usize,
    /// Mapping from dense index (0..N) back to NodeId
    pub index_to_node: Vec<NodeId>,
    /// Mapping from NodeId to dense index
    pub node_to_index: HashMap<NodeId, usize>,

    /// Offsets into `targets`. Size = node_count + 1
    pub offsets: Vec<usize>,
    /// Contiguous array of neighbor indices
    pub targets: Vec<usize>,
    /// Edge weights: aligned with `targets`
    pub weights: Vec<f64>,
}

impl GraphView {
    /// Build a view from a node list and undirected weighted edges given by NodeId.
    ///
    /// Dense indices follow the order of `nodes`. Parallel edges are merged by
    /// summing their weights.
    pub fn from_edges(nodes: Vec<NodeId>, edges: &[(NodeId, NodeId, f64)]) -> AlgoResult<Self> {
        let node_to_index: HashMap<NodeId, usize> = nodes
            .iter()
            .enumerate()
            .map(|(idx, &id)| (id, idx))
            .collect();

        let mut adjacency: Vec<Vec<(usize, f64)>> = vec![Vec::new(); nodes.len()];
        for &(u, v, w) in edges {
            let u_idx = *node_to_index.get(&u).ok_or(AlgoError::UnknownNode(u))?;
            let v_idx = *node_to_index.get(&v).ok_or(AlgoError::UnknownNode(v))?;
            if u_idx == v_idx {
                return Err(AlgoError::SelfLoop(u));
            }
            if !w.is_finite() || w <= 0.0 {
                return Err(AlgoError::InvalidWeight {
                    source_node: u,
                    target_node: v,
                    weight: w,
                });
            }
            adjacency[u_idx].push((v_idx, w));
            adjacency[v_idx].push((u_idx, w));
        }

        Ok(Self::from_adjacency_list(nodes, node_to_index, adjacency))
    }

    /// Helper to create a GraphView from symmetric adjacency lists
    pub fn from_adjacency_list(
        index_to_node: Vec<NodeId>,
        node_to_index: HashMap<NodeId, usize>,
        adjacency: Vec<Vec<(usize, f64)>>,
    ) -> Self {
        let node_count = index_to_node.len();
        let mut offsets = Vec::with_capacity(node_count + 1);
        let mut targets = Vec::new();
        let mut weights = Vec::new();

        offsets.push(0);
        for mut row in adjacency {
            row.sort_by_key(|&(idx, _)| idx);
            let mut merged: Vec<(usize, f64)> = Vec::with_capacity(row.len());
            for (idx, w) in row {
                match merged.last_mut() {
                    Some(last) if last.0 == idx => last.1 += w,
                    _ => merged.push((idx, w)),
                }
            }
            for (idx, w) in merged {
                targets.push(idx);
                weights.push(w);
            }
            offsets.push(targets.len());
        }

        GraphView {
            node_count,
            index_to_node,
            node_to_index,
            offsets,
            targets,
            weights,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.targets.len() / 2
    }

    /// Get the (unweighted) degree of a node (by index)
    pub fn degree(&self, idx: usize) -> usize {
        self.offsets[idx + 1] - self.offsets[idx]
    }

    /// Sum of the weights of all edges incident to a node
    pub fn weighted_degree(&self, idx: usize) -> f64 {
        self.weights(idx).iter().sum()
    }

    /// Sum of all edge weights, each undirected edge counted once
    pub fn total_weight(&self) -> f64 {
        self.edges().map(|(_, _, w)| w).sum()
    }

    /// Get neighbors of a node
    pub fn neighbors(&self, idx: usize) -> &[usize] {
        let start = self.offsets[idx];
        let end = self.offsets[idx + 1];
        &self.targets[start..end]
    }

    /// Get weights for the edges of a node, aligned with `neighbors`
    pub fn weights(&self, idx: usize) -> &[f64] {
        let start = self.offsets[idx];
        let end = self.offsets[idx + 1];
        &self.weights[start..end]
    }

    /// Iterate `(neighbor, weight)` pairs of a node
    pub fn adjacent(&self, idx: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.neighbors(idx)
            .iter()
            .copied()
            .zip(self.weights(idx).iter().copied())
    }

    /// Weight of the edge between two indices, if present
    pub fn edge_weight(&self, u: usize, v: usize) -> Option<f64> {
        let row = self.neighbors(u);
        row.binary_search(&v).ok().map(|pos| self.weights(u)[pos])
    }

    /// Iterate every undirected edge once as `(u, v, w)` with `u < v` (dense indices)
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.node_count).flat_map(move |u| {
            self.adjacent(u)
                .filter(move |&(v, _)| u < v)
                .map(move |(v, w)| (u, v, w))
        })
    }

    /// Subgraph induced by the given dense indices.
    ///
    /// The new view keeps the original NodeIds; its dense order follows `members`.
    pub fn induced_subgraph(&self, members: &[usize]) -> GraphView {
        let mut local: HashMap<usize, usize> = HashMap::with_capacity(members.len());
        for (new_idx, &old_idx) in members.iter().enumerate() {
            local.insert(old_idx, new_idx);
        }

        let index_to_node: Vec<NodeId> = members.iter().map(|&i| self.index_to_node[i]).collect();
        let node_to_index = index_to_node
            .iter()
            .enumerate()
            .map(|(idx, &id)| (id, idx))
            .collect();

        let adjacency = members
            .iter()
            .map(|&old_idx| {
                self.adjacent(old_idx)
                    .filter_map(|(v, w)| local.get(&v).map(|&nv| (nv, w)))
                    .collect()
            })
            .collect();

        GraphView::from_adjacency_list(index_to_node, node_to_index, adjacency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_from_edges() {
        // 10 - 20 (0.5), 20 - 30 (0.9)
        let view = GraphView::from_edges(vec![10, 20, 30], &[(10, 20, 0.5), (30, 20, 0.9)]).unwrap();

        assert_eq!(view.node_count, 3);
        assert_eq!(view.edge_count(), 2);
        assert_eq!(view.neighbors(1), &[0, 2]);
        assert_eq!(view.degree(1), 2);
        assert!((view.weighted_degree(1) - 1.4).abs() < 1e-12);
        assert!((view.total_weight() - 1.4).abs() < 1e-12);
        assert_eq!(view.edge_weight(2, 1), Some(0.9));
        assert_eq!(view.edge_weight(0, 2), None);

        let edges: Vec<_> = view.edges().collect();
        assert_eq!(edges, vec![(0, 1, 0.5), (1, 2, 0.9)]);
    }

    #[test]
    fn test_rejects_bad_edges() {
        assert_eq!(
            GraphView::from_edges(vec![1, 2], &[(1, 3, 1.0)]).unwrap_err(),
            AlgoError::UnknownNode(3)
        );
        assert_eq!(
            GraphView::from_edges(vec![1, 2], &[(1, 1, 1.0)]).unwrap_err(),
            AlgoError::SelfLoop(1)
        );
        assert!(matches!(
            GraphView::from_edges(vec![1, 2], &[(1, 2, 0.0)]),
            Err(AlgoError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn test_induced_subgraph() {
        let view = GraphView::from_edges(
            vec![0, 1, 2, 3],
            &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0)],
        )
        .unwrap();

        let sub = view.induced_subgraph(&[1, 2, 3]);
        assert_eq!(sub.index_to_node, vec![1, 2, 3]);
        assert_eq!(sub.edge_count(), 2);
        assert_eq!(sub.node_to_index[&3], 2);
        assert_eq!(sub.neighbors(0), &[1]);
    }
}
