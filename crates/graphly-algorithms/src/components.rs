//! Connected components and giant-component extraction

use super::common::{GraphView, NodeId};
use crate::error::{AlgoError, AlgoResult};

/// Result of the connected components algorithm
#[derive(Debug, Clone)]
pub struct ComponentsResult {
    /// Components in discovery order, scanning nodes by ascending NodeId.
    /// Members of each component are dense indices in the same scan order.
    pub components: Vec<Vec<usize>>,
    /// Dense index -> component position in `components`
    pub node_component: Vec<usize>,
}

impl ComponentsResult {
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Position of the largest component; ties go to the first discovered.
    pub fn largest(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (pos, members) in self.components.iter().enumerate() {
            match best {
                Some(b) if self.components[b].len() >= members.len() => {}
                _ => best = Some(pos),
            }
        }
        best
    }

    /// NodeIds of a component
    pub fn component_nodes(&self, view: &GraphView, pos: usize) -> Vec<NodeId> {
        self.components[pos]
            .iter()
            .map(|&idx| view.index_to_node[idx])
            .collect()
    }
}

/// Union-Find data structure
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        UnionFind {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression
        let mut curr = i;
        while self.parent[curr] != root {
            let next = self.parent[curr];
            self.parent[curr] = root;
            curr = next;
        }
        root
    }

    fn union(&mut self, i: usize, j: usize) {
        let root_i = self.find(i);
        let root_j = self.find(j);

        if root_i != root_j {
            if self.rank[root_i] < self.rank[root_j] {
                self.parent[root_i] = root_j;
            } else if self.rank[root_i] > self.rank[root_j] {
                self.parent[root_j] = root_i;
            } else {
                self.parent[root_j] = root_i;
                self.rank[root_i] += 1;
            }
        }
    }
}

/// Connected Components
///
/// Finds all disjoint subgraphs of an undirected graph. Component numbering
/// follows discovery order when scanning nodes by ascending NodeId.
pub fn connected_components(view: &GraphView) -> ComponentsResult {
    let n = view.node_count;
    let mut uf = UnionFind::new(n);

    for u_idx in 0..n {
        for &v_idx in view.neighbors(u_idx) {
            uf.union(u_idx, v_idx);
        }
    }

    let mut scan: Vec<usize> = (0..n).collect();
    scan.sort_by_key(|&idx| view.index_to_node[idx]);

    let mut root_to_component: Vec<Option<usize>> = vec![None; n];
    let mut components: Vec<Vec<usize>> = Vec::new();
    let mut node_component = vec![0; n];

    for idx in scan {
        let root = uf.find(idx);
        let pos = match root_to_component[root] {
            Some(pos) => pos,
            None => {
                components.push(Vec::new());
                root_to_component[root] = Some(components.len() - 1);
                components.len() - 1
            }
        };
        components[pos].push(idx);
        node_component[idx] = pos;
    }

    ComponentsResult {
        components,
        node_component,
    }
}

/// True if the graph is non-empty and has a single component
pub fn is_connected(view: &GraphView) -> bool {
    !view.is_empty() && connected_components(view).len() == 1
}

/// Fail with `Disconnected` unless the graph has exactly one component
pub fn ensure_connected(view: &GraphView) -> AlgoResult<()> {
    if view.is_empty() {
        return Err(AlgoError::EmptyGraph);
    }
    let components = connected_components(view).len();
    if components != 1 {
        return Err(AlgoError::Disconnected { components });
    }
    Ok(())
}

/// Induced subgraph on the largest connected component.
///
/// Among equally sized components the one discovered first (smallest
/// NodeId) wins. The result lists its nodes by ascending NodeId.
pub fn giant_component(view: &GraphView) -> AlgoResult<GraphView> {
    let result = connected_components(view);
    let pos = result.largest().ok_or(AlgoError::EmptyGraph)?;
    Ok(view.induced_subgraph(&result.components[pos]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components() {
        // Nodes: 1, 2, 3, 4, 5, 6
        // Edges: 1-2, 3-4-5, 6 (isolated)
        let view = GraphView::from_edges(
            vec![1, 2, 3, 4, 5, 6],
            &[(1, 2, 1.0), (3, 4, 1.0), (4, 5, 1.0)],
        )
        .unwrap();

        let result = connected_components(&view);

        assert_eq!(result.len(), 3);
        assert_eq!(result.node_component[0], result.node_component[1]);
        assert_eq!(result.node_component[2], result.node_component[3]);
        assert_eq!(result.node_component[3], result.node_component[4]);
        assert_ne!(result.node_component[0], result.node_component[2]);
        assert_eq!(result.largest(), Some(1));
        assert_eq!(result.component_nodes(&view, 1), vec![3, 4, 5]);
        assert!(!is_connected(&view));
        assert_eq!(
            ensure_connected(&view),
            Err(AlgoError::Disconnected { components: 3 })
        );
    }

    #[test]
    fn test_giant_component_tie_prefers_smallest_id() {
        // Dense order deliberately differs from id order
        let view = GraphView::from_edges(
            vec![3, 2, 1, 0],
            &[(0, 1, 1.0), (2, 3, 1.0)],
        )
        .unwrap();

        let giant = giant_component(&view).unwrap();
        assert_eq!(giant.index_to_node, vec![0, 1]);
        assert_eq!(giant.edge_count(), 1);
        assert!(is_connected(&giant));
    }

    #[test]
    fn test_giant_component_without_edges() {
        let view = GraphView::from_edges(vec![7, 5, 9], &[]).unwrap();
        let giant = giant_component(&view).unwrap();
        assert_eq!(giant.index_to_node, vec![5]);
        assert_eq!(giant.edge_count(), 0);
    }

    #[test]
    fn test_empty_graph() {
        let view = GraphView::from_edges(vec![], &[]).unwrap();
        assert_eq!(giant_component(&view).unwrap_err(), AlgoError::EmptyGraph);
        assert!(!is_connected(&view));
    }
}
