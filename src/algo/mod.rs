//! Graph stage
//!
//! Algorithms live in the `graphly-algorithms` crate. This module is the
//! adapter: it turns a thresholded similarity matrix into a `GraphView`,
//! extracts the giant component and carries entity labels alongside the
//! dense node ids.

pub mod centrality;
pub mod community;

pub use centrality::{CentralityRow, CentralityTable};
pub use community::{CommunityAssignment, CommunityReport};

pub use graphly_algorithms::{
    connected_components, giant_component, is_connected, louvain, modularity, ComponentsResult,
    ConvergenceWarning, GraphView, LouvainConfig, LouvainResult, NodeId,
};

use crate::error::PipelineResult;
use crate::similarity::SimilarityMatrix;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Build a GraphView whose NodeIds are row positions of the similarity matrix
pub fn build_view(similarity: &SimilarityMatrix) -> PipelineResult<GraphView> {
    let nodes: Vec<NodeId> = (0..similarity.len() as NodeId).collect();
    let edges: Vec<(NodeId, NodeId, f64)> = similarity
        .edges()
        .map(|(i, j, w)| (i as NodeId, j as NodeId, w))
        .collect();
    Ok(GraphView::from_edges(nodes, &edges)?)
}

/// Size and density of the full graph, before giant-component extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub node_count: usize,
    pub edge_count: usize,
    /// Sum of weighted degrees over node count
    pub mean_degree: f64,
}

impl GraphSummary {
    pub fn of(view: &GraphView) -> Self {
        let node_count = view.node_count;
        let total: f64 = (0..node_count).map(|idx| view.weighted_degree(idx)).sum();
        let mean_degree = if node_count == 0 {
            0.0
        } else {
            total / node_count as f64
        };
        Self {
            node_count,
            edge_count: view.edge_count(),
            mean_degree,
        }
    }
}

/// Weighted edge between two entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledEdge {
    pub source: String,
    pub target: String,
    pub weight: f64,
}

/// The similarity graph together with its giant component
#[derive(Debug, Clone)]
pub struct SimilarityGraph {
    labels: Vec<String>,
    full: GraphView,
    giant: GraphView,
    summary: GraphSummary,
}

impl SimilarityGraph {
    pub fn build(similarity: &SimilarityMatrix) -> PipelineResult<Self> {
        let full = build_view(similarity)?;
        let summary = GraphSummary::of(&full);
        let giant = giant_component(&full)?;

        info!(
            "similarity graph: {} nodes, {} edges, giant component {} nodes / {} edges",
            summary.node_count,
            summary.edge_count,
            giant.node_count,
            giant.edge_count()
        );
        if summary.edge_count == 0 && summary.node_count > 1 {
            warn!(
                "no pair reaches threshold {}; giant component is a single node",
                similarity.threshold()
            );
        }

        Ok(Self {
            labels: similarity.labels().to_vec(),
            full,
            giant,
            summary,
        })
    }

    /// Graph over every entity
    pub fn full(&self) -> &GraphView {
        &self.full
    }

    /// Largest connected component, nodes in ascending NodeId order
    pub fn giant_component(&self) -> &GraphView {
        &self.giant
    }

    pub fn summary(&self) -> &GraphSummary {
        &self.summary
    }

    /// Entity id of a node
    pub fn label(&self, node: NodeId) -> &str {
        &self.labels[node as usize]
    }

    /// Entity ids of the giant component, in its dense order
    pub fn giant_labels(&self) -> Vec<&str> {
        self.giant
            .index_to_node
            .iter()
            .map(|&node| self.label(node))
            .collect()
    }

    /// Giant-component edges with entity labels, for persistence
    pub fn edges(&self) -> Vec<LabeledEdge> {
        self.giant
            .edges()
            .map(|(u, v, weight)| LabeledEdge {
                source: self.label(self.giant.index_to_node[u]).to_string(),
                target: self.label(self.giant.index_to_node[v]).to_string(),
                weight,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::FeatureMatrix;

    fn graph(rows: Vec<Vec<f64>>, threshold: f64) -> SimilarityGraph {
        let matrix = FeatureMatrix::from_rows_positional(rows).unwrap();
        let sim = SimilarityMatrix::build(&matrix, threshold).unwrap();
        SimilarityGraph::build(&sim).unwrap()
    }

    #[test]
    fn test_two_pairs_pick_lowest_ids() {
        let g = graph(
            vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0], vec![0.0, 1.0]],
            0.99,
        );
        assert_eq!(
            g.summary(),
            &GraphSummary {
                node_count: 4,
                edge_count: 2,
                mean_degree: 1.0
            }
        );
        assert_eq!(g.giant_labels(), vec!["0", "1"]);
        assert_eq!(
            g.edges(),
            vec![LabeledEdge {
                source: "0".into(),
                target: "1".into(),
                weight: 1.0
            }]
        );
    }

    #[test]
    fn test_no_edges_leaves_single_node() {
        let g = graph(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![-1.0, 0.0]], 0.5);
        assert_eq!(g.summary().edge_count, 0);
        assert_eq!(g.summary().mean_degree, 0.0);
        assert_eq!(g.giant_component().node_count, 1);
        assert_eq!(g.giant_labels(), vec!["0"]);
        assert!(is_connected(g.giant_component()));
    }

    #[test]
    fn test_giant_component_is_largest() {
        // rows 2 to 4 point nearly the same way; rows 0 and 1 stay isolated
        let g = graph(
            vec![
                vec![1.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0],
                vec![0.0, 0.0, 1.0],
                vec![0.0, 0.1, 1.0],
                vec![0.1, 0.0, 1.0],
            ],
            0.9,
        );
        assert_eq!(g.giant_labels(), vec!["2", "3", "4"]);
        assert!(is_connected(g.giant_component()));
        assert_eq!(g.full().node_count, 5);
    }
}
