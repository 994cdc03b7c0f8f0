//! Community detection over the giant component

use super::SimilarityGraph;
use crate::error::PipelineResult;
use graphly_algorithms::{louvain, ConvergenceWarning, LouvainConfig};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Community of one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityAssignment {
    pub label: String,
    pub community: usize,
}

/// Louvain partition of the giant component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityReport {
    pub community_count: usize,
    /// Indexed by community id
    pub community_sizes: Vec<usize>,
    pub modularity: f64,
    /// Aggregation levels kept in the dendrogram
    pub levels: usize,
    pub warnings: Vec<ConvergenceWarning>,
    /// One entry per giant-component node, ascending node order
    pub assignments: Vec<CommunityAssignment>,
    /// Community per dense index of the giant component
    pub partition: Vec<usize>,
}

impl CommunityReport {
    pub fn detect(graph: &SimilarityGraph, config: &LouvainConfig) -> PipelineResult<Self> {
        let result = louvain(graph.giant_component(), config)?;

        for warning in &result.warnings {
            warn!("{}", warning);
        }
        info!(
            "louvain: {} communities over {} levels, modularity {:.6}",
            result.community_count,
            result.levels.len(),
            result.modularity
        );

        let assignments = graph
            .giant_labels()
            .into_iter()
            .zip(&result.partition)
            .map(|(label, &community)| CommunityAssignment {
                label: label.to_string(),
                community,
            })
            .collect();

        Ok(Self {
            community_count: result.community_count,
            community_sizes: result.community_sizes,
            modularity: result.modularity,
            levels: result.levels.len(),
            warnings: result.warnings,
            assignments,
            partition: result.partition,
        })
    }

    /// Community of an entity, if it belongs to the giant component
    pub fn community_of(&self, label: &str) -> Option<usize> {
        self.assignments
            .iter()
            .find(|a| a.label == label)
            .map(|a| a.community)
    }

    /// Members of a community, in ascending node order
    pub fn members(&self, community: usize) -> Vec<&str> {
        self.assignments
            .iter()
            .filter(|a| a.community == community)
            .map(|a| a.label.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::FeatureMatrix;
    use crate::similarity::SimilarityMatrix;

    /// Two tight direction bundles joined by one bridging row
    fn bundles() -> SimilarityGraph {
        let rows = vec![
            vec![1.0, 0.0, 0.0],
            vec![1.0, 0.05, 0.0],
            vec![1.0, 0.0, 0.05],
            vec![1.0, 0.05, 0.05],
            vec![0.0, 1.0, 0.0],
            vec![0.05, 1.0, 0.0],
            vec![0.0, 1.0, 0.05],
            vec![0.05, 1.0, 0.05],
            vec![1.0, 1.0, 0.0],
        ];
        let ids = ["a1", "a2", "a3", "a4", "b1", "b2", "b3", "b4", "bridge"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let matrix = FeatureMatrix::new(ids, rows).unwrap();
        let sim = SimilarityMatrix::build(&matrix, 0.7).unwrap();
        SimilarityGraph::build(&sim).unwrap()
    }

    #[test]
    fn test_detects_bundles() {
        let graph = bundles();
        assert_eq!(graph.giant_component().node_count, 9);

        let report = CommunityReport::detect(&graph, &LouvainConfig::default()).unwrap();
        assert_eq!(report.community_count, 2);
        assert_eq!(report.community_of("a1"), Some(0));
        assert_eq!(report.community_of("b4"), Some(1));
        assert_eq!(report.members(0)[..4], ["a1", "a2", "a3", "a4"]);
        assert_eq!(report.community_sizes.iter().sum::<usize>(), 9);
        assert!(report.modularity > 0.25);
        assert!(report.warnings.is_empty());
        assert_eq!(report.community_of("nowhere"), None);
    }
}
