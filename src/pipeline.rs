//! End-to-end run: transform, similarity graph, communities, centralities
//!
//! Every stage returns a new immutable value; a run either yields all of
//! them or fails before producing any.

use crate::algo::{CentralityTable, CommunityReport, GraphSummary, SimilarityGraph};
use crate::config::PipelineConfig;
use crate::dataset::FeatureMatrix;
use crate::error::PipelineResult;
use crate::similarity::SimilarityMatrix;
use crate::transform::{apply_study, TransformSummary};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

/// Graph part of the external summary record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphInfo {
    pub nodes: usize,
    pub edges: usize,
    pub degree: f64,
}

/// Partition part of the external summary record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LouvainInfo {
    pub communities: usize,
    pub sizes: Vec<usize>,
    pub modularity: f64,
}

/// Summary record handed to result writers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub graph: GraphInfo,
    pub louvain: LouvainInfo,
}

/// Everything a run produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub transformed: FeatureMatrix,
    pub transform_summary: TransformSummary,
    pub similarity: SimilarityMatrix,
    pub graph: SimilarityGraph,
    pub communities: CommunityReport,
    pub centrality: CentralityTable,
}

impl PipelineOutput {
    pub fn report(&self) -> RunReport {
        let summary: &GraphSummary = self.graph.summary();
        RunReport {
            graph: GraphInfo {
                nodes: summary.node_count,
                edges: summary.edge_count,
                degree: summary.mean_degree,
            },
            louvain: LouvainInfo {
                communities: self.communities.community_count,
                sizes: self.communities.community_sizes.clone(),
                modularity: self.communities.modularity,
            },
        }
    }
}

/// A validated configuration ready to run
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run(&self, matrix: &FeatureMatrix) -> PipelineResult<PipelineOutput> {
        let start = Instant::now();
        info!(
            "running study '{}' on {} rows x {} features, threshold {}",
            self.config.mode,
            matrix.row_count(),
            matrix.column_count(),
            self.config.threshold
        );

        let (transformed, transform_summary) = apply_study(matrix, &self.config)?;
        let similarity = SimilarityMatrix::build(&transformed, self.config.threshold)?;
        let graph = SimilarityGraph::build(&similarity)?;
        let communities = CommunityReport::detect(&graph, &self.config.louvain)?;
        let centrality = CentralityTable::compute(&graph, &communities)?;

        info!(
            "study '{}' finished in {:?}: {} communities, modularity {:.6}",
            self.config.mode,
            start.elapsed(),
            communities.community_count,
            communities.modularity
        );

        Ok(PipelineOutput {
            transformed,
            transform_summary,
            similarity,
            graph,
            communities,
            centrality,
        })
    }
}
