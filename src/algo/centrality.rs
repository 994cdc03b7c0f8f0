//! Per-node centrality table joined with communities

use super::{CommunityReport, SimilarityGraph};
use crate::error::PipelineResult;
use graphly_algorithms::CentralityMetrics;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Metrics of one giant-component node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralityRow {
    pub label: String,
    pub community: usize,
    pub degree: f64,
    pub clustering: f64,
    pub closeness: f64,
    pub current_flow_closeness: f64,
    pub betweenness: f64,
    pub current_flow_betweenness: f64,
    pub load: f64,
    pub harmonic: f64,
}

impl CentralityRow {
    /// Metric values in `CentralityTable::COLUMN_NAMES` order
    pub fn values(&self) -> [f64; 8] {
        [
            self.degree,
            self.clustering,
            self.closeness,
            self.current_flow_closeness,
            self.betweenness,
            self.current_flow_betweenness,
            self.load,
            self.harmonic,
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CentralityTable {
    pub rows: Vec<CentralityRow>,
}

impl CentralityTable {
    /// Column headers used by external table writers
    pub const COLUMN_NAMES: [&'static str; 8] = [
        "C.grau",
        "C.clustering",
        "C.closeness",
        "C.cf.closeness",
        "C.betweenness",
        "C.cf.betweenness",
        "C.load",
        "C.harmonic",
    ];

    /// Compute all metrics on the giant component and join each row with its
    /// community
    pub fn compute(graph: &SimilarityGraph, communities: &CommunityReport) -> PipelineResult<Self> {
        let view = graph.giant_component();
        let metrics = CentralityMetrics::compute(view)?;
        debug!("centrality metrics computed for {} nodes", metrics.len());

        let rows = graph
            .giant_labels()
            .into_iter()
            .enumerate()
            .map(|(idx, label)| CentralityRow {
                label: label.to_string(),
                community: communities.partition[idx],
                degree: metrics.degree[idx],
                clustering: metrics.clustering[idx],
                closeness: metrics.closeness[idx],
                current_flow_closeness: metrics.current_flow_closeness[idx],
                betweenness: metrics.betweenness[idx],
                current_flow_betweenness: metrics.current_flow_betweenness[idx],
                load: metrics.load[idx],
                harmonic: metrics.harmonic[idx],
            })
            .collect();

        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<&CentralityRow> {
        self.rows.iter().find(|row| row.label == label)
    }
}
