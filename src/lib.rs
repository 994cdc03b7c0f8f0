//! Graphly
//!
//! Similarity networks and modularity communities from tabular feature data.
//!
//! # Pipeline
//!
//! 1. [`transform`]: optional incremental PCA and/or Yeo-Johnson normalization
//!    of the feature matrix, selected by [`StudyMode`].
//! 2. [`similarity`]: pairwise cosine similarity; entries below the threshold
//!    are dropped.
//! 3. [`algo`]: the thresholded matrix becomes an undirected weighted graph.
//!    Its giant component goes through Louvain community detection and eight
//!    centrality metrics.
//!
//! Graph algorithms live in the `graphly-algorithms` crate; this crate owns
//! the data model, the transforms and the orchestration.
//!
//! ## Example Usage
//!
//! ```rust
//! use graphly::{FeatureMatrix, Pipeline, PipelineConfig, StudyMode};
//!
//! let matrix = FeatureMatrix::from_rows_positional(vec![
//!     vec![1.0, 0.0],
//!     vec![0.9, 0.1],
//!     vec![0.0, 1.0],
//!     vec![0.1, 0.9],
//! ])
//! .unwrap();
//!
//! let config = PipelineConfig::default()
//!     .with_threshold(0.5)
//!     .with_mode(StudyMode::Raw);
//! let output = Pipeline::new(config).unwrap().run(&matrix).unwrap();
//!
//! let report = output.report();
//! assert_eq!(report.graph.nodes, 4);
//! assert_eq!(report.louvain.sizes.iter().sum::<usize>(), 2);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod config;
pub mod dataset;
pub mod error;
pub mod pipeline;
pub mod similarity;
pub mod transform;

// Re-export main types for convenience
pub use algo::{
    CentralityRow, CentralityTable, CommunityAssignment, CommunityReport, GraphSummary,
    LabeledEdge, SimilarityGraph,
};
pub use config::{PipelineConfig, StudyMode};
pub use dataset::FeatureMatrix;
pub use error::{PipelineError, PipelineResult};
pub use pipeline::{GraphInfo, LouvainInfo, Pipeline, PipelineOutput, RunReport};
pub use similarity::SimilarityMatrix;
pub use transform::{PcaConfig, TransformSummary};

pub use graphly_algorithms::{ConvergenceWarning, LouvainConfig};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let ver = version();
        assert!(!ver.is_empty());
        assert_eq!(ver, "0.3.0");
    }
}
