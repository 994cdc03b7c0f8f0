//! Feature transform stage
//!
//! Maps a feature matrix to a new one according to the study mode. Row
//! identity and order are preserved; only columns change.

pub mod pca;
pub mod power;

pub use pca::{IncrementalPca, PcaConfig};
pub use power::{yeo_johnson, PowerTransform};

use crate::config::{PipelineConfig, StudyMode};
use crate::dataset::FeatureMatrix;
use crate::error::PipelineResult;
use serde::{Deserialize, Serialize};
use tracing::info;

/// What a transform run did to the columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformSummary {
    pub mode: StudyMode,
    pub input_columns: usize,
    pub output_columns: usize,
    /// Explained-variance ratio of each fitted component (reduced modes)
    pub explained_variance_ratio: Vec<f64>,
    /// Cumulative ratio of the kept components (reduced modes)
    pub cumulative_variance: Option<f64>,
    /// Fitted Yeo-Johnson λ per input column (normalized modes)
    pub lambdas: Vec<f64>,
}

/// Yeo-Johnson with standardization; column names gain a `-yj` suffix
pub fn normalize(matrix: &FeatureMatrix) -> PipelineResult<(FeatureMatrix, Vec<f64>)> {
    let fitted = PowerTransform::fit(matrix.values(), matrix.columns())?;
    let values = fitted.transform(matrix.values());
    let columns = matrix.columns().iter().map(|c| format!("{}-yj", c)).collect();
    Ok((matrix.derive(values, columns), fitted.lambdas().to_vec()))
}

/// Incremental PCA keeping the shortest component prefix that reaches
/// `min_variance`
pub fn reduce(matrix: &FeatureMatrix, config: &PcaConfig) -> PipelineResult<(FeatureMatrix, IncrementalPca, usize)> {
    let fitted = IncrementalPca::fit(matrix.values(), config.max_components, config.batch_size)?;
    let keep = fitted.retained(config.min_variance);
    let values = fitted.transform(matrix.values(), keep);
    let columns = (0..keep).map(|k| format!("component{}", k)).collect();
    Ok((matrix.derive(values, columns), fitted, keep))
}

/// Run the transforms selected by `config.mode`.
///
/// In the combined mode the power transform runs first and PCA reduces its
/// standardized output.
pub fn apply_study(
    matrix: &FeatureMatrix,
    config: &PipelineConfig,
) -> PipelineResult<(FeatureMatrix, TransformSummary)> {
    let mode = config.mode;
    let mut summary = TransformSummary {
        mode,
        input_columns: matrix.column_count(),
        output_columns: matrix.column_count(),
        explained_variance_ratio: Vec::new(),
        cumulative_variance: None,
        lambdas: Vec::new(),
    };

    let mut current = matrix.clone();

    if mode.normalizes() {
        let (normalized, lambdas) = normalize(&current)?;
        summary.lambdas = lambdas;
        current = normalized;
    }

    if mode.reduces() {
        let (reduced, fitted, keep) = reduce(&current, &config.pca())?;
        let ratios = fitted.explained_variance_ratio().to_vec();
        summary.cumulative_variance = Some(ratios[..keep].iter().sum());
        summary.explained_variance_ratio = ratios;
        current = reduced;
    }

    summary.output_columns = current.column_count();
    info!(
        "transform '{}': {} -> {} columns",
        mode, summary.input_columns, summary.output_columns
    );

    Ok((current, summary))
}
