//! Incremental principal component analysis
//!
//! Rows are consumed in batches. Each batch contributes its mean and scatter
//! matrix, merged into running totals, so the full covariance is never
//! rebuilt from scratch. Components are the eigenvectors of the merged
//! covariance, ordered by descending eigenvalue.

use crate::error::{PipelineError, PipelineResult};
use nalgebra::{DMatrix, DVector, SymmetricEigen};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Relative slack when comparing cumulative variance against a target
const RETAIN_TOLERANCE: f64 = 1e-9;

/// Reduction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PcaConfig {
    /// Components to fit (C)
    pub max_components: usize,
    /// Minimum cumulative explained variance, in percent
    pub min_variance: f64,
    /// Rows per batch; `None` means 5 x feature count
    pub batch_size: Option<usize>,
}

impl Default for PcaConfig {
    fn default() -> Self {
        Self {
            max_components: 15,
            min_variance: 90.0,
            batch_size: None,
        }
    }
}

/// Running mean and scatter over the rows seen so far
struct Moments {
    samples: usize,
    mean: DVector<f64>,
    scatter: DMatrix<f64>,
}

impl Moments {
    fn new(features: usize) -> Self {
        Self {
            samples: 0,
            mean: DVector::zeros(features),
            scatter: DMatrix::zeros(features, features),
        }
    }

    fn of_batch(batch: ArrayView2<'_, f64>) -> Self {
        let (rows, features) = batch.dim();
        let mut mean = DVector::zeros(features);
        for row in batch.rows() {
            for (j, &x) in row.iter().enumerate() {
                mean[j] += x;
            }
        }
        mean /= rows as f64;

        let centered = DMatrix::from_fn(rows, features, |i, j| batch[[i, j]] - mean[j]);
        let scatter = centered.transpose() * &centered;

        Self {
            samples: rows,
            mean,
            scatter,
        }
    }

    /// Chan's pairwise update
    fn merge(&mut self, other: Moments) {
        if other.samples == 0 {
            return;
        }
        if self.samples == 0 {
            *self = other;
            return;
        }

        let total = (self.samples + other.samples) as f64;
        let weight = (self.samples * other.samples) as f64 / total;
        let delta = &other.mean - &self.mean;

        self.mean += &delta * (other.samples as f64 / total);
        self.scatter += other.scatter + (&delta * delta.transpose()) * weight;
        self.samples += other.samples;
    }
}

/// Fitted principal axes
#[derive(Debug, Clone)]
pub struct IncrementalPca {
    /// C x F, one unit-length component per row
    components: Array2<f64>,
    mean: Array1<f64>,
    explained_variance: Vec<f64>,
    explained_variance_ratio: Vec<f64>,
    samples: usize,
}

impl IncrementalPca {
    /// Fit `n_components` axes over `values` (N x F), `batch_size` rows at a time
    pub fn fit(
        values: &Array2<f64>,
        n_components: usize,
        batch_size: Option<usize>,
    ) -> PipelineResult<Self> {
        let (rows, features) = values.dim();
        if n_components == 0 || n_components > features {
            return Err(PipelineError::validation(
                "max_components",
                n_components,
                format!("must lie in [1, {}] (feature count)", features),
            ));
        }
        if rows < n_components + 1 {
            return Err(PipelineError::validation(
                "rows",
                rows,
                format!("need at least {} rows for {} components", n_components + 1, n_components),
            ));
        }

        let batch_size = batch_size.unwrap_or(5 * features);
        if batch_size == 0 {
            return Err(PipelineError::validation("pca_batch_size", 0, "must be at least 1"));
        }

        let mut moments = Moments::new(features);
        for batch in values.axis_chunks_iter(Axis(0), batch_size) {
            moments.merge(Moments::of_batch(batch));
        }

        let covariance = moments.scatter / (moments.samples - 1) as f64;
        let total_variance = covariance.trace();
        if !(total_variance.is_finite() && total_variance > 0.0) {
            return Err(PipelineError::Numerical(
                "feature matrix has zero total variance".to_string(),
            ));
        }

        let eigen = SymmetricEigen::new(covariance);
        let mut order: Vec<usize> = (0..features).collect();
        order.sort_by(|&a, &b| {
            eigen.eigenvalues[b]
                .partial_cmp(&eigen.eigenvalues[a])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });

        let mut components = Array2::zeros((n_components, features));
        let mut explained_variance = Vec::with_capacity(n_components);
        for (k, &col) in order.iter().take(n_components).enumerate() {
            let axis = eigen.eigenvectors.column(col);

            // Sign convention: the largest-magnitude loading is positive
            let pivot = axis
                .iter()
                .copied()
                .fold(0.0_f64, |best, x| if x.abs() > best.abs() { x } else { best });
            let sign = if pivot < 0.0 { -1.0 } else { 1.0 };

            for j in 0..features {
                components[[k, j]] = sign * axis[j];
            }
            explained_variance.push(eigen.eigenvalues[col].max(0.0));
        }

        let explained_variance_ratio = explained_variance
            .iter()
            .map(|v| v / total_variance)
            .collect();

        debug!(
            "incremental PCA fitted: {} rows, {} features, {} components",
            moments.samples, features, n_components
        );

        Ok(Self {
            components,
            mean: Array1::from_iter(moments.mean.iter().copied()),
            explained_variance,
            explained_variance_ratio,
            samples: moments.samples,
        })
    }

    /// Project rows onto the first `keep` components
    pub fn transform(&self, values: &Array2<f64>, keep: usize) -> Array2<f64> {
        let keep = keep.min(self.components.nrows());
        let centered = values - &self.mean;
        let axes = self.components.slice(ndarray::s![..keep, ..]);
        centered.dot(&axes.t())
    }

    /// Shortest prefix of components whose cumulative ratio reaches
    /// `min_variance` percent; all components when it is never reached
    pub fn retained(&self, min_variance: f64) -> usize {
        // rounding in the ratios must not push an exact boundary past V
        let target = min_variance - RETAIN_TOLERANCE * min_variance.max(1.0);
        let mut cumulative = 0.0;
        for (k, ratio) in self.explained_variance_ratio.iter().enumerate() {
            cumulative += ratio;
            if cumulative * 100.0 >= target {
                return k + 1;
            }
        }
        self.explained_variance_ratio.len()
    }

    pub fn components(&self) -> &Array2<f64> {
        &self.components
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn explained_variance(&self) -> &[f64] {
        &self.explained_variance
    }

    pub fn explained_variance_ratio(&self) -> &[f64] {
        &self.explained_variance_ratio
    }

    pub fn samples(&self) -> usize {
        self.samples
    }
}
