//! Thresholded cosine similarity between feature rows

use crate::dataset::FeatureMatrix;
use crate::error::{PipelineError, PipelineResult};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Cosine similarity of two vectors with precomputed norms.
///
/// A zero vector is similar to nothing: the result is 0.
pub fn cosine_similarity(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>, norm_a: f64, norm_b: f64) -> f64 {
    if norm_a <= 0.0 || norm_b <= 0.0 {
        return 0.0;
    }
    let dot = a.dot(&b);
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Divide each row by its largest absolute entry.
///
/// Cosine similarity is scale invariant; bringing entries into [-1, 1]
/// keeps squared norms of very large or very small rows finite and nonzero.
fn scale_rows(values: &Array2<f64>) -> Array2<f64> {
    let mut scaled = values.clone();
    for mut row in scaled.rows_mut() {
        let peak = row.iter().fold(0.0_f64, |m, x| m.max(x.abs()));
        if peak > 0.0 {
            row.mapv_inplace(|x| x / peak);
        }
    }
    scaled
}

/// Symmetric N x N similarity matrix after thresholding.
///
/// The diagonal is exactly zero and every entry below the threshold is
/// zeroed, so a positive entry is an edge weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    labels: Vec<String>,
    threshold: f64,
    values: Array2<f64>,
}

impl SimilarityMatrix {
    /// Pairwise cosine similarity of the rows of `matrix`, keeping entries
    /// `>= threshold`
    pub fn build(matrix: &FeatureMatrix, threshold: f64) -> PipelineResult<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(PipelineError::validation("threshold", threshold, "must lie in [0, 1]"));
        }

        let n = matrix.row_count();
        let rows = scale_rows(matrix.values());
        let norms: Vec<f64> = rows.rows().into_iter().map(|row| row.dot(&row).sqrt()).collect();

        let mut values = Array2::zeros((n, n));
        for i in 0..n {
            for j in (i + 1)..n {
                let s = cosine_similarity(rows.row(i), rows.row(j), norms[i], norms[j]);
                if s >= threshold {
                    values[[i, j]] = s;
                    values[[j, i]] = s;
                }
            }
        }

        let zero_rows = norms.iter().filter(|&&norm| norm <= 0.0).count();
        if zero_rows > 0 {
            debug!("{} zero-norm rows have similarity 0 to every row", zero_rows);
        }

        Ok(Self {
            labels: matrix.ids().map(str::to_string).collect(),
            threshold,
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Entity ids labelling rows and columns
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[[i, j]]
    }

    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.values.row(i)
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Unordered pairs `(i, j, w)` with `i < j` and `w > 0`
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let n = self.len();
        (0..n).flat_map(move |i| {
            ((i + 1)..n).filter_map(move |j| {
                let w = self.values[[i, j]];
                (w > 0.0).then_some((i, j, w))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_rows() -> FeatureMatrix {
        FeatureMatrix::from_rows_positional(vec![
            vec![1.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![0.0, 1.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_cosine_values() {
        let matrix = FeatureMatrix::from_rows_positional(vec![
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![-1.0, 0.0],
        ])
        .unwrap();
        let sim = SimilarityMatrix::build(&matrix, 0.0).unwrap();

        assert!((sim.get(0, 1) - 1.0 / 2f64.sqrt()).abs() < 1e-12);
        // negative similarity is below any threshold
        assert_eq!(sim.get(0, 2), 0.0);
        assert_eq!(sim.get(1, 1), 0.0);
    }

    #[test]
    fn test_threshold_and_edges() {
        let sim = SimilarityMatrix::build(&four_rows(), 0.99).unwrap();
        let edges: Vec<_> = sim.edges().collect();
        assert_eq!(edges, vec![(0, 1, 1.0), (2, 3, 1.0)]);
        assert_eq!(sim.labels(), &["0", "1", "2", "3"]);
        assert_eq!(sim.row(2).to_vec(), vec![0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_zero_vector_rows() {
        let matrix = FeatureMatrix::from_rows_positional(vec![
            vec![0.0, 0.0],
            vec![1.0, 2.0],
            vec![2.0, 4.0],
        ])
        .unwrap();
        let sim = SimilarityMatrix::build(&matrix, 0.0).unwrap();
        assert_eq!(sim.row(0).to_vec(), vec![0.0; 3]);
        assert!((sim.get(1, 2) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_extreme_magnitudes() {
        let large = FeatureMatrix::from_rows_positional(vec![
            vec![1e200, 1e200],
            vec![2e200, 2e200],
            vec![1e200, -1e200],
        ])
        .unwrap();
        let sim = SimilarityMatrix::build(&large, 0.0).unwrap();
        assert!((sim.get(0, 1) - 1.0).abs() < 1e-12);
        assert_eq!(sim.get(0, 2), 0.0);

        let tiny = FeatureMatrix::from_rows_positional(vec![
            vec![1e-200, 0.0],
            vec![3e-200, 0.0],
            vec![1e-200, 1e-200],
        ])
        .unwrap();
        let sim = SimilarityMatrix::build(&tiny, 0.0).unwrap();
        assert!((sim.get(0, 1) - 1.0).abs() < 1e-12);
        assert!((sim.get(0, 2) - 1.0 / 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_symmetric_with_zero_diagonal() {
        let matrix = FeatureMatrix::from_rows_positional(
            (0..7)
                .map(|i| vec![(i as f64).sin(), (i as f64 * 0.7).cos(), 1.0 + i as f64 * 0.1])
                .collect(),
        )
        .unwrap();
        let sim = SimilarityMatrix::build(&matrix, 0.3).unwrap();
        for i in 0..sim.len() {
            assert_eq!(sim.get(i, i), 0.0);
            for j in 0..sim.len() {
                assert_eq!(sim.get(i, j), sim.get(j, i));
                let s = sim.get(i, j);
                assert!(s == 0.0 || (0.3..=1.0).contains(&s));
            }
        }
    }

    #[test]
    fn test_rejects_bad_threshold() {
        assert!(SimilarityMatrix::build(&four_rows(), 1.5).unwrap_err().is_validation());
    }
}
