//! Run configuration
//!
//! One record per run: similarity threshold, study mode and the PCA
//! parameters, plus Louvain tuning.

use crate::error::{PipelineError, PipelineResult};
use crate::transform::PcaConfig;
use graphly_algorithms::LouvainConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which transforms run before the similarity graph is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyMode {
    /// Features as supplied
    #[default]
    Raw,
    /// Incremental PCA
    Reduced,
    /// Yeo-Johnson power transform with standardization
    Normalized,
    /// Yeo-Johnson followed by incremental PCA
    ReducedNormalized,
}

impl StudyMode {
    pub const ALL: [StudyMode; 4] = [
        StudyMode::Raw,
        StudyMode::Reduced,
        StudyMode::Normalized,
        StudyMode::ReducedNormalized,
    ];

    /// Short study name used in reports and file names
    pub fn as_str(&self) -> &'static str {
        match self {
            StudyMode::Raw => "original",
            StudyMode::Reduced => "pca",
            StudyMode::Normalized => "yj",
            StudyMode::ReducedNormalized => "pca+yj",
        }
    }

    /// Numeric study code (0..=3)
    pub fn code(&self) -> u8 {
        match self {
            StudyMode::Raw => 0,
            StudyMode::Reduced => 1,
            StudyMode::Normalized => 2,
            StudyMode::ReducedNormalized => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn reduces(&self) -> bool {
        matches!(self, StudyMode::Reduced | StudyMode::ReducedNormalized)
    }

    pub fn normalizes(&self) -> bool {
        matches!(self, StudyMode::Normalized | StudyMode::ReducedNormalized)
    }
}

impl fmt::Display for StudyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StudyMode {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "original" | "raw" | "0" => Ok(StudyMode::Raw),
            "pca" | "reduced" | "1" => Ok(StudyMode::Reduced),
            "yj" | "normalized" | "2" => Ok(StudyMode::Normalized),
            "pca+yj" | "reduced_normalized" | "3" => Ok(StudyMode::ReducedNormalized),
            other => Err(PipelineError::validation(
                "mode",
                other,
                "expected one of original, pca, yj, pca+yj",
            )),
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Similarity threshold in [0, 1]; pairs with similarity >= threshold become edges
    pub threshold: f64,
    pub mode: StudyMode,
    /// Maximum number of principal components (reduced modes)
    pub max_components: usize,
    /// Minimum cumulative explained variance, in percent (reduced modes)
    pub min_variance: f64,
    /// Rows per PCA batch; defaults to 5 x feature count
    pub pca_batch_size: Option<usize>,
    pub louvain: LouvainConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            mode: StudyMode::Raw,
            max_components: 15,
            min_variance: 90.0,
            pca_batch_size: None,
            louvain: LouvainConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_mode(mut self, mode: StudyMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_pca(mut self, max_components: usize, min_variance: f64) -> Self {
        self.max_components = max_components;
        self.min_variance = min_variance;
        self
    }

    /// Reduction parameters as a standalone record
    pub fn pca(&self) -> PcaConfig {
        PcaConfig {
            max_components: self.max_components,
            min_variance: self.min_variance,
            batch_size: self.pca_batch_size,
        }
    }

    /// Check ranges that do not depend on the dataset
    pub fn validate(&self) -> PipelineResult<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(PipelineError::validation(
                "threshold",
                self.threshold,
                "must lie in [0, 1]",
            ));
        }

        if self.mode.reduces() {
            if self.max_components == 0 {
                return Err(PipelineError::validation(
                    "max_components",
                    self.max_components,
                    "must be at least 1",
                ));
            }
            if !(self.min_variance > 0.0 && self.min_variance <= 100.0) {
                return Err(PipelineError::validation(
                    "min_variance",
                    self.min_variance,
                    "must lie in (0, 100]",
                ));
            }
            if self.pca_batch_size == Some(0) {
                return Err(PipelineError::validation(
                    "pca_batch_size",
                    0,
                    "must be at least 1",
                ));
            }
        }

        let resolution = self.louvain.resolution;
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(PipelineError::validation(
                "louvain.resolution",
                resolution,
                "must be positive",
            ));
        }
        let min_improvement = self.louvain.min_improvement;
        if !(min_improvement.is_finite() && min_improvement >= 0.0) {
            return Err(PipelineError::validation(
                "louvain.min_improvement",
                min_improvement,
                "must be finite and non-negative",
            ));
        }
        if self.louvain.max_passes == 0 {
            return Err(PipelineError::validation(
                "louvain.max_passes",
                0,
                "must be at least 1",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.mode, StudyMode::Raw);
        assert_eq!(config.threshold, 0.5);
    }

    #[test]
    fn test_threshold_range() {
        for bad in [-0.1, 1.01, f64::NAN] {
            let err = PipelineConfig::default().with_threshold(bad).validate().unwrap_err();
            assert!(matches!(err, PipelineError::Validation { ref parameter, .. } if parameter == "threshold"));
        }
        assert!(PipelineConfig::default().with_threshold(0.0).validate().is_ok());
        assert!(PipelineConfig::default().with_threshold(1.0).validate().is_ok());
    }

    #[test]
    fn test_louvain_min_improvement_checked() {
        for bad in [-1e-7, f64::NAN, f64::INFINITY] {
            let mut config = PipelineConfig::default();
            config.louvain.min_improvement = bad;
            let err = config.validate().unwrap_err();
            assert!(matches!(err, PipelineError::Validation { ref parameter, .. } if parameter == "louvain.min_improvement"));
        }
        let mut config = PipelineConfig::default();
        config.louvain.min_improvement = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_pca_parameters_checked_only_when_reducing() {
        let raw = PipelineConfig::default().with_pca(0, 0.0);
        assert!(raw.validate().is_ok());

        let reduced = raw.with_mode(StudyMode::Reduced);
        assert!(reduced.validate().is_err());
        assert!(reduced.with_pca(3, 70.0).validate().is_ok());
    }

    #[test]
    fn test_mode_names_and_codes() {
        for mode in StudyMode::ALL {
            assert_eq!(StudyMode::from_code(mode.code()), Some(mode));
            assert_eq!(mode.as_str().parse::<StudyMode>().unwrap(), mode);
        }
        assert_eq!(StudyMode::from_code(4), None);
        assert!("umap".parse::<StudyMode>().is_err());
        assert!(StudyMode::ReducedNormalized.reduces());
        assert!(StudyMode::ReducedNormalized.normalizes());
        assert!(!StudyMode::Raw.normalizes());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"threshold": 0.8, "mode": "reduced_normalized"}"#).unwrap();
        assert_eq!(config.threshold, 0.8);
        assert_eq!(config.mode, StudyMode::ReducedNormalized);
        assert_eq!(config.max_components, 15);
        assert_eq!(config.louvain, LouvainConfig::default());
    }
}
