//! Pipeline error taxonomy

use graphly_algorithms::AlgoError;
use std::fmt::Display;
use thiserror::Error;

/// Errors that abort a pipeline run
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Bad configuration or input shape; carries the parameter for retry
    #[error("invalid {parameter} = {value}: {reason}")]
    Validation {
        parameter: String,
        value: String,
        reason: String,
    },

    /// Degenerate numeric input to a transform
    #[error("numerical error: {0}")]
    Numerical(String),

    /// A graph precondition did not hold
    #[error("computation error: {0}")]
    Computation(String),
}

impl PipelineError {
    pub fn validation(
        parameter: impl Into<String>,
        value: impl Display,
        reason: impl Into<String>,
    ) -> Self {
        PipelineError::Validation {
            parameter: parameter.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, PipelineError::Validation { .. })
    }
}

impl From<AlgoError> for PipelineError {
    fn from(err: AlgoError) -> Self {
        match err {
            AlgoError::EmptyGraph => {
                PipelineError::validation("graph", "0 nodes", "graph must have at least one node")
            }
            other => PipelineError::Computation(other.to_string()),
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_parameter() {
        let err = PipelineError::validation("threshold", 1.5, "must lie in [0, 1]");
        assert_eq!(err.to_string(), "invalid threshold = 1.5: must lie in [0, 1]");
        assert!(err.is_validation());
    }

    #[test]
    fn test_algo_errors_map_into_taxonomy() {
        assert!(PipelineError::from(AlgoError::EmptyGraph).is_validation());
        assert_eq!(
            PipelineError::from(AlgoError::Disconnected { components: 3 }),
            PipelineError::Computation("graph is not connected (3 components)".to_string())
        );
    }
}
