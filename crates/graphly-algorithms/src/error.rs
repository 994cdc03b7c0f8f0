//! Error types for graph algorithms

use crate::common::NodeId;
use thiserror::Error;

/// Errors raised by algorithms whose preconditions do not hold
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlgoError {
    #[error("graph has no nodes")]
    EmptyGraph,

    #[error("graph is not connected ({components} components)")]
    Disconnected { components: usize },

    #[error("reduced Laplacian is not positive definite")]
    SingularLaplacian,

    #[error("edge references unknown node {0}")]
    UnknownNode(NodeId),

    #[error("self-loop on node {0}")]
    SelfLoop(NodeId),

    #[error("invalid weight {weight} on edge ({source_node}, {target_node})")]
    InvalidWeight {
        source_node: NodeId,
        target_node: NodeId,
        weight: f64,
    },
}

pub type AlgoResult<T> = Result<T, AlgoError>;
