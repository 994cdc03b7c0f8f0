pub mod common;
pub mod error;
pub mod components;
pub mod pathfinding;
pub mod topology;
pub mod louvain;
pub mod current_flow;
pub mod centrality;

pub use common::{GraphView, NodeId};
pub use error::{AlgoError, AlgoResult};
pub use components::{connected_components, ensure_connected, giant_component, is_connected, ComponentsResult};
pub use pathfinding::{bfs_distances, dijkstra_dag, ShortestPathDag};
pub use topology::weighted_clustering;
pub use louvain::{louvain, modularity, ConvergenceWarning, LouvainConfig, LouvainResult};
pub use current_flow::{current_flow_betweenness, current_flow_closeness};
pub use centrality::{
    betweenness_centrality, closeness_centrality, degree_centrality, harmonic_centrality,
    load_centrality, CentralityMetrics,
};
