//! Louvain community detection
//!
//! Hierarchical greedy modularity optimization. Each level runs a local
//! moving phase (nodes hop to the neighboring community with the best
//! modularity gain until no node moves) followed by aggregation (every
//! community collapses into one super-node whose internal weight becomes a
//! self-loop). Levels repeat until modularity stops improving.
//!
//! Given the same graph and configuration the result is bit-identical:
//! traversal order is either ascending node index or a permutation drawn
//! from a seeded RNG, and every floating-point sum runs in a fixed order.

use super::common::{GraphView, NodeId};
use crate::error::{AlgoError, AlgoResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Louvain configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LouvainConfig {
    /// Resolution parameter (1.0 = classic modularity)
    pub resolution: f64,
    /// Seed for shuffling the node traversal order; `None` keeps ascending order
    pub seed: Option<u64>,
    /// Cap on local-moving passes per level
    pub max_passes: usize,
    /// Minimum modularity gain for a new level to be kept
    pub min_improvement: f64,
}

impl Default for LouvainConfig {
    fn default() -> Self {
        Self {
            resolution: 1.0,
            seed: None,
            max_passes: 1000,
            min_improvement: 1e-7,
        }
    }
}

impl LouvainConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }
}

/// Raised when a local-moving phase hits `max_passes` while nodes were still moving
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceWarning {
    pub level: usize,
    pub passes: usize,
}

impl fmt::Display for ConvergenceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "local moving at level {} stopped after {} passes before reaching a local optimum",
            self.level, self.passes
        )
    }
}

/// Result of the Louvain algorithm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LouvainResult {
    /// Dense index -> community id. Ids are 0..K-1, numbered by first
    /// appearance when scanning nodes by ascending NodeId.
    pub partition: Vec<usize>,
    /// Number of communities (K)
    pub community_count: usize,
    /// Size of each community, aligned with the ids in `partition`
    pub community_sizes: Vec<usize>,
    /// Modularity of `partition` on the input graph
    pub modularity: f64,
    /// Dendrogram: `levels[0]` maps original nodes to level-0 communities,
    /// `levels[l]` maps level-(l-1) communities to level-l communities.
    pub levels: Vec<Vec<usize>>,
    pub warnings: Vec<ConvergenceWarning>,
}

impl LouvainResult {
    /// Membership of the original nodes after `level` aggregation steps
    pub fn partition_at_level(&self, level: usize) -> Option<Vec<usize>> {
        if level >= self.levels.len() {
            return None;
        }
        let mut partition = self.levels[0].clone();
        for step in &self.levels[1..=level] {
            for community in partition.iter_mut() {
                *community = step[*community];
            }
        }
        Some(partition)
    }

    /// Community of a node by NodeId
    pub fn community_of(&self, view: &GraphView, node: NodeId) -> Option<usize> {
        view.node_to_index
            .get(&node)
            .map(|&idx| self.partition[idx])
    }
}

/// Weighted graph of one aggregation level
struct LevelGraph {
    /// Adjacency without self-loops, sorted by neighbor index
    adjacency: Vec<Vec<(usize, f64)>>,
    self_loops: Vec<f64>,
    /// Weighted degree; a self-loop counts twice
    degrees: Vec<f64>,
    /// Sum of edge weights, each edge and self-loop counted once
    total_weight: f64,
}

impl LevelGraph {
    fn from_view(view: &GraphView) -> Self {
        let adjacency = (0..view.node_count)
            .map(|idx| view.adjacent(idx).collect())
            .collect();
        Self::new(adjacency, vec![0.0; view.node_count])
    }

    fn new(adjacency: Vec<Vec<(usize, f64)>>, self_loops: Vec<f64>) -> Self {
        let degrees: Vec<f64> = adjacency
            .iter()
            .zip(&self_loops)
            .map(|(row, &own)| row.iter().map(|&(_, w)| w).sum::<f64>() + 2.0 * own)
            .collect();

        let mut total_weight = 0.0;
        for (u, row) in adjacency.iter().enumerate() {
            total_weight += self_loops[u];
            for &(v, w) in row {
                if u < v {
                    total_weight += w;
                }
            }
        }

        Self {
            adjacency,
            self_loops,
            degrees,
            total_weight,
        }
    }

    fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Collapse each community of `membership` into one node
    fn aggregate(&self, membership: &[usize], community_count: usize) -> LevelGraph {
        let mut self_loops = vec![0.0; community_count];
        let mut links: FxHashMap<(usize, usize), f64> = FxHashMap::default();

        for (u, row) in self.adjacency.iter().enumerate() {
            let cu = membership[u];
            self_loops[cu] += self.self_loops[u];
            for &(v, w) in row {
                if v < u {
                    continue;
                }
                let cv = membership[v];
                if cu == cv {
                    self_loops[cu] += w;
                } else {
                    *links.entry((cu.min(cv), cu.max(cv))).or_insert(0.0) += w;
                }
            }
        }

        let mut links: Vec<((usize, usize), f64)> = links.into_iter().collect();
        links.sort_by_key(|&(pair, _)| pair);

        let mut adjacency: Vec<Vec<(usize, f64)>> = vec![Vec::new(); community_count];
        for ((a, b), w) in links {
            adjacency[a].push((b, w));
            adjacency[b].push((a, w));
        }
        for row in adjacency.iter_mut() {
            row.sort_by_key(|&(idx, _)| idx);
        }

        LevelGraph::new(adjacency, self_loops)
    }

    /// Modularity of a membership vector on this level's graph
    fn modularity(&self, membership: &[usize], resolution: f64) -> f64 {
        if self.total_weight == 0.0 {
            return 0.0;
        }
        let community_count = membership.iter().max().map_or(0, |&c| c + 1);
        let mut internal = vec![0.0; community_count];
        let mut totals = vec![0.0; community_count];

        for (u, row) in self.adjacency.iter().enumerate() {
            let cu = membership[u];
            totals[cu] += self.degrees[u];
            internal[cu] += self.self_loops[u];
            for &(v, w) in row {
                if u < v && membership[v] == cu {
                    internal[cu] += w;
                }
            }
        }

        community_q(&internal, &totals, self.total_weight, resolution)
    }
}

fn community_q(internal: &[f64], totals: &[f64], m: f64, resolution: f64) -> f64 {
    let mut q = 0.0;
    for (inside, total) in internal.iter().zip(totals) {
        let share = total / (2.0 * m);
        q += inside / m - resolution * share * share;
    }
    q
}

/// Renumber community ids densely by first appearance in `scan` order
fn renumber(membership: &[usize], scan: &[usize]) -> (Vec<usize>, usize) {
    let mut mapping: Vec<Option<usize>> = vec![None; membership.len()];
    let mut next = 0;
    let mut renumbered = vec![0; membership.len()];

    for &idx in scan {
        let old = membership[idx];
        let new = *mapping[old].get_or_insert_with(|| {
            next += 1;
            next - 1
        });
        renumbered[idx] = new;
    }

    (renumbered, next)
}

/// Modularity of a partition of `view`
///
/// `Q = sum_c [ L_c / m - resolution * (d_c / 2m)^2 ]`, with `L_c` the
/// weight inside community `c`, `d_c` its summed weighted degree and `m`
/// the total edge weight. A graph without edges scores 0.
pub fn modularity(view: &GraphView, partition: &[usize], resolution: f64) -> f64 {
    let m = view.total_weight();
    if m == 0.0 {
        return 0.0;
    }
    let community_count = partition.iter().max().map_or(0, |&c| c + 1);
    let mut internal = vec![0.0; community_count];
    let mut totals = vec![0.0; community_count];

    for u in 0..view.node_count {
        let cu = partition[u];
        totals[cu] += view.weighted_degree(u);
        for (v, w) in view.adjacent(u) {
            if u < v && partition[v] == cu {
                internal[cu] += w;
            }
        }
    }

    community_q(&internal, &totals, m, resolution)
}

struct LocalMoving<'a> {
    config: &'a LouvainConfig,
    rng: Option<StdRng>,
    warnings: Vec<ConvergenceWarning>,
}

impl<'a> LocalMoving<'a> {
    /// Move nodes between communities until no node moves. Returns whether
    /// any node moved at all.
    fn run(&mut self, graph: &LevelGraph, membership: &mut [usize], level: usize) -> bool {
        let n = graph.node_count();
        if graph.total_weight == 0.0 {
            return false;
        }
        let two_m = 2.0 * graph.total_weight;
        let resolution = self.config.resolution;

        let mut totals = vec![0.0; n];
        for (node, &community) in membership.iter().enumerate() {
            totals[community] += graph.degrees[node];
        }

        let mut order: Vec<usize> = (0..n).collect();
        let mut link_weight = vec![0.0; n];
        let mut touched: Vec<usize> = Vec::new();
        let mut is_touched = vec![false; n];
        let mut any_moved = false;
        let mut passes = 0;

        loop {
            if passes == self.config.max_passes {
                let warning = ConvergenceWarning { level, passes };
                warn!("{}", warning);
                self.warnings.push(warning);
                break;
            }
            passes += 1;

            if let Some(rng) = self.rng.as_mut() {
                order.shuffle(rng);
            }

            let mut moved = 0usize;
            for &node in &order {
                let current = membership[node];
                let k_i = graph.degrees[node];

                for &(neighbor, w) in &graph.adjacency[node] {
                    let community = membership[neighbor];
                    if !is_touched[community] {
                        is_touched[community] = true;
                        touched.push(community);
                    }
                    link_weight[community] += w;
                }

                totals[current] -= k_i;

                let gain = |community: usize, links: f64, totals: &[f64]| {
                    links - resolution * totals[community] * k_i / two_m
                };

                let mut best = current;
                let mut best_gain = gain(current, link_weight[current], &totals);
                for &community in &touched {
                    if community == current {
                        continue;
                    }
                    let candidate = gain(community, link_weight[community], &totals);
                    if candidate > best_gain || (candidate == best_gain && community < best) {
                        best = community;
                        best_gain = candidate;
                    }
                }

                totals[best] += k_i;
                membership[node] = best;
                if best != current {
                    moved += 1;
                }

                for &community in &touched {
                    link_weight[community] = 0.0;
                    is_touched[community] = false;
                }
                touched.clear();
            }

            debug!("level {} pass {}: {} nodes moved", level, passes, moved);
            if moved == 0 {
                break;
            }
            any_moved = true;
        }

        any_moved
    }
}

/// Louvain community detection over an undirected weighted graph
pub fn louvain(view: &GraphView, config: &LouvainConfig) -> AlgoResult<LouvainResult> {
    if view.is_empty() {
        return Err(AlgoError::EmptyGraph);
    }

    let mut moving = LocalMoving {
        config,
        rng: config.seed.map(StdRng::seed_from_u64),
        warnings: Vec::new(),
    };

    let mut graph = LevelGraph::from_view(view);
    let mut levels: Vec<Vec<usize>> = Vec::new();
    let mut current_q = f64::NEG_INFINITY;

    loop {
        let level = levels.len();
        let n = graph.node_count();
        let mut membership: Vec<usize> = (0..n).collect();
        moving.run(&graph, &mut membership, level);

        let scan: Vec<usize> = (0..n).collect();
        let (membership, community_count) = renumber(&membership, &scan);
        let q = graph.modularity(&membership, config.resolution);

        if !levels.is_empty() && q - current_q < config.min_improvement {
            break;
        }
        debug!(
            "level {}: {} nodes -> {} communities, modularity {:.6}",
            level, n, community_count, q
        );
        levels.push(membership);
        current_q = q;

        if community_count == n {
            break;
        }
        let last = &levels[levels.len() - 1];
        graph = graph.aggregate(last, community_count);
    }

    // Flatten the dendrogram to original nodes
    let mut flat = levels[0].clone();
    for step in &levels[1..] {
        for community in flat.iter_mut() {
            *community = step[*community];
        }
    }

    let mut scan: Vec<usize> = (0..view.node_count).collect();
    scan.sort_by_key(|&idx| view.index_to_node[idx]);
    let (partition, community_count) = renumber(&flat, &scan);

    let mut community_sizes = vec![0; community_count];
    for &community in &partition {
        community_sizes[community] += 1;
    }

    let modularity = modularity(view, &partition, config.resolution);

    Ok(LouvainResult {
        partition,
        community_count,
        community_sizes,
        modularity,
        levels,
        warnings: moving.warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two 4-cliques joined by a single light bridge
    fn two_cliques() -> GraphView {
        let mut edges = Vec::new();
        for base in [0u64, 4] {
            for i in base..base + 4 {
                for j in (i + 1)..base + 4 {
                    edges.push((i, j, 1.0));
                }
            }
        }
        edges.push((3, 4, 0.1));
        GraphView::from_edges((0..8).collect(), &edges).unwrap()
    }

    /// Closed-form double sum over all node pairs
    fn reference_modularity(view: &GraphView, partition: &[usize]) -> f64 {
        let m = view.total_weight();
        let mut q = 0.0;
        for i in 0..view.node_count {
            for j in 0..view.node_count {
                if partition[i] != partition[j] {
                    continue;
                }
                let a_ij = view.edge_weight(i, j).unwrap_or(0.0);
                q += a_ij - view.weighted_degree(i) * view.weighted_degree(j) / (2.0 * m);
            }
        }
        q / (2.0 * m)
    }

    #[test]
    fn test_two_cliques() {
        let view = two_cliques();
        let result = louvain(&view, &LouvainConfig::default()).unwrap();

        assert_eq!(result.community_count, 2);
        assert_eq!(result.partition, vec![0, 0, 0, 0, 1, 1, 1, 1]);
        assert_eq!(result.community_sizes, vec![4, 4]);
        assert!(result.modularity > 0.4);
        assert!(result.warnings.is_empty());
        assert!((result.modularity - reference_modularity(&view, &result.partition)).abs() < 1e-12);
    }

    #[test]
    fn test_single_edge_is_one_community() {
        let view = GraphView::from_edges(vec![0, 1], &[(0, 1, 0.99)]).unwrap();
        let result = louvain(&view, &LouvainConfig::default()).unwrap();

        assert_eq!(result.partition, vec![0, 0]);
        assert_eq!(result.community_sizes, vec![2]);
        assert_eq!(result.modularity, 0.0);
    }

    #[test]
    fn test_equal_gains_pick_lowest_community() {
        // Unit 4-cycle: node 0 sees communities 1 and 3 with the same gain,
        // node 2 then prefers 3 over the now heavier 1
        let view = GraphView::from_edges(
            (0..4).collect(),
            &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (0, 3, 1.0)],
        )
        .unwrap();
        let result = louvain(&view, &LouvainConfig::default()).unwrap();

        assert_eq!(result.levels[0], vec![0, 0, 1, 1]);
        assert_eq!(result.partition, vec![0, 0, 1, 1]);
        assert_eq!(result.community_sizes, vec![2, 2]);
        assert!(result.modularity.abs() < 1e-12);
    }

    #[test]
    fn test_single_node() {
        let view = GraphView::from_edges(vec![42], &[]).unwrap();
        let result = louvain(&view, &LouvainConfig::default()).unwrap();

        assert_eq!(result.partition, vec![0]);
        assert_eq!(result.community_count, 1);
        assert_eq!(result.modularity, 0.0);
    }

    #[test]
    fn test_empty_graph() {
        let view = GraphView::from_edges(vec![], &[]).unwrap();
        assert_eq!(
            louvain(&view, &LouvainConfig::default()).unwrap_err(),
            AlgoError::EmptyGraph
        );
    }

    #[test]
    fn test_deterministic_with_seed() {
        let view = two_cliques();
        let config = LouvainConfig::default().with_seed(7);
        let first = louvain(&view, &config).unwrap();
        let second = louvain(&view, &config).unwrap();

        assert_eq!(first.partition, second.partition);
        assert_eq!(first.modularity.to_bits(), second.modularity.to_bits());
    }

    #[test]
    fn test_ids_follow_node_id_order() {
        // Dense order reversed relative to NodeIds
        let base = two_cliques();
        let nodes: Vec<NodeId> = (0..8).rev().collect();
        let edges: Vec<(NodeId, NodeId, f64)> = base
            .edges()
            .map(|(u, v, w)| (base.index_to_node[u], base.index_to_node[v], w))
            .collect();
        let view = GraphView::from_edges(nodes, &edges).unwrap();

        let result = louvain(&view, &LouvainConfig::default()).unwrap();
        assert_eq!(result.community_of(&view, 0), Some(0));
        assert_eq!(result.community_of(&view, 7), Some(1));
    }

    #[test]
    fn test_partition_at_level() {
        let view = two_cliques();
        let result = louvain(&view, &LouvainConfig::default()).unwrap();

        let top = result.partition_at_level(result.levels.len() - 1).unwrap();
        assert_eq!(top.len(), view.node_count);
        assert!(result.partition_at_level(result.levels.len()).is_none());
    }

    #[test]
    fn test_pass_cap_surfaces_warning() {
        let view = two_cliques();
        let config = LouvainConfig {
            max_passes: 1,
            ..LouvainConfig::default()
        };
        let result = louvain(&view, &config).unwrap();

        assert!(!result.warnings.is_empty());
        assert_eq!(result.warnings[0].level, 0);
        assert_eq!(result.partition.len(), 8);
    }

    #[test]
    fn test_modularity_of_singletons() {
        let view = GraphView::from_edges(vec![0, 1], &[(0, 1, 1.0)]).unwrap();
        assert!((modularity(&view, &[0, 1], 1.0) + 0.5).abs() < 1e-12);
        assert_eq!(modularity(&view, &[0, 0], 1.0), 0.0);
    }
}
