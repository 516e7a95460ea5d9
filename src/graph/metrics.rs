//! Centrality metrics over the collapsed link graph
//!
//! The graph handed to these functions has at most one edge per ordered pair of
//! nodes; its `u32` weight is the number of parallel links it stands for. Only
//! the degree functions look at that weight. PageRank, betweenness and depth all
//! treat the graph as simple and unweighted.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{HashMap, VecDeque};

pub const DAMPING: f64 = 0.85;
pub const MAX_ITERATIONS: usize = 200;
pub const TOLERANCE: f64 = 1.0e-6;

/// Incoming link count per node, parallel links included
pub fn in_degrees<N>(graph: &DiGraph<N, u32>) -> Vec<usize> {
    weighted_degrees(graph, Direction::Incoming)
}

/// Outgoing link count per node, parallel links included
pub fn out_degrees<N>(graph: &DiGraph<N, u32>) -> Vec<usize> {
    weighted_degrees(graph, Direction::Outgoing)
}

fn weighted_degrees<N>(graph: &DiGraph<N, u32>, direction: Direction) -> Vec<usize> {
    graph
        .node_indices()
        .map(|v| {
            graph
                .edges_directed(v, direction)
                .map(|e| *e.weight() as usize)
                .sum()
        })
        .collect()
}

/// PageRank by power iteration, indexed by node index
///
/// Uses damping [`DAMPING`], a uniform teleport vector, and redistributes the rank
/// of dangling nodes (no outgoing links) uniformly. Iteration stops once the L1
/// change drops below `N * TOLERANCE` or after [`MAX_ITERATIONS`]; the result
/// always sums to 1.
pub fn pagerank<N, E>(graph: &DiGraph<N, E>) -> Vec<f64> {
    let n = graph.node_count();
    if n == 0 {
        return Vec::new();
    }

    let uniform = 1.0 / n as f64;
    let out_degree: Vec<usize> = graph
        .node_indices()
        .map(|v| graph.neighbors_directed(v, Direction::Outgoing).count())
        .collect();

    let mut rank = vec![uniform; n];
    for iteration in 1..=MAX_ITERATIONS {
        let previous = rank.clone();

        let dangling_sum: f64 = graph
            .node_indices()
            .filter(|v| out_degree[v.index()] == 0)
            .map(|v| previous[v.index()])
            .sum();
        let base = DAMPING * dangling_sum * uniform + (1.0 - DAMPING) * uniform;

        rank.iter_mut().for_each(|r| *r = base);
        for v in graph.node_indices() {
            let degree = out_degree[v.index()];
            if degree == 0 {
                continue;
            }
            let share = DAMPING * previous[v.index()] / degree as f64;
            for w in graph.neighbors_directed(v, Direction::Outgoing) {
                rank[w.index()] += share;
            }
        }

        let change: f64 = rank
            .iter()
            .zip(&previous)
            .map(|(a, b)| (a - b).abs())
            .sum();
        if change < n as f64 * TOLERANCE {
            tracing::debug!("PageRank converged after {} iterations", iteration);
            return rank;
        }
    }

    tracing::warn!(
        "PageRank did not converge within {} iterations; using last estimate",
        MAX_ITERATIONS
    );
    rank
}

/// Normalized betweenness centrality (Brandes), indexed by node index
///
/// Shortest paths are counted on the unweighted directed graph. For more than two
/// nodes, scores are scaled by `1 / ((n - 1)(n - 2))`.
pub fn betweenness<N, E>(graph: &DiGraph<N, E>) -> Vec<f64> {
    let n = graph.node_count();
    let mut centrality = vec![0.0; n];

    let successors: Vec<Vec<usize>> = graph
        .node_indices()
        .map(|v| {
            let mut next: Vec<usize> = graph
                .neighbors_directed(v, Direction::Outgoing)
                .map(|w| w.index())
                .collect();
            next.sort_unstable();
            next.dedup();
            next
        })
        .collect();

    for source in 0..n {
        let mut stack = Vec::with_capacity(n);
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0f64; n];
        let mut distance: Vec<Option<usize>> = vec![None; n];
        sigma[source] = 1.0;
        distance[source] = Some(0);

        let mut queue = VecDeque::from([source]);
        while let Some(v) = queue.pop_front() {
            stack.push(v);
            let next_distance = distance[v].map_or(0, |d| d + 1);
            for &w in &successors[v] {
                if distance[w].is_none() {
                    distance[w] = Some(next_distance);
                    queue.push_back(w);
                }
                if distance[w] == Some(next_distance) {
                    sigma[w] += sigma[v];
                    predecessors[w].push(v);
                }
            }
        }

        let mut delta = vec![0.0f64; n];
        while let Some(w) = stack.pop() {
            for &v in &predecessors[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != source {
                centrality[w] += delta[w];
            }
        }
    }

    if n > 2 {
        let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
        centrality.iter_mut().for_each(|c| *c *= scale);
    }
    centrality
}

/// Hop distance from `root` to every reachable node
pub fn depths_from<N, E>(graph: &DiGraph<N, E>, root: NodeIndex) -> HashMap<NodeIndex, u32> {
    let mut depths = HashMap::from([(root, 0u32)]);
    let mut queue = VecDeque::from([root]);
    while let Some(v) = queue.pop_front() {
        let next = depths[&v] + 1;
        for w in graph.neighbors_directed(v, Direction::Outgoing) {
            if !depths.contains_key(&w) {
                depths.insert(w, next);
                queue.push_back(w);
            }
        }
    }
    depths
}
