//! Crawl reports and graph statistics
//!
//! [`CrawlReport`] is written at the end of every crawl; [`GraphStatistics`] is
//! computed from a built graph for the `stats` command.

use crate::model::{Edge, Node};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Summary of one crawl run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Pages fetched and handed to the page sink
    pub pages_fetched: u64,

    /// Fetches that failed (network, timeout, non-2xx, body read)
    pub fetch_failures: u64,

    /// Dequeued URLs rejected by domain or robots policy
    pub policy_rejections: u64,

    /// Links accepted into the frontier
    pub links_offered: u64,

    /// URLs still queued when the crawl stopped
    pub frontier_remaining: usize,

    /// Whether the crawl stopped because it was cancelled
    pub cancelled: bool,
}

impl CrawlReport {
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    pub fn log(&self) {
        tracing::info!(
            "Crawl finished in {}s: {} pages fetched, {} failures, {} policy rejections, {} links offered, {} left in frontier{}",
            self.duration_seconds(),
            self.pages_fetched,
            self.fetch_failures,
            self.policy_rejections,
            self.links_offered,
            self.frontier_remaining,
            if self.cancelled { " (cancelled)" } else { "" }
        );
    }
}

/// Summary figures for a built link graph
#[derive(Debug, Clone, PartialEq)]
pub struct GraphStatistics {
    pub total_nodes: usize,
    pub crawled_nodes: usize,
    pub stub_nodes: usize,
    pub total_edges: usize,

    /// Distinct (source, target) pairs
    pub unique_links: usize,
    pub self_loops: usize,

    /// Nodes per `doc_type`
    pub doc_types: BTreeMap<String, usize>,

    /// Nodes whose depth from root is known
    pub reachable_from_root: usize,
    pub max_depth: Option<u32>,

    /// Highest PageRank nodes, best first
    pub top_pagerank: Vec<(String, f64)>,
}

impl GraphStatistics {
    /// Computes statistics from graph output
    ///
    /// # Arguments
    ///
    /// * `nodes` - Nodes as written by the graph builder
    /// * `edges` - Edges as written by the graph builder
    /// * `top_n` - How many PageRank leaders to keep
    pub fn from_graph(nodes: &[Node], edges: &[Edge], top_n: usize) -> Self {
        let stub_nodes = nodes.iter().filter(|n| n.is_stub()).count();

        let mut doc_types = BTreeMap::new();
        for node in nodes {
            *doc_types.entry(node.doc_type.clone()).or_insert(0) += 1;
        }

        let unique_links = edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect::<HashSet<_>>()
            .len();

        let depths: Vec<u32> = nodes
            .iter()
            .filter_map(|n| n.metrics.as_ref()?.depth_from_root)
            .collect();

        let mut ranked: Vec<(String, f64)> = nodes
            .iter()
            .filter_map(|n| Some((n.url.to_string(), n.metrics.as_ref()?.pagerank)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(top_n);

        Self {
            total_nodes: nodes.len(),
            crawled_nodes: nodes.len() - stub_nodes,
            stub_nodes,
            total_edges: edges.len(),
            unique_links,
            self_loops: edges.iter().filter(|e| e.is_self_link()).count(),
            doc_types,
            reachable_from_root: depths.len(),
            max_depth: depths.iter().copied().max(),
            top_pagerank: ranked,
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &GraphStatistics) {
    println!("=== Link Graph Statistics ===\n");

    println!("Overview:");
    println!("  Total nodes: {}", stats.total_nodes);
    println!("  Crawled nodes: {}", stats.crawled_nodes);
    println!("  Stub nodes: {}", stats.stub_nodes);
    println!("  Total edges: {}", stats.total_edges);
    println!("  Unique links: {}", stats.unique_links);
    println!("  Self-loops: {}", stats.self_loops);
    println!();

    println!("Nodes by Document Type:");
    let mut doc_types: Vec<_> = stats.doc_types.iter().collect();
    doc_types.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (doc_type, count) in doc_types {
        let percentage = if stats.total_nodes > 0 {
            (*count as f64 / stats.total_nodes as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", doc_type, count, percentage);
    }
    println!();

    match stats.max_depth {
        Some(depth) => println!(
            "Reachable from root: {} nodes (max depth {})",
            stats.reachable_from_root, depth
        ),
        None => println!("Reachable from root: none (root not in graph)"),
    }
    println!();

    if !stats.top_pagerank.is_empty() {
        println!("Top PageRank:");
        for (url, rank) in &stats.top_pagerank {
            println!("  {:.6}  {}", rank, url);
        }
    }
}
