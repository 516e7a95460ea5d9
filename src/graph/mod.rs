//! Link-graph module
//!
//! Builds the directed link graph from the cleaned extraction snapshot, attaches
//! degree, PageRank, betweenness and depth-from-root metrics to every node, and
//! writes `nodes.json` / `edges.json`.

mod builder;
pub mod metrics;

pub use builder::{GraphBuilder, GraphSummary, LinkGraph};

use crate::config::Config;
use crate::extract::ContentExtractor;
use crate::output::{read_snapshot, write_snapshot};
use crate::url::UrlPolicy;
use crate::{Result, SitegraphError};

/// Runs the graph stage: cleaned snapshot in, graph output out
///
/// The metadata log must exist; without it nothing is written. If no cleaned
/// snapshot exists yet, extraction runs first.
pub fn run_graph_stage(config: &Config) -> Result<GraphSummary> {
    let output = &config.output;
    let metadata_path = output.metadata_path();
    if !metadata_path.exists() {
        return Err(SitegraphError::MissingMetadata {
            path: metadata_path,
        });
    }

    if !output.clean_nodes_path().exists() || !output.clean_edges_path().exists() {
        tracing::info!("No cleaned snapshot found; running extraction first");
        ContentExtractor::new(config).run()?;
    }

    let (nodes, edges) = read_snapshot(&output.clean_nodes_path(), &output.clean_edges_path())?;
    tracing::info!(
        "Building graph from {} nodes and {} edges",
        nodes.len(),
        edges.len()
    );

    let builder = GraphBuilder::with_root_url(UrlPolicy::from_config(&config.crawl), config.root_url());
    let graph = builder.build(nodes, edges);

    write_snapshot(&output.nodes_path(), &output.edges_path(), &graph.nodes, &graph.edges)?;

    let summary = graph.summary;
    tracing::info!(
        "Graph built: {} crawled nodes, {} stub nodes, {} edges ({} unique links); wrote {} / {}",
        summary.crawled_nodes,
        summary.stub_nodes,
        summary.edges,
        summary.unique_links,
        output.nodes_path().display(),
        output.edges_path().display()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_graph_stage_requires_metadata() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.output.raw_dir = dir.path().join("raw");
        config.output.processed_dir = dir.path().join("processed");

        let result = run_graph_stage(&config);
        assert!(matches!(result, Err(SitegraphError::MissingMetadata { .. })));
        assert!(!config.output.nodes_path().exists());
        assert!(!config.output.edges_path().exists());
    }
}
