//! Integration tests for the offline stages: extraction and graph build
//!
//! Documents are stored through the same persister the crawler uses, so no
//! network is involved.

use sitegraph::config::{Config, DuplicateRecordPolicy, SelfLinkPolicy};
use sitegraph::extract::ContentExtractor;
use sitegraph::graph::run_graph_stage;
use sitegraph::output::read_snapshot;
use sitegraph::storage::Persister;
use sitegraph::{canonicalize, CanonicalUrl, SitegraphError};
use std::collections::HashMap;
use std::path::Path;
use tempfile::TempDir;

fn create_test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.crawl.start_url = "https://example.edu".to_string();
    config.crawl.allowed_domains = vec!["example.edu".to_string()];
    config.output.raw_dir = dir.join("raw");
    config.output.processed_dir = dir.join("processed");
    config
}

fn url(raw: &str) -> CanonicalUrl {
    canonicalize(raw, None).unwrap()
}

fn store_pages(config: &Config, pages: &[(&str, &str, &str)]) {
    let mut persister = Persister::open(&config.output).unwrap();
    for (page, content_type, body) in pages {
        persister
            .persist(&url(page), content_type, body.as_bytes())
            .unwrap();
    }
}

fn small_site(config: &Config) {
    store_pages(
        config,
        &[
            (
                "https://example.edu",
                "text/html",
                r##"<html><head><title>Home</title></head><body>
                    <a href="#main">Skip to content</a>
                    <a href="/news">News</a>
                    <a href="/news/">News again</a>
                    <a href="/people">People</a>
                    <a href="https://elsewhere.org/">Partner</a>
                </body></html>"##,
            ),
            (
                "https://example.edu/news",
                "text/html",
                r#"<html><head><title>News</title><script>var x = 1;</script></head>
                <body><p>Latest   headlines here</p><a href="/">Home</a><a href="/archive">Archive</a></body></html>"#,
            ),
            (
                "https://example.edu/people",
                "text/html",
                r#"<html><head><title>People</title></head><body><a href="/news">News</a></body></html>"#,
            ),
        ],
    );
}

#[test]
fn test_fragment_link_is_dropped_by_default() {
    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(temp_dir.path());
    small_site(&config);

    let summary = ContentExtractor::new(&config).run().unwrap();
    assert_eq!(summary.self_links_dropped, 1);
    assert_eq!(summary.off_domain_edges_dropped, 1);

    let (_, edges) = read_snapshot(
        &config.output.clean_nodes_path(),
        &config.output.clean_edges_path(),
    )
    .unwrap();
    assert!(edges.iter().all(|e| !e.is_self_link()));
    assert_eq!(
        edges
            .iter()
            .filter(|e| e.source == url("https://example.edu"))
            .count(),
        3
    );
}

#[test]
fn test_fragment_link_is_a_self_loop_when_kept() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = create_test_config(temp_dir.path());
    config.extract.self_links = SelfLinkPolicy::Keep;
    small_site(&config);

    let summary = ContentExtractor::new(&config).run().unwrap();
    assert_eq!(summary.self_links_dropped, 0);

    run_graph_stage(&config).unwrap();
    let (nodes, edges) =
        read_snapshot(&config.output.nodes_path(), &config.output.edges_path()).unwrap();

    let self_loops: Vec<_> = edges.iter().filter(|e| e.is_self_link()).collect();
    assert_eq!(self_loops.len(), 1);
    assert_eq!(self_loops[0].source, url("https://example.edu"));
    assert_eq!(self_loops[0].anchor_text, "Skip to content");

    let home = nodes
        .iter()
        .find(|n| n.url == url("https://example.edu"))
        .unwrap();
    let metrics = home.metrics.as_ref().unwrap();
    assert_eq!(metrics.out_degree, 4);
}

#[test]
fn test_extraction_rerun_is_byte_identical() {
    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(temp_dir.path());
    small_site(&config);

    ContentExtractor::new(&config).run().unwrap();
    let nodes_first = std::fs::read(config.output.clean_nodes_path()).unwrap();
    let edges_first = std::fs::read(config.output.clean_edges_path()).unwrap();

    ContentExtractor::new(&config).run().unwrap();
    let nodes_second = std::fs::read(config.output.clean_nodes_path()).unwrap();
    let edges_second = std::fs::read(config.output.clean_edges_path()).unwrap();

    assert_eq!(nodes_first, nodes_second);
    assert_eq!(edges_first, edges_second);
}

#[test]
fn test_clean_nodes_carry_text_and_titles() {
    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(temp_dir.path());
    small_site(&config);

    ContentExtractor::new(&config).run().unwrap();
    let (nodes, _) = read_snapshot(
        &config.output.clean_nodes_path(),
        &config.output.clean_edges_path(),
    )
    .unwrap();

    let news = nodes
        .iter()
        .find(|n| n.url == url("https://example.edu/news"))
        .unwrap();
    assert_eq!(news.title, "News");
    assert!(news.clean_text.contains("Latest headlines here"));
    assert!(!news.clean_text.contains("var x"));
    assert_eq!(news.doc_type, "html");
    assert!(news.metrics.is_none());
}

#[test]
fn test_graph_invariants() {
    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(temp_dir.path());
    small_site(&config);

    let summary = run_graph_stage(&config).unwrap();
    assert_eq!(summary.crawled_nodes, 3);
    assert_eq!(summary.stub_nodes, 1);
    assert!(summary.root_found);

    let (nodes, edges) =
        read_snapshot(&config.output.nodes_path(), &config.output.edges_path()).unwrap();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for node in &nodes {
        *counts.entry(node.url.as_str()).or_default() += 1;
    }
    assert!(counts.values().all(|&c| c == 1), "duplicate nodes");
    for edge in &edges {
        assert!(counts.contains_key(edge.source.as_str()), "dangling {}", edge.source);
        assert!(counts.contains_key(edge.target.as_str()), "dangling {}", edge.target);
    }

    let total: f64 = nodes
        .iter()
        .map(|n| n.metrics.as_ref().unwrap().pagerank)
        .sum();
    assert!((total - 1.0).abs() < 1e-6, "pagerank sums to {}", total);

    let archive = nodes
        .iter()
        .find(|n| n.url == url("https://example.edu/archive"))
        .unwrap();
    assert!(archive.is_stub());
    assert_eq!(archive.doc_type, "external");
    assert_eq!(archive.metrics.as_ref().unwrap().depth_from_root, Some(2));

    // "/news" and "/news/" collapse into one target with multiplicity 2
    let news = nodes
        .iter()
        .find(|n| n.url == url("https://example.edu/news"))
        .unwrap();
    assert_eq!(news.metrics.as_ref().unwrap().in_degree, 3);
}

#[test]
fn test_graph_runs_extraction_when_snapshot_is_missing() {
    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(temp_dir.path());
    small_site(&config);

    assert!(!config.output.clean_nodes_path().exists());
    run_graph_stage(&config).unwrap();
    assert!(config.output.clean_nodes_path().exists());
    assert!(config.output.nodes_path().exists());
}

#[test]
fn test_missing_metadata_is_fatal_and_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(temp_dir.path());

    let err = run_graph_stage(&config).unwrap_err();
    assert!(matches!(err, SitegraphError::MissingMetadata { .. }));

    let err = ContentExtractor::new(&config).run().unwrap_err();
    assert!(matches!(err, SitegraphError::MissingMetadata { .. }));

    assert!(!config.output.processed_dir.exists());
}

#[test]
fn test_duplicate_record_policies() {
    let pages = [
        ("https://example.edu/data", "text/html", "<p>first</p>"),
        ("https://example.edu/data", "text/plain", "second"),
    ];

    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(temp_dir.path());
    store_pages(&config, &pages);
    let summary = ContentExtractor::new(&config).run().unwrap();
    assert_eq!(summary.records_read, 2);
    assert_eq!(summary.duplicate_records, 1);
    let (nodes, _) = read_snapshot(
        &config.output.clean_nodes_path(),
        &config.output.clean_edges_path(),
    )
    .unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].content_type, "text/plain");

    let temp_dir = TempDir::new().unwrap();
    let mut config = create_test_config(temp_dir.path());
    config.extract.duplicate_records = DuplicateRecordPolicy::KeepFirst;
    store_pages(&config, &pages);
    ContentExtractor::new(&config).run().unwrap();
    let (nodes, _) = read_snapshot(
        &config.output.clean_nodes_path(),
        &config.output.clean_edges_path(),
    )
    .unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].content_type, "text/html");
    assert_eq!(nodes[0].clean_text, "first");
}
