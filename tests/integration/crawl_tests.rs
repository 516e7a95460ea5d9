//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use sitegraph::config::Config;
use sitegraph::crawler::{run_crawl, run_scan};
use sitegraph::extract::ContentExtractor;
use sitegraph::graph::run_graph_stage;
use sitegraph::output::{read_json, read_snapshot, CrawlReport};
use sitegraph::storage::read_metadata;
use std::path::Path;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling the mock server into `dir`
fn create_test_config(server: &MockServer, dir: &Path) -> Config {
    let mut config = Config::default();
    config.crawl.start_url = server.uri();
    config.crawl.allowed_domains = vec!["127.0.0.1".to_string()];
    config.crawl.request_delay_ms = 10; // Very short for testing
    config.crawl.request_timeout_secs = 5;
    config.user_agent.crawler_name = "TestBot".to_string();
    config.output.raw_dir = dir.join("raw");
    config.output.processed_dir = dir.join("processed");
    config.output.link_map_path = dir.join("link_map.json");
    config
}

async fn mount_html(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(body, "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

fn url_path<'a>(server: &MockServer, url: &'a str) -> String {
    let path = url.trim_start_matches(&server.uri());
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

#[tokio::test]
async fn test_budget_two_crawl_builds_two_node_graph() {
    let mock_server = MockServer::start().await;
    mount_html(
        &mock_server,
        "/",
        r#"<html><head><title>Home</title></head><body>
            <a href="/about">About us</a>
            <a href="https://other.org">Elsewhere</a>
        </body></html>"#,
    )
    .await;
    mount_html(
        &mock_server,
        "/about",
        r#"<html><head><title>About</title></head><body>
            <p>We are a test site.</p><a href="/">Home</a><a href="/contact">Contact</a>
        </body></html>"#,
    )
    .await;
    mount_html(&mock_server, "/contact", "<p>contact</p>").await;

    let temp_dir = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server, temp_dir.path());
    config.crawl.max_pages = 2;

    let report = run_crawl(&config, CancellationToken::new()).await.unwrap();
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.fetch_failures, 0);
    assert_eq!(report.frontier_remaining, 1);
    assert!(!report.cancelled);

    let written: CrawlReport = read_json(&config.output.crawl_report_path()).unwrap();
    assert_eq!(written, report);

    let records = read_metadata(&config.output.metadata_path()).unwrap();
    let paths: Vec<String> = records
        .iter()
        .map(|r| url_path(&mock_server, r.url.as_str()))
        .collect();
    assert_eq!(paths, vec!["/", "/about"]);
    for record in &records {
        assert_eq!(record.content_type, "text/html");
        assert!(record.stored_path.exists());
    }

    let extraction = ContentExtractor::new(&config).run().unwrap();
    assert_eq!(extraction.records_processed, 2);
    assert_eq!(extraction.off_domain_edges_dropped, 1);

    let summary = run_graph_stage(&config).unwrap();
    assert_eq!(summary.crawled_nodes, 2);
    assert_eq!(summary.stub_nodes, 1);
    assert!(summary.root_found);

    let (nodes, edges) =
        read_snapshot(&config.output.nodes_path(), &config.output.edges_path()).unwrap();
    assert!(edges.iter().all(|e| !e.target.as_str().contains("other.org")));

    let depth_of = |route: &str| {
        nodes
            .iter()
            .find(|n| url_path(&mock_server, n.url.as_str()) == route)
            .and_then(|n| n.metrics.as_ref())
            .and_then(|m| m.depth_from_root)
    };
    assert_eq!(depth_of("/"), Some(0));
    assert_eq!(depth_of("/about"), Some(1));
    assert_eq!(depth_of("/contact"), Some(2));

    let home = nodes
        .iter()
        .find(|n| url_path(&mock_server, n.url.as_str()) == "/")
        .unwrap();
    assert_eq!(home.title, "Home");
    assert!(!home.is_stub());
}

#[tokio::test]
async fn test_robots_disallowed_url_is_never_fetched() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private"),
        )
        .mount(&mock_server)
        .await;
    mount_html(
        &mock_server,
        "/",
        r#"<a href="/private/report">Private</a><a href="/public">Public</a>"#,
    )
    .await;
    mount_html(&mock_server, "/public", "<p>public</p>").await;
    mount_html(&mock_server, "/private/report", "<p>secret</p>").await;

    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server, temp_dir.path());

    let report = run_crawl(&config, CancellationToken::new()).await.unwrap();
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.policy_rejections, 1);

    let records = read_metadata(&config.output.metadata_path()).unwrap();
    assert!(records.iter().all(|r| !r.url.as_str().contains("/private")));

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| !r.url.path().starts_with("/private")));
    assert_eq!(
        requests
            .iter()
            .filter(|r| r.url.path() == "/robots.txt")
            .count(),
        1,
        "robots.txt is fetched once per host"
    );
}

#[tokio::test]
async fn test_binary_documents_go_to_file_store() {
    let mock_server = MockServer::start().await;
    mount_html(
        &mock_server,
        "/",
        r#"<a href="/docs/guide.pdf">Guide</a><a href="/export?format=PDF">Export</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/docs/guide.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(b"%PDF-1.4 not really".to_vec()),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/export"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/octet-stream")
                .set_body_bytes(vec![0u8, 1, 2, 3]),
        )
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server, temp_dir.path());

    let report = run_crawl(&config, CancellationToken::new()).await.unwrap();
    assert_eq!(report.pages_fetched, 3);

    let records = read_metadata(&config.output.metadata_path()).unwrap();
    let pdf = records
        .iter()
        .find(|r| r.content_type == "application/pdf")
        .unwrap();
    assert!(pdf.stored_path.starts_with(config.output.files_dir()));
    assert_eq!(pdf.stored_path.extension().unwrap(), "pdf");
    assert_eq!(std::fs::read(&pdf.stored_path).unwrap(), b"%PDF-1.4 not really");

    let export = records
        .iter()
        .find(|r| r.content_type == "application/octet-stream")
        .unwrap();
    assert_eq!(export.stored_path.extension().unwrap(), "bin");
}

#[tokio::test]
async fn test_recrawl_appends_to_log_and_overwrites_artifacts() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/", "<p>only page</p>").await;

    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server, temp_dir.path());

    run_crawl(&config, CancellationToken::new()).await.unwrap();
    run_crawl(&config, CancellationToken::new()).await.unwrap();

    let records = read_metadata(&config.output.metadata_path()).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].stored_path, records[1].stored_path);

    let html_files = std::fs::read_dir(config.output.html_dir()).unwrap().count();
    assert_eq!(html_files, 1);

    let log = std::fs::read_to_string(config.output.metadata_path()).unwrap();
    assert_eq!(log.matches("url\tpath\tcontent_type").count(), 1);
}

#[tokio::test]
async fn test_scan_writes_link_map_without_persisting() {
    let mock_server = MockServer::start().await;
    mount_html(
        &mock_server,
        "/",
        r##"<a href="/a">A</a><a href="/a#again">A again</a><a href="https://other.org/x">X</a>"##,
    )
    .await;
    mount_html(&mock_server, "/a", r#"<a href="/">Home</a><a href="/gone">Gone</a>"#).await;

    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server, temp_dir.path());

    let link_map = run_scan(&config, CancellationToken::new()).await.unwrap();
    assert_eq!(link_map.stats.pages_processed, 3);
    assert_eq!(link_map.stats.unique_urls, 2);
    assert_eq!(link_map.stats.unique_edges, 3);

    let json: serde_json::Value = read_json(&config.output.link_map_path).unwrap();
    assert_eq!(json["stats"]["unique_edges"], 3);
    assert_eq!(json["nodes"].as_array().unwrap().len(), 2);

    assert!(!config.output.metadata_path().exists());
    assert!(!config.output.html_dir().exists());
}
