//! Sitegraph main entry point
//!
//! This is the command-line interface for the Sitegraph crawl-and-graph pipeline.

use anyhow::Context;
use clap::{Parser, Subcommand};
use sitegraph::config::{check_config, load_config_or_default, Config};
use sitegraph::crawler::{run_crawl, run_scan};
use sitegraph::extract::ContentExtractor;
use sitegraph::graph::run_graph_stage;
use sitegraph::output::{print_statistics, read_snapshot, GraphStatistics};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

const TOP_PAGERANK: usize = 10;

/// Sitegraph: a polite site crawler and link-graph builder
///
/// Sitegraph crawls a bounded set of hosts while respecting robots.txt and a
/// politeness delay, extracts clean text and links from what it fetched, and
/// builds a link graph annotated with centrality metrics.
#[derive(Parser, Debug)]
#[command(name = "sitegraph")]
#[command(version)]
#[command(about = "A polite site crawler and link-graph builder", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "PIPELINE_CONFIG",
        default_value = "config/sitegraph.toml"
    )]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the configured site and store every fetched document
    Crawl,

    /// Extract clean text and links from stored documents
    Extract,

    /// Build the link graph and its metrics
    Graph,

    /// Crawl, extract and build the graph in one go
    Run,

    /// Map the site's links without storing anything
    Scan,

    /// Show statistics for the built graph
    Stats,

    /// Validate the configuration file and show the effective settings
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let load = || {
        tracing::info!("Loading configuration from: {}", cli.config.display());
        load_config_or_default(&cli.config)
    };

    match cli.command {
        Command::Crawl => {
            handle_crawl(&load()).await?;
        }
        Command::Extract => handle_extract(&load())?,
        Command::Graph => handle_graph(&load())?,
        Command::Run => {
            let config = load();
            if handle_crawl(&config).await? {
                tracing::info!("Crawl was cancelled; skipping extraction and graph build");
                return Ok(());
            }
            handle_extract(&config)?;
            handle_graph(&config)?;
        }
        Command::Scan => handle_scan(&load()).await?,
        Command::Stats => handle_stats(&load())?,
        Command::CheckConfig => handle_check_config(&cli.config)?,
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitegraph=info,warn"),
            1 => EnvFilter::new("sitegraph=debug,info"),
            2 => EnvFilter::new("sitegraph=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Returns a token that is cancelled on Ctrl-C
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current fetch");
            token.cancel();
        }
    });
    cancel
}

/// Runs the crawl; returns whether it was cancelled
async fn handle_crawl(config: &Config) -> anyhow::Result<bool> {
    tracing::info!(
        "Crawling from {} (allowed domains: {})",
        config.crawl.start_url,
        config.crawl.allowed_domains.join(", ")
    );

    let report = run_crawl(config, cancel_on_ctrl_c())
        .await
        .context("Crawl failed")?;
    Ok(report.cancelled)
}

fn handle_extract(config: &Config) -> anyhow::Result<()> {
    let summary = ContentExtractor::new(config)
        .run()
        .context("Extraction failed")?;
    tracing::info!(
        "Extraction complete: {} records processed, {} nodes, {} edges",
        summary.records_processed,
        summary.total_nodes,
        summary.total_edges
    );
    Ok(())
}

fn handle_graph(config: &Config) -> anyhow::Result<()> {
    run_graph_stage(config).context("Graph build failed")?;
    Ok(())
}

async fn handle_scan(config: &Config) -> anyhow::Result<()> {
    run_scan(config, cancel_on_ctrl_c())
        .await
        .context("Link-map scan failed")?;
    Ok(())
}

/// Handles the stats command: prints statistics for the built graph
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let nodes_path = config.output.nodes_path();
    let edges_path = config.output.edges_path();
    println!("Graph: {}\n", nodes_path.display());

    let (nodes, edges) = read_snapshot(&nodes_path, &edges_path)
        .with_context(|| format!("No graph output at {}; run `graph` first", nodes_path.display()))?;

    let stats = GraphStatistics::from_graph(&nodes, &edges, TOP_PAGERANK);
    print_statistics(&stats);
    Ok(())
}

/// Handles the check-config command: strict load, then shows the settings
///
/// Exits with an error when any value would be replaced by its default at run time.
fn handle_check_config(path: &std::path::Path) -> anyhow::Result<()> {
    let (config, hash, issues) = check_config(path)
        .with_context(|| format!("Cannot read configuration {}", path.display()))?;

    println!("=== Sitegraph Configuration ===\n");
    println!("File: {} (hash: {})", path.display(), hash);

    if !issues.is_empty() {
        println!("\nProblems:");
        for issue in &issues {
            println!("  ✗ {}", issue);
        }
        anyhow::bail!(
            "{} invalid setting(s) in {}",
            issues.len(),
            path.display()
        );
    }

    println!("\nCrawl:");
    println!("  Start URL: {}", config.crawl.start_url);
    println!("  Allowed domains: {}", config.crawl.allowed_domains.join(", "));
    match config.crawl.max_pages {
        n if n < 0 => println!("  Max pages: unbounded"),
        n => println!("  Max pages: {}", n),
    }
    println!("  Request delay: {}ms", config.crawl.request_delay_ms);
    println!("  Request timeout: {}s", config.crawl.request_timeout_secs);
    println!(
        "  Allowed extensions: {}",
        config.crawl.allowed_extensions.join(" ")
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Raw: {}", config.output.raw_dir.display());
    println!("  Processed: {}", config.output.processed_dir.display());
    println!("  Link map: {}", config.output.link_map_path.display());

    println!("\nExtraction:");
    println!("  Snippet chars: {}", config.extract.snippet_chars);
    println!("  Checkpoint interval: {}", config.extract.checkpoint_interval);
    println!("  Self links: {:?}", config.extract.self_links);
    println!("  Duplicate records: {:?}", config.extract.duplicate_records);

    println!("\nGraph:");
    println!("  Root URL: {}", config.root_url());

    println!("\n✓ Configuration is valid");
    Ok(())
}
