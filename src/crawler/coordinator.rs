//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the breadth-first crawl loop. It owns the frontier,
//! the robots cache and the HTTP client, and hands every fetched page to a
//! [`PageSink`]:
//! - [`Persister`] writes artifacts and the metadata log (`crawl`)
//! - `LinkMapSink` only records the link structure (`scan`)

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch, FetchOutcome};
use crate::crawler::frontier::{Frontier, PageBudget};
use crate::extract::outbound_links;
use crate::output::{write_json_atomic, CrawlReport};
use crate::robots::RobotsCache;
use crate::storage::{is_html_content_type, Persister};
use crate::url::{canonicalize, CanonicalUrl, UrlPolicy};
use crate::Result;
use chrono::Utc;
use reqwest::Client;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Receives the pages a crawl fetches
pub trait PageSink {
    /// Called once per successful fetch, before any link of the page is offered
    fn accept(&mut self, url: &CanonicalUrl, content_type: &str, body: &[u8]) -> Result<()>;

    /// Called with the eligible links found on an HTML page, in document order
    fn on_links(&mut self, _page: &CanonicalUrl, _links: &[CanonicalUrl]) {}
}

impl PageSink for Persister {
    fn accept(&mut self, url: &CanonicalUrl, content_type: &str, body: &[u8]) -> Result<()> {
        self.persist(url, content_type, body)?;
        Ok(())
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<S: PageSink> {
    sink: S,
    frontier: Frontier,
    policy: UrlPolicy,
    robots: RobotsCache,
    client: Client,
    delay: Duration,
    budget: PageBudget,
    cancel: CancellationToken,
    next_slot: Option<Instant>,
}

/// Whether the crawl loop should keep going after a politeness wait
enum Slot {
    Ready,
    Cancelled,
}

impl<S: PageSink> Coordinator<S> {
    /// Creates a coordinator seeded with the configured start URL
    pub fn new(
        config: &Config,
        budget: PageBudget,
        sink: S,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let seed = canonicalize(&config.crawl.start_url, None)?;
        let client = build_http_client(&config.user_agent, &config.crawl)?;

        Ok(Self {
            sink,
            frontier: Frontier::new(seed),
            policy: UrlPolicy::from_config(&config.crawl),
            robots: RobotsCache::new(config.user_agent.crawler_name.clone()),
            client,
            delay: config.crawl.request_delay(),
            budget,
            cancel,
            next_slot: None,
        })
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Runs the crawl loop until the frontier is empty, the budget is spent
    /// or the cancellation token fires
    ///
    /// Fetch failures and policy rejections only drop the URL concerned. Errors
    /// from the sink abort the crawl.
    pub async fn run(&mut self) -> Result<CrawlReport> {
        let started_at = Utc::now();
        let start_time = std::time::Instant::now();
        tracing::info!(
            "Starting crawl (budget: {})",
            self.budget
                .limit()
                .map_or_else(|| "unbounded".to_string(), |limit| limit.to_string())
        );

        let mut report = CrawlReport {
            started_at,
            finished_at: started_at,
            pages_fetched: 0,
            fetch_failures: 0,
            policy_rejections: 0,
            links_offered: 0,
            frontier_remaining: 0,
            cancelled: false,
        };

        loop {
            if self.cancel.is_cancelled() {
                tracing::info!("Crawl cancelled");
                report.cancelled = true;
                break;
            }

            if self.budget.is_exhausted(report.pages_fetched) {
                tracing::info!("Page budget of {} reached", report.pages_fetched);
                break;
            }

            let Some(url) = self.frontier.dequeue() else {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            };

            let parsed = match url.parse() {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::debug!("Skipping {}: {}", url, e);
                    report.policy_rejections += 1;
                    continue;
                }
            };

            if !self.is_fetch_eligible(&parsed).await {
                tracing::debug!("Skipping {}: not fetch-eligible", url);
                report.policy_rejections += 1;
                continue;
            }

            if !self.frontier.mark_visited(&url) {
                continue;
            }

            if let Slot::Cancelled = self.wait_for_slot().await {
                tracing::info!("Crawl cancelled");
                report.cancelled = true;
                break;
            }

            tracing::info!("Fetching {}", url);
            match fetch(&self.client, &parsed).await {
                FetchOutcome::Stored { content_type, body } => {
                    self.sink.accept(&url, &content_type, &body)?;
                    report.pages_fetched += 1;

                    if is_html_content_type(&content_type) {
                        report.links_offered += self.offer_links(&url, &parsed, &body).await;
                    }

                    if report.pages_fetched % 10 == 0 {
                        let rate =
                            report.pages_fetched as f64 / start_time.elapsed().as_secs_f64();
                        tracing::info!(
                            "Progress: {} pages fetched, {} in frontier, {:.2} pages/sec",
                            report.pages_fetched,
                            self.frontier.len(),
                            rate
                        );
                    }
                }
                FetchOutcome::Failed(reason) => {
                    tracing::warn!("Failed to fetch {}: {}", url, reason);
                    report.fetch_failures += 1;
                }
            }
        }

        report.finished_at = Utc::now();
        report.frontier_remaining = self.frontier.len();
        Ok(report)
    }

    /// Scheme, allowed host and robots.txt
    async fn is_fetch_eligible(&mut self, url: &Url) -> bool {
        self.policy.is_crawlable(url) && self.robots.is_allowed(&self.client, url).await
    }

    /// Offers every eligible link on a page to the frontier
    ///
    /// Only fetch-eligible links reach [`PageSink::on_links`]. Download-eligible
    /// links are queued too and meet the robots check again at dequeue.
    /// Returns how many links were newly queued.
    async fn offer_links(&mut self, page: &CanonicalUrl, page_url: &Url, body: &[u8]) -> u64 {
        let html = String::from_utf8_lossy(body);
        let mut fetchable = Vec::new();
        let mut eligible = Vec::new();

        for link in outbound_links(&html, page_url) {
            let Ok(target) = link.target.parse() else {
                continue;
            };
            if self.is_fetch_eligible(&target).await {
                fetchable.push(link.target.clone());
                eligible.push(link.target);
            } else if self.policy.is_download_eligible(&target) {
                eligible.push(link.target);
            }
        }

        self.sink.on_links(page, &fetchable);

        let mut queued = 0;
        for target in eligible {
            if self.frontier.offer(target) {
                queued += 1;
            }
        }
        tracing::debug!("Queued {} new links from {}", queued, page);
        queued
    }

    /// Waits until the next fetch may start, or until cancellation
    async fn wait_for_slot(&mut self) -> Slot {
        if let Some(slot) = self.next_slot {
            tokio::select! {
                _ = self.cancel.cancelled() => return Slot::Cancelled,
                _ = tokio::time::sleep_until(slot) => {}
            }
        }
        self.next_slot = Some(Instant::now() + self.delay);
        Slot::Ready
    }
}

/// Runs a complete crawl operation
///
/// Fetched pages go to the artifact store and metadata log under the configured
/// raw directory. The crawl report is written to `crawl_report.json` next to them.
///
/// # Example
///
/// ```no_run
/// use sitegraph::config::load_config_or_default;
/// use sitegraph::crawler::run_crawl;
/// use std::path::Path;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config_or_default(Path::new("sitegraph.toml"));
/// let report = run_crawl(&config, CancellationToken::new()).await?;
/// println!("{} pages fetched", report.pages_fetched);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config, cancel: CancellationToken) -> Result<CrawlReport> {
    let persister = Persister::open(&config.output)?;
    let budget = PageBudget::from_limit(config.crawl.max_pages);
    let mut coordinator = Coordinator::new(config, budget, persister, cancel)?;

    let report = coordinator.run().await?;
    write_json_atomic(&config.output.crawl_report_path(), &report)?;
    report.log();
    Ok(report)
}
