use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Extensions eligible for download when no explicit list is configured
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[
    ".html", ".htm", ".php", ".asp", ".aspx", ".jsp", ".pdf", ".txt", ".json", ".csv", ".xml",
    ".doc", ".docx", ".ppt", ".pptx", ".xls", ".xlsx", ".rtf", ".srt", ".vtt", ".jpg", ".jpeg",
    ".png", ".gif", ".svg", ".zip", ".tar", ".gz", ".mp3", ".mp4",
];

pub const DEFAULT_START_URL: &str = "https://www.bgsu.edu";

/// Main configuration structure for Sitegraph
///
/// Every section and key is optional; anything missing takes its default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawl: CrawlConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub extract: ExtractConfig,
    pub graph: GraphConfig,
    pub scan: ScanConfig,
}

impl Config {
    /// Root URL for depth computation, falling back to the crawl start URL
    pub fn root_url(&self) -> &str {
        self.graph
            .root_url
            .as_deref()
            .unwrap_or(&self.crawl.start_url)
    }
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlConfig {
    /// Seed URL for the breadth-first traversal
    pub start_url: String,

    /// Hosts the crawler may visit (exact hosts or `*.domain` wildcards)
    pub allowed_domains: Vec<String>,

    /// Maximum number of pages to fetch; negative means unbounded
    pub max_pages: i64,

    /// Minimum time between consecutive fetches (milliseconds)
    pub request_delay_ms: u64,

    /// Per-request timeout (seconds)
    pub request_timeout_secs: u64,

    /// File extensions eligible for download, with leading dot
    pub allowed_extensions: Vec<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            start_url: DEFAULT_START_URL.to_string(),
            allowed_domains: vec!["www.bgsu.edu".to_string(), "bgsu.edu".to_string()],
            max_pages: -1,
            request_delay_ms: 250,
            request_timeout_secs: 20,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl CrawlConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler, also the token matched against robots.txt groups
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SitegraphBot".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the full User-Agent header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// Output locations
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory holding fetched artifacts and the metadata log
    pub raw_dir: PathBuf,

    /// Directory receiving extraction and graph outputs
    pub processed_dir: PathBuf,

    /// Where the link-map scan writes its JSON report
    pub link_map_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("data/raw"),
            processed_dir: PathBuf::from("data/processed"),
            link_map_path: PathBuf::from("data/link_map.json"),
        }
    }
}

impl OutputConfig {
    pub fn metadata_path(&self) -> PathBuf {
        self.raw_dir.join("metadata.tsv")
    }

    pub fn html_dir(&self) -> PathBuf {
        self.raw_dir.join("html")
    }

    pub fn files_dir(&self) -> PathBuf {
        self.raw_dir.join("files")
    }

    pub fn crawl_report_path(&self) -> PathBuf {
        self.raw_dir.join("crawl_report.json")
    }

    pub fn clean_nodes_path(&self) -> PathBuf {
        self.processed_dir.join("clean_nodes.json")
    }

    pub fn clean_edges_path(&self) -> PathBuf {
        self.processed_dir.join("clean_edges.json")
    }

    pub fn nodes_path(&self) -> PathBuf {
        self.processed_dir.join("nodes.json")
    }

    pub fn edges_path(&self) -> PathBuf {
        self.processed_dir.join("edges.json")
    }
}

/// What to do with a link whose canonical target equals its source page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelfLinkPolicy {
    /// Discard the edge (fragment-only anchors become no-ops)
    #[default]
    Drop,
    /// Keep the edge as a self-loop
    Keep,
}

/// Which record wins when a URL appears more than once in the metadata log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateRecordPolicy {
    /// The most recently appended record replaces earlier ones
    #[default]
    LastWriteWins,
    /// The first record is kept and later repeats are ignored
    KeepFirst,
}

/// Content extraction configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExtractConfig {
    /// Number of characters of clean text kept as the node snippet
    pub snippet_chars: usize,

    /// Write a partial snapshot every N records (0 disables checkpoints)
    pub checkpoint_interval: usize,

    pub self_links: SelfLinkPolicy,

    pub duplicate_records: DuplicateRecordPolicy,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            snippet_chars: 600,
            checkpoint_interval: 50,
            self_links: SelfLinkPolicy::default(),
            duplicate_records: DuplicateRecordPolicy::default(),
        }
    }
}

/// Graph metrics configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GraphConfig {
    /// URL that depth-from-root is measured from (defaults to the start URL)
    pub root_url: Option<String>,
}

/// Link-map scan configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScanConfig {
    /// Page budget for the scan; negative means unbounded
    pub max_pages: i64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { max_pages: -1 }
    }
}
