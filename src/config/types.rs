use crate::ConfigError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Browser-like user agent sent when none is configured
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Main configuration structure for Sumi-Scroll
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawl: CrawlSection,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub budget: BudgetConfig,
}

/// What to crawl and how to extract it
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlSection {
    /// Seed URL the crawl starts from
    pub url: String,

    /// Optional CSS selector narrowing the extracted content
    #[serde(default)]
    pub selector: Option<String>,

    /// Seconds to wait between requests
    #[serde(rename = "wait-time", default = "default_wait_time")]
    pub wait_time: f64,

    /// Whether each page's markdown is written to disk
    #[serde(rename = "save-to-file", default = "default_true")]
    pub save_to_file: bool,
}

/// Crawler traversal configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum link depth from the seed page
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum number of pages to process
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Regex patterns a path must match (any) to be crawled
    #[serde(rename = "include-patterns", default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns that exclude a path from the crawl
    #[serde(rename = "exclude-patterns", default)]
    pub exclude_patterns: Vec<String>,

    /// Path prefix every crawled URL must carry
    #[serde(rename = "path-prefix", default = "default_path_prefix")]
    pub path_prefix: String,

    /// Number of pages fetched concurrently
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_pages: default_max_pages(),
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            path_prefix: default_path_prefix(),
            concurrency: default_concurrency(),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra headers merged over the defaults
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            headers: BTreeMap::new(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Builds the header set sent with every page request
    ///
    /// Custom headers replace defaults of the same name.
    pub fn header_map(&self) -> Result<HeaderMap, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(
            HeaderName::from_static("upgrade-insecure-requests"),
            HeaderValue::from_static("1"),
        );
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));

        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ConfigError::Validation(format!("Invalid header name '{}': {}", name, e))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                ConfigError::Validation(format!("Invalid value for header '{}': {}", name, e))
            })?;
            headers.insert(name, value);
        }

        Ok(headers)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the markdown tree is written into
    #[serde(rename = "content-dir", default = "default_content_dir")]
    pub content_dir: String,

    /// Directory archives are written into
    #[serde(rename = "archive-dir", default = "default_archive_dir")]
    pub archive_dir: String,

    /// File name prefix for archives
    #[serde(rename = "archive-prefix", default = "default_archive_prefix")]
    pub archive_prefix: String,

    /// Seconds an archive is kept before it may be deleted
    #[serde(rename = "retention-secs", default = "default_retention_secs")]
    pub retention_secs: u64,

    /// Whether a SUMMARY.md index is written next to the content
    #[serde(default = "default_true")]
    pub summary: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
            archive_dir: default_archive_dir(),
            archive_prefix: default_archive_prefix(),
            retention_secs: default_retention_secs(),
            summary: true,
        }
    }
}

impl OutputConfig {
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }
}

/// Resource limits for a single crawl
#[derive(Debug, Clone, Deserialize)]
pub struct BudgetConfig {
    /// Wall-clock limit for the whole crawl
    #[serde(rename = "max-duration-secs", default)]
    pub max_duration_secs: Option<u64>,

    /// Limit on the total markdown held in memory
    #[serde(rename = "max-content-bytes", default = "default_max_content_bytes")]
    pub max_content_bytes: Option<u64>,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_duration_secs: None,
            max_content_bytes: default_max_content_bytes(),
        }
    }
}

impl BudgetConfig {
    pub fn max_duration(&self) -> Option<Duration> {
        self.max_duration_secs.map(Duration::from_secs)
    }
}

fn default_wait_time() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_max_depth() -> u32 {
    3
}

fn default_max_pages() -> u32 {
    100
}

fn default_path_prefix() -> String {
    "/docs".to_string()
}

fn default_concurrency() -> u32 {
    1
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_content_dir() -> String {
    "content".to_string()
}

fn default_archive_dir() -> String {
    "downloads".to_string()
}

fn default_archive_prefix() -> String {
    "docs".to_string()
}

fn default_retention_secs() -> u64 {
    60
}

fn default_max_content_bytes() -> Option<u64> {
    Some(500 * 1024 * 1024)
}
