//! Validated, immutable crawl request
//!
//! A `CrawlRequest` is what the engine consumes. It can only be produced from
//! a [`Config`] that passed validation, so the engine never sees an invalid
//! seed URL, regex, selector or wait time.

use crate::config::types::{BudgetConfig, Config, CrawlerConfig, HttpConfig, OutputConfig};
use crate::config::validation::validate;
use crate::ConfigError;
use scraper::Selector;
use std::time::Duration;
use url::Url;

/// A compiled CSS selector together with the text it was parsed from
#[derive(Debug, Clone)]
pub struct ContentSelector {
    pub source: String,
    pub selector: Selector,
}

impl ContentSelector {
    pub fn parse(source: &str) -> Result<Self, ConfigError> {
        let selector = Selector::parse(source)
            .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", source, e)))?;
        Ok(Self {
            source: source.to_string(),
            selector,
        })
    }
}

/// Everything one crawl needs, fixed for its whole duration
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    /// Seed URL as supplied
    pub url: Url,
    pub selector: Option<ContentSelector>,
    /// Minimum interval between fetches
    pub wait_time: Duration,
    pub save_to_file: bool,
    pub crawler: CrawlerConfig,
    pub http: HttpConfig,
    pub output: OutputConfig,
    pub budget: BudgetConfig,
}

impl CrawlRequest {
    /// Validates a configuration and turns it into a crawl request
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        validate(&config)?;

        let url = Url::parse(&config.crawl.url)
            .map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", config.crawl.url, e)))?;

        let selector = config
            .crawl
            .selector
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ContentSelector::parse)
            .transpose()?;

        Ok(Self {
            url,
            selector,
            wait_time: Duration::from_secs_f64(config.crawl.wait_time),
            save_to_file: config.crawl.save_to_file,
            crawler: config.crawler,
            http: config.http,
            output: config.output,
            budget: config.budget,
        })
    }

    /// Requests per second implied by the wait time
    pub fn requests_per_second(&self) -> f64 {
        1.0 / self.wait_time.as_secs_f64()
    }
}
