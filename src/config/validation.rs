use crate::config::types::{
    BudgetConfig, Config, CrawlSection, CrawlerConfig, HttpConfig, OutputConfig,
};
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Longest allowed pause between requests, in seconds
const MAX_WAIT_TIME: f64 = 30.0;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_section(&config.crawl)?;
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    validate_output_config(&config.output)?;
    validate_budget_config(&config.budget)?;
    Ok(())
}

/// Validates the seed URL and wait time
fn validate_crawl_section(section: &CrawlSection) -> Result<(), ConfigError> {
    let url = Url::parse(&section.url)
        .map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", section.url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' must use http or https",
            section.url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' has no host",
            section.url
        )));
    }

    if !section.wait_time.is_finite() || section.wait_time <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "wait_time must be greater than 0, got {}",
            section.wait_time
        )));
    }

    if section.wait_time > MAX_WAIT_TIME {
        return Err(ConfigError::Validation(format!(
            "wait_time must be <= {} seconds, got {}",
            MAX_WAIT_TIME, section.wait_time
        )));
    }

    Ok(())
}

/// Validates traversal bounds and scope patterns
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_depth > 10 {
        return Err(ConfigError::Validation(format!(
            "max_depth must be between 0 and 10, got {}",
            config.max_depth
        )));
    }

    if config.max_pages < 1 || config.max_pages > 1000 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be between 1 and 1000, got {}",
            config.max_pages
        )));
    }

    if config.concurrency < 1 || config.concurrency > 32 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 32, got {}",
            config.concurrency
        )));
    }

    if !config.path_prefix.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "path_prefix must start with '/', got '{}'",
            config.path_prefix
        )));
    }

    for pattern in config
        .include_patterns
        .iter()
        .chain(config.exclude_patterns.iter())
    {
        validate_pattern(pattern)?;
    }

    Ok(())
}

/// Validates user agent, timeout and custom headers
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 || config.timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be between 1 and 300, got {}",
            config.timeout_secs
        )));
    }

    config.header_map()?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.content_dir.is_empty() {
        return Err(ConfigError::Validation(
            "content_dir cannot be empty".to_string(),
        ));
    }

    if config.archive_dir.is_empty() {
        return Err(ConfigError::Validation(
            "archive_dir cannot be empty".to_string(),
        ));
    }

    if config.archive_prefix.is_empty()
        || !config
            .archive_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "archive_prefix must be non-empty and contain only alphanumerics, '-' or '_', got '{}'",
            config.archive_prefix
        )));
    }

    Ok(())
}

fn validate_budget_config(config: &BudgetConfig) -> Result<(), ConfigError> {
    if config.max_duration_secs == Some(0) {
        return Err(ConfigError::Validation(
            "max_duration_secs must be greater than 0".to_string(),
        ));
    }

    if config.max_content_bytes == Some(0) {
        return Err(ConfigError::Validation(
            "max_content_bytes must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Checks that a scope pattern compiles as a regex
fn validate_pattern(pattern: &str) -> Result<(), ConfigError> {
    Regex::new(pattern)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_section() -> CrawlSection {
        CrawlSection {
            url: "https://nextjs.org/docs/app".to_string(),
            selector: None,
            wait_time: 1.0,
            save_to_file: true,
        }
    }

    #[test]
    fn test_validate_crawl_section() {
        assert!(validate_crawl_section(&create_test_section()).is_ok());

        let mut section = create_test_section();
        section.url = "not-a-url".to_string();
        assert!(matches!(
            validate_crawl_section(&section),
            Err(ConfigError::InvalidUrl(_))
        ));

        let mut section = create_test_section();
        section.url = "ftp://example.com/docs".to_string();
        assert!(validate_crawl_section(&section).is_err());
    }

    #[test]
    fn test_validate_wait_time() {
        let mut section = create_test_section();

        section.wait_time = 0.001;
        assert!(validate_crawl_section(&section).is_ok());

        section.wait_time = 0.0;
        assert!(validate_crawl_section(&section).is_err());

        section.wait_time = -1.0;
        assert!(validate_crawl_section(&section).is_err());

        section.wait_time = 31.0;
        assert!(validate_crawl_section(&section).is_err());

        section.wait_time = f64::NAN;
        assert!(validate_crawl_section(&section).is_err());
    }

    #[test]
    fn test_validate_crawler_bounds() {
        assert!(validate_crawler_config(&CrawlerConfig::default()).is_ok());

        let config = CrawlerConfig {
            max_pages: 0,
            ..CrawlerConfig::default()
        };
        assert!(validate_crawler_config(&config).is_err());

        let config = CrawlerConfig {
            max_depth: 11,
            ..CrawlerConfig::default()
        };
        assert!(validate_crawler_config(&config).is_err());

        let config = CrawlerConfig {
            max_depth: 0,
            ..CrawlerConfig::default()
        };
        assert!(validate_crawler_config(&config).is_ok());

        let config = CrawlerConfig {
            concurrency: 0,
            ..CrawlerConfig::default()
        };
        assert!(validate_crawler_config(&config).is_err());

        let config = CrawlerConfig {
            path_prefix: "docs".to_string(),
            ..CrawlerConfig::default()
        };
        assert!(validate_crawler_config(&config).is_err());
    }

    #[test]
    fn test_validate_patterns() {
        let config = CrawlerConfig {
            include_patterns: vec!["/docs/app.*".to_string()],
            exclude_patterns: vec!["/docs/pages.*".to_string()],
            ..CrawlerConfig::default()
        };
        assert!(validate_crawler_config(&config).is_ok());

        let config = CrawlerConfig {
            exclude_patterns: vec!["/docs/(unclosed".to_string()],
            ..CrawlerConfig::default()
        };
        assert!(matches!(
            validate_crawler_config(&config),
            Err(ConfigError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_validate_http_headers() {
        let mut config = HttpConfig::default();
        config
            .headers
            .insert("X-Docs-Token".to_string(), "abc".to_string());
        assert!(validate_http_config(&config).is_ok());

        config
            .headers
            .insert("bad header".to_string(), "abc".to_string());
        assert!(validate_http_config(&config).is_err());
    }

    #[test]
    fn test_validate_output_prefix() {
        let mut config = OutputConfig::default();
        assert!(validate_output_config(&config).is_ok());

        config.archive_prefix = "../escape".to_string();
        assert!(validate_output_config(&config).is_err());
    }

    #[test]
    fn test_validate_budget() {
        assert!(validate_budget_config(&BudgetConfig::default()).is_ok());

        let config = BudgetConfig {
            max_duration_secs: Some(0),
            max_content_bytes: None,
        };
        assert!(validate_budget_config(&config).is_err());
    }
}
