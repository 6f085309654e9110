//! Sumi-Scroll: a documentation site scribe
//!
//! This crate crawls a documentation site breadth-first from a seed URL, keeps
//! traversal inside a configured URL scope, converts each page to Markdown and
//! streams progress events to observers while building an ordered result set.

pub mod config;
pub mod crawler;
pub mod output;
pub mod progress;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Scroll operations
#[derive(Debug, Error)]
pub enum ScrollError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Export error: {0}")]
    Export(#[from] output::ExportError),

    #[error("Crawl budget exceeded: {0}")]
    BudgetExceeded(String),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlState,
        to: state::CrawlState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Sumi-Scroll operations
pub type Result<T> = std::result::Result<T, ScrollError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, CrawlRequest};
pub use crawler::Coordinator;
pub use output::{CrawlOutcome, OutcomeStatus, PageResult};
pub use progress::{ProgressEvent, ProgressReporter};
pub use state::{CrawlState, VisitedSet};
pub use url::{normalize_url, ScopePolicy};
