//! Configuration module for Sumi-Scroll
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and turning a validated configuration into a [`CrawlRequest`].
//!
//! # Example
//!
//! ```no_run
//! use sumi_scroll::config::{load_config, CrawlRequest};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scroll.toml")).unwrap();
//! let request = CrawlRequest::from_config(config).unwrap();
//! println!("Crawling from: {}", request.url);
//! ```

mod parser;
mod request;
mod types;
mod validation;

// Re-export types
pub use request::{ContentSelector, CrawlRequest};
pub use types::{
    BudgetConfig, Config, CrawlSection, CrawlerConfig, HttpConfig, OutputConfig,
    DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
