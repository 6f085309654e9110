//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching
//! - Content extraction and Markdown conversion
//! - The breadth-first frontier and request pacing
//! - Overall crawl coordination

pub mod coordinator;
pub mod extractor;
pub mod fetcher;
pub mod frontier;
pub mod rate_limiter;
pub mod worker;

pub use coordinator::Coordinator;
pub use extractor::{extract, ExtractError, Extraction};
pub use fetcher::{build_http_client, FetchResult, HttpFetcher};
pub use frontier::{Frontier, FrontierEntry};
pub use rate_limiter::RateLimiter;
pub use worker::{PageOutcome, PageWorker, SkipReason};

use crate::config::CrawlRequest;
use crate::output::CrawlOutcome;
use crate::progress::NullReporter;
use std::sync::Arc;

/// Runs a complete crawl without progress reporting
///
/// Convenience wrapper over [`Coordinator`] for callers that only want the
/// outcome.
pub async fn crawl(request: CrawlRequest) -> crate::Result<CrawlOutcome> {
    Coordinator::new(request, Arc::new(NullReporter))?.run().await
}
