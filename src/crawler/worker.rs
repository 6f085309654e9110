//! Per-page processing
//!
//! A [`PageWorker`] takes one frontier entry through rate limiting, fetch,
//! extraction, link discovery and the optional save to disk. Every per-page
//! failure becomes a [`SkipReason`]; nothing here can abort the crawl.

use crate::crawler::extractor::{self, ExtractError, Extraction};
use crate::crawler::fetcher::{FetchResult, HttpFetcher};
use crate::crawler::frontier::FrontierEntry;
use crate::crawler::rate_limiter::RateLimiter;
use crate::output::{ContentWriter, PageResult};
use crate::state::VisitedSet;
use crate::url::ScopePolicy;
use scraper::{Html, Selector};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Why a dequeued page produced no result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Connection, TLS or body read failure
    Network(String),

    /// No response within the client timeout
    Timeout,

    /// Non-2xx response
    HttpStatus(u16),

    /// Empty document or Markdown conversion failure
    Extraction(String),

    /// Crawl was cancelled before the fetch completed
    Cancelled,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(e) => write!(f, "network error: {}", e),
            Self::Timeout => write!(f, "request timed out"),
            Self::HttpStatus(code) => write!(f, "HTTP {}", code),
            Self::Extraction(e) => write!(f, "extraction failed: {}", e),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Result of processing one frontier entry
#[derive(Debug)]
pub enum PageOutcome {
    Processed {
        page: PageResult,
        /// In-scope links discovered on the page, in document order
        links: Vec<String>,
    },
    Skipped {
        entry: FrontierEntry,
        reason: SkipReason,
    },
}

/// Everything a fetch task needs, shared between tasks through an `Arc`
pub struct PageWorker {
    fetcher: HttpFetcher,
    limiter: Arc<RateLimiter>,
    scope: Arc<ScopePolicy>,
    visited: Arc<VisitedSet>,
    selector: Option<Selector>,
    writer: Option<ContentWriter>,
    cancel: CancellationToken,
}

impl PageWorker {
    pub fn new(
        fetcher: HttpFetcher,
        limiter: Arc<RateLimiter>,
        scope: Arc<ScopePolicy>,
        visited: Arc<VisitedSet>,
        selector: Option<Selector>,
        writer: Option<ContentWriter>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            fetcher,
            limiter,
            scope,
            visited,
            selector,
            writer,
            cancel,
        }
    }

    /// Processes one entry
    pub async fn process(&self, entry: FrontierEntry) -> PageOutcome {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return skipped(entry, SkipReason::Cancelled),
            _ = self.limiter.wait() => {}
        }

        tracing::debug!("Fetching {} at depth {}", entry.url, entry.depth);

        let fetched = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return skipped(entry, SkipReason::Cancelled),
            fetched = self.fetcher.fetch(&entry.url) => fetched,
        };

        match fetched {
            FetchResult::Success {
                final_url, body, ..
            } => self.complete(entry, &final_url, &body).await,
            FetchResult::HttpError { status_code } => {
                tracing::warn!("Request failed for {}: HTTP {}", entry.url, status_code);
                skipped(entry, SkipReason::HttpStatus(status_code))
            }
            FetchResult::Timeout => {
                tracing::warn!("Request timed out for {}", entry.url);
                skipped(entry, SkipReason::Timeout)
            }
            FetchResult::NetworkError { error } => {
                tracing::warn!("Request failed for {}: {}", entry.url, error);
                skipped(entry, SkipReason::Network(error))
            }
        }
    }

    /// Extracts, discovers links and saves a fetched page
    async fn complete(&self, entry: FrontierEntry, final_url: &str, body: &str) -> PageOutcome {
        let (extraction, links) = match self.parse(&entry, final_url, body) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Failed to extract content from {}: {}", entry.url, e);
                return skipped(entry, SkipReason::Extraction(e.to_string()));
            }
        };

        tracing::info!("Found {} new links to crawl from {}", links.len(), entry.url);

        let saved_file_path = match &self.writer {
            Some(writer) => save_page(writer.clone(), &entry.url, &extraction.markdown).await,
            None => None,
        };

        PageOutcome::Processed {
            page: PageResult {
                content: extraction.excerpt(),
                markdown_content: extraction.markdown,
                url: entry.url,
                saved_file_path,
                depth: entry.depth,
            },
            links,
        }
    }

    /// Parses the body once for both content and links
    ///
    /// Links resolve against the final URL so redirects keep relative links
    /// correct.
    fn parse(
        &self,
        entry: &FrontierEntry,
        final_url: &str,
        body: &str,
    ) -> Result<(Extraction, Vec<String>), ExtractError> {
        if body.trim().is_empty() {
            return Err(ExtractError::EmptyDocument);
        }

        let document = Html::parse_document(body);
        let extraction = extractor::extract_document(&document, self.selector.as_ref())?;

        let links = match Url::parse(final_url).or_else(|_| Url::parse(&entry.url)) {
            Ok(page_url) => self.scope.extract_links(&document, &page_url, &self.visited),
            Err(e) => {
                tracing::debug!("Cannot resolve links for {}: {}", entry.url, e);
                Vec::new()
            }
        };

        Ok((extraction, links))
    }
}

/// Writes the page on the blocking pool; a failed save only loses the file
async fn save_page(writer: ContentWriter, url: &str, markdown: &str) -> Option<PathBuf> {
    let owned_url = url.to_string();
    let markdown = markdown.to_string();

    match tokio::task::spawn_blocking(move || writer.save(&owned_url, &markdown)).await {
        Ok(Ok(path)) => Some(path),
        Ok(Err(e)) => {
            tracing::warn!("Failed to save {}: {}", url, e);
            None
        }
        Err(e) => {
            tracing::warn!("Save task for {} failed: {}", url, e);
            None
        }
    }
}

fn skipped(entry: FrontierEntry, reason: SkipReason) -> PageOutcome {
    PageOutcome::Skipped { entry, reason }
}
