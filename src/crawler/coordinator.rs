//! Crawler coordinator - main crawl orchestration logic
//!
//! The coordinator owns the frontier, the visited set and the result list.
//! It drains the frontier breadth-first, hands pages to fetch tasks, and
//! turns their outcomes into results, new frontier entries and progress
//! events.
//!
//! With `concurrency = 1` exactly one page is in flight at a time and
//! traversal is strict FIFO. With more workers, pages still leave the
//! frontier in FIFO order but may complete out of order, so breadth-first
//! order is approximate. The depth and page bounds hold exactly either way.

use crate::config::CrawlRequest;
use crate::crawler::fetcher::HttpFetcher;
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::crawler::rate_limiter::RateLimiter;
use crate::crawler::worker::{PageOutcome, PageWorker, SkipReason};
use crate::output::{ContentWriter, CrawlOutcome, FailedPage, OutcomeStatus, PageResult};
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::state::{CrawlState, VisitedSet};
use crate::url::{normalize_parsed, ScopePolicy};
use crate::{Result, ScrollError};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Why the main loop stopped
enum Stop {
    /// Frontier exhausted or page limit reached
    Finished,
    Cancelled,
    Budget(String),
}

/// Main crawler coordinator structure
pub struct Coordinator {
    request: CrawlRequest,
    reporter: Arc<dyn ProgressReporter>,
    worker: Arc<PageWorker>,
    visited: Arc<VisitedSet>,
    cancel: CancellationToken,
    state: CrawlState,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Builds the HTTP client, rate limiter and scope policy for `request`.
    /// Progress events go to `reporter`.
    pub fn new(request: CrawlRequest, reporter: Arc<dyn ProgressReporter>) -> Result<Self> {
        let fetcher = HttpFetcher::from_config(&request.http)?;
        let limiter = Arc::new(RateLimiter::from_interval(request.wait_time));
        let scope = Arc::new(ScopePolicy::new(&request.url, &request.crawler)?);
        let visited = Arc::new(VisitedSet::new());
        let cancel = CancellationToken::new();

        let writer = request
            .save_to_file
            .then(|| ContentWriter::new(&request.output.content_dir));

        let worker = Arc::new(PageWorker::new(
            fetcher,
            limiter,
            scope,
            Arc::clone(&visited),
            request.selector.as_ref().map(|s| s.selector.clone()),
            writer,
            cancel.clone(),
        ));

        Ok(Self {
            request,
            reporter,
            worker,
            visited,
            cancel,
            state: CrawlState::Idle,
        })
    }

    /// Token that stops the crawl when cancelled
    ///
    /// After cancellation no new fetches start, in-flight fetches are
    /// abandoned and `run` returns the partial outcome with an error status.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    fn transition(&mut self, next: CrawlState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(ScrollError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!("Crawl state {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    fn emit(&self, event: ProgressEvent) {
        self.reporter.publish(event);
    }

    /// Runs the main crawl loop
    ///
    /// Per-page failures are logged and recorded in `failed_pages`; they
    /// never abort the crawl. Cancellation returns a partial outcome with
    /// status `Error`. An unusable seed or an exceeded budget returns an
    /// error.
    pub async fn run(mut self) -> Result<CrawlOutcome> {
        let started_at = Utc::now();
        let clock = Instant::now();

        self.transition(CrawlState::Running)?;

        let max_pages = self.request.crawler.max_pages as usize;
        let max_depth = self.request.crawler.max_depth;
        let concurrency = self.request.crawler.concurrency.max(1) as usize;

        tracing::info!(
            "Starting crawl of {} (max pages: {}, max depth: {}, concurrency: {})",
            self.request.url,
            max_pages,
            max_depth,
            concurrency
        );
        self.emit(ProgressEvent::started());

        let seed = match normalize_parsed(&self.request.url) {
            Ok(seed) => seed,
            Err(e) => {
                tracing::error!("Cannot start crawl from {}: {}", self.request.url, e);
                self.emit(ProgressEvent::failed(&e.to_string()));
                self.transition(CrawlState::Aborted)?;
                return Err(e.into());
            }
        };

        let mut frontier = Frontier::with_seed(seed);
        // Every URL handed to a task, so each is fetched at most once
        let mut claimed: HashSet<String> = HashSet::new();
        let mut tasks: JoinSet<PageOutcome> = JoinSet::new();
        let mut pages: Vec<PageResult> = Vec::new();
        let mut failed_pages: Vec<FailedPage> = Vec::new();
        let mut markdown_bytes = 0usize;

        let stop = 'crawl: loop {
            if self.cancel.is_cancelled() {
                break Stop::Cancelled;
            }

            if let Some(reason) = self.budget_exceeded(clock.elapsed(), markdown_bytes) {
                break Stop::Budget(reason);
            }

            // Admit work while it cannot overshoot the page limit
            while tasks.len() < concurrency && pages.len() + tasks.len() < max_pages {
                let Some(entry) = frontier.pop() else {
                    break;
                };

                if entry.depth > max_depth {
                    tracing::debug!("Skipping {} - max depth reached", entry.url);
                    continue;
                }

                if self.visited.contains(&entry.url) || claimed.contains(&entry.url) {
                    tracing::debug!("Skipping {} - already visited", entry.url);
                    continue;
                }

                claimed.insert(entry.url.clone());
                tracing::info!("Processing URL: {} at depth {}", entry.url, entry.depth);
                self.emit(ProgressEvent::processing(&entry.url));

                let worker = Arc::clone(&self.worker);
                tasks.spawn(async move { worker.process(entry).await });
            }

            if tasks.is_empty() {
                break Stop::Finished;
            }

            let joined = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break 'crawl Stop::Cancelled,
                joined = tasks.join_next() => joined,
            };

            let outcome = match joined {
                Some(Ok(outcome)) => outcome,
                Some(Err(e)) => {
                    tracing::error!("Fetch task failed: {}", e);
                    continue;
                }
                None => continue,
            };

            match outcome {
                PageOutcome::Processed { page, links } => {
                    self.visited.insert(page.url.clone());
                    markdown_bytes += page.markdown_content.len();

                    let url = page.url.clone();
                    let depth = page.depth;
                    pages.push(page);

                    tracing::info!("Pages processed: {}/{}", pages.len(), max_pages);

                    if pages.len() >= max_pages {
                        tracing::info!("Reached max pages limit: {}", max_pages);
                        break Stop::Finished;
                    }

                    let mut queued = 0;
                    for link in links {
                        if self.visited.contains(&link) || claimed.contains(&link) {
                            continue;
                        }
                        if frontier.push(FrontierEntry::new(link, depth + 1)) {
                            queued += 1;
                        }
                    }
                    tracing::debug!(
                        "Queued {} links from {}, queue size: {}",
                        queued,
                        url,
                        frontier.len()
                    );

                    self.emit(ProgressEvent::processed(&url, pages.len(), max_pages));
                }
                PageOutcome::Skipped { entry, reason } => {
                    if reason == SkipReason::Cancelled {
                        continue;
                    }
                    failed_pages.push(FailedPage {
                        url: entry.url,
                        depth: entry.depth,
                        reason: reason.to_string(),
                    });
                }
            }
        };

        tasks.abort_all();

        let base_url = self.request.url.to_string();
        let build = move |status: OutcomeStatus, error: Option<String>| CrawlOutcome {
            base_url,
            total_pages: pages.len(),
            pages,
            status,
            error,
            failed_pages,
            started_at,
            finished_at: Utc::now(),
            elapsed_secs: clock.elapsed().as_secs_f64(),
        };

        match stop {
            Stop::Finished => {
                let outcome = build(OutcomeStatus::Success, None);
                self.finish(CrawlState::Completed, ProgressEvent::completed(), &outcome)?;
                Ok(outcome)
            }
            Stop::Cancelled => {
                let outcome = build(OutcomeStatus::Error, Some("crawl cancelled".to_string()));
                tracing::warn!("Crawl cancelled after {} pages", outcome.total_pages);
                self.finish(
                    CrawlState::Aborted,
                    ProgressEvent::failed("crawl cancelled"),
                    &outcome,
                )?;
                Ok(outcome)
            }
            Stop::Budget(reason) => {
                tracing::error!("Crawl aborted: {}", reason);
                self.emit(ProgressEvent::failed(&reason));
                self.transition(CrawlState::Aborted)?;
                Err(ScrollError::BudgetExceeded(reason))
            }
        }
    }

    fn finish(
        &mut self,
        state: CrawlState,
        event: ProgressEvent,
        outcome: &CrawlOutcome,
    ) -> Result<()> {
        self.emit(event);
        self.transition(state)?;
        tracing::info!(
            "Crawl {}: {} pages processed, {} failed, {:.2}s",
            state,
            outcome.total_pages,
            outcome.failed_pages.len(),
            outcome.elapsed_secs
        );
        Ok(())
    }

    /// Returns the reason if a configured budget has been used up
    fn budget_exceeded(&self, elapsed: Duration, markdown_bytes: usize) -> Option<String> {
        let budget = &self.request.budget;

        if let Some(max) = budget.max_duration() {
            if elapsed > max {
                return Some(format!("time budget of {}s exceeded", max.as_secs()));
            }
        }

        if let Some(max) = budget.max_content_bytes {
            if markdown_bytes as u64 > max {
                return Some(format!("content budget of {} bytes exceeded", max));
            }
        }

        None
    }
}
