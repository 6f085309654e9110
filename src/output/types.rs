//! Crawl result types
//!
//! This module defines the records a crawl produces and the error type shared
//! by the export helpers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while exporting crawl results
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Invalid export path: {0}")]
    InvalidPath(String),

    #[error("No saved files to archive")]
    NothingToArchive,
}

/// Result type for export operations
pub type OutputResult<T> = Result<T, ExportError>;

/// One successfully processed page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult {
    /// Normalized page URL
    pub url: String,

    /// First characters of the extracted fragment markup
    pub content: String,

    /// Fragment rendered as Markdown
    pub markdown_content: String,

    /// Where the Markdown was written, if it was saved
    pub saved_file_path: Option<PathBuf>,

    /// Link distance from the seed
    pub depth: u32,
}

/// A page that was dequeued but produced no result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedPage {
    pub url: String,
    pub depth: u32,
    pub reason: String,
}

/// Final status of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Error,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Everything a finished crawl hands back to its caller
#[derive(Debug, Clone, Serialize)]
pub struct CrawlOutcome {
    /// Seed URL as requested
    pub base_url: String,

    /// Processed pages in processing order
    pub pages: Vec<PageResult>,

    /// Always equal to `pages.len()`
    pub total_pages: usize,

    pub status: OutcomeStatus,

    /// Why the crawl stopped early, for `OutcomeStatus::Error`
    pub error: Option<String>,

    /// Pages skipped because of fetch or extraction failures
    pub failed_pages: Vec<FailedPage>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_secs: f64,
}

impl CrawlOutcome {
    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }

    /// Paths of all pages that were written to disk
    pub fn saved_files(&self) -> Vec<PathBuf> {
        self.pages
            .iter()
            .filter_map(|p| p.saved_file_path.clone())
            .collect()
    }

    /// Total size of the Markdown produced, in bytes
    pub fn markdown_bytes(&self) -> usize {
        self.pages.iter().map(|p| p.markdown_content.len()).sum()
    }
}
