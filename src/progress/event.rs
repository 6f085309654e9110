use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A progress notification emitted during a crawl
///
/// `progress` is a percentage in `[0, 100]`, `None` while a page is being
/// fetched, or `-1.0` when the crawl stopped with an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub message: String,

    /// RFC 3339 time the event was created
    pub timestamp: String,

    pub progress: Option<f64>,
}

impl ProgressEvent {
    pub fn new(message: impl Into<String>, progress: Option<f64>) -> Self {
        Self {
            message: message.into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            progress,
        }
    }

    pub fn started() -> Self {
        Self::new("Starting crawl...", Some(0.0))
    }

    pub fn processing(url: &str) -> Self {
        Self::new(format!("Processing {}", url), None)
    }

    /// Page finished; `processed` out of at most `max_pages`
    pub fn processed(url: &str, processed: usize, max_pages: usize) -> Self {
        let pct = if max_pages == 0 {
            100.0
        } else {
            processed as f64 / max_pages as f64 * 100.0
        };
        Self::new(format!("Processed {}", url), Some(pct))
    }

    pub fn completed() -> Self {
        Self::new("Crawl completed successfully", Some(100.0))
    }

    pub fn failed(reason: &str) -> Self {
        Self::new(format!("Error: {}", reason), Some(-1.0))
    }

    pub fn is_error(&self) -> bool {
        self.progress == Some(-1.0)
    }
}
