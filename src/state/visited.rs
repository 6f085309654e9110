use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Set of normalized URLs already processed in this crawl
///
/// The set only grows. Membership is the sole deduplication authority, and
/// `insert` is an atomic test-and-insert so the at-most-once guarantee holds
/// when the set is shared between tasks. The lock is never held across an
/// `.await`.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(url)
    }

    /// Marks a URL visited, returning false if it already was
    pub fn insert(&self, url: impl Into<String>) -> bool {
        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.into())
    }

    pub fn len(&self) -> usize {
        self.urls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
