//! Breadth-first crawl frontier
//!
//! The frontier is a FIFO queue of `(url, depth)` pairs. Because the seed
//! enters at depth 0 and every discovered link enters at `depth + 1`, FIFO
//! order is depth order: no page of depth `d + 1` is dequeued before every
//! queued page of depth `d`.

use std::collections::{HashSet, VecDeque};

/// A URL waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Normalized URL
    pub url: String,

    /// Link distance from the seed
    pub depth: u32,
}

impl FrontierEntry {
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

/// FIFO queue of URLs discovered but not yet fetched
///
/// A URL already waiting in the queue is not queued a second time. The
/// earliest (shallowest) entry wins.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    pending: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frontier holding only the seed at depth 0
    pub fn with_seed(url: impl Into<String>) -> Self {
        let mut frontier = Self::new();
        frontier.push(FrontierEntry::new(url, 0));
        frontier
    }

    /// Appends an entry, returning false if the URL is already pending
    pub fn push(&mut self, entry: FrontierEntry) -> bool {
        if !self.pending.insert(entry.url.clone()) {
            tracing::trace!("{} already pending, not queued again", entry.url);
            return false;
        }
        self.queue.push_back(entry);
        true
    }

    /// Removes the oldest entry
    pub fn pop(&mut self) -> Option<FrontierEntry> {
        let entry = self.queue.pop_front()?;
        self.pending.remove(&entry.url);
        Some(entry)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
