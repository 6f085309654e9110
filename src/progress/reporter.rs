use crate::progress::ProgressEvent;
use std::sync::{Mutex, PoisonError};
use tokio::sync::broadcast;

/// Default buffer of the broadcast channel
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Receives progress events from a running crawl
///
/// Publishing is fire-and-forget and must never block the crawl.
pub trait ProgressReporter: Send + Sync {
    fn publish(&self, event: ProgressEvent);
}

/// Fans events out to any number of subscribers
///
/// Events sent while nobody is subscribed are dropped. A subscriber that
/// falls more than the channel capacity behind loses the oldest events.
#[derive(Debug, Clone)]
pub struct BroadcastReporter {
    tx: broadcast::Sender<ProgressEvent>,
}

impl BroadcastReporter {
    pub fn new() -> Self {
        Self::with_capacity(EVENT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for BroadcastReporter {
    fn publish(&self, event: ProgressEvent) {
        let message = event.message.clone();
        match self.tx.send(event) {
            Ok(n) => tracing::debug!("Progress '{}': {} subscriber(s)", message, n),
            Err(_) => tracing::debug!("Progress '{}': no subscribers", message),
        }
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn publish(&self, _event: ProgressEvent) {}
}

/// Keeps every event in memory, in publish order
#[derive(Debug, Default)]
pub struct CollectingReporter {
    events: Mutex<Vec<ProgressEvent>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events published so far
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.message).collect()
    }
}

impl ProgressReporter for CollectingReporter {
    fn publish(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
