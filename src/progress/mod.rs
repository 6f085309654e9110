//! Progress reporting
//!
//! The engine publishes a [`ProgressEvent`] at each crawl milestone through a
//! [`ProgressReporter`]. Reporters are fire-and-forget: a slow or absent
//! observer never stalls the crawl.

mod event;
mod reporter;

pub use event::ProgressEvent;
pub use reporter::{
    BroadcastReporter, CollectingReporter, NullReporter, ProgressReporter, EVENT_CHANNEL_CAPACITY,
};
