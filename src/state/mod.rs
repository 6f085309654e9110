//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: lifecycle of one crawl run (idle, running, completed, aborted)
//! - `VisitedSet`: normalized URLs already processed, the dedup authority

mod crawl_state;
mod visited;

// Re-export main types
pub use crawl_state::CrawlState;
pub use visited::VisitedSet;
