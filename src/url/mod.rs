//! URL handling module for Sumi-Scroll
//!
//! This module provides URL normalization and the scope policy that decides
//! which discovered links belong to a crawl.

mod normalize;
mod scope;

// Re-export main functions
pub use normalize::{normalize_parsed, normalize_url};
pub use scope::{ScopePolicy, ScopeRejection};
