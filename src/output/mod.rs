//! Output module for crawl results and their exports
//!
//! This module handles:
//! - The result records a crawl produces
//! - Saving page Markdown to the content directory
//! - Packaging saved pages into zip archives
//! - Generating a markdown summary of the run

pub mod archive;
pub mod export;
pub mod summary;
mod types;

pub use archive::{create_archive, prune_expired_archives};
pub use export::{page_path, slugify, ContentWriter, PagePath};
pub use summary::{format_markdown_summary, generate_markdown_summary};
pub use types::{
    CrawlOutcome, ExportError, FailedPage, OutcomeStatus, OutputResult, PageResult,
};
