//! Saving page Markdown to disk
//!
//! Each page is written under the content directory at a path mirroring its
//! URL path: every directory segment is slugified and the last segment
//! becomes `<slug>.md` (`index.md` for the root).

use crate::output::types::{ExportError, OutputResult};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Relative location of a page inside the content directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePath {
    /// Slugified directory segments
    pub dirs: Vec<String>,

    /// File name including the `.md` extension
    pub file_name: String,
}

impl PagePath {
    pub fn relative_path(&self) -> PathBuf {
        let mut path: PathBuf = self.dirs.iter().collect();
        path.push(&self.file_name);
        path
    }
}

/// Lowercases ASCII alphanumerics and collapses every other run into `-`
///
/// ```
/// use sumi_scroll::output::slugify;
///
/// assert_eq!(slugify("Data_Fetching v2"), "data-fetching-v2");
/// ```
pub fn slugify(segment: &str) -> String {
    let mut slug = String::with_capacity(segment.len());
    let mut pending_dash = false;

    for c in segment.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Maps a page URL to its location under the content directory
pub fn page_path(url: &str) -> OutputResult<PagePath> {
    let parsed =
        Url::parse(url).map_err(|e| ExportError::InvalidPath(format!("'{}': {}", url, e)))?;

    let segments: Vec<&str> = parsed.path().trim_matches('/').split('/').collect();
    let (last, parents) = segments
        .split_last()
        .ok_or_else(|| ExportError::InvalidPath(url.to_string()))?;

    let dirs = parents
        .iter()
        .map(|segment| slugify(segment))
        .filter(|slug| !slug.is_empty())
        .collect();

    let stem = match slugify(last) {
        s if s.is_empty() => "index".to_string(),
        s => s,
    };

    Ok(PagePath {
        dirs,
        file_name: format!("{}.md", stem),
    })
}

/// Writes page Markdown with a small front matter header
#[derive(Debug, Clone)]
pub struct ContentWriter {
    root: PathBuf,
}

impl ContentWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Saves `markdown` for `url`, returning the written file's path
    ///
    /// An existing file for the same URL is overwritten.
    pub fn save(&self, url: &str, markdown: &str) -> OutputResult<PathBuf> {
        let page = page_path(url)?;
        let path = self.root.join(page.relative_path());

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let document = format!(
            "---\nurl: {}\ndate: {}\n---\n\n{}\n",
            url,
            Utc::now().format("%Y-%m-%d"),
            markdown
        );
        fs::write(&path, document)?;

        tracing::debug!("Saved {} to {}", url, path.display());
        Ok(path)
    }
}
