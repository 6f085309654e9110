//! URL scope policy
//!
//! Decides which discovered URLs belong to the crawl. A URL is in scope only
//! when every rule passes:
//!
//! 1. it has not been visited yet
//! 2. its host (and port) equals the seed's exactly
//! 3. its path starts with the configured path prefix
//! 4. its path matches none of the exclude patterns
//! 5. its path matches at least one include pattern, if any are configured
//!
//! The policy fails closed: a URL that cannot be parsed is out of scope.

use crate::config::CrawlerConfig;
use crate::state::VisitedSet;
use crate::url::normalize::{authority, normalize_parsed};
use crate::{ConfigError, UrlError};
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::fmt;
use url::Url;

/// Why a URL was rejected by the scope policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeRejection {
    AlreadyVisited,
    Unparseable(String),
    ForeignHost(String),
    OutsidePrefix,
    Excluded(String),
    NotIncluded,
}

impl fmt::Display for ScopeRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyVisited => write!(f, "already visited"),
            Self::Unparseable(e) => write!(f, "unparseable: {}", e),
            Self::ForeignHost(host) => write!(f, "wrong host: {}", host),
            Self::OutsidePrefix => write!(f, "outside path prefix"),
            Self::Excluded(pattern) => write!(f, "matched exclude pattern {}", pattern),
            Self::NotIncluded => write!(f, "matched no include pattern"),
        }
    }
}

/// Scope rules for one crawl, anchored on the seed URL
#[derive(Debug, Clone)]
pub struct ScopePolicy {
    authority: String,
    path_prefix: String,
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl ScopePolicy {
    /// Builds the policy for a crawl seeded at `seed`
    pub fn new(seed: &Url, config: &CrawlerConfig) -> Result<Self, ConfigError> {
        let authority = authority(seed)
            .ok_or_else(|| ConfigError::InvalidUrl(format!("Seed URL '{}' has no host", seed)))?;

        Ok(Self {
            authority,
            path_prefix: config.path_prefix.clone(),
            include: compile_patterns(&config.include_patterns)?,
            exclude: compile_patterns(&config.exclude_patterns)?,
        })
    }

    /// Host and port every in-scope URL must carry
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Canonical form used for dedup and frontier entries
    pub fn normalize(&self, url: &str) -> Result<String, UrlError> {
        super::normalize_url(url)
    }

    /// Returns true if `url` should be crawled
    pub fn is_in_scope(&self, url: &str, visited: &VisitedSet) -> bool {
        match self.check(url, visited) {
            Ok(()) => {
                tracing::debug!("URL approved for crawling: {}", url);
                true
            }
            Err(reason) => {
                tracing::debug!("Skipping {} - {}", url, reason);
                false
            }
        }
    }

    /// Applies the scope rules in order, reporting the first that fails
    pub fn check(&self, url: &str, visited: &VisitedSet) -> Result<(), ScopeRejection> {
        if visited.contains(url) {
            return Err(ScopeRejection::AlreadyVisited);
        }

        let parsed = Url::parse(url).map_err(|e| ScopeRejection::Unparseable(e.to_string()))?;

        let host = authority(&parsed).unwrap_or_default();
        if host != self.authority {
            return Err(ScopeRejection::ForeignHost(host));
        }

        let path = parsed.path();
        if !path.starts_with(&self.path_prefix) {
            return Err(ScopeRejection::OutsidePrefix);
        }

        if let Some(pattern) = self.exclude.iter().find(|re| re.is_match(path)) {
            return Err(ScopeRejection::Excluded(pattern.as_str().to_string()));
        }

        if !self.include.is_empty() && !self.include.iter().any(|re| re.is_match(path)) {
            return Err(ScopeRejection::NotIncluded);
        }

        Ok(())
    }

    /// Collects the in-scope link targets of a page
    ///
    /// Anchor targets are resolved against `page_url`, normalized and scope
    /// tested. The result is de-duplicated and keeps document order.
    pub fn extract_links(
        &self,
        document: &Html,
        page_url: &Url,
        visited: &VisitedSet,
    ) -> Vec<String> {
        let anchor_selector = match Selector::parse("a[href]") {
            Ok(selector) => selector,
            Err(_) => return Vec::new(),
        };

        let mut seen = HashSet::new();
        let mut links = Vec::new();
        let mut anchors = 0usize;

        for element in document.select(&anchor_selector) {
            anchors += 1;

            // Download links point at assets, not pages
            if element.value().attr("download").is_some() {
                continue;
            }

            let Some(href) = element.value().attr("href") else {
                continue;
            };

            let Some(resolved) = resolve_link(href, page_url) else {
                continue;
            };

            let normalized = match normalize_parsed(&resolved) {
                Ok(n) => n,
                Err(e) => {
                    tracing::debug!("Failed to normalize link {}: {}", resolved, e);
                    continue;
                }
            };

            if seen.contains(&normalized) {
                continue;
            }

            if self.is_in_scope(&normalized, visited) {
                seen.insert(normalized.clone());
                links.push(normalized);
            }
        }

        tracing::debug!(
            "Extracted {} in-scope links from {} anchors on {}",
            links.len(),
            anchors,
            page_url
        );

        links
    }
}

/// Resolves an anchor target against the page it appeared on
///
/// Returns None for empty targets, fragment-only targets, the `javascript:`,
/// `mailto:`, `tel:` and `data:` schemes, and anything that is not http(s)
/// once resolved.
fn resolve_link(href: &str, page_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    // `/abs` resolves against scheme and host, `rel` against the full page URL
    let resolved = page_url.join(href).ok()?;

    match resolved.scheme() {
        "http" | "https" => Some(resolved),
        _ => None,
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", p, e)))
        })
        .collect()
}
