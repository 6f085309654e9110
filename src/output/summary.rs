//! Markdown summary generation
//!
//! Renders a `SUMMARY.md` index for a finished crawl: run information, a
//! depth breakdown, the processed pages and the pages that failed.

use crate::output::types::{CrawlOutcome, OutputResult};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the crawl summary to `output_path`
pub fn generate_markdown_summary(
    outcome: &CrawlOutcome,
    config_hash: &str,
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_markdown_summary(outcome, config_hash);

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl outcome as markdown
pub fn format_markdown_summary(outcome: &CrawlOutcome, config_hash: &str) -> String {
    let mut md = String::new();

    md.push_str("# Sumi-Scroll Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Base URL**: {}\n", outcome.base_url));
    md.push_str(&format!("- **Started**: {}\n", outcome.started_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Finished**: {}\n",
        outcome.finished_at.to_rfc3339()
    ));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        outcome.elapsed_secs
    ));
    md.push_str(&format!("- **Status**: {}\n", outcome.status.as_str()));
    if let Some(error) = &outcome.error {
        md.push_str(&format!("- **Error**: {}\n", error));
    }
    md.push_str(&format!("- **Config Hash**: {}\n\n", config_hash));

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Pages Processed**: {}\n", outcome.total_pages));
    md.push_str(&format!(
        "- **Pages Failed**: {}\n",
        outcome.failed_pages.len()
    ));
    md.push_str(&format!(
        "- **Pages Saved**: {}\n",
        outcome.saved_files().len()
    ));
    md.push_str(&format!(
        "- **Markdown Size**: {} bytes\n\n",
        outcome.markdown_bytes()
    ));

    // Depth breakdown
    if !outcome.pages.is_empty() {
        let mut depths: BTreeMap<u32, usize> = BTreeMap::new();
        for page in &outcome.pages {
            *depths.entry(page.depth).or_default() += 1;
        }

        md.push_str("## Depth Breakdown\n\n");
        md.push_str("| Depth | Pages |\n");
        md.push_str("|-------|-------|\n");
        for (depth, count) in depths {
            md.push_str(&format!("| {} | {} |\n", depth, count));
        }
        md.push('\n');
    }

    // Page list in processing order
    if !outcome.pages.is_empty() {
        md.push_str("## Pages\n\n");
        for page in &outcome.pages {
            match &page.saved_file_path {
                Some(path) => md.push_str(&format!(
                    "- [{}]({}) (depth {}, saved to `{}`)\n",
                    page.url,
                    page.url,
                    page.depth,
                    path.display()
                )),
                None => md.push_str(&format!(
                    "- [{}]({}) (depth {})\n",
                    page.url, page.url, page.depth
                )),
            }
        }
        md.push('\n');
    }

    // Failures
    if !outcome.failed_pages.is_empty() {
        md.push_str("## Failed Pages\n\n");
        md.push_str("| URL | Depth | Reason |\n");
        md.push_str("|-----|-------|--------|\n");
        for failed in &outcome.failed_pages {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                failed.url, failed.depth, failed.reason
            ));
        }
        md.push('\n');
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::types::{FailedPage, OutcomeStatus, PageResult};
    use chrono::Utc;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn page(url: &str, depth: u32) -> PageResult {
        PageResult {
            url: url.to_string(),
            content: String::new(),
            markdown_content: "# Page".to_string(),
            saved_file_path: None,
            depth,
        }
    }

    fn create_test_outcome() -> CrawlOutcome {
        let now = Utc::now();
        let pages = vec![
            page("https://nextjs.org/docs/app", 0),
            page("https://nextjs.org/docs/app/routing", 1),
            page("https://nextjs.org/docs/app/caching", 1),
        ];
        CrawlOutcome {
            base_url: "https://nextjs.org/docs/app".to_string(),
            total_pages: pages.len(),
            pages,
            status: OutcomeStatus::Success,
            error: None,
            failed_pages: Vec::new(),
            started_at: now,
            finished_at: now,
            elapsed_secs: 3.5,
        }
    }

    #[test]
    fn test_format_markdown_summary() {
        let outcome = create_test_outcome();
        let markdown = format_markdown_summary(&outcome, "abc123");

        assert!(markdown.contains("# Sumi-Scroll Crawl Summary"));
        assert!(markdown.contains("- **Base URL**: https://nextjs.org/docs/app"));
        assert!(markdown.contains("- **Status**: success"));
        assert!(markdown.contains("- **Config Hash**: abc123"));
        assert!(markdown.contains("- **Pages Processed**: 3"));
        assert!(!markdown.contains("**Error**"));
    }

    #[test]
    fn test_markdown_with_depth_breakdown() {
        let markdown = format_markdown_summary(&create_test_outcome(), "abc123");

        assert!(markdown.contains("Depth Breakdown"));
        assert!(markdown.contains("| 0 | 1 |"));
        assert!(markdown.contains("| 1 | 2 |"));
    }

    #[test]
    fn test_pages_listed_in_order() {
        let markdown = format_markdown_summary(&create_test_outcome(), "abc123");

        let routing = markdown.find("docs/app/routing").unwrap();
        let caching = markdown.find("docs/app/caching").unwrap();
        assert!(routing < caching);
    }

    #[test]
    fn test_markdown_with_failures_and_error() {
        let mut outcome = create_test_outcome();
        outcome.status = OutcomeStatus::Error;
        outcome.error = Some("crawl cancelled".to_string());
        outcome.failed_pages.push(FailedPage {
            url: "https://nextjs.org/docs/app/broken".to_string(),
            depth: 1,
            reason: "HTTP 500".to_string(),
        });
        outcome.pages[0].saved_file_path = Some(PathBuf::from("content/docs/app.md"));

        let markdown = format_markdown_summary(&outcome, "abc123");

        assert!(markdown.contains("- **Error**: crawl cancelled"));
        assert!(markdown.contains("## Failed Pages"));
        assert!(markdown.contains("| https://nextjs.org/docs/app/broken | 1 | HTTP 500 |"));
        assert!(markdown.contains("saved to `content/docs/app.md`"));
    }

    #[test]
    fn test_generate_markdown_summary_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("SUMMARY.md");

        generate_markdown_summary(&create_test_outcome(), "abc123", &path).unwrap();

        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.starts_with("# Sumi-Scroll Crawl Summary"));
    }
}
