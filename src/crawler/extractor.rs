//! Content extraction and Markdown conversion
//!
//! Narrows a fetched page down to its documentation content and renders that
//! fragment as Markdown.
//!
//! # Fragment Selection
//!
//! 1. If a selector is configured and matches, the outer HTML of every match
//!    joined by a newline, in document order
//! 2. Otherwise the outer HTML of `<body>`
//! 3. Otherwise the whole document

use htmd::options::{HeadingStyle, LinkStyle, Options};
use htmd::{Element, HtmlToMarkdown};
use scraper::{Html, Selector};
use thiserror::Error;

/// Number of characters of fragment markup kept as a page excerpt
pub const EXCERPT_CHARS: usize = 1000;

/// Tags dropped before Markdown conversion
const SKIPPED_TAGS: [&str; 3] = ["script", "style", "noscript"];

// Markers carrying cell and row boundaries from the cell and row handlers up
// to the table handler. Cell text never contains them.
const CELL_OPEN: char = '\u{1f}';
const CELL_CLOSE: char = '\u{1e}';
const ROW_OPEN: char = '\u{1d}';
const ROW_CLOSE: char = '\u{1c}';

/// Extraction failures
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Document is empty")]
    EmptyDocument,

    #[error("Markdown conversion failed: {0}")]
    Markdown(String),
}

/// Content extracted from one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Selected fragment as HTML
    pub fragment: String,

    /// Fragment rendered as Markdown
    pub markdown: String,
}

impl Extraction {
    /// First characters of the fragment markup
    pub fn excerpt(&self) -> String {
        excerpt(&self.fragment)
    }
}

/// Extracts the content fragment from raw markup and converts it to Markdown
pub fn extract(markup: &str, selector: Option<&Selector>) -> Result<Extraction, ExtractError> {
    if markup.trim().is_empty() {
        return Err(ExtractError::EmptyDocument);
    }

    let document = Html::parse_document(markup);
    extract_document(&document, selector)
}

/// Extracts from an already parsed document
pub fn extract_document(
    document: &Html,
    selector: Option<&Selector>,
) -> Result<Extraction, ExtractError> {
    let fragment = select_fragment(document, selector);

    if fragment.trim().is_empty() {
        return Err(ExtractError::EmptyDocument);
    }

    let markdown = convert_to_markdown(&fragment)?;

    Ok(Extraction { fragment, markdown })
}

/// Picks the content fragment out of a parsed document
pub fn select_fragment(document: &Html, selector: Option<&Selector>) -> String {
    if let Some(selector) = selector {
        let matches: Vec<String> = document.select(selector).map(|el| el.html()).collect();
        if !matches.is_empty() {
            return matches.join("\n");
        }
        tracing::warn!("Content selector matched nothing, falling back to <body>");
    }

    if let Ok(body_selector) = Selector::parse("body") {
        if let Some(body) = document.select(&body_selector).next() {
            return body.html();
        }
    }

    document.root_element().html()
}

/// Renders an HTML fragment as Markdown
///
/// ATX headings, inline links and pipe tables. Script, style and noscript
/// content is dropped.
pub fn convert_to_markdown(html: &str) -> Result<String, ExtractError> {
    let converter = HtmlToMarkdown::builder()
        .skip_tags(SKIPPED_TAGS.to_vec())
        .add_handler(vec!["th", "td"], table_cell)
        .add_handler(vec!["tr"], table_row)
        .add_handler(vec!["table"], table)
        .options(Options {
            heading_style: HeadingStyle::Atx,
            link_style: LinkStyle::Inlined,
            ..Default::default()
        })
        .build();

    converter
        .convert(html)
        .map(|md| md.trim().to_string())
        .map_err(|e| ExtractError::Markdown(e.to_string()))
}

fn table_cell(element: Element) -> Option<String> {
    Some(format!(
        "{}{}{}",
        CELL_OPEN,
        cell_text(element.content),
        CELL_CLOSE
    ))
}

fn table_row(element: Element) -> Option<String> {
    let cells = between(element.content, CELL_OPEN, CELL_CLOSE);
    if cells.is_empty() {
        return Some(String::new());
    }

    let mut row = String::new();
    row.push(ROW_OPEN);
    for cell in cells {
        row.push(CELL_OPEN);
        row.push_str(cell);
    }
    row.push(ROW_CLOSE);
    Some(row)
}

/// Pipe table with the first row as header
fn table(element: Element) -> Option<String> {
    let rows: Vec<Vec<&str>> = between(element.content, ROW_OPEN, ROW_CLOSE)
        .into_iter()
        .map(|row| row.split(CELL_OPEN).skip(1).collect())
        .collect();

    Some(render_table(&rows))
}

/// Renders rows as a pipe table, padding short rows to the widest one
fn render_table(rows: &[Vec<&str>]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    if columns == 0 {
        return String::new();
    }

    let line = |cells: &[&str]| {
        let mut padded: Vec<&str> = cells.to_vec();
        padded.resize(columns, "");
        format!("| {} |", padded.join(" | "))
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    for (i, row) in rows.iter().enumerate() {
        lines.push(line(row));
        if i == 0 {
            lines.push(format!("|{}", " --- |".repeat(columns)));
        }
    }

    format!("\n\n{}\n\n", lines.join("\n"))
}

/// Collapses cell Markdown onto one line and escapes bare pipes
fn cell_text(content: &str) -> String {
    let collapsed = content
        .chars()
        .filter(|c| ![CELL_OPEN, CELL_CLOSE, ROW_OPEN, ROW_CLOSE].contains(c))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let mut escaped = String::with_capacity(collapsed.len());
    let mut prev = None;
    for c in collapsed.chars() {
        if c == '|' && prev != Some('\\') {
            escaped.push('\\');
        }
        escaped.push(c);
        prev = Some(c);
    }
    escaped
}

/// Slices of `text` enclosed by `open` and `close`, in order
fn between(text: &str, open: char, close: char) -> Vec<&str> {
    let mut found = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find(open) {
        let after = &rest[start + open.len_utf8()..];
        match after.find(close) {
            Some(end) => {
                found.push(&after[..end]);
                rest = &after[end + close.len_utf8()..];
            }
            None => break,
        }
    }

    found
}

/// Returns at most the first [`EXCERPT_CHARS`] characters of `text`
pub fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_CHARS).collect()
}
