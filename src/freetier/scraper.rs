use crate::error::FetchError;
use once_cell::sync::Lazy;
use regex::Regex;
use ego_tree::NodeRef;
use scraper::{Html, Node};
use std::time::Duration;

/// The only host documentation is fetched from.
pub const DEFAULT_DOC_BASE_URL: &str = "https://cloud.google.com";

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);
const USER_AGENT: &str = "Mozilla/5.0 (compatible; gcpcost/0.1)";

/// Character budget of the pricing excerpt window, and how much leading
/// context is kept before the first pricing keyword.
const EXCERPT_BUDGET: usize = 5000;
const EXCERPT_LEAD: usize = 200;

/// Non-content elements dropped entirely during text extraction.
const SKIP_TAGS: &[&str] = &[
    "script", "style", "nav", "header", "footer", "noscript", "svg", "path", "meta", "link",
];

/// Elements that terminate a line in the extracted text.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "tr", "br",
];

static PRICING_MARKERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)pricing|free tier|free usage|at no charge|no cost|free of charge|monthly free|always free",
    )
    .expect("invalid pricing marker pattern")
});

static HSPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]+").unwrap());
static NEWLINE_EDGES: Lazy<Regex> = Lazy::new(|| Regex::new(r" ?\n ?").unwrap());
static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Fetches documentation pages from the allow-listed host and flattens
/// them to plain text.
#[derive(Debug, Clone)]
pub struct DocScraper {
    client: reqwest::Client,
    base_url: String,
}

impl Default for DocScraper {
    fn default() -> Self {
        Self::new()
    }
}

impl DocScraper {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_DOC_BASE_URL)
    }

    /// Override the trusted base URL. Used by tests to point at a local
    /// mock server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(FETCH_TIMEOUT)
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
        }
    }

    /// Fetch a documentation page and return its normalized text content.
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        if !is_trusted_url(url, &self.base_url) {
            return Err(FetchError::UntrustedSource(self.base_url.clone()));
        }

        let response = self
            .client
            .get(url)
            .header("Accept", "text/html,application/xhtml+xml")
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let body = response.text().await?;
        Ok(extract_text_from_html(&body))
    }
}

/// A URL is trusted only when the base is followed by a path, query,
/// fragment, or nothing. A bare prefix test would admit look-alike hosts
/// such as `https://cloud.google.com.evil.com`.
fn is_trusted_url(url: &str, base_url: &str) -> bool {
    match url.strip_prefix(base_url) {
        Some(rest) => rest.is_empty() || rest.starts_with(['/', '?', '#']),
        None => false,
    }
}

/// Flatten markup into a single whitespace-normalized text blob, dropping
/// non-content elements and breaking lines at block elements.
pub fn extract_text_from_html(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();
    collect_text(document.tree.root(), &mut out);
    clean_text(&out)
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    if let Node::Element(element) = node.value() {
        if SKIP_TAGS.contains(&element.name()) {
            return;
        }
    }

    if let Node::Text(text) = node.value() {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            out.push_str(trimmed);
            out.push(' ');
        }
    }

    for child in node.children() {
        collect_text(child, out);
    }

    if let Node::Element(element) = node.value() {
        if BLOCK_TAGS.contains(&element.name()) {
            out.push('\n');
        }
    }
}

fn clean_text(text: &str) -> String {
    let text = HSPACE.replace_all(text, " ");
    let text = NEWLINE_EDGES.replace_all(&text, "\n");
    let text = BLANK_RUNS.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Extract a bounded window around the first pricing-related keyword, with
/// some leading context retained. When no keyword occurs the full text is
/// returned unchanged.
pub fn extract_pricing_section(content: &str) -> &str {
    let Some(found) = PRICING_MARKERS.find(content) else {
        return content;
    };

    let mut start = found.start().saturating_sub(EXCERPT_LEAD);
    while !content.is_char_boundary(start) {
        start -= 1;
    }

    let mut end = (start + EXCERPT_BUDGET).min(content.len());
    while !content.is_char_boundary(end) {
        end -= 1;
    }

    &content[start..end]
}
