use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "gcpcost/0.1";

/// Default DuckDuckGo Instant Answers endpoint.
pub const DEFAULT_SEARCH_API_URL: &str = "https://api.duckduckgo.com/";

/// Documentation host search results are filtered to.
pub const DEFAULT_DOC_HOST: &str = "cloud.google.com";

/// A single candidate documentation address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    pub snippet: String,
}

#[derive(Debug, Deserialize)]
struct DuckDuckGoResponse {
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<DuckDuckGoTopic>,
    #[serde(rename = "AbstractURL", default)]
    abstract_url: String,
    #[serde(rename = "AbstractText", default)]
    abstract_text: String,
}

#[derive(Debug, Deserialize)]
struct DuckDuckGoTopic {
    #[serde(rename = "FirstURL", default)]
    first_url: String,
    #[serde(rename = "Text", default)]
    text: String,
}

/// Known service-name aliases mapped to pricing page path segments under
/// the documentation host. Used when live search is unavailable or
/// unproductive.
static FALLBACK_PRICING_PATHS: Lazy<HashMap<&'static str, &'static [&'static str]>> =
    Lazy::new(|| {
        let entries: &[(&str, &[&str])] = &[
            ("cloud-run", &["run/pricing", "run/pricing/"]),
            ("compute-engine", &["compute/all-pricing", "compute/pricing"]),
            ("cloud-storage", &["storage/pricing", "storage-pricing"]),
            ("bigquery", &["bigquery/pricing", "bigquery/pricing/"]),
            ("cloud-sql", &["sql/pricing", "sql/pricing/"]),
            ("gke", &["kubernetes-engine/pricing", "kubernetes-engine/pricing/"]),
            (
                "kubernetes-engine",
                &["kubernetes-engine/pricing", "kubernetes-engine/pricing/"],
            ),
            ("cloud-functions", &["functions/pricing", "functions/pricing/"]),
            ("pub/sub", &["pubsub/pricing", "pubsub/pricing/"]),
            ("pubsub", &["pubsub/pricing", "pubsub/pricing/"]),
            ("firestore", &["firestore/pricing", "firestore/pricing/"]),
            ("spanner", &["spanner/pricing", "spanner/pricing/"]),
            ("cloud-spanner", &["spanner/pricing", "spanner/pricing/"]),
            ("memorystore", &["memorystore/pricing", "memorystore/pricing/"]),
            ("cloud-cdn", &["cdn/pricing", "cdn/pricing/"]),
            ("cloud-armor", &["armor/pricing", "armor/pricing/"]),
            (
                "artifact-registry",
                &["artifact-registry/pricing", "artifact-registry/pricing/"],
            ),
            (
                "secret-manager",
                &["secret-manager/pricing", "secret-manager/pricing/"],
            ),
            ("app-engine", &["appengine/pricing", "appengine/pricing/"]),
            (
                "cloud-load-balancing",
                &["load-balancing/pricing", "load-balancing/pricing/"],
            ),
            ("vertex-ai", &["vertex-ai/pricing", "vertex-ai/pricing/"]),
        ];
        entries.iter().copied().collect()
    });

/// Locates candidate pricing pages for a service, via a keyword search
/// restricted to the documentation host with a deterministic rule-based
/// fallback. Never errors: a failed search degrades to the fallback.
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: reqwest::Client,
    api_url: String,
    doc_host: String,
}

impl Default for SearchClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchClient {
    pub fn new() -> Self {
        Self::with_endpoints(DEFAULT_SEARCH_API_URL, DEFAULT_DOC_HOST)
    }

    /// Override the search endpoint and documentation host. Used by tests
    /// to point at a local mock server.
    pub fn with_endpoints(api_url: impl Into<String>, doc_host: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(SEARCH_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_url: api_url.into(),
            doc_host: doc_host.into(),
        }
    }

    pub fn doc_host(&self) -> &str {
        &self.doc_host
    }

    /// Search for candidate pricing pages, returning at most `limit`
    /// results on the documentation host.
    pub async fn search(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        match self.search_api(query, limit).await {
            Some(results) if !results.is_empty() => results,
            _ => {
                debug!(query, "search unproductive, using fallback URLs");
                self.fallback_results(query, limit)
            }
        }
    }

    async fn search_api(&self, query: &str, limit: usize) -> Option<Vec<SearchResult>> {
        let url = format!(
            "{}?q={}&format=json&no_redirect=1&skip_disambig=1",
            self.api_url,
            urlencoding::encode(query)
        );

        let response = self.client.get(&url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }

        let parsed: DuckDuckGoResponse = response.json().await.ok()?;

        let mut results = Vec::new();

        if !parsed.abstract_url.is_empty() && parsed.abstract_url.contains(&self.doc_host) {
            results.push(SearchResult {
                url: parsed.abstract_url,
                title: "GCP Documentation".to_string(),
                snippet: parsed.abstract_text,
            });
        }

        for topic in parsed.related_topics {
            if results.len() >= limit {
                break;
            }
            if !topic.first_url.is_empty() && topic.first_url.contains(&self.doc_host) {
                results.push(SearchResult {
                    url: topic.first_url,
                    title: extract_title(&topic.text),
                    snippet: topic.text,
                });
            }
        }

        Some(results)
    }

    /// Deterministically construct likely pricing page addresses from the
    /// static alias table, guessing `{slug}/pricing` forms for unknown
    /// services.
    fn fallback_results(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        let service_name = extract_service_name(query, &self.doc_host);
        if service_name.is_empty() {
            return Vec::new();
        }

        generate_pricing_urls(&service_name, &self.doc_host)
            .into_iter()
            .take(limit)
            .map(|url| SearchResult {
                url,
                title: format!("{service_name} Pricing - Google Cloud"),
                snippet: format!("Pricing information for {service_name}"),
            })
            .collect()
    }
}

/// Pull the bare service name out of a search query by stripping the
/// search operators the resolver adds.
fn extract_service_name(query: &str, doc_host: &str) -> String {
    query
        .to_lowercase()
        .replace(&format!("site:{doc_host}"), "")
        .replace("pricing", "")
        .replace("free tier", "")
        .trim()
        .to_string()
}

fn generate_pricing_urls(service_name: &str, doc_host: &str) -> Vec<String> {
    let slug = service_name.to_lowercase().replace([' ', '_'], "-");
    let base = format!("https://{doc_host}/");

    if let Some(paths) = FALLBACK_PRICING_PATHS.get(slug.as_str()) {
        return paths.iter().map(|path| format!("{base}{path}")).collect();
    }

    vec![
        format!("{base}{slug}/pricing"),
        format!("{base}{slug}-pricing"),
        format!("{base}{}/pricing", slug.replace('-', "/")),
    ]
}

/// DuckDuckGo topic text often has the form "Title - Description".
fn extract_title(text: &str) -> String {
    if let Some(idx) = text.find(" - ") {
        if idx > 0 && idx < 100 {
            return text[..idx].to_string();
        }
    }
    if text.len() > 100 {
        let mut end = 100;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        return format!("{}...", &text[..end]);
    }
    text.to_string()
}
