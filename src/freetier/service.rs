use crate::error::FetchError;
use crate::freetier::cache::{normalize_service_name, CacheStats, FreeTierCache};
use crate::freetier::scraper::{extract_pricing_section, DocScraper};
use crate::freetier::search::SearchClient;
use crate::freetier::{classify, patterns, FreeTierRecord, SearchResult};
use tracing::{debug, info, warn};

/// How many candidate pages the locator is asked for per resolution.
const SEARCH_RESULT_LIMIT: usize = 3;

/// Resolves free tier allowances for a service by locating its pricing
/// page, scraping it, and extracting allowance phrasings. Results (and
/// recorded absences) are cached for the cache TTL.
///
/// Resolution is best effort: network and parse failures never surface to
/// the caller, they only degrade to "no free tier available".
pub struct FreeTierService {
    search_client: SearchClient,
    scraper_client: DocScraper,
    cache: FreeTierCache,
}

impl Default for FreeTierService {
    fn default() -> Self {
        Self::new()
    }
}

impl FreeTierService {
    pub fn new() -> Self {
        Self {
            search_client: SearchClient::new(),
            scraper_client: DocScraper::new(),
            cache: FreeTierCache::new(),
        }
    }

    /// Assemble a service from explicit parts. Used by tests to inject
    /// mock-backed clients and a deterministic clock.
    pub fn with_parts(
        search_client: SearchClient,
        scraper_client: DocScraper,
        cache: FreeTierCache,
    ) -> Self {
        Self {
            search_client,
            scraper_client,
            cache,
        }
    }

    /// Retrieve free tier information for a service, or `None` when no
    /// allowance could be found. Absence is a normal outcome, not a
    /// failure.
    pub async fn get_free_tier(&self, service_name: &str) -> Option<FreeTierRecord> {
        let cache_key = normalize_service_name(service_name);

        if let Some(entry) = self.cache.get(&cache_key) {
            debug!(service = service_name, "free tier cache hit");
            return entry.record.clone();
        }

        debug!(
            service = service_name,
            "free tier cache miss, fetching from documentation"
        );

        let record = match self.fetch_from_docs(service_name).await {
            Ok(Some(record)) => {
                info!(
                    service = service_name,
                    source = %record.source_url,
                    items = record.items.len(),
                    "free tier resolved"
                );
                Some(record)
            }
            Ok(None) => {
                debug!(service = service_name, "no free tier information found");
                None
            }
            Err(err) => {
                warn!(service = service_name, error = %err, "free tier lookup failed");
                None
            }
        };

        self.cache.insert(&cache_key, record.clone());
        record
    }

    /// Search for pricing pages and extract allowances from the first
    /// candidate that yields any. `Ok(None)` means the documentation had
    /// nothing to offer; `Err` means every usable candidate failed to
    /// fetch.
    async fn fetch_from_docs(
        &self,
        service_name: &str,
    ) -> Result<Option<FreeTierRecord>, FetchError> {
        let query = format!(
            "site:{} {} pricing",
            self.search_client.doc_host(),
            service_name
        );
        let results = self
            .search_client
            .search(&query, SEARCH_RESULT_LIMIT)
            .await;

        let mut last_err: Option<FetchError> = None;

        for result in &results {
            if !self.is_pricing_candidate(result) {
                continue;
            }

            debug!(url = %result.url, "fetching pricing page");

            let content = match self.scraper_client.fetch_text(&result.url).await {
                Ok(content) => content,
                Err(err) => {
                    debug!(url = %result.url, error = %err, "fetch failed, trying next candidate");
                    last_err = Some(err);
                    continue;
                }
            };

            let excerpt = extract_pricing_section(&content);
            let mut items = patterns::extract_free_tier_items(excerpt);
            if items.is_empty() {
                items = patterns::extract_free_tier_items(&content);
            }

            if !items.is_empty() {
                return Ok(Some(FreeTierRecord {
                    service_name: service_name.to_string(),
                    items,
                    scope: classify::extract_scope(&content),
                    period: classify::extract_period(&content),
                    conditions: Vec::new(),
                    source_url: result.url.clone(),
                }));
            }
        }

        match last_err {
            Some(err) => Err(err),
            None => Ok(None),
        }
    }

    /// A candidate is worth fetching only if it sits on the documentation
    /// host and its address or title hints at a pricing page.
    fn is_pricing_candidate(&self, result: &SearchResult) -> bool {
        if !result.url.contains(self.search_client.doc_host()) {
            return false;
        }
        result.url.to_lowercase().contains("pricing")
            || result.title.to_lowercase().contains("pricing")
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn clear_cache_entry(&self, service_name: &str) {
        self.cache.remove(&normalize_service_name(service_name));
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
