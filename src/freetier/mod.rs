//! Free tier discovery: retrieves usage allowances from GCP documentation
//! when they are not available through the Cloud Billing Catalog API.

pub mod cache;
pub mod classify;
pub mod matcher;
pub mod patterns;
pub mod scraper;
pub mod search;
pub mod service;
pub mod types;

pub use cache::{CacheEntry, CacheStats, Clock, FreeTierCache, SystemClock};
pub use matcher::find_matching_item;
pub use patterns::extract_free_tier_items;
pub use scraper::DocScraper;
pub use search::{SearchClient, SearchResult};
pub use service::FreeTierService;
pub use types::{FreeTierItem, FreeTierRecord, Period, Scope};
