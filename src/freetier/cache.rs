use crate::freetier::FreeTierRecord;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Default cache lifetime for resolved free tier records.
pub const DEFAULT_CACHE_TTL_HOURS: i64 = 24;

/// Injectable time source so expiry logic is testable without sleeps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock used outside of tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// One cached resolution. `record` is `None` when resolution found nothing,
/// so an unproductive lookup is also not retried until the TTL lapses.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub record: Option<FreeTierRecord>,
    pub cached_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Cache statistics snapshot.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
    pub ttl_hours: i64,
}

/// Time-bound, concurrency-safe store of resolved free tier records keyed
/// by normalized service name. Entries are replaced wholesale, never
/// updated in place, so readers never observe a partially written record.
pub struct FreeTierCache {
    entries: RwLock<HashMap<String, Arc<CacheEntry>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl Default for FreeTierCache {
    fn default() -> Self {
        Self::new()
    }
}

impl FreeTierCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: Duration::hours(DEFAULT_CACHE_TTL_HOURS),
            clock,
        }
    }

    /// Look up a live entry for a normalized service key. Expired entries
    /// are treated as misses and superseded by the next insert.
    pub fn get(&self, key: &str) -> Option<Arc<CacheEntry>> {
        let entries = self.entries.read().unwrap();
        let entry = entries.get(key)?;
        if entry.is_expired(self.clock.now()) {
            return None;
        }
        Some(Arc::clone(entry))
    }

    /// Store a resolution (or a recorded absence) under a normalized key,
    /// superseding any previous entry.
    pub fn insert(&self, key: &str, record: Option<FreeTierRecord>) {
        let now = self.clock.now();
        let entry = Arc::new(CacheEntry {
            record,
            cached_at: now,
            expires_at: now + self.ttl,
        });
        let mut entries = self.entries.write().unwrap();
        entries.insert(key.to_string(), entry);
    }

    /// Remove one entry. Returns whether anything was removed.
    pub fn remove(&self, key: &str) -> bool {
        let mut entries = self.entries.write().unwrap();
        entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap();
        entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read().unwrap();
        let now = self.clock.now();
        let expired = entries.values().filter(|e| e.is_expired(now)).count();
        CacheStats {
            total_entries: entries.len(),
            valid_entries: entries.len() - expired,
            expired_entries: expired,
            ttl_hours: self.ttl.num_hours(),
        }
    }
}

/// Normalize a service name into a cache key: lowercase, trimmed, spaces
/// replaced with hyphens.
pub fn normalize_service_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "-")
}
