use super::currency::RateTable;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Default lifetime of a cached rate table: one hour.
pub const DEFAULT_TTL: Duration = Duration::from_millis(3_600_000);

#[derive(Debug, Clone)]
struct CacheEntry {
    table: Arc<RateTable>,
    fetched_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

/// A rate table read back from the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedRates {
    pub table: Arc<RateTable>,
    /// Set when the entry outlived its TTL.
    pub stale: bool,
}

/// Single-slot cache holding the most recently fetched rate table.
///
/// Writes replace the whole entry, so readers only ever observe the old or
/// the new table.
pub struct RateCache {
    entry: RwLock<Option<CacheEntry>>,
    ttl: Duration,
}

impl RateCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entry: RwLock::new(None),
            ttl,
        }
    }

    /// Returns the cached table only while it is younger than the TTL.
    pub async fn get_fresh(&self) -> Option<Arc<RateTable>> {
        let entry = self.entry.read().await;
        match entry.as_ref() {
            Some(e) if e.is_fresh(self.ttl) => {
                debug!("Cache HIT for rate table");
                Some(Arc::clone(&e.table))
            }
            Some(_) => {
                debug!("Cache entry expired for rate table");
                None
            }
            None => {
                debug!("Cache MISS for rate table");
                None
            }
        }
    }

    /// Returns whatever table is cached, flagged stale once expired.
    pub async fn get_any(&self) -> Option<CachedRates> {
        let entry = self.entry.read().await;
        entry.as_ref().map(|e| CachedRates {
            table: Arc::clone(&e.table),
            stale: !e.is_fresh(self.ttl),
        })
    }

    pub async fn put(&self, table: RateTable) -> Arc<RateTable> {
        let table = Arc::new(table);
        let mut entry = self.entry.write().await;
        debug!("Cache PUT for rate table ({} rates)", table.len());
        *entry = Some(CacheEntry {
            table: Arc::clone(&table),
            fetched_at: Instant::now(),
        });
        table
    }
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
