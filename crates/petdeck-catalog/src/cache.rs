use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use petdeck_types::Bucket;

use crate::model::Catalog;

/// Default lifetime of a cached catalog.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

struct CacheEntry {
    stored_at: Instant,
    catalog: Arc<Catalog>,
}

/// TTL-bounded cache of built catalogs, keyed by bucket.
///
/// Entries expire `ttl` after insertion; expired entries are dropped on
/// access and never served.
pub struct CatalogCache {
    ttl: Duration,
    entries: Mutex<HashMap<Bucket, CacheEntry>>,
}

impl CatalogCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached catalog for `bucket`, if present and fresh.
    pub fn get(&self, bucket: &Bucket) -> Option<Arc<Catalog>> {
        let mut entries = self.entries.lock().expect("lock poisoned");
        match entries.get(bucket) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(Arc::clone(&entry.catalog)),
            Some(_) => {
                entries.remove(bucket);
                None
            }
            None => None,
        }
    }

    /// Store `catalog` for `bucket` and return the shared handle.
    pub fn put(&self, bucket: Bucket, catalog: Catalog) -> Arc<Catalog> {
        let catalog = Arc::new(catalog);
        let entry = CacheEntry {
            stored_at: Instant::now(),
            catalog: Arc::clone(&catalog),
        };
        self.entries.lock().expect("lock poisoned").insert(bucket, entry);
        catalog
    }

    /// Drop the entry for `bucket`. Returns `true` if one was cached.
    pub fn invalidate(&self, bucket: &Bucket) -> bool {
        self.entries.lock().expect("lock poisoned").remove(bucket).is_some()
    }

    pub fn clear(&self) {
        self.entries.lock().expect("lock poisoned").clear();
    }

    /// Number of entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl std::fmt::Debug for CatalogCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.len())
            .finish()
    }
}
