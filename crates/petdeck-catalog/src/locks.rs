use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use petdeck_types::Bucket;

/// Per-bucket reader/writer locks.
///
/// Mutations hold the write side for their whole filesystem sequence; catalog
/// builds hold the read side across scan and cache store. Buckets never
/// contend with each other.
#[derive(Default)]
pub struct BucketLocks {
    locks: Mutex<HashMap<Bucket, Arc<RwLock<()>>>>,
}

impl BucketLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock guarding `bucket`, created on first use.
    pub fn handle(&self, bucket: &Bucket) -> Arc<RwLock<()>> {
        let mut locks = self.locks.lock().expect("lock poisoned");
        Arc::clone(locks.entry(bucket.clone()).or_default())
    }
}
