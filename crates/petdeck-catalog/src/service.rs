use std::sync::Arc;

use tracing::debug;

use petdeck_store::{AssetLayout, StoreResult, UserLayer};
use petdeck_types::{AssetLimits, Bucket, Level, PetTypeId};

use crate::cache::CatalogCache;
use crate::error::CatalogResult;
use crate::locks::BucketLocks;
use crate::model::Catalog;
use crate::overlay::build_catalog;

/// The asset service: layered catalog reads and user-layer mutations.
///
/// Constructed once at startup and shared behind an `Arc`. All methods do
/// blocking filesystem I/O.
pub struct AssetService {
    layout: AssetLayout,
    limits: AssetLimits,
    cache: CatalogCache,
    locks: BucketLocks,
}

impl AssetService {
    pub fn new(layout: AssetLayout, limits: AssetLimits, cache: CatalogCache) -> Self {
        Self {
            layout,
            limits,
            cache,
            locks: BucketLocks::new(),
        }
    }

    pub fn layout(&self) -> &AssetLayout {
        &self.layout
    }

    pub fn limits(&self) -> &AssetLimits {
        &self.limits
    }

    pub fn cache(&self) -> &CatalogCache {
        &self.cache
    }

    /// The catalog visible to `bucket`, served from cache while fresh.
    pub fn list_types(&self, bucket: &Bucket) -> CatalogResult<Arc<Catalog>> {
        let lock = self.locks.handle(bucket);
        let _guard = lock.read().expect("lock poisoned");

        if let Some(catalog) = self.cache.get(bucket) {
            debug!(%bucket, "catalog cache hit");
            return Ok(catalog);
        }
        let catalog = build_catalog(&self.layout, &self.limits, bucket)?;
        Ok(self.cache.put(bucket.clone(), catalog))
    }

    /// Run `op` against the bucket's user layer under its write lock, then
    /// invalidate the bucket's cached catalog whatever the outcome.
    fn mutate<T>(
        &self,
        bucket: &Bucket,
        op: impl FnOnce(&UserLayer<'_>) -> StoreResult<T>,
    ) -> CatalogResult<T> {
        let lock = self.locks.handle(bucket);
        let _guard = lock.write().expect("lock poisoned");

        let result = UserLayer::open(&self.layout, &self.limits, bucket).and_then(|layer| op(&layer));
        self.cache.invalidate(bucket);
        Ok(result?)
    }

    /// Store an uploaded level image and return its URL.
    pub fn upload_image(
        &self,
        bucket: &Bucket,
        pet_type: &str,
        level: i64,
        content_type: &str,
        data: &[u8],
    ) -> CatalogResult<String> {
        let id = PetTypeId::parse(pet_type)?;
        let level = Level::new(level, &self.limits)?;
        self.mutate(bucket, |layer| layer.upload_image(&id, level, content_type, data))
    }

    /// Delete a level image; returns whether anything changed.
    pub fn delete_image(&self, bucket: &Bucket, pet_type: &str, level: i64) -> CatalogResult<bool> {
        let id = PetTypeId::parse(pet_type)?;
        let level = Level::new(level, &self.limits)?;
        self.mutate(bucket, |layer| layer.delete_image(&id, level))
    }

    /// Create or restore a pet type; returns the sanitized id.
    pub fn create_type(
        &self,
        bucket: &Bucket,
        pet_type: &str,
        name: Option<&str>,
        stage_names: Option<&[String]>,
    ) -> CatalogResult<PetTypeId> {
        let id = PetTypeId::parse(pet_type)?;
        self.mutate(bucket, |layer| layer.create_type(&id, name, stage_names))?;
        Ok(id)
    }

    /// Delete (or hide) a pet type.
    pub fn delete_type(&self, bucket: &Bucket, pet_type: &str) -> CatalogResult<()> {
        let id = PetTypeId::parse(pet_type)?;
        self.mutate(bucket, |layer| layer.delete_type(&id))
    }
}

impl std::fmt::Debug for AssetService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetService")
            .field("layout", &self.layout)
            .field("limits", &self.limits)
            .field("cache", &self.cache)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use std::thread;

    use petdeck_store::StoreError;
    use petdeck_types::TypeError;

    use crate::error::CatalogError;

    fn service(root: &Path) -> AssetService {
        AssetService::new(
            AssetLayout::with_defaults(root),
            AssetLimits::default(),
            CatalogCache::default(),
        )
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"global").unwrap();
    }

    fn level(n: i64) -> Level {
        Level::new(n, &AssetLimits::default()).unwrap()
    }

    #[test]
    fn upload_then_list_is_cached() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let bucket = Bucket::offline();

        let url = svc.upload_image(&bucket, "cat", 1, "image/png", b"png").unwrap();
        let first = svc.list_types(&bucket).unwrap();
        assert_eq!(first.get("cat").unwrap().images.get(level(1)), Some(url.as_str()));

        let second = svc.list_types(&bucket).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn mutation_invalidates_cache() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let bucket = Bucket::offline();

        let before = svc.list_types(&bucket).unwrap();
        assert!(before.types.is_empty());
        svc.create_type(&bucket, "cat", None, None).unwrap();
        let after = svc.list_types(&bucket).unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(after.types.len(), 1);
    }

    #[test]
    fn delete_image_twice() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let bucket = Bucket::offline();
        touch(&dir.path().join("cat/2.png"));
        svc.upload_image(&bucket, "cat", 2, "image/gif", b"gif").unwrap();

        assert!(svc.delete_image(&bucket, "cat", 2).unwrap());
        assert!(!svc.delete_image(&bucket, "cat", 2).unwrap());
        let catalog = svc.list_types(&bucket).unwrap();
        assert!(catalog.get("cat").unwrap().images.get(level(2)).is_none());
    }

    #[test]
    fn deleted_legacy_level_stays_gone() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let bucket = Bucket::for_member(5).unwrap();
        touch(&dir.path().join("user_5/fox/1.png"));

        let before = svc.list_types(&bucket).unwrap();
        assert_eq!(
            before.get("fox").unwrap().images.get(level(1)),
            Some("/assets/pet/user_5/fox/1.png")
        );

        assert!(svc.delete_image(&bucket, "fox", 1).unwrap());
        let after = svc.list_types(&bucket).unwrap();
        assert!(after.get("fox").unwrap().images.get(level(1)).is_none());
        assert!(!svc.delete_image(&bucket, "fox", 1).unwrap());
        assert!(dir.path().join("user_5/fox/1.png").is_file());
    }

    #[test]
    fn hide_and_restore_global_type() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let bucket = Bucket::for_member(3).unwrap();
        touch(&dir.path().join("cat/1.png"));

        svc.delete_type(&bucket, "cat").unwrap();
        assert!(svc.list_types(&bucket).unwrap().get("cat").is_none());
        // Other buckets still see it.
        let other = Bucket::for_member(4).unwrap();
        assert!(svc.list_types(&other).unwrap().get("cat").is_some());

        svc.create_type(&bucket, "cat", None, None).unwrap();
        let catalog = svc.list_types(&bucket).unwrap();
        assert_eq!(
            catalog.get("cat").unwrap().images.get(level(1)),
            Some("/assets/pet/cat/1.png")
        );
    }

    #[test]
    fn invalid_input_fails_before_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let bucket = Bucket::offline();

        assert!(matches!(
            svc.upload_image(&bucket, "../x", 1, "image/png", b"x"),
            Err(CatalogError::Type(TypeError::InvalidName(_)))
        ));
        assert!(matches!(
            svc.upload_image(&bucket, "cat", 7, "image/png", b"x"),
            Err(CatalogError::Type(TypeError::InvalidLevel { .. }))
        ));
        assert!(matches!(
            svc.delete_image(&bucket, "cat", 0),
            Err(CatalogError::Type(TypeError::InvalidLevel { .. }))
        ));
        assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn store_errors_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let bucket = Bucket::offline();
        assert!(matches!(
            svc.delete_type(&bucket, "ghost"),
            Err(CatalogError::Store(StoreError::NotFound(_)))
        ));
        svc.create_type(&bucket, "cat", None, None).unwrap();
        assert!(matches!(
            svc.create_type(&bucket, "cat", None, None),
            Err(CatalogError::Store(StoreError::Conflict(_)))
        ));
    }

    #[test]
    fn replacing_a_level_keeps_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let bucket = Bucket::offline();

        let png = vec![0u8; 2 * 1024 * 1024];
        let url = svc.upload_image(&bucket, "cat", 3, "image/png", &png).unwrap();
        assert!(url.ends_with("/3.png"));
        let gif = vec![0u8; 1024 * 1024];
        let url = svc.upload_image(&bucket, "cat", 3, "image/gif", &gif).unwrap();
        assert!(url.ends_with("/3.gif"));

        let type_dir = dir.path().join("__users__/offline/cat");
        assert!(!type_dir.join("3.png").exists());
        let catalog = svc.list_types(&bucket).unwrap();
        let cat = catalog.get("cat").unwrap();
        assert_eq!(cat.image_count, 1);
        assert_eq!(cat.images.get(level(3)), Some(url.as_str()));
    }

    #[test]
    fn concurrent_mutations_and_reads() {
        let dir = tempfile::tempdir().unwrap();
        let svc = Arc::new(service(dir.path()));
        touch(&dir.path().join("cat/1.png"));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let svc = Arc::clone(&svc);
                thread::spawn(move || {
                    let bucket = Bucket::for_member(i % 2).unwrap();
                    for _ in 0..10 {
                        svc.upload_image(&bucket, "cat", 1, "image/png", b"x").unwrap();
                        svc.delete_image(&bucket, "cat", 1).unwrap();
                        svc.list_types(&bucket).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().expect("thread should not panic");
        }

        for i in 0..2 {
            let bucket = Bucket::for_member(i).unwrap();
            let catalog = svc.list_types(&bucket).unwrap();
            assert!(catalog.get("cat").unwrap().images.is_empty());
        }
    }
}
