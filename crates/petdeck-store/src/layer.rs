//! Writes against one bucket's user layer.
//!
//! The global library is only ever read here: user actions shadow it with
//! their own images or tombstones, never modify it.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use petdeck_types::{AssetLimits, Bucket, ImageFormat, Level, PetTypeId};

use crate::error::{StoreError, StoreResult};
use crate::layout::AssetLayout;
use crate::tombstone;
use crate::tree::{self, find_level_image, level_image_path};

/// Mutation handle for the current user layer of one bucket.
pub struct UserLayer<'a> {
    layout: &'a AssetLayout,
    limits: &'a AssetLimits,
    bucket: &'a Bucket,
    root: PathBuf,
}

impl<'a> UserLayer<'a> {
    pub fn open(layout: &'a AssetLayout, limits: &'a AssetLimits, bucket: &'a Bucket) -> StoreResult<Self> {
        let root = layout.current_root(bucket)?;
        Ok(Self {
            layout,
            limits,
            bucket,
            root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn type_dir(&self, id: &PetTypeId) -> StoreResult<PathBuf> {
        self.layout.type_dir(&self.root, id)
    }

    /// Type directories in the read-only layers beneath the user layer:
    /// the global library and the bucket's legacy root.
    fn shadowed_dirs(&self, id: &PetTypeId) -> StoreResult<Vec<PathBuf>> {
        let legacy_root = self.layout.legacy_root(self.bucket)?;
        let mut dirs = vec![self.layout.type_dir(&legacy_root, id)?];
        dirs.extend(self.layout.global_type_dir(id, self.bucket)?);
        Ok(dirs)
    }

    fn shadowed_has_level(&self, id: &PetTypeId, level: Level) -> StoreResult<bool> {
        Ok(self
            .shadowed_dirs(id)?
            .iter()
            .any(|dir| find_level_image(dir, level).is_some()))
    }

    fn shadowed_has_type(&self, id: &PetTypeId) -> StoreResult<bool> {
        Ok(self.shadowed_dirs(id)?.iter().any(|dir| dir.is_dir()))
    }

    /// Remove every stored image for `level`. Returns `true` if any existed.
    fn remove_level_images(type_dir: &Path, level: Level) -> StoreResult<bool> {
        let mut removed = false;
        for format in ImageFormat::PROBE_ORDER {
            let path = level_image_path(type_dir, level, format);
            if path.is_file() {
                fs::remove_file(&path)?;
                removed = true;
            }
        }
        Ok(removed)
    }

    /// Store `data` as the image for (`id`, `level`) and return its URL.
    ///
    /// The body is staged in a temporary file inside the type directory, so a
    /// failed write leaves the previous image and tombstones untouched.
    pub fn upload_image(
        &self,
        id: &PetTypeId,
        level: Level,
        content_type: &str,
        data: &[u8],
    ) -> StoreResult<String> {
        if data.len() > self.limits.max_upload_bytes {
            return Err(StoreError::PayloadTooLarge {
                size: data.len(),
                max: self.limits.max_upload_bytes,
            });
        }
        let format = ImageFormat::from_content_type(content_type)
            .ok_or_else(|| StoreError::UnsupportedMediaType(content_type.to_string()))?;

        let type_dir = self.type_dir(id)?;
        fs::create_dir_all(&type_dir)?;

        let mut staged = tempfile::NamedTempFile::new_in(&type_dir)?;
        staged.write_all(data)?;
        staged.as_file().sync_all()?;

        tombstone::unhide(&type_dir)?;
        tombstone::clear_level_deleted(&type_dir, level)?;
        Self::remove_level_images(&type_dir, level)?;

        let target = level_image_path(&type_dir, level, format);
        staged.persist(&target).map_err(|e| StoreError::Io(e.error))?;

        info!(bucket = %self.bucket, pet_type = %id, %level, "stored {} bytes at {:?}", data.len(), target);
        Ok(self.layout.image_url(&self.root, id, level, format))
    }

    /// Delete the bucket's image for (`id`, `level`).
    ///
    /// If the global library or the legacy layer still provides that level a
    /// tombstone is written so it stays hidden; the legacy tree is not touched. Returns `true` when something changed: an image was
    /// removed or a new tombstone was written.
    pub fn delete_image(&self, id: &PetTypeId, level: Level) -> StoreResult<bool> {
        let type_dir = self.type_dir(id)?;
        let removed = Self::remove_level_images(&type_dir, level)?;

        let tombstoned = if self.shadowed_has_level(id, level)? {
            tombstone::mark_level_deleted(&type_dir, level)?
        } else {
            false
        };

        info!(bucket = %self.bucket, pet_type = %id, %level, removed, tombstoned, "deleted level image");
        Ok(removed || tombstoned)
    }

    /// Create (or un-hide) a type in the user layer.
    pub fn create_type(
        &self,
        id: &PetTypeId,
        name: Option<&str>,
        stage_names: Option<&[String]>,
    ) -> StoreResult<()> {
        let type_dir = self.type_dir(id)?;
        if type_dir.is_dir() {
            if !tombstone::unhide(&type_dir)? {
                return Err(StoreError::Conflict(id.to_string()));
            }
        } else {
            fs::create_dir_all(&type_dir)?;
        }

        if let Some(names) = stage_names.filter(|names| !names.is_empty()) {
            tree::write_stage_names(&type_dir, names, self.limits.max_stage_names)?;
        }
        if let Some(name) = name.map(str::trim).filter(|name| !name.is_empty()) {
            tree::write_display_name(&type_dir, name)?;
        }

        info!(bucket = %self.bucket, pet_type = %id, "created pet type");
        Ok(())
    }

    /// Delete a type from the bucket's view.
    ///
    /// With a global or legacy counterpart the user directory is reset to a
    /// bare `.hidden` marker; otherwise it is removed outright.
    pub fn delete_type(&self, id: &PetTypeId) -> StoreResult<()> {
        let type_dir = self.type_dir(id)?;
        let has_shadowed = self.shadowed_has_type(id)?;
        let has_user = type_dir.is_dir();

        if !has_user && !has_shadowed {
            return Err(StoreError::NotFound(id.to_string()));
        }
        if has_user {
            fs::remove_dir_all(&type_dir)?;
        }
        if has_shadowed {
            fs::create_dir_all(&type_dir)?;
            tombstone::hide(&type_dir)?;
        }

        info!(bucket = %self.bucket, pet_type = %id, hidden = has_shadowed, "deleted pet type");
        Ok(())
    }
}
