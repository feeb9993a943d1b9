//! Layer merging: global library, legacy user layer, current user layer.

use std::collections::BTreeSet;

use tracing::debug;

use petdeck_store::{scan_root, tombstone, AssetLayout, ScannedType, TypeMap};
use petdeck_types::{AssetLimits, Bucket};

use crate::error::CatalogResult;
use crate::model::{Catalog, CatalogEntry, LevelImages};

/// Merge the pre-migration user layer with the current one.
///
/// Current images override legacy ones per level; names and stage names
/// fall back from current to legacy.
pub fn merge_user_layers(legacy: TypeMap, current: TypeMap) -> TypeMap {
    let mut merged = legacy;
    for (id, info) in current {
        let existing = merged.remove(&id).unwrap_or_default();
        let mut images = existing.images;
        images.extend(info.images);
        let stage_names = if info.stage_names.is_empty() {
            existing.stage_names
        } else {
            info.stage_names
        };
        merged.insert(
            id,
            ScannedType {
                name: info.name.or(existing.name),
                images,
                stage_names,
            },
        );
    }
    merged
}

/// Build the catalog visible to `bucket`.
pub fn build_catalog(
    layout: &AssetLayout,
    limits: &AssetLimits,
    bucket: &Bucket,
) -> CatalogResult<Catalog> {
    let current_root = layout.current_root(bucket)?;
    let global = scan_root(
        layout,
        layout.global_root(),
        &layout.reserved_names(bucket),
        limits,
    )?;
    let legacy = scan_root(layout, &layout.legacy_root(bucket)?, &[], limits)?;
    let current = scan_root(layout, &current_root, &[], limits)?;
    let user = merge_user_layers(legacy, current);

    let ids: BTreeSet<_> = global.keys().chain(user.keys()).cloned().collect();
    let empty = ScannedType::default();
    let mut types = Vec::with_capacity(ids.len());

    for id in ids {
        let user_dir = layout.type_dir(&current_root, &id)?;
        if tombstone::is_hidden(&user_dir) {
            continue;
        }
        let global_info = global.get(&id).unwrap_or(&empty);
        let user_info = user.get(&id).unwrap_or(&empty);

        let mut images = global_info.images.clone();
        images.extend(user_info.images.clone());
        for level in tombstone::deleted_levels(&user_dir, limits) {
            images.remove(&level);
        }

        let name = user_info
            .name
            .clone()
            .or_else(|| global_info.name.clone())
            .unwrap_or_else(|| id.to_string());
        let mut stage_names = if user_info.stage_names.is_empty() {
            global_info.stage_names.clone()
        } else {
            user_info.stage_names.clone()
        };
        stage_names.truncate(limits.max_stage_names);

        types.push(CatalogEntry {
            id,
            name,
            image_count: images.len(),
            images: LevelImages(images),
            stage_names,
        });
    }

    debug!(%bucket, "built catalog with {} types", types.len());
    Ok(Catalog { types })
}
