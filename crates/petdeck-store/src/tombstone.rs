//! Soft-delete markers kept inside user-layer type directories.
//!
//! - `.hidden` hides the whole type from the bucket's catalog.
//! - `.level<N>.deleted` suppresses level `N` regardless of which layer
//!   provides the image.
//!
//! Markers are plain files so they survive restarts and are found with a
//! single `exists` probe per level.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use petdeck_types::{AssetLimits, Level};

/// File name of the hidden-type marker.
pub const HIDDEN_MARKER: &str = ".hidden";

fn level_marker(type_dir: &Path, level: Level) -> PathBuf {
    type_dir.join(format!(".level{level}.deleted"))
}

/// Remove `path`, treating a missing file as already removed.
fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

pub fn is_hidden(type_dir: &Path) -> bool {
    type_dir.join(HIDDEN_MARKER).is_file()
}

/// Write the hidden marker; `type_dir` must exist.
pub fn hide(type_dir: &Path) -> io::Result<()> {
    fs::write(type_dir.join(HIDDEN_MARKER), "hidden")
}

/// Remove the hidden marker. Returns `true` if the type was hidden.
pub fn unhide(type_dir: &Path) -> io::Result<bool> {
    remove_if_exists(&type_dir.join(HIDDEN_MARKER))
}

pub fn is_level_deleted(type_dir: &Path, level: Level) -> bool {
    level_marker(type_dir, level).is_file()
}

/// Levels suppressed for the type in `type_dir`.
pub fn deleted_levels(type_dir: &Path, limits: &AssetLimits) -> BTreeSet<Level> {
    if !type_dir.is_dir() {
        return BTreeSet::new();
    }
    limits
        .levels()
        .filter(|level| is_level_deleted(type_dir, *level))
        .collect()
}

/// Write a level tombstone. Returns `true` if the marker is new.
pub fn mark_level_deleted(type_dir: &Path, level: Level) -> io::Result<bool> {
    if is_level_deleted(type_dir, level) {
        return Ok(false);
    }
    fs::create_dir_all(type_dir)?;
    fs::write(level_marker(type_dir, level), "deleted")?;
    Ok(true)
}

/// Remove a level tombstone. Returns `true` if one was present.
pub fn clear_level_deleted(type_dir: &Path, level: Level) -> io::Result<bool> {
    remove_if_exists(&level_marker(type_dir, level))
}
