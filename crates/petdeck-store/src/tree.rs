//! Directory scanning for one asset root.
//!
//! A root holds one directory per pet type. Inside a type directory:
//!
//! ```text
//! <level>.<ext>          level image, ext probed in ImageFormat::PROBE_ORDER
//! *等级名称*.txt          stage names, one per line, optional "1. " prefixes
//! .name                  display name
//! .hidden, .levelN.deleted   tombstones (see crate::tombstone)
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use petdeck_types::{AssetLimits, ImageFormat, Level, PetTypeId};

use crate::error::StoreResult;
use crate::guard::assert_contained;
use crate::layout::AssetLayout;

/// Substring identifying a stage-name file.
pub const STAGE_NAME_MARKER: &str = "等级名称";

/// File name used when writing stage names.
pub const STAGE_NAME_FILE: &str = "等级名称.txt";

/// File holding a type's display name.
pub const DISPLAY_NAME_FILE: &str = ".name";

/// What one root says about one pet type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScannedType {
    pub name: Option<String>,
    pub images: BTreeMap<Level, String>,
    pub stage_names: Vec<String>,
}

/// Scan result for one root, keyed by type id.
pub type TypeMap = BTreeMap<PetTypeId, ScannedType>;

/// Path of the image for `level` in `format`.
pub fn level_image_path(type_dir: &Path, level: Level, format: ImageFormat) -> PathBuf {
    type_dir.join(format!("{}{}", level, format.extension()))
}

/// The format of the image stored for `level`, if any.
pub fn find_level_image(type_dir: &Path, level: Level) -> Option<ImageFormat> {
    ImageFormat::PROBE_ORDER
        .into_iter()
        .find(|format| level_image_path(type_dir, level, *format).is_file())
}

/// Scan every type directory directly under `root`.
///
/// A missing root yields an empty map. Directories named in `exclude`, and
/// directories whose name is not a valid type id, are skipped. Symlinked type
/// directories are followed as long as they resolve inside `root`.
pub fn scan_root(
    layout: &AssetLayout,
    root: &Path,
    exclude: &[&str],
    limits: &AssetLimits,
) -> StoreResult<TypeMap> {
    let mut result = TypeMap::new();
    if !root.is_dir() {
        return Ok(result);
    }

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if exclude.iter().any(|skip| *skip == name) {
            continue;
        }
        let id = match PetTypeId::parse(name) {
            Ok(id) if id.as_str() == name => id,
            _ => {
                debug!("skipping non-type directory {:?}", entry.path());
                continue;
            }
        };
        if entry.path_is_symlink() && assert_contained(entry.path(), root).is_err() {
            warn!("skipping type directory linked outside {:?}: {:?}", root, entry.path());
            continue;
        }

        let type_dir = entry.path();
        let images = limits
            .levels()
            .filter_map(|level| {
                find_level_image(type_dir, level)
                    .map(|format| (level, layout.image_url(root, &id, level, format)))
            })
            .collect();
        let scanned = ScannedType {
            name: read_display_name(type_dir),
            images,
            stage_names: read_stage_names(type_dir, limits.max_stage_names),
        };
        result.insert(id, scanned);
    }

    debug!("scanned {:?}: {} types", root, result.len());
    Ok(result)
}

/// Strip a leading ordinal such as `1. `, `2、` or `3 `.
fn strip_ordinal(line: &str) -> &str {
    let line = line.trim();
    let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == line.len() {
        return line;
    }
    let after = rest.trim_start_matches(|c: char| c == '.' || c == '、' || c.is_whitespace());
    if after.len() == rest.len() {
        return line;
    }
    after.trim()
}

fn stage_name_file(type_dir: &Path) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(type_dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            name.contains(STAGE_NAME_MARKER) && name.ends_with(".txt")
        })
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

/// Stage names of the type in `type_dir`, at most `max` of them.
///
/// An unreadable stage-name file is logged and treated as empty.
pub fn read_stage_names(type_dir: &Path, max: usize) -> Vec<String> {
    let Some(path) = stage_name_file(type_dir) else {
        return Vec::new();
    };
    match fs::read_to_string(&path) {
        Ok(content) => content
            .lines()
            .map(strip_ordinal)
            .filter(|name| !name.is_empty())
            .take(max)
            .map(str::to_string)
            .collect(),
        Err(e) => {
            warn!("unreadable stage-name file {:?}: {}", path, e);
            Vec::new()
        }
    }
}

/// Write stage names as numbered lines, keeping at most `max`.
pub fn write_stage_names(type_dir: &Path, names: &[String], max: usize) -> io::Result<()> {
    let lines: Vec<String> = names
        .iter()
        .take(max)
        .enumerate()
        .map(|(i, name)| format!("{}. {}", i + 1, name.trim()))
        .collect();
    fs::write(type_dir.join(STAGE_NAME_FILE), lines.join("\n"))
}

pub fn read_display_name(type_dir: &Path) -> Option<String> {
    let content = fs::read_to_string(type_dir.join(DISPLAY_NAME_FILE)).ok()?;
    let name = content.trim();
    (!name.is_empty()).then(|| name.to_string())
}

pub fn write_display_name(type_dir: &Path, name: &str) -> io::Result<()> {
    fs::write(type_dir.join(DISPLAY_NAME_FILE), name.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"img").unwrap();
    }

    fn level(n: i64) -> Level {
        Level::new(n, &AssetLimits::default()).unwrap()
    }

    #[test]
    fn ordinal_prefixes() {
        assert_eq!(strip_ordinal("1. 幼崽"), "幼崽");
        assert_eq!(strip_ordinal("2、少年"), "少年");
        assert_eq!(strip_ordinal("  3  成年 "), "成年");
        assert_eq!(strip_ordinal("baby"), "baby");
        assert_eq!(strip_ordinal("100分"), "100分");
        assert_eq!(strip_ordinal("4."), "");
    }

    #[test]
    fn probe_order_first_match_wins() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("1.png"));
        touch(&dir.path().join("1.jpeg"));
        assert_eq!(find_level_image(dir.path(), level(1)), Some(ImageFormat::Jpeg));
        assert_eq!(find_level_image(dir.path(), level(2)), None);
    }

    #[test]
    fn stage_names_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let names: Vec<String> = ["egg", "baby", "teen", "adult", "elder", "legend", "myth"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        write_stage_names(dir.path(), &names, 6).unwrap();
        let content = fs::read_to_string(dir.path().join(STAGE_NAME_FILE)).unwrap();
        assert!(content.starts_with("1. egg\n2. baby"));
        assert_eq!(read_stage_names(dir.path(), 6), names[..6].to_vec());
        assert_eq!(read_stage_names(dir.path(), 2), names[..2].to_vec());
    }

    #[test]
    fn stage_names_skip_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("宠物等级名称.txt"), "1. 蛋\n\n2、幼崽\n   \n3 成年").unwrap();
        assert_eq!(read_stage_names(dir.path(), 6), vec!["蛋", "幼崽", "成年"]);
    }

    #[test]
    fn scan_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let layout = AssetLayout::with_defaults(dir.path());
        let map = scan_root(&layout, &dir.path().join("nope"), &[], &AssetLimits::default()).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn scan_collects_types() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("cat").join("1.png"));
        touch(&root.join("cat").join("3.webp"));
        touch(&root.join("cat").join("7.png"));
        touch(&root.join("cat").join("notes.txt"));
        write_display_name(&root.join("cat"), "Kitty").unwrap();
        fs::create_dir_all(root.join("dog")).unwrap();
        touch(&root.join("__users__").join("user_1").join("cat").join("1.png"));
        fs::create_dir_all(root.join("bad name")).unwrap();
        touch(&root.join("stray.png"));

        let layout = AssetLayout::with_defaults(root);
        let map = scan_root(&layout, root, &["__users__"], &AssetLimits::default()).unwrap();

        let ids: Vec<&str> = map.keys().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["cat", "dog"]);

        let cat = &map[&PetTypeId::parse("cat").unwrap()];
        assert_eq!(cat.name.as_deref(), Some("Kitty"));
        assert_eq!(cat.images.len(), 2);
        assert_eq!(cat.images[&level(1)], "/assets/pet/cat/1.png");
        assert_eq!(cat.images[&level(3)], "/assets/pet/cat/3.webp");

        let dog = &map[&PetTypeId::parse("dog").unwrap()];
        assert!(dog.images.is_empty());
        assert!(dog.name.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn scan_follows_links_inside_root_only() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        touch(&root.join("cat").join("1.png"));
        touch(&dir.path().join("elsewhere").join("owl").join("2.png"));
        std::os::unix::fs::symlink(root.join("cat"), root.join("kitty")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("elsewhere/owl"), root.join("owl")).unwrap();

        let layout = AssetLayout::with_defaults(&root);
        let map = scan_root(&layout, &root, &[], &AssetLimits::default()).unwrap();

        let ids: Vec<&str> = map.keys().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["cat", "kitty"]);
        let kitty = &map[&PetTypeId::parse("kitty").unwrap()];
        assert_eq!(kitty.images[&level(1)], "/assets/pet/kitty/1.png");
    }
}
