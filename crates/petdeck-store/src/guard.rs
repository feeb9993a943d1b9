//! Containment checks for every path derived from caller input.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};

/// Canonicalize `path`, tolerating components that do not exist yet.
///
/// The deepest existing ancestor is canonicalized (following symlinks) and
/// the missing tail is appended verbatim. A tail ending in `..` cannot be
/// resolved without touching the filesystem and is rejected.
pub fn resolve_lenient(path: &Path) -> io::Result<PathBuf> {
    let mut existing = path;
    let mut tail = Vec::new();
    loop {
        match existing.canonicalize() {
            Ok(mut resolved) => {
                for component in tail.iter().rev() {
                    resolved.push(component);
                }
                return Ok(resolved);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let (Some(parent), Some(name)) = (existing.parent(), existing.file_name()) else {
                    return Err(e);
                };
                tail.push(name.to_os_string());
                existing = if parent.as_os_str().is_empty() {
                    Path::new(".")
                } else {
                    parent
                };
            }
            Err(e) => return Err(e),
        }
    }
}

/// Fail with [`StoreError::PathEscape`] unless `child` resolves inside `parent`.
pub fn assert_contained(child: &Path, parent: &Path) -> StoreResult<()> {
    let escape = || StoreError::PathEscape(child.to_path_buf());
    let parent = resolve_lenient(parent)?;
    let child = match resolve_lenient(child) {
        Ok(resolved) => resolved,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(escape()),
        Err(e) => return Err(e.into()),
    };
    if child.starts_with(&parent) {
        Ok(())
    } else {
        Err(escape())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_child_is_contained() {
        let dir = tempfile::tempdir().unwrap();
        let child = dir.path().join("cat");
        std::fs::create_dir(&child).unwrap();
        assert!(assert_contained(&child, dir.path()).is_ok());
    }

    #[test]
    fn missing_child_is_contained() {
        let dir = tempfile::tempdir().unwrap();
        let child = dir.path().join("__users__").join("user_1").join("cat");
        assert!(assert_contained(&child, dir.path()).is_ok());
    }

    #[test]
    fn parent_traversal_escapes() {
        let dir = tempfile::tempdir().unwrap();
        let inner = dir.path().join("inner");
        std::fs::create_dir(&inner).unwrap();
        let child = inner.join("..").join("..").join("etc");
        assert!(matches!(
            assert_contained(&child, &inner),
            Err(StoreError::PathEscape(_))
        ));
    }

    #[test]
    fn sibling_escapes() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        std::fs::create_dir(&a).unwrap();
        std::fs::create_dir(&b).unwrap();
        assert!(assert_contained(&b, &a).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn symlink_out_of_root_escapes() {
        let root = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        let link = root.path().join("cat");
        std::os::unix::fs::symlink(outside.path(), &link).unwrap();
        assert!(assert_contained(&link.join("1.png"), root.path()).is_err());
    }

    #[test]
    fn resolve_appends_missing_tail() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_lenient(&dir.path().join("x").join("y")).unwrap();
        let base = dir.path().canonicalize().unwrap();
        assert_eq!(resolved, base.join("x").join("y"));
    }
}
