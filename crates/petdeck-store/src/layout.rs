use std::path::{Component, Path, PathBuf};

use petdeck_types::{sanitize_name, Bucket, ImageFormat, Level, PetTypeId};

use crate::error::StoreResult;
use crate::guard::{assert_contained, resolve_lenient};

/// Default name of the reserved directory holding per-bucket user layers.
pub const DEFAULT_USERS_DIR: &str = "__users__";

/// Default URL prefix under which the global root is served.
pub const DEFAULT_URL_PREFIX: &str = "/assets/pet";

/// Physical layout of the asset roots.
///
/// ```text
/// <global_root>/<type>/<level>.<ext>                  shared library
/// <global_root>/<bucket>/<type>/...                   legacy user layer
/// <global_root>/<users_dir>/<bucket>/<type>/...       current user layer
/// ```
#[derive(Clone, Debug)]
pub struct AssetLayout {
    global_root: PathBuf,
    users_dir: String,
    url_prefix: String,
}

impl AssetLayout {
    /// Create a layout; `users_dir` must be a single sanitized component.
    pub fn new(
        global_root: impl Into<PathBuf>,
        users_dir: &str,
        url_prefix: &str,
    ) -> StoreResult<Self> {
        let users_dir = sanitize_name(users_dir)?;
        Ok(Self {
            global_root: global_root.into(),
            users_dir,
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        })
    }

    /// Layout with the default users directory and URL prefix.
    pub fn with_defaults(global_root: impl Into<PathBuf>) -> Self {
        Self {
            global_root: global_root.into(),
            users_dir: DEFAULT_USERS_DIR.to_string(),
            url_prefix: DEFAULT_URL_PREFIX.to_string(),
        }
    }

    pub fn global_root(&self) -> &Path {
        &self.global_root
    }

    pub fn users_dir(&self) -> &str {
        &self.users_dir
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Current user layer for `bucket`.
    pub fn current_root(&self, bucket: &Bucket) -> StoreResult<PathBuf> {
        let root = self.global_root.join(&self.users_dir).join(bucket.as_str());
        assert_contained(&root, &self.global_root)?;
        Ok(root)
    }

    /// Pre-migration user layer for `bucket`, read-only.
    pub fn legacy_root(&self, bucket: &Bucket) -> StoreResult<PathBuf> {
        let root = self.global_root.join(bucket.as_str());
        assert_contained(&root, &self.global_root)?;
        Ok(root)
    }

    /// Global directory names that are not pet types for `bucket`.
    pub fn reserved_names<'a>(&'a self, bucket: &'a Bucket) -> [&'a str; 2] {
        [self.users_dir.as_str(), bucket.as_str()]
    }

    /// Directory of `id` inside `root`, checked for containment.
    pub fn type_dir(&self, root: &Path, id: &PetTypeId) -> StoreResult<PathBuf> {
        let dir = root.join(id.as_str());
        assert_contained(&dir, root)?;
        Ok(dir)
    }

    /// Global directory of `id`, or `None` when `id` names a reserved directory.
    pub fn global_type_dir(&self, id: &PetTypeId, bucket: &Bucket) -> StoreResult<Option<PathBuf>> {
        if self.reserved_names(bucket).iter().any(|name| *name == id.as_str()) {
            return Ok(None);
        }
        self.type_dir(&self.global_root, id).map(Some)
    }

    /// Public URL of a level image stored under `root`.
    ///
    /// Roots beneath the global root keep their relative sub-path because the
    /// static server mounts the whole global root at the URL prefix.
    pub fn image_url(&self, root: &Path, id: &PetTypeId, level: Level, format: ImageFormat) -> String {
        let file = format!("{}{}", level, format.extension());
        match self.relative_root(root) {
            Some(rel) => format!("{}/{}/{}/{}", self.url_prefix, rel, id, file),
            None => format!("{}/{}/{}", self.url_prefix, id, file),
        }
    }

    fn relative_root(&self, root: &Path) -> Option<String> {
        let global = resolve_lenient(&self.global_root).ok()?;
        let root = resolve_lenient(root).ok()?;
        let rel = root.strip_prefix(&global).ok()?;
        let parts: Vec<String> = rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("/"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petdeck_types::AssetLimits;

    fn level(n: i64) -> Level {
        Level::new(n, &AssetLimits::default()).unwrap()
    }

    fn cat() -> PetTypeId {
        PetTypeId::parse("cat").unwrap()
    }

    #[test]
    fn roots() {
        let dir = tempfile::tempdir().unwrap();
        let layout = AssetLayout::with_defaults(dir.path());
        let bucket = Bucket::for_member(5).unwrap();
        assert_eq!(
            layout.current_root(&bucket).unwrap(),
            dir.path().join("__users__").join("user_5")
        );
        assert_eq!(layout.legacy_root(&bucket).unwrap(), dir.path().join("user_5"));
    }

    #[test]
    fn rejects_bad_users_dir() {
        assert!(AssetLayout::new("/tmp", "../up", "/assets/pet").is_err());
    }

    #[test]
    fn global_urls_omit_sub_path() {
        let dir = tempfile::tempdir().unwrap();
        let layout = AssetLayout::with_defaults(dir.path());
        let url = layout.image_url(dir.path(), &cat(), level(1), ImageFormat::Png);
        assert_eq!(url, "/assets/pet/cat/1.png");
    }

    #[test]
    fn user_urls_carry_sub_path() {
        let dir = tempfile::tempdir().unwrap();
        let layout = AssetLayout::with_defaults(dir.path());
        let bucket = Bucket::for_member(5).unwrap();

        let current = layout.current_root(&bucket).unwrap();
        let url = layout.image_url(&current, &cat(), level(2), ImageFormat::Gif);
        assert_eq!(url, "/assets/pet/__users__/user_5/cat/2.gif");

        let legacy = layout.legacy_root(&bucket).unwrap();
        let url = layout.image_url(&legacy, &cat(), level(3), ImageFormat::Jpg);
        assert_eq!(url, "/assets/pet/user_5/cat/3.jpg");
    }

    #[test]
    fn outside_root_urls_omit_sub_path() {
        let dir = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let layout = AssetLayout::new(dir.path(), "__users__", "/static/images/pet/").unwrap();
        let url = layout.image_url(other.path(), &cat(), level(1), ImageFormat::Webp);
        assert_eq!(url, "/static/images/pet/cat/1.webp");
    }

    #[test]
    fn reserved_type_names_have_no_global_dir() {
        let dir = tempfile::tempdir().unwrap();
        let layout = AssetLayout::with_defaults(dir.path());
        let bucket = Bucket::offline();
        let users = PetTypeId::parse("__users__").unwrap();
        let offline = PetTypeId::parse("offline").unwrap();
        assert!(layout.global_type_dir(&users, &bucket).unwrap().is_none());
        assert!(layout.global_type_dir(&offline, &bucket).unwrap().is_none());
        assert!(layout.global_type_dir(&cat(), &bucket).unwrap().is_some());
    }
}
