//! Caller-supplied name sanitization.
//!
//! Every name that ends up as a path component (pet type ids, bucket names)
//! goes through [`sanitize_name`]:
//! - Must be non-empty
//! - Must not contain `..`, `/` or `\`
//! - Characters outside `[A-Za-z0-9_-]` and the CJK ideograph blocks
//!   (U+4E00..U+9FFF, U+3400..U+4DBF) are stripped
//! - The stripped result must be non-empty

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Bucket used for every caller when running in desktop mode.
pub const OFFLINE_BUCKET: &str = "offline";

fn is_allowed(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
        || ch == '_'
        || ch == '-'
        || ('\u{4e00}'..='\u{9fff}').contains(&ch)
        || ('\u{3400}'..='\u{4dbf}').contains(&ch)
}

/// Sanitize a caller-supplied name into a single safe path component.
///
/// # Examples
///
/// ```
/// use petdeck_types::name::sanitize_name;
///
/// assert_eq!(sanitize_name("cat").unwrap(), "cat");
/// assert_eq!(sanitize_name("小猫 v2!").unwrap(), "小猫v2");
/// assert!(sanitize_name("../../etc").is_err());
/// assert!(sanitize_name("!!!").is_err());
/// ```
pub fn sanitize_name(raw: &str) -> Result<String, TypeError> {
    if raw.is_empty() || raw.contains("..") || raw.contains('/') || raw.contains('\\') {
        return Err(TypeError::InvalidName(raw.to_string()));
    }
    let cleaned: String = raw.chars().filter(|ch| is_allowed(*ch)).collect();
    if cleaned.is_empty() {
        return Err(TypeError::InvalidName(raw.to_string()));
    }
    Ok(cleaned)
}

/// Identifier of a pet type; always a sanitized name.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PetTypeId(String);

impl PetTypeId {
    /// Sanitize `raw` into a pet type id.
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        sanitize_name(raw).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PetTypeId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PetTypeId> for String {
    fn from(id: PetTypeId) -> Self {
        id.0
    }
}

impl AsRef<str> for PetTypeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PetTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PetTypeId({})", self.0)
    }
}

impl fmt::Display for PetTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Isolation namespace owning one user layer.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bucket(String);

impl Bucket {
    /// The shared bucket used in desktop mode.
    pub fn offline() -> Self {
        Self(OFFLINE_BUCKET.to_string())
    }

    /// The bucket owned by member `id`.
    pub fn for_member(id: i64) -> Result<Self, TypeError> {
        Self::parse(&format!("user_{id}"))
    }

    /// Sanitize an arbitrary bucket name.
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        sanitize_name(raw).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Bucket {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bucket({})", self.0)
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
