use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Product limits for a pet type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetLimits {
    /// Highest level a pet type can have (levels are `1..=max_levels`).
    pub max_levels: u8,
    /// Stage names beyond this count are dropped.
    pub max_stage_names: usize,
    /// Largest accepted upload body, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for AssetLimits {
    fn default() -> Self {
        Self {
            max_levels: 6,
            max_stage_names: 6,
            max_upload_bytes: 5 * 1024 * 1024,
        }
    }
}

impl AssetLimits {
    /// All valid levels, lowest first.
    pub fn levels(&self) -> impl Iterator<Item = Level> {
        (1..=self.max_levels).map(Level)
    }
}

/// A validated pet level, `1..=max_levels`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Level(u8);

impl Level {
    /// Validate a raw level against `limits`.
    pub fn new(raw: i64, limits: &AssetLimits) -> Result<Self, TypeError> {
        if raw < 1 || raw > i64::from(limits.max_levels) {
            return Err(TypeError::InvalidLevel {
                level: raw,
                max: limits.max_levels,
            });
        }
        Ok(Self(raw as u8))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Key used for this level in catalog image maps (`level3`).
    pub fn key(self) -> String {
        format!("level{}", self.0)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
