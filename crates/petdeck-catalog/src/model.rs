use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use petdeck_types::{Level, PetTypeId};

/// Level images keyed by level; serialized as `{"level1": url, ...}`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LevelImages(pub BTreeMap<Level, String>);

impl LevelImages {
    pub fn get(&self, level: Level) -> Option<&str> {
        self.0.get(&level).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for LevelImages {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (level, url) in &self.0 {
            map.serialize_entry(&level.key(), url)?;
        }
        map.end()
    }
}

/// One pet type as visible to a bucket.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: PetTypeId,
    pub name: String,
    pub images: LevelImages,
    pub stage_names: Vec<String>,
    pub image_count: usize,
}

/// Resolved view of every pet type visible to a bucket, sorted by id.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct Catalog {
    pub types: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.types.iter().find(|entry| entry.id.as_str() == id)
    }
}
