//! Persisted spread records and the metadata index

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::spread_key;
use crate::scene::DrawableObject;
use crate::types::PageRange;

/// Everything saved for one spread. Overwritten on every save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadRecord {
    pub spread_index: usize,
    pub page_range: Option<PageRange>,
    pub saved_at: DateTime<Utc>,
    pub objects: Vec<DrawableObject>,
}

impl SpreadRecord {
    pub fn key(&self) -> String {
        spread_key(self.spread_index)
    }

    pub fn meta(&self) -> SpreadMeta {
        SpreadMeta {
            key: self.key(),
            spread_index: self.spread_index,
            page_range: self.page_range,
            saved_at: self.saved_at,
        }
    }
}

/// Summary of a saved spread, listed without loading its objects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadMeta {
    pub key: String,
    pub spread_index: usize,
    pub page_range: Option<PageRange>,
    pub saved_at: DateTime<Utc>,
}

/// Map from spread key to summary, persisted as one JSON document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpreadMetadataIndex {
    entries: BTreeMap<String, SpreadMeta>,
}

impl SpreadMetadataIndex {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn insert(&mut self, meta: SpreadMeta) {
        self.entries.insert(meta.key.clone(), meta);
    }

    pub fn remove(&mut self, key: &str) -> Option<SpreadMeta> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&SpreadMeta> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by spread index
    pub fn list(&self) -> Vec<SpreadMeta> {
        let mut list: Vec<SpreadMeta> = self.entries.values().cloned().collect();
        list.sort_by_key(|m| m.spread_index);
        list
    }
}
