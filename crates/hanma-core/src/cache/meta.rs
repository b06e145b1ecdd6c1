//! `.cache-meta.json` shape

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const META_FILE: &str = ".cache-meta.json";

/// Current metadata format version
pub const META_VERSION: u32 = 1;

/// Shared metadata for every cached key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheMeta {
    pub version: u32,

    /// Unix milliseconds of the last metadata write
    pub last_update: i64,

    #[serde(default)]
    pub entries: BTreeMap<String, CacheMetaEntry>,
}

impl Default for CacheMeta {
    fn default() -> Self {
        Self {
            version: META_VERSION,
            last_update: 0,
            entries: BTreeMap::new(),
        }
    }
}

/// When a key was written and how large its blob is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetaEntry {
    /// Unix milliseconds
    pub timestamp: i64,
    pub size: u64,
}
