//! Incremental extraction cache.
//!
//! Stores the imports and exports extracted from each file, keyed by its
//! root-relative path and a hash of its content. A cache hit lets the scanner
//! skip lexing that file.

use crate::fs::{FileSystem, write_with_retry};
use crate::model::{FileSyntax, SourceFile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;
use thiserror::Error;

/// Bumped whenever the extracted data changes shape or meaning.
pub const CACHE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Failed to read cache: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cache file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("Unsupported cache format version {0}")]
    Version(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractCache {
    pub version: u32,
    pub entries: BTreeMap<String, CacheEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub content_hash: String,
    pub syntax: FileSyntax,
}

impl Default for ExtractCache {
    fn default() -> Self {
        Self {
            version: CACHE_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

pub fn content_hash(text: &str) -> String {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    format!("{:x}", hasher.finish())
}

impl ExtractCache {
    /// Load a cache file. A missing file is an empty cache.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self, CacheError> {
        if !fs.exists(path) {
            return Ok(Self::default());
        }
        let content = fs.read_to_string(path)?;
        let cache: Self = serde_json::from_str(&content)?;
        if cache.version != CACHE_VERSION {
            return Err(CacheError::Version(cache.version));
        }
        Ok(cache)
    }

    /// Cached syntax for a file whose content still hashes to the stored value.
    pub fn lookup(&self, relative: &str, hash: &str) -> Option<&FileSyntax> {
        self.entries
            .get(relative)
            .filter(|entry| entry.content_hash == hash)
            .map(|entry| &entry.syntax)
    }

    /// A fresh cache holding exactly the given files; anything stale is gone.
    pub fn from_files(files: &[SourceFile]) -> Self {
        let entries = files
            .iter()
            .map(|file| {
                (
                    file.relative.clone(),
                    CacheEntry {
                        content_hash: content_hash(&file.text),
                        syntax: file.syntax(),
                    },
                )
            })
            .collect();
        Self {
            version: CACHE_VERSION,
            entries,
        }
    }

    pub fn save(&self, fs: &dyn FileSystem, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string(self).map_err(std::io::Error::other)?;
        write_with_retry(fs, path, &json)
    }
}
