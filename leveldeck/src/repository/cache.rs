//! Content-matched validation cache.
//!
//! An entry remembers the exact document a config was validated from. It is
//! reused only when a fresh read returns the same document, so a changed
//! file is always re-validated and stale data is never served.

use std::sync::Arc;

use dashmap::DashMap;
use leveldeck_core::{LevelConfig, RawDocument};

#[derive(Debug)]
struct CacheEntry {
    document: RawDocument,
    config: Arc<LevelConfig>,
}

/// Validated configs keyed by level identifier.
#[derive(Debug, Default)]
pub struct ValidationCache {
    entries: DashMap<String, CacheEntry>,
}

impl ValidationCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached config for `id` if it was validated from `document`.
    pub fn get(&self, id: &str, document: &RawDocument) -> Option<Arc<LevelConfig>> {
        self.entries
            .get(id)
            .filter(|entry| entry.document == *document)
            .map(|entry| Arc::clone(&entry.config))
    }

    /// Records the config validated from `document`, replacing any entry.
    pub fn insert(&self, id: &str, document: RawDocument, config: Arc<LevelConfig>) {
        self.entries
            .insert(id.to_string(), CacheEntry { document, config });
    }

    /// Drops the entry for `id`.
    pub fn evict(&self, id: &str) {
        self.entries.remove(id);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
