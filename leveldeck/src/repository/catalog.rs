//! The set of level identifiers known at startup.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;

/// Immutable snapshot of the known level identifiers.
///
/// Built once during repository initialization and never modified. Clones
/// share the same underlying set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    ids: Arc<BTreeSet<String>>,
}

impl Catalog {
    /// Builds a catalog from enumerated identifiers.
    pub fn new(ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            ids: Arc::new(ids.into_iter().collect()),
        }
    }

    /// Returns whether `id` is a known level.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Number of known levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Identifiers in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

impl Serialize for Catalog {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.ids())
    }
}
