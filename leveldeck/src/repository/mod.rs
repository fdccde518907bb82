//! Level repository
//!
//! Owns the catalog of known level identifiers and resolves lookups against
//! a [`LevelStore`]. The catalog is built once by
//! [`LevelRepository::initialize`] and never changes afterwards.
//!
//! Every lookup re-reads the stored document. By default it is also
//! re-validated every time; with [`CachePolicy::ContentMatch`] a previous
//! result is reused only when the fresh bytes are identical to the ones it
//! was validated from.

pub mod cache;
pub mod catalog;
pub mod store;

use std::sync::Arc;
use std::time::Instant;

use leveldeck_core::{LevelConfig, ValidationOptions, Validator};

use crate::error::{LookupError, StartupError, StorageError};
use crate::observability::metrics;

pub use cache::ValidationCache;
pub use catalog::Catalog;
pub use store::{DirectoryStore, DocumentLimits, LevelStore, MemoryStore, read_document};

/// Whether validated configs may be reused across lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CachePolicy {
    /// Re-validate on every lookup.
    #[default]
    Disabled,
    /// Reuse a validated config while the stored bytes are unchanged.
    ContentMatch,
}

/// Repository construction options.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepositoryOptions {
    /// Options passed to the validator.
    pub validation: ValidationOptions,
    /// Validation cache policy.
    pub cache: CachePolicy,
}

/// Resolves level identifiers to validated configs.
#[derive(Debug)]
pub struct LevelRepository {
    store: Arc<dyn LevelStore>,
    catalog: Catalog,
    validator: Validator,
    cache: Option<ValidationCache>,
}

impl LevelRepository {
    /// Scans `store` once and builds the catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`StartupError`] if the storage location is absent,
    /// enumeration fails, or no level documents are found.
    pub async fn initialize(
        store: Arc<dyn LevelStore>,
        options: RepositoryOptions,
    ) -> Result<Self, StartupError> {
        let location = store.location();
        tracing::debug!(%location, "scanning level storage");

        let ids = store.list_ids().await.map_err(|source| match source {
            StorageError::LocationMissing { location } => {
                StartupError::MissingLocation { location }
            }
            source => StartupError::Enumeration {
                location: location.clone(),
                source,
            },
        })?;

        let catalog = Catalog::new(ids);
        if catalog.is_empty() {
            return Err(StartupError::EmptyCatalog { location });
        }

        tracing::info!(%location, levels = catalog.len(), cache = ?options.cache, "level catalog built");
        metrics::set_catalog_levels(catalog.len());

        let cache = match options.cache {
            CachePolicy::Disabled => None,
            CachePolicy::ContentMatch => Some(ValidationCache::new()),
        };

        Ok(Self {
            store,
            catalog,
            validator: Validator::new(options.validation),
            cache,
        })
    }

    /// Returns the catalog snapshot.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Resolves `id` to a validated level.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::NotFound`] if `id` is not in the catalog,
    /// [`LookupError::Storage`] if the document cannot be read, or
    /// [`LookupError::Invalid`] if it fails validation.
    pub async fn lookup(&self, id: &str) -> Result<Arc<LevelConfig>, LookupError> {
        let started = Instant::now();
        let result = self.resolve(id).await;

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind().as_str(),
        };
        metrics::record_lookup(outcome, started.elapsed());

        result
    }

    async fn resolve(&self, id: &str) -> Result<Arc<LevelConfig>, LookupError> {
        if !self.catalog.contains(id) {
            tracing::debug!(level_id = %id, "level not in catalog");
            return Err(LookupError::NotFound { id: id.to_string() });
        }

        let document = self.store.fetch(id).await.map_err(|source| {
            tracing::error!(level_id = %id, error = %source, "failed to read level document");
            LookupError::Storage {
                id: id.to_string(),
                source,
            }
        })?;

        if let Some(config) = self.cache.as_ref().and_then(|c| c.get(id, &document)) {
            tracing::debug!(level_id = %id, "level served from validation cache");
            metrics::record_cache_hit();
            return Ok(config);
        }

        match self.validator.validate_document(&document) {
            Ok(config) => {
                if id.parse::<i64>().is_ok_and(|n| n != config.id) {
                    tracing::warn!(
                        level_id = %id,
                        document_id = config.id,
                        "document id differs from its storage identifier"
                    );
                }
                let config = Arc::new(config);
                if let Some(cache) = &self.cache {
                    cache.insert(id, document, Arc::clone(&config));
                }
                tracing::debug!(level_id = %id, "level validated");
                Ok(config)
            }
            Err(source) => {
                if let Some(cache) = &self.cache {
                    cache.evict(id);
                }
                tracing::warn!(
                    level_id = %id,
                    kind = %source.kind(),
                    issues = source.issues().len(),
                    error = %source,
                    "level failed validation"
                );
                metrics::record_validation_failure(source.kind());
                Err(LookupError::Invalid {
                    id: id.to_string(),
                    source,
                })
            }
        }
    }
}
