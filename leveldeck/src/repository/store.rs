//! Storage collaborators for level documents.
//!
//! A [`LevelStore`] maps identifiers to raw documents and can enumerate the
//! identifiers it holds. The repository never assumes anything beyond that,
//! so a directory of files and an in-memory map are interchangeable.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use dashmap::DashMap;
use leveldeck_core::{DocumentFormat, RawDocument};

use crate::error::StorageError;

/// Default maximum document size (10 MiB).
pub const DEFAULT_MAX_DOCUMENT_SIZE: u64 = 10 * 1024 * 1024;

/// Read-only source of level documents.
#[async_trait]
pub trait LevelStore: Send + Sync + std::fmt::Debug {
    /// Human-readable description of where documents live.
    fn location(&self) -> String;

    /// Enumerates every identifier in the store, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::LocationMissing`] if the store does not
    /// exist, or another [`StorageError`] if enumeration fails.
    async fn list_ids(&self) -> Result<Vec<String>, StorageError>;

    /// Reads the raw document stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Missing`] if nothing is stored under `id`,
    /// or another [`StorageError`] if the read fails.
    async fn fetch(&self, id: &str) -> Result<RawDocument, StorageError>;
}

// ============================================================================
// Limits
// ============================================================================

/// Size limits for stored documents.
///
/// Each limit can be overridden by an environment variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentLimits {
    /// Largest document accepted, in bytes (`LEVELDECK_MAX_DOCUMENT_SIZE`).
    pub max_document_size: u64,
}

impl Default for DocumentLimits {
    fn default() -> Self {
        Self {
            max_document_size: env_or("LEVELDECK_MAX_DOCUMENT_SIZE", DEFAULT_MAX_DOCUMENT_SIZE),
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ============================================================================
// Directory Store
// ============================================================================

/// One document per file under a root directory.
///
/// The identifier is the file stem. Only regular `.json`, `.yaml` and
/// `.yml` files count; hidden files and other extensions are ignored.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
    limits: DocumentLimits,
}

impl DirectoryStore {
    /// Creates a store rooted at `root` with default limits.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_limits(root, DocumentLimits::default())
    }

    /// Creates a store rooted at `root` with explicit limits.
    pub fn with_limits(root: impl Into<PathBuf>, limits: DocumentLimits) -> Self {
        Self {
            root: root.into(),
            limits,
        }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps each identifier to its document path.
    async fn scan(&self) -> Result<BTreeMap<String, PathBuf>, StorageError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::LocationMissing {
                    location: self.location(),
                });
            }
            Err(source) => {
                return Err(StorageError::Io {
                    location: self.location(),
                    source,
                });
            }
        };

        let mut documents: BTreeMap<String, PathBuf> = BTreeMap::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| StorageError::Io {
                location: self.location(),
                source,
            })?
        {
            let path = entry.path();
            let Some(id) = document_id(&path) else {
                continue;
            };
            // Follows symlinks; dangling links are skipped.
            match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.is_file() => {}
                _ => continue,
            }

            if let Some(first) = documents.get(&id) {
                return Err(StorageError::AmbiguousId {
                    id,
                    first: first.display().to_string(),
                    second: path.display().to_string(),
                });
            }
            tracing::trace!(level_id = %id, path = %path.display(), "found level document");
            documents.insert(id, path);
        }

        Ok(documents)
    }
}

#[async_trait]
impl LevelStore for DirectoryStore {
    fn location(&self) -> String {
        self.root.display().to_string()
    }

    async fn list_ids(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.scan().await?.into_keys().collect())
    }

    async fn fetch(&self, id: &str) -> Result<RawDocument, StorageError> {
        if !is_plain_id(id) {
            return Err(StorageError::InvalidId { id: id.to_string() });
        }

        let mut found: Option<(PathBuf, DocumentFormat, u64)> = None;
        for ext in DocumentFormat::EXTENSIONS {
            let path = self.root.join(format!("{id}.{ext}"));
            let Ok(meta) = tokio::fs::metadata(&path).await else {
                continue;
            };
            if !meta.is_file() {
                continue;
            }
            if let Some((first, _, _)) = &found {
                return Err(StorageError::AmbiguousId {
                    id: id.to_string(),
                    first: first.display().to_string(),
                    second: path.display().to_string(),
                });
            }
            let Some(format) = DocumentFormat::from_extension(ext) else {
                continue;
            };
            found = Some((path, format, meta.len()));
        }

        let Some((path, format, size)) = found else {
            return Err(StorageError::Missing { id: id.to_string() });
        };

        let document = read_checked(&path, format, size, self.limits).await?;
        tracing::debug!(level_id = %id, path = %path.display(), bytes = document.bytes.len(), "read level document");
        Ok(document)
    }
}

/// Reads a single level document from `path`.
///
/// The format is taken from the file extension.
///
/// # Errors
///
/// Returns [`StorageError::UnsupportedFormat`] for an unknown extension,
/// [`StorageError::TooLarge`] if the file exceeds `limits`, or
/// [`StorageError::Io`] if it cannot be read.
pub async fn read_document(path: &Path, limits: DocumentLimits) -> Result<RawDocument, StorageError> {
    let Some(format) = DocumentFormat::from_path(path) else {
        return Err(StorageError::UnsupportedFormat {
            location: path.display().to_string(),
        });
    };
    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|source| StorageError::Io {
            location: path.display().to_string(),
            source,
        })?;
    read_checked(path, format, meta.len(), limits).await
}

async fn read_checked(
    path: &Path,
    format: DocumentFormat,
    size: u64,
    limits: DocumentLimits,
) -> Result<RawDocument, StorageError> {
    if size > limits.max_document_size {
        return Err(StorageError::TooLarge {
            location: path.display().to_string(),
            size,
            limit: limits.max_document_size,
        });
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| StorageError::Io {
            location: path.display().to_string(),
            source,
        })?;
    Ok(RawDocument::new(format, bytes))
}

/// Returns the identifier for a candidate document path.
///
/// Only the exact extensions `fetch` probes count, so every catalogued id
/// resolves on a case-sensitive filesystem.
fn document_id(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    if name.starts_with('.') {
        return None;
    }
    let ext = path.extension()?.to_str()?;
    if !DocumentFormat::EXTENSIONS.contains(&ext) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    (!stem.is_empty()).then(|| stem.to_string())
}

/// An identifier must be a single, visible path component.
fn is_plain_id(id: &str) -> bool {
    if id.is_empty() || id.starts_with('.') {
        return false;
    }
    let mut components = Path::new(id).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(c)), None) if c == id
    )
}

// ============================================================================
// Memory Store
// ============================================================================

/// In-memory document map.
///
/// Documents can be replaced while the store is shared, which lets tests
/// change content between lookups.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: DashMap<String, RawDocument>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a document, builder style.
    #[must_use]
    pub fn with_document(self, id: impl Into<String>, document: RawDocument) -> Self {
        self.insert(id, document);
        self
    }

    /// Adds or replaces the document stored under `id`.
    pub fn insert(&self, id: impl Into<String>, document: RawDocument) {
        self.documents.insert(id.into(), document);
    }

    /// Removes the document stored under `id`.
    pub fn remove(&self, id: &str) {
        self.documents.remove(id);
    }
}

#[async_trait]
impl LevelStore for MemoryStore {
    fn location(&self) -> String {
        "memory".to_string()
    }

    async fn list_ids(&self) -> Result<Vec<String>, StorageError> {
        let mut ids: Vec<String> = self.documents.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        Ok(ids)
    }

    async fn fetch(&self, id: &str) -> Result<RawDocument, StorageError> {
        self.documents
            .get(id)
            .map(|doc| doc.value().clone())
            .ok_or_else(|| StorageError::Missing { id: id.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[tokio::test]
    async fn test_list_ids_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "2.yaml", "id: 2");
        write(dir.path(), "1.json", "{}");
        write(dir.path(), "3.yml", "id: 3");
        write(dir.path(), "notes.txt", "ignored");
        write(dir.path(), ".hidden.json", "{}");
        std::fs::create_dir(dir.path().join("nested.json")).unwrap();

        let store = DirectoryStore::new(dir.path());
        assert_eq!(store.list_ids().await.unwrap(), vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn test_listed_ids_are_fetchable() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "1.JSON", "{}");
        write(dir.path(), "2.json", "{}");
        write(dir.path(), "3.Yaml", "id: 3");

        let store = DirectoryStore::new(dir.path());
        let ids = store.list_ids().await.unwrap();
        assert_eq!(ids, vec!["2"]);
        for id in &ids {
            assert!(store.fetch(id).await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_list_ids_missing_directory() {
        let dir = TempDir::new().unwrap();
        let store = DirectoryStore::new(dir.path().join("absent"));
        assert!(matches!(
            store.list_ids().await,
            Err(StorageError::LocationMissing { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_ids_rejects_ambiguous_stem() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "1.json", "{}");
        write(dir.path(), "1.yaml", "id: 1");

        let store = DirectoryStore::new(dir.path());
        match store.list_ids().await {
            Err(StorageError::AmbiguousId { id, .. }) => assert_eq!(id, "1"),
            other => panic!("expected ambiguous id, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_reads_format_from_extension() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "1.json", "{\"id\": 1}");
        write(dir.path(), "2.yml", "id: 2");

        let store = DirectoryStore::new(dir.path());
        let json = store.fetch("1").await.unwrap();
        assert_eq!(json.format, DocumentFormat::Json);
        assert_eq!(json.bytes, b"{\"id\": 1}");

        let yaml = store.fetch("2").await.unwrap();
        assert_eq!(yaml.format, DocumentFormat::Yaml);
    }

    #[tokio::test]
    async fn test_fetch_missing_document() {
        let dir = TempDir::new().unwrap();
        let store = DirectoryStore::new(dir.path());
        assert!(matches!(
            store.fetch("7").await,
            Err(StorageError::Missing { ref id }) if id == "7"
        ));
    }

    #[tokio::test]
    async fn test_fetch_refuses_traversal() {
        let dir = TempDir::new().unwrap();
        let store = DirectoryStore::new(dir.path());
        for id in ["../1", "a/b", "..", ".", "", ".hidden", "/etc/passwd"] {
            assert!(
                matches!(store.fetch(id).await, Err(StorageError::InvalidId { .. })),
                "expected {id:?} to be refused"
            );
        }
    }

    #[tokio::test]
    async fn test_fetch_enforces_size_limit() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "1.json", "{\"name\": \"a long enough document\"}");

        let store = DirectoryStore::with_limits(
            dir.path(),
            DocumentLimits {
                max_document_size: 8,
            },
        );
        assert!(matches!(
            store.fetch("1").await,
            Err(StorageError::TooLarge { limit: 8, .. })
        ));
    }

    #[tokio::test]
    async fn test_read_document_single_file() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "level.yaml", "id: 4");
        write(dir.path(), "level.txt", "id: 4");

        let doc = read_document(&dir.path().join("level.yaml"), DocumentLimits::default())
            .await
            .unwrap();
        assert_eq!(doc, RawDocument::yaml("id: 4"));

        assert!(matches!(
            read_document(&dir.path().join("level.txt"), DocumentLimits::default()).await,
            Err(StorageError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            read_document(&dir.path().join("absent.json"), DocumentLimits::default()).await,
            Err(StorageError::Io { .. })
        ));
    }

    #[test]
    fn test_is_plain_id() {
        assert!(is_plain_id("1"));
        assert!(is_plain_id("green-plains"));
        assert!(!is_plain_id("a/b"));
        assert!(!is_plain_id(".."));
        assert!(!is_plain_id(".env"));
    }

    proptest::proptest! {
        #[test]
        fn test_plain_ids_stay_inside_root(id in "[a-z0-9./-]{1,12}") {
            if is_plain_id(&id) {
                let joined = Path::new("/levels").join(&id);
                proptest::prop_assert_eq!(joined.parent(), Some(Path::new("/levels")));
            }
        }
    }

    #[test]
    fn test_document_limits_default() {
        let limits = DocumentLimits::default();
        assert!(limits.max_document_size > 0);
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStore::new().with_document("b", RawDocument::json("{}"));
        store.insert("a", RawDocument::yaml("id: 1"));

        assert_eq!(store.list_ids().await.unwrap(), vec!["a", "b"]);
        assert_eq!(store.fetch("a").await.unwrap(), RawDocument::yaml("id: 1"));

        store.remove("a");
        assert!(matches!(
            store.fetch("a").await,
            Err(StorageError::Missing { .. })
        ));
    }
}
