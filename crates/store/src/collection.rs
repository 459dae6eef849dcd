//! Persisted record collections.
//!
//! A collection is a plain sequence of records that is loaded once at
//! startup and rewritten wholesale after every mutation. The [`RecordStore`]
//! trait is the only thing the engines know about durable storage.

use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StoreError};

/// Anything that can live in a persisted collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> Record for T where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

/// Durable storage for a sequence of records.
#[async_trait]
pub trait RecordStore<T: Record>: Send + Sync {
    /// Read the stored sequence.
    ///
    /// Returns `Ok(None)` when nothing has been stored yet.
    async fn load(&self) -> Result<Option<Vec<T>>>;

    /// Overwrite the stored sequence.
    async fn save(&self, records: &[T]) -> Result<()>;

    /// Human-readable name used in log output.
    fn describe(&self) -> String;
}

/// Load a collection, falling back to `seed` when the store is empty or unreadable.
///
/// The seed is written back immediately so the next startup finds a valid
/// file. A failure of that write is logged and otherwise ignored.
pub async fn load_or_seed<T, F>(store: &dyn RecordStore<T>, seed: F) -> Vec<T>
where
    T: Record,
    F: FnOnce() -> Vec<T>,
{
    match store.load().await {
        Ok(Some(records)) => {
            tracing::info!(
                store = %store.describe(),
                count = records.len(),
                "Loaded collection"
            );
            return records;
        }
        Ok(None) => {
            tracing::info!(store = %store.describe(), "No stored collection, writing seed");
        }
        Err(err) => {
            tracing::warn!(
                store = %store.describe(),
                error = %err,
                "Stored collection unreadable, reinitializing from seed"
            );
        }
    }

    let records = seed();
    if let Err(err) = store.save(&records).await {
        tracing::warn!(store = %store.describe(), error = %err, "Failed to persist seed");
    }
    records
}

/// A collection stored as pretty-printed JSON in a single file.
pub struct JsonFileStore<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    /// Create a store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for JsonFileStore<T> {
    async fn load(&self) -> Result<Option<Vec<T>>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let records = serde_json::from_slice(&bytes)?;
        Ok(Some(records))
    }

    async fn save(&self, records: &[T]) -> Result<()> {
        let write = async {
            let bytes = serde_json::to_vec_pretty(records)?;

            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }

            // Write beside the target, then swap it in.
            let temp = self.temp_path();
            tokio::fs::write(&temp, &bytes).await?;
            tokio::fs::rename(&temp, &self.path).await?;
            Ok::<_, StoreError>(())
        };

        write
            .await
            .map_err(|err| StoreError::Persistence(format!("{}: {}", self.path.display(), err)))?;

        tracing::debug!(path = %self.path.display(), count = records.len(), "Saved collection");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// An in-process store, mainly for tests.
///
/// Writes can be made to fail with [`MemoryStore::set_fail_writes`].
pub struct MemoryStore<T> {
    records: Mutex<Option<Vec<T>>>,
    fail_writes: AtomicBool,
}

impl<T: Record> MemoryStore<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            records: Mutex::new(None),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Create a store that already holds `records`.
    pub fn with_records(records: Vec<T>) -> Self {
        Self {
            records: Mutex::new(Some(records)),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make subsequent saves fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Copy of the last successfully saved sequence.
    pub fn snapshot(&self) -> Option<Vec<T>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl<T: Record> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for MemoryStore<T> {
    async fn load(&self) -> Result<Option<Vec<T>>> {
        Ok(self.snapshot())
    }

    async fn save(&self, records: &[T]) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Persistence("memory store rejected write".to_string()));
        }

        *self
            .records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(records.to_vec());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: String,
        label: String,
    }

    fn item(id: &str, label: &str) -> Item {
        Item {
            id: id.to_string(),
            label: label.to_string(),
        }
    }

    #[tokio::test]
    async fn test_file_store_missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::<Item>::new(dir.path().join("items.json"));

        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_load_after_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::<Item>::new(dir.path().join("items.json"));
        let items = vec![item("1", "안녕하세요"), item("2", "second")];

        store.save(&items).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();

        assert_eq!(loaded, items);
    }

    #[tokio::test]
    async fn test_file_store_resave_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");
        let store = JsonFileStore::<Item>::new(&path);
        store.save(&[item("1", "one"), item("2", "δύο")]).await.unwrap();
        let before = std::fs::read(&path).unwrap();

        let loaded: Vec<Item> = store.load().await.unwrap().unwrap();
        store.save(&loaded).await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_file_store_writes_readable_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");
        let store = JsonFileStore::<Item>::new(&path);

        store.save(&[item("1", "안녕")]).await.unwrap();
        let text = std::fs::read_to_string(&path).unwrap();

        assert!(text.contains("\n  {"));
        assert!(text.contains("안녕"));
        assert!(!dir.path().join("items.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_store_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::<Item>::new(dir.path().join("nested/data/items.json"));

        store.save(&[item("1", "one")]).await.unwrap();

        assert_eq!(store.load().await.unwrap().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = JsonFileStore::<Item>::new(&path);

        assert!(matches!(store.load().await, Err(StoreError::Json(_))));
    }

    #[tokio::test]
    async fn test_load_or_seed_missing_writes_seed() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::<Item>::new(dir.path().join("items.json"));

        let records = load_or_seed(&store, || vec![item("seed", "default")]).await;

        assert_eq!(records, vec![item("seed", "default")]);
        assert_eq!(store.load().await.unwrap().unwrap(), records);
    }

    #[tokio::test]
    async fn test_load_or_seed_corrupt_reseeds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");
        std::fs::write(&path, "[{\"id\": 3").unwrap();
        let store = JsonFileStore::<Item>::new(&path);

        let records = load_or_seed(&store, || vec![item("seed", "default")]).await;

        assert_eq!(records.len(), 1);
        assert_eq!(store.load().await.unwrap().unwrap(), records);
    }

    #[tokio::test]
    async fn test_load_or_seed_keeps_existing() {
        let store = MemoryStore::with_records(vec![item("a", "kept")]);

        let records = load_or_seed(&store, || vec![item("seed", "default")]).await;

        assert_eq!(records, vec![item("a", "kept")]);
    }

    #[tokio::test]
    async fn test_load_or_seed_tolerates_failed_seed_write() {
        let store = MemoryStore::<Item>::new();
        store.set_fail_writes(true);

        let records = load_or_seed(&store, || vec![item("seed", "default")]).await;

        assert_eq!(records.len(), 1);
        assert!(store.snapshot().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_failed_write() {
        let store = MemoryStore::with_records(vec![item("a", "kept")]);
        store.set_fail_writes(true);

        let result = store.save(&[]).await;

        assert!(matches!(result, Err(StoreError::Persistence(_))));
        assert_eq!(store.snapshot().unwrap().len(), 1);
    }
}
