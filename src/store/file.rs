//! File-backed store — one JSON object per profile, written through on
//! every mutation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use super::KvBackend;
use crate::types::StoreError;

const STORE_FILE: &str = "sketchtab.json";

/// Persistent [`KvBackend`] over a single JSON file.
///
/// The full map is held in memory and rewritten on every `set`/`remove`.
/// State is a handful of small slots, so the rewrite is cheap and keeps the
/// on-disk file human-readable.
pub struct FileStore {
    path: PathBuf,
    slots: Mutex<HashMap<String, Value>>,
}

impl FileStore {
    /// Default store location: `<config dir>/sketchtab/sketchtab.json`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join("sketchtab")
            .join(STORE_FILE)
    }

    /// Open (or create) a store at `path`, loading any existing contents.
    ///
    /// A missing file starts empty; a corrupt file is logged and also
    /// starts empty rather than blocking acquisition.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let slots = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<HashMap<String, Value>>(&bytes) {
                Ok(map) => map,
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "store file corrupt; starting empty");
                    HashMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err.into()),
        };

        tracing::debug!(path = %path.display(), slots = slots.len(), "store opened");

        Ok(Self {
            path,
            slots: Mutex::new(slots),
        })
    }

    /// Open the store at its default location.
    pub async fn open_default() -> Result<Self, StoreError> {
        Self::open(Self::default_path()).await
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, slots: &HashMap<String, Value>) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(slots)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl KvBackend for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.slots.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut slots = self.slots.lock().await;
        slots.insert(key.to_string(), value);
        self.persist(&slots).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut slots = self.slots.lock().await;
        if slots.remove(key).is_some() {
            self.persist(&slots).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reopen_sees_persisted_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        {
            let store = FileStore::open(&path).await.unwrap();
            store.set("frequency", Value::String("hourly".into())).await.unwrap();
        }

        let store = FileStore::open(&path).await.unwrap();
        assert_eq!(
            store.get("frequency").await.unwrap(),
            Some(Value::String("hourly".into()))
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        tokio::fs::write(&path, b"{ not json").await.unwrap();

        let store = FileStore::open(&path).await.unwrap();
        assert!(store.get("frequency").await.unwrap().is_none());

        // And it recovers to a writable state
        store.set("frequency", Value::String("daily".into())).await.unwrap();
        assert!(store.get("frequency").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_remove_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        {
            let store = FileStore::open(&path).await.unwrap();
            store.set("theme", Value::String("dark".into())).await.unwrap();
            store.remove("theme").await.unwrap();
        }

        let store = FileStore::open(&path).await.unwrap();
        assert!(store.get("theme").await.unwrap().is_none());
    }
}
