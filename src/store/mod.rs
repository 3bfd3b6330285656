//! Key-value persistence for acquisition state.
//!
//! Everything the policy remembers between tabs — cadence, last sketch,
//! recency window, connectivity classification — lives in one string-keyed
//! store. The backend is polymorphic: [`FileStore`] persists to a JSON file
//! under the user's config directory, [`MemoryStore`] is the volatile
//! fallback. Callers go through the typed [`Store`] facade and never pick
//! a backend past startup.

pub mod file;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::types::StoreError;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Store keys. Each is an independent, individually read/written slot;
/// there is no transactional grouping across keys.
pub mod keys {
    /// User-configured fetch cadence ([`crate::types::FetchFrequency`]).
    pub const FREQUENCY: &str = "frequency";
    /// Epoch ms of the last successful fetch.
    pub const LAST_FETCH_TIME: &str = "lastFetchTime";
    /// Most recently fetched sketch record.
    pub const LAST_SKETCH: &str = "lastSketch";
    /// Recently shown sketch uids, newest first.
    pub const RECENT: &str = "recent";
    /// Presentation theme.
    pub const THEME: &str = "theme";
    /// Cached offline/service-issue classification.
    pub const CONNECTIVITY_CACHE: &str = "connectivityCache";
    /// Force offline classification without probing (testing aid).
    pub const TEST_OFFLINE_MODE: &str = "testOfflineMode";
}

/// An asynchronous string-keyed JSON value store.
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Read the value at `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    /// Write `value` at `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
    /// Delete the value at `key`. Deleting an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Typed facade over an [`KvBackend`], shared cheaply by clone.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn KvBackend>,
}

impl Store {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self { backend }
    }

    /// Read and deserialize the value at `key`.
    ///
    /// A value that no longer deserializes as `T` is treated as absent
    /// rather than fatal — a stale slot must not brick acquisition.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.backend.get(key).await? {
            Some(value) => match serde_json::from_value(value) {
                Ok(typed) => Ok(Some(typed)),
                Err(err) => {
                    tracing::warn!(key, %err, "discarding undecodable store value");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Serialize and write `value` at `key`.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let value = serde_json::to_value(value)?;
        self.backend.set(key, value).await
    }

    pub async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.backend.remove(key).await
    }
}
