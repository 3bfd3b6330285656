//! Volatile in-memory store — the fallback when no persistent location is
//! available, and the backend for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use super::KvBackend;
use crate::types::StoreError;

/// In-memory [`KvBackend`]. Contents die with the process.
#[derive(Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvBackend for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.slots.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.slots.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.slots.lock().await.remove(key);
        Ok(())
    }
}
