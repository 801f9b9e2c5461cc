//! In-process document store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::DocumentStore;
use crate::error::{Error, Result};

/// Documents kept in a map for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<HashMap<(String, String), Value>>,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.lock().map(|docs| docs.len()).unwrap_or(0)
    }

    /// Whether the store holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>> {
        let docs = self
            .documents
            .lock()
            .map_err(|_| Error::internal("memory store lock poisoned"))?;
        Ok(docs
            .get(&(collection.to_string(), key.to_string()))
            .cloned())
    }

    async fn put(&self, collection: &str, key: &str, body: &Value) -> Result<()> {
        let mut docs = self
            .documents
            .lock()
            .map_err(|_| Error::internal("memory store lock poisoned"))?;
        docs.insert((collection.to_string(), key.to_string()), body.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_missing() {
        let store = MemoryDocumentStore::new();
        assert!(store.get("portfolio", "content").await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = MemoryDocumentStore::new();
        store.put("c", "k", &json!({"v": 1})).await.unwrap();
        store.put("c", "k", &json!({"v": 2})).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("c", "k").await.unwrap(), Some(json!({"v": 2})));
    }

    #[tokio::test]
    async fn test_keys_are_scoped_by_collection() {
        let store = MemoryDocumentStore::new();
        store.put("a", "k", &json!(1)).await.unwrap();

        assert!(store.get("b", "k").await.unwrap().is_none());
    }
}
