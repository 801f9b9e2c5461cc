//! Content storage.
//!
//! [`ContentStore`] reads and writes the single portfolio document through a
//! [`DocumentStore`] backend:
//!
//! - [`SqliteDocumentStore`]: local `SQLite` file (default)
//! - [`HttpDocumentStore`]: hosted JSON document API
//! - [`MemoryDocumentStore`]: in-process, for tests and offline runs
//!
//! Failures never propagate out of [`ContentStore`]: `load` yields `None`,
//! `save` yields `false`, and the caller keeps its in-memory copy. Writes are
//! whole-document and last writer wins.

pub mod http;
pub mod memory;
pub mod migrations;
pub mod schema;
pub mod sqlite;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::config::{StoreBackend, StoreConfig};
use crate::content::{ContentDocument, LAST_UPDATED_FIELD};
use crate::error::Result;

pub use http::HttpDocumentStore;
pub use memory::MemoryDocumentStore;
pub use sqlite::SqliteDocumentStore;

/// A store of whole JSON documents addressed by collection and key.
#[async_trait]
pub trait DocumentStore: Send + Sync + fmt::Debug {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Read a document, `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached or the stored body
    /// is not valid JSON.
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>>;

    /// Overwrite a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    async fn put(&self, collection: &str, key: &str, body: &Value) -> Result<()>;
}

/// Shared document store.
pub type SharedDocumentStore = Arc<dyn DocumentStore>;

/// Client for the portfolio content document.
#[derive(Debug, Clone)]
pub struct ContentStore {
    backend: SharedDocumentStore,
    collection: String,
    key: String,
}

impl ContentStore {
    /// Create a client for the document at `collection/key`.
    #[must_use]
    pub fn new(
        backend: SharedDocumentStore,
        collection: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            collection: collection.into(),
            key: key.into(),
        }
    }

    /// Build the configured backend and wrap it.
    ///
    /// # Errors
    ///
    /// Returns an error if the `SQLite` database cannot be opened.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let backend: SharedDocumentStore = match config.backend {
            StoreBackend::Sqlite => Arc::new(SqliteDocumentStore::open(config.database_path())?),
            StoreBackend::Http => Arc::new(HttpDocumentStore::new(
                config.base_url.clone(),
                config.timeout(),
            )),
            StoreBackend::Memory => Arc::new(MemoryDocumentStore::new()),
        };
        Ok(Self::new(backend, &config.collection, &config.key))
    }

    /// In-memory client, mostly for tests.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryDocumentStore::new()),
            crate::config::DEFAULT_COLLECTION,
            crate::config::DEFAULT_KEY,
        )
    }

    /// The backend this client talks to.
    #[must_use]
    pub fn backend(&self) -> &SharedDocumentStore {
        &self.backend
    }

    /// Load the content document.
    ///
    /// Returns `None` when there is no stored document or when anything goes
    /// wrong; the failure is logged.
    pub async fn load(&self) -> Option<ContentDocument> {
        let value = match self.backend.get(&self.collection, &self.key).await {
            Ok(Some(value)) => value,
            Ok(None) => {
                info!(
                    backend = self.backend.name(),
                    "No stored content found, using initial content"
                );
                return None;
            }
            Err(e) => {
                error!(backend = self.backend.name(), error = %e, "Error loading content");
                return None;
            }
        };

        match ContentDocument::from_stored(value) {
            Ok(doc) => {
                debug!(backend = self.backend.name(), "Content loaded");
                Some(doc)
            }
            Err(e) => {
                error!(error = %e, "Stored content is malformed, ignoring it");
                None
            }
        }
    }

    /// Load the content document, or the bundled default.
    pub async fn load_or_default(&self) -> ContentDocument {
        self.load().await.unwrap_or_default()
    }

    /// Overwrite the stored document with `doc`, stamped with the current time.
    ///
    /// Returns whether the write succeeded.
    pub async fn save(&self, doc: &ContentDocument) -> bool {
        let body = match doc.to_stored(Utc::now()) {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, "Failed to serialize content");
                return false;
            }
        };

        match self.backend.put(&self.collection, &self.key, &body).await {
            Ok(()) => {
                info!(backend = self.backend.name(), "Content saved");
                true
            }
            Err(e) => {
                error!(backend = self.backend.name(), error = %e, "Error saving content");
                false
            }
        }
    }

    /// When the stored document was last written, if known.
    pub async fn last_updated(&self) -> Option<DateTime<Utc>> {
        let value = self.backend.get(&self.collection, &self.key).await.ok()??;
        let stamp = value.get(LAST_UPDATED_FIELD)?.as_str()?;
        DateTime::parse_from_rfc3339(stamp)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}
