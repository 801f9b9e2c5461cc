//! `SQLite`-backed document store.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tracing::{debug, info};

use super::{migrations, DocumentStore};
use crate::content::LAST_UPDATED_FIELD;
use crate::error::{Error, Result};

/// Documents stored as JSON text in a local `SQLite` database.
///
/// Queries are short single-row reads and writes, so they run inline under
/// the connection mutex.
#[derive(Debug)]
pub struct SqliteDocumentStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Mutex<Connection>,
}

impl SqliteDocumentStore {
    /// Open or create a database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self, collection: &str, key: &str) -> Result<Option<Value>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| Error::internal("database lock poisoned"))?;
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND key = ?2",
                params![collection, key],
                |row| row.get(0),
            )
            .optional()?;

        body.map(|text| serde_json::from_str(&text).map_err(Error::from))
            .transpose()
    }

    /// Number of times a document has been overwritten since it was created.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn revision(&self, collection: &str, key: &str) -> Result<Option<i64>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| Error::internal("database lock poisoned"))?;
        let revision = conn
            .query_row(
                "SELECT revision FROM documents WHERE collection = ?1 AND key = ?2",
                params![collection, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(revision)
    }

    fn write(&self, collection: &str, key: &str, body: &Value) -> Result<()> {
        let last_updated = body
            .get(LAST_UPDATED_FIELD)
            .and_then(Value::as_str)
            .map_or_else(|| Utc::now().to_rfc3339(), str::to_string);
        let text = serde_json::to_string(body)?;

        let conn = self
            .conn
            .lock()
            .map_err(|_| Error::internal("database lock poisoned"))?;
        conn.execute(
            r"
            INSERT INTO documents (collection, key, body, last_updated)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (collection, key)
            DO UPDATE SET body = excluded.body,
                          last_updated = excluded.last_updated,
                          revision = documents.revision + 1
            ",
            params![collection, key, text, last_updated],
        )?;

        debug!(collection, key, bytes = text.len(), "Document written");
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>> {
        self.read(collection, key)
    }

    async fn put(&self, collection: &str, key: &str, body: &Value) -> Result<()> {
        self.write(collection, key, body)
    }
}
