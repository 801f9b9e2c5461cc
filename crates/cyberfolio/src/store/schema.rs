//! `SQLite` schema definitions for the document store.

/// SQL statement to create the documents table.
///
/// One row per `(collection, key)`; `body` holds the whole JSON document.
pub const CREATE_DOCUMENTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    key TEXT NOT NULL,
    body TEXT NOT NULL,
    last_updated TEXT NOT NULL,
    PRIMARY KEY (collection, key)
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Migration 2: count overwrites of each document.
pub const ADD_REVISION_COLUMN: &str =
    "ALTER TABLE documents ADD COLUMN revision INTEGER NOT NULL DEFAULT 0";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_DOCUMENTS_TABLE, CREATE_METADATA_TABLE];
