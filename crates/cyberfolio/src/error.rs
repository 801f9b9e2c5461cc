//! Error types for cyberfolio.
//!
//! This module defines all error types used throughout the cyberfolio crate.
//! Most of them never reach the user: store and feed failures are logged and
//! replaced by defaults at the call site.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for cyberfolio operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === HTTP Errors ===
    /// The remote answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// Requested URL.
        url: String,
        /// Status code returned.
        status: u16,
    },

    /// The request never produced a response.
    #[error("HTTP transport error for {url}: {message}")]
    HttpTransport {
        /// Requested URL.
        url: String,
        /// Description of what went wrong.
        message: String,
    },

    // === Content Errors ===
    /// A section name that the content document does not have.
    #[error("section \"{name}\" not found")]
    UnknownSection {
        /// The name that was asked for.
        name: String,
    },

    /// A field path that does not resolve inside the document.
    #[error("field \"{path}\" not found")]
    UnknownField {
        /// Dotted path that was asked for.
        path: String,
    },

    /// A field value that does not fit the field's type.
    #[error("invalid value for \"{path}\": {message}")]
    InvalidValue {
        /// Dotted path of the field.
        path: String,
        /// Description of the mismatch.
        message: String,
    },

    /// A list index past the end of the list.
    #[error("index {index} out of range for {section} (len {len})")]
    IndexOutOfRange {
        /// List section name.
        section: &'static str,
        /// Requested index.
        index: usize,
        /// Current list length.
        len: usize,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for cyberfolio operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create an HTTP transport error.
    #[must_use]
    pub fn http_transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::HttpTransport {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an invalid value error for a field path.
    #[must_use]
    pub fn invalid_value(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Check if this error came from the network rather than from local state.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::HttpStatus { .. } | Self::HttpTransport { .. })
    }

    /// Check if this error is a user input problem (bad section, path or value).
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownSection { .. }
                | Self::UnknownField { .. }
                | Self::InvalidValue { .. }
                | Self::IndexOutOfRange { .. }
        )
    }
}
