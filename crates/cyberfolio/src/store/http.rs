//! Hosted JSON document API.
//!
//! Documents live at `{base_url}/{collection}/{key}`: `GET` returns the JSON
//! body (404 when absent), `PUT` replaces it.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::DocumentStore;
use crate::error::{Error, Result};

/// Document store reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDocumentStore {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpDocumentStore {
    /// Create a client for the API at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            base_url: base_url.into(),
            agent,
        }
    }

    /// URL of one document.
    #[must_use]
    pub fn document_url(&self, collection: &str, key: &str) -> String {
        format!(
            "{}/{collection}/{key}",
            self.base_url.trim_end_matches('/')
        )
    }
}

/// Map a ureq failure onto the crate error.
pub(crate) fn map_ureq_error(url: &str, err: ureq::Error) -> Error {
    match err {
        ureq::Error::Status(status, _) => Error::HttpStatus {
            url: url.to_string(),
            status,
        },
        ureq::Error::Transport(transport) => Error::http_transport(url, transport.to_string()),
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>> {
        let url = self.document_url(collection, key);
        let agent = self.agent.clone();
        debug!(%url, "Fetching document");

        tokio::task::spawn_blocking(move || match agent.get(&url).call() {
            Ok(response) => response
                .into_json::<Value>()
                .map(Some)
                .map_err(|e| Error::http_transport(&url, e.to_string())),
            Err(ureq::Error::Status(404, _)) => Ok(None),
            Err(e) => Err(map_ureq_error(&url, e)),
        })
        .await
        .map_err(|e| Error::internal(format!("document fetch task failed: {e}")))?
    }

    async fn put(&self, collection: &str, key: &str, body: &Value) -> Result<()> {
        let url = self.document_url(collection, key);
        let agent = self.agent.clone();
        let body = body.clone();
        debug!(%url, "Writing document");

        tokio::task::spawn_blocking(move || {
            agent
                .put(&url)
                .send_json(body)
                .map(|_| ())
                .map_err(|e| map_ureq_error(&url, e))
        })
        .await
        .map_err(|e| Error::internal(format!("document write task failed: {e}")))?
    }
}
