//! Threat intelligence feed.
//!
//! [`FeedClient`] pulls subscribed pulse names from the OTX API once per key
//! and never fails: errors turn into [`FALLBACK_PULSES`]. [`FeedRotation`]
//! cycles through whatever came back on a fixed interval.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-OTX-API-KEY";

/// Shown before the first fetch completes.
pub const INITIALIZING_TEXT: &str = "Initializing threat feed...";

/// Shown while a fetch is in flight.
pub const FETCHING_TEXT: &str = "Fetching intel from OTX...";

/// Shown when no API key is configured.
pub const MISSING_KEY_TEXT: &str = "OTX API Key missing...";

/// Shown when the API answered with no pulses.
pub const NO_PULSES_TEXT: &str = "No threat pulses found.";

/// Demo pulses used whenever the live feed is unavailable.
pub const FALLBACK_PULSES: &[&str] = &[
    "[DEMO] Spear-phishing wave against diplomatic entities attributed to APT29",
    "[DEMO] Infostealer builds distributed through fake CAPTCHA pages",
    "[DEMO] Ransomware affiliates abusing exposed RDP in the healthcare sector",
    "[DEMO] Credential harvesting kit impersonating Microsoft 365 sign-in",
    "[DEMO] Botnet C2 rotating through bulletproof hosting providers",
];

/// What a fetch produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
    /// No key configured; nothing was requested.
    MissingKey,
    /// The API answered with an empty result list.
    Empty,
    /// Pulse names from the API, in API order.
    Live(Vec<String>),
    /// The demo pulses, because the live fetch failed.
    Fallback(Vec<String>),
}

impl FeedOutcome {
    /// The fallback outcome.
    #[must_use]
    pub fn fallback() -> Self {
        Self::Fallback(FALLBACK_PULSES.iter().map(ToString::to_string).collect())
    }

    /// Pulse names to rotate through (empty for placeholders).
    #[must_use]
    pub fn pulses(&self) -> &[String] {
        match self {
            Self::Live(pulses) | Self::Fallback(pulses) => pulses,
            Self::MissingKey | Self::Empty => &[],
        }
    }

    /// Static text to show instead of pulses, if any.
    #[must_use]
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            Self::MissingKey => Some(MISSING_KEY_TEXT),
            Self::Empty => Some(NO_PULSES_TEXT),
            Self::Live(_) | Self::Fallback(_) => None,
        }
    }

    /// Whether the pulses came from the live API.
    #[must_use]
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }
}

/// Raw HTTP answer from a [`FeedTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl FeedResponse {
    /// Whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues the feed request.
#[async_trait]
pub trait FeedTransport: Send + Sync + fmt::Debug {
    /// `GET url` with the API key header.
    ///
    /// Non-success statuses are returned as responses, not errors.
    ///
    /// # Errors
    ///
    /// Returns an error if no response was received.
    async fn get(&self, url: &str, api_key: &str) -> Result<FeedResponse>;
}

/// Production transport over ureq.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Create a transport with a request timeout.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

#[async_trait]
impl FeedTransport for UreqTransport {
    async fn get(&self, url: &str, api_key: &str) -> Result<FeedResponse> {
        let agent = self.agent.clone();
        let url = url.to_string();
        let api_key = api_key.to_string();

        tokio::task::spawn_blocking(move || {
            let result = agent.get(&url).set(API_KEY_HEADER, &api_key).call();
            let response = match result {
                Ok(response) | Err(ureq::Error::Status(_, response)) => response,
                Err(ureq::Error::Transport(transport)) => {
                    return Err(Error::http_transport(&url, transport.to_string()))
                }
            };
            let status = response.status();
            let body = response
                .into_string()
                .map_err(|e| Error::http_transport(&url, e.to_string()))?;
            Ok(FeedResponse { status, body })
        })
        .await
        .map_err(|e| Error::internal(format!("feed task failed: {e}")))?
    }
}

/// Transport for offline runs: every request fails, so the demo pulses show.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineTransport;

#[async_trait]
impl FeedTransport for OfflineTransport {
    async fn get(&self, url: &str, _api_key: &str) -> Result<FeedResponse> {
        Err(Error::http_transport(url, "offline mode"))
    }
}

#[derive(Debug, Deserialize)]
struct PulsePage {
    #[serde(default)]
    results: Vec<Pulse>,
}

#[derive(Debug, Deserialize)]
struct Pulse {
    name: String,
}

/// Client for the subscribed-pulses endpoint.
#[derive(Debug, Clone)]
pub struct FeedClient {
    endpoint: String,
    transport: Arc<dyn FeedTransport>,
}

impl FeedClient {
    /// Create a client with an explicit transport.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, transport: Arc<dyn FeedTransport>) -> Self {
        Self {
            endpoint: endpoint.into(),
            transport,
        }
    }

    /// Create a client that talks HTTP through ureq.
    #[must_use]
    pub fn http(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self::new(endpoint, Arc::new(UreqTransport::new(timeout)))
    }

    /// Fetch pulse names for `api_key`.
    ///
    /// Never fails: an empty key skips the request, and any error becomes
    /// [`FeedOutcome::Fallback`].
    pub async fn fetch_pulses(&self, api_key: &str) -> FeedOutcome {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            debug!("No OTX key configured, skipping feed fetch");
            return FeedOutcome::MissingKey;
        }

        let response = match self.transport.get(&self.endpoint, api_key).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "OTX fetch failed, using demo pulses");
                return FeedOutcome::fallback();
            }
        };

        if !response.is_success() {
            warn!(status = response.status, "OTX returned an error, using demo pulses");
            return FeedOutcome::fallback();
        }

        match serde_json::from_str::<PulsePage>(&response.body) {
            Ok(page) if page.results.is_empty() => FeedOutcome::Empty,
            Ok(page) => {
                info!(count = page.results.len(), "Fetched OTX pulses");
                FeedOutcome::Live(page.results.into_iter().map(|p| p.name).collect())
            }
            Err(e) => {
                warn!(error = %e, "OTX response not understood, using demo pulses");
                FeedOutcome::fallback()
            }
        }
    }
}

/// Cyclic display over fetched pulses.
#[derive(Debug, Clone)]
pub struct FeedRotation {
    pulses: Vec<String>,
    placeholder: &'static str,
    index: usize,
    interval: Duration,
    pending: Duration,
}

impl FeedRotation {
    /// Create an empty rotation showing [`INITIALIZING_TEXT`].
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            pulses: Vec::new(),
            placeholder: INITIALIZING_TEXT,
            index: 0,
            interval,
            pending: Duration::ZERO,
        }
    }

    /// Show a status text until pulses arrive.
    pub fn set_placeholder(&mut self, text: &'static str) {
        self.pulses.clear();
        self.placeholder = text;
        self.index = 0;
        self.pending = Duration::ZERO;
    }

    /// Replace the rotation contents with a fetch result.
    pub fn set_outcome(&mut self, outcome: &FeedOutcome) {
        self.pulses = outcome.pulses().to_vec();
        self.placeholder = outcome.placeholder().unwrap_or(NO_PULSES_TEXT);
        self.index = 0;
        self.pending = Duration::ZERO;
    }

    /// Advance to the next pulse, wrapping after the last.
    pub fn tick(&mut self) {
        if !self.pulses.is_empty() {
            self.index = (self.index + 1) % self.pulses.len();
        }
    }

    /// Feed elapsed time; ticks once per full interval.
    ///
    /// Returns the number of ticks taken.
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        if self.pulses.is_empty() || self.interval.is_zero() {
            return 0;
        }
        self.pending += elapsed;
        let mut ticks = 0;
        while self.pending >= self.interval {
            self.pending -= self.interval;
            self.tick();
            ticks += 1;
        }
        ticks
    }

    /// The line to display.
    #[must_use]
    pub fn current(&self) -> &str {
        self.pulses
            .get(self.index)
            .map_or(self.placeholder, String::as_str)
    }

    /// Index of the displayed pulse.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of pulses in rotation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pulses.len()
    }

    /// Whether there is nothing to rotate.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pulses.is_empty()
    }

    /// Rotation interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }
}
