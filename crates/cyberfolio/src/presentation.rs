//! Presentation state shared by the dashboard and the overlays.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::Theme;
use crate::content::ContentDocument;

/// Which full-screen mode suspends the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Overlay {
    /// Dashboard only.
    #[default]
    None,
    /// Command terminal.
    Terminal,
    /// Admin password prompt.
    AdminGate,
    /// Admin edit form.
    Admin,
}

impl Overlay {
    /// Whether any overlay is open.
    #[must_use]
    pub fn is_open(self) -> bool {
        self != Self::None
    }
}

/// Tone of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// Something is in progress.
    Pending,
    /// The operation worked.
    Success,
    /// The operation failed.
    Failure,
}

impl StatusKind {
    /// Marker printed before the message.
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            Self::Pending => "…",
            Self::Success => "✓",
            Self::Failure => "✗",
        }
    }
}

/// A transient message for the footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    /// Tone.
    pub kind: StatusKind,
    /// Message text.
    pub text: String,
    /// When the message stops being shown.
    pub expires_at: Instant,
}

impl StatusMessage {
    /// Whether the message is still visible at `now`.
    #[must_use]
    pub fn is_visible(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

impl std::fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind.marker(), self.text)
    }
}

/// Everything the dashboard needs to draw itself.
#[derive(Debug, Clone)]
pub struct PresentationState {
    content: ContentDocument,
    overlay: Overlay,
    theme: Theme,
    loading: bool,
    status: Option<StatusMessage>,
    status_ttl: Duration,
}

impl PresentationState {
    /// Start from `content`, loading, with no overlay.
    #[must_use]
    pub fn new(content: ContentDocument, theme: Theme, status_ttl: Duration) -> Self {
        Self {
            content,
            overlay: Overlay::None,
            theme,
            loading: true,
            status: None,
            status_ttl,
        }
    }

    /// Current content.
    #[must_use]
    pub fn content(&self) -> &ContentDocument {
        &self.content
    }

    /// Replace the content wholesale.
    pub fn set_content(&mut self, content: ContentDocument) {
        self.content = content;
    }

    /// Finish the startup load, replacing content when one was found.
    pub fn finish_loading(&mut self, loaded: Option<ContentDocument>) {
        if let Some(content) = loaded {
            self.content = content;
        }
        self.loading = false;
    }

    /// Whether the startup load is still pending.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Open overlay.
    #[must_use]
    pub fn overlay(&self) -> Overlay {
        self.overlay
    }

    /// Switch to `overlay`, replacing whatever was open.
    pub fn open(&mut self, overlay: Overlay) {
        debug!(from = ?self.overlay, to = ?overlay, "Switching overlay");
        self.overlay = overlay;
    }

    /// Close the open overlay, returning the one that was closed.
    pub fn close_overlay(&mut self) -> Overlay {
        std::mem::take(&mut self.overlay)
    }

    /// Color theme.
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Show a status message for the configured lifetime.
    pub fn set_status(&mut self, kind: StatusKind, text: impl Into<String>, now: Instant) {
        self.status = Some(StatusMessage {
            kind,
            text: text.into(),
            expires_at: now + self.status_ttl,
        });
    }

    /// The status message, if still visible at `now`.
    #[must_use]
    pub fn status(&self, now: Instant) -> Option<&StatusMessage> {
        self.status.as_ref().filter(|status| status.is_visible(now))
    }

    /// Drop an expired status message. Returns whether one was dropped.
    pub fn expire_status(&mut self, now: Instant) -> bool {
        if self.status.as_ref().is_some_and(|s| !s.is_visible(now)) {
            self.status = None;
            return true;
        }
        false
    }

    /// Drop the status message regardless of age.
    pub fn clear_status(&mut self) {
        self.status = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::initial_content;

    fn state() -> PresentationState {
        PresentationState::new(initial_content(), Theme::Dark, Duration::from_millis(3000))
    }

    #[test]
    fn test_starts_loading_without_overlay() {
        let state = state();
        assert!(state.is_loading());
        assert_eq!(state.overlay(), Overlay::None);
    }

    #[test]
    fn test_finish_loading_keeps_default_when_nothing_loaded() {
        let mut state = state();
        state.finish_loading(None);
        assert!(!state.is_loading());
        assert_eq!(state.content(), &initial_content());

        let mut loaded = initial_content();
        loaded.about = "loaded".to_string();
        let mut state = self::state();
        state.finish_loading(Some(loaded));
        assert_eq!(state.content().about, "loaded");
    }

    #[test]
    fn test_open_replaces_and_close_returns_overlay() {
        let mut state = state();
        state.open(Overlay::Terminal);
        state.open(Overlay::Admin);
        assert_eq!(state.overlay(), Overlay::Admin);
        assert_eq!(state.close_overlay(), Overlay::Admin);
        assert!(!state.overlay().is_open());
    }

    #[test]
    fn test_status_expires() {
        let mut state = state();
        let now = Instant::now();
        state.set_status(StatusKind::Success, "Saved successfully!", now);

        let shown = state.status(now + Duration::from_millis(2999)).unwrap();
        assert_eq!(shown.to_string(), "✓ Saved successfully!");

        let later = now + Duration::from_millis(3000);
        assert!(state.status(later).is_none());
        assert!(state.expire_status(later));
        assert!(!state.expire_status(later));
    }
}
