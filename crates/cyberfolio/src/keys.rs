//! Global keyboard shortcuts.
//!
//! `~` toggles the terminal, `Escape` closes whatever overlay is open, and
//! typing the admin sequence (default `/admin`) opens the admin gate. The
//! sequence is matched against a rolling buffer that resets after a period
//! of inactivity or as soon as it stops being a prefix of the sequence.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::KeysConfig;

/// A key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable character.
    Char(char),
    /// The escape key.
    Escape,
}

impl Key {
    /// Split a line of input into key presses. `ESC` bytes become [`Key::Escape`].
    pub fn from_line(line: &str) -> impl Iterator<Item = Key> + '_ {
        line.chars().map(|c| match c {
            '\u{1b}' => Key::Escape,
            c => Key::Char(c),
        })
    }
}

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Open or close the terminal.
    ToggleTerminal,
    /// Close the open overlay.
    CloseOverlay,
    /// Open the admin password prompt.
    OpenAdminGate,
}

/// Turns key presses into [`KeyAction`]s.
#[derive(Debug, Clone)]
pub struct KeyRouter {
    sequence: String,
    buffer: String,
    reset_after: Duration,
    last_key: Option<Instant>,
}

impl KeyRouter {
    /// Create a router for `sequence`, forgetting partial input after `reset_after`.
    #[must_use]
    pub fn new(sequence: &str, reset_after: Duration) -> Self {
        Self {
            sequence: sequence.to_lowercase(),
            buffer: String::new(),
            reset_after,
            last_key: None,
        }
    }

    /// Create a router from configuration.
    #[must_use]
    pub fn from_config(config: &KeysConfig) -> Self {
        Self::new(&config.admin_sequence, Duration::from_millis(config.reset_ms))
    }

    /// The partially typed sequence.
    #[must_use]
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Route one key press made at `now`.
    pub fn handle(&mut self, key: Key, now: Instant) -> Option<KeyAction> {
        if self
            .last_key
            .is_some_and(|last| now.saturating_duration_since(last) >= self.reset_after)
        {
            self.buffer.clear();
        }
        self.last_key = Some(now);

        match key {
            Key::Escape => {
                self.buffer.clear();
                Some(KeyAction::CloseOverlay)
            }
            Key::Char('~') => {
                self.buffer.clear();
                Some(KeyAction::ToggleTerminal)
            }
            Key::Char(c) => self.track(c),
        }
    }

    fn track(&mut self, c: char) -> Option<KeyAction> {
        self.buffer.extend(c.to_lowercase());

        if self.buffer == self.sequence {
            debug!("Admin sequence entered");
            self.buffer.clear();
            return Some(KeyAction::OpenAdminGate);
        }

        if !self.sequence.starts_with(&self.buffer) {
            // The diverging key may itself start a new attempt
            let restart: String = c.to_lowercase().collect();
            self.buffer.clear();
            if self.sequence.starts_with(&restart) {
                self.buffer = restart;
            }
        }
        None
    }
}
