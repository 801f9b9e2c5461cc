//! Typewriter text animation.
//!
//! A looping state machine: type the text one character at a time, hold it,
//! erase it one character at a time, start over. The driver either calls
//! [`Typewriter::step`] after sleeping [`Typewriter::next_delay`], or feeds
//! elapsed time into [`Typewriter::advance`].

use std::time::Duration;

use crate::config::TypewriterConfig;

/// Animation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Appending characters.
    Typing,
    /// Full text shown, waiting for the hold delay.
    Waiting,
    /// Removing characters.
    Erasing,
}

/// Typewriter animation over one target text.
#[derive(Debug, Clone)]
pub struct Typewriter {
    text: Vec<char>,
    shown: usize,
    phase: Phase,
    type_speed: Duration,
    erase_speed: Duration,
    hold_delay: Duration,
    pending: Duration,
}

impl Typewriter {
    /// Create an animation with explicit timing.
    #[must_use]
    pub fn new(
        text: &str,
        type_speed: Duration,
        erase_speed: Duration,
        hold_delay: Duration,
    ) -> Self {
        Self {
            text: text.chars().collect(),
            shown: 0,
            phase: Phase::Typing,
            type_speed,
            erase_speed,
            hold_delay,
            pending: Duration::ZERO,
        }
    }

    /// Create an animation with configured timing.
    #[must_use]
    pub fn with_config(text: &str, config: &TypewriterConfig) -> Self {
        Self::new(
            text,
            config.type_speed(),
            config.erase_speed(),
            config.hold_delay(),
        )
    }

    /// Replace the target text and restart from an empty display.
    ///
    /// Any pending hold is dropped. Setting the same text again is a no-op.
    pub fn set_text(&mut self, text: &str) {
        if self.text.iter().copied().eq(text.chars()) {
            return;
        }
        self.text = text.chars().collect();
        self.shown = 0;
        self.phase = Phase::Typing;
        self.pending = Duration::ZERO;
    }

    /// The currently displayed prefix.
    #[must_use]
    pub fn display(&self) -> String {
        self.text[..self.shown].iter().collect()
    }

    /// The full target text.
    #[must_use]
    pub fn text(&self) -> String {
        self.text.iter().collect()
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Delay before the next [`Typewriter::step`].
    #[must_use]
    pub fn next_delay(&self) -> Duration {
        match self.phase {
            Phase::Typing => self.type_speed,
            Phase::Waiting => self.hold_delay,
            Phase::Erasing => self.erase_speed,
        }
    }

    /// Perform one transition. Empty text never animates.
    pub fn step(&mut self) {
        if self.text.is_empty() {
            return;
        }

        match self.phase {
            Phase::Typing => {
                self.shown = (self.shown + 1).min(self.text.len());
                if self.shown == self.text.len() {
                    self.phase = Phase::Waiting;
                }
            }
            Phase::Waiting => self.phase = Phase::Erasing,
            Phase::Erasing => {
                self.shown = self.shown.saturating_sub(1);
                if self.shown == 0 {
                    self.phase = Phase::Typing;
                }
            }
        }
    }

    /// Feed elapsed time, stepping as often as the phase delays allow.
    ///
    /// Returns the number of steps taken.
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        if self.text.is_empty() {
            return 0;
        }

        self.pending += elapsed;
        let mut steps = 0;
        loop {
            let delay = self.next_delay();
            if self.pending < delay {
                break;
            }
            self.pending -= delay;
            self.step();
            steps += 1;
            if delay.is_zero() {
                // Zero delays would never drain the budget
                self.pending = Duration::ZERO;
                break;
            }
        }
        steps
    }
}
