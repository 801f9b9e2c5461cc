//! The command terminal overlay.
//!
//! A [`TerminalSession`] lives as long as the overlay is open. It keeps a
//! capped transcript, an [`AuthGate`], and an optional editing buffer for the
//! `nano` sub-mode. Closing and reopening the overlay means a fresh session.

use std::collections::VecDeque;

use tracing::{debug, info};

use crate::auth::{AuthAttempt, AuthGate};
use crate::content::{ContentDocument, Section};
use crate::presentation::PresentationState;
use crate::store::ContentStore;

/// First line of every session.
pub const WELCOME_TEXT: &str = "Terminal active. Type \"help\" for a list of commands.";

/// Output of `help`.
pub const HELP_TEXT: &str = "Available commands:
  whoami          - Display user information
  view <section>  - View section (about, skills, softskills, projects, certs, contact, resumeurl, whoami)
  auth <password> - Authenticate this session
  logout          - Drop authentication
  nano <section>  - Edit a text section (about, resumeurl)
  clear           - Clear the terminal
  exit            - Close the terminal";

const AUTH_REQUIRED: &str = "Error: Authentication required. Use \"auth <password>\".";

/// Kind of transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// What the user typed.
    Input,
    /// Command output.
    Output,
    /// Session notices.
    System,
}

/// One transcript line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Line kind.
    pub kind: LineKind,
    /// Line text, possibly multi-line.
    pub text: String,
}

impl Line {
    fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// The `nano` scratch buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    /// Section being edited.
    pub section: Section,
    /// Current buffer text.
    pub text: String,
}

/// What the overlay should do after a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Keep the terminal open.
    Continue,
    /// The user asked to close the terminal.
    Exit,
    /// The session locked itself; the terminal must close.
    Locked,
}

/// One open terminal.
#[derive(Debug)]
pub struct TerminalSession {
    transcript: VecDeque<Line>,
    max_lines: usize,
    pushed: u64,
    gate: AuthGate,
    editing: Option<EditBuffer>,
    closed: bool,
}

impl TerminalSession {
    /// Open a session guarded by `gate`, keeping at most `max_lines` lines.
    #[must_use]
    pub fn new(gate: AuthGate, max_lines: usize) -> Self {
        let mut session = Self {
            transcript: VecDeque::new(),
            max_lines: max_lines.max(1),
            pushed: 0,
            gate,
            editing: None,
            closed: false,
        };
        session.push(LineKind::System, WELCOME_TEXT);
        session
    }

    /// Transcript, oldest first.
    pub fn transcript(&self) -> impl Iterator<Item = &Line> {
        self.transcript.iter()
    }

    /// Number of transcript lines.
    #[must_use]
    pub fn transcript_len(&self) -> usize {
        self.transcript.len()
    }

    /// Lines appended over the session's lifetime, including dropped ones.
    #[must_use]
    pub fn lines_pushed(&self) -> u64 {
        self.pushed
    }

    /// Lines appended since `lines_pushed()` returned `mark`, oldest first.
    pub fn lines_since(&self, mark: u64) -> impl Iterator<Item = &Line> {
        let fresh = usize::try_from(self.pushed.saturating_sub(mark)).unwrap_or(usize::MAX);
        let skip = self.transcript.len().saturating_sub(fresh);
        self.transcript.iter().skip(skip)
    }

    /// Whether the session has been authenticated.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.gate.is_granted()
    }

    /// Whether the session locked itself after too many failures.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The `nano` buffer, when editing.
    #[must_use]
    pub fn editing(&self) -> Option<&EditBuffer> {
        self.editing.as_ref()
    }

    /// Whether the `nano` sub-mode is active.
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Run one command line against `content`.
    ///
    /// Ignored while editing or after the session has locked.
    pub fn submit(&mut self, input: &str, content: &ContentDocument) -> Submission {
        if self.closed {
            return Submission::Locked;
        }
        if self.editing.is_some() {
            debug!("Command entry suspended while editing");
            return Submission::Continue;
        }

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Submission::Continue;
        }

        let (name, rest) = trimmed
            .split_once(char::is_whitespace)
            .map_or((trimmed, ""), |(name, rest)| (name, rest.trim_start()));
        let command = name.to_ascii_lowercase();
        let arg = rest.split_whitespace().next().unwrap_or("");

        if command == "clear" {
            self.transcript.clear();
            return Submission::Continue;
        }

        self.push(LineKind::Input, trimmed);

        match command.as_str() {
            "help" => self.push(LineKind::Output, HELP_TEXT),
            "whoami" => self.show_section(Section::Whoami, content),
            "view" => self.view(arg, content),
            "auth" => return self.auth(rest),
            "logout" => self.logout(),
            "nano" => self.nano(arg, content),
            "exit" => return Submission::Exit,
            _ => self.push(LineKind::Output, format!("command not found: {command}")),
        }
        Submission::Continue
    }

    /// Replace the editing buffer. No-op outside editing.
    pub fn set_buffer(&mut self, text: impl Into<String>) {
        if let Some(edit) = self.editing.as_mut() {
            edit.text = text.into();
        }
    }

    /// Append a line to the editing buffer. No-op outside editing.
    pub fn append_buffer(&mut self, line: &str) {
        if let Some(edit) = self.editing.as_mut() {
            if !edit.text.is_empty() {
                edit.text.push('\n');
            }
            edit.text.push_str(line);
        }
    }

    /// Write the buffer into the presented content and persist it.
    ///
    /// The in-memory content is updated even when the store write fails.
    /// Returns whether the store write succeeded.
    pub async fn save_edit(&mut self, state: &mut PresentationState, store: &ContentStore) -> bool {
        let Some(edit) = self.editing.take() else {
            return false;
        };

        let mut content = state.content().clone();
        if let Err(e) = content.set_text_section(edit.section, edit.text) {
            self.push(LineKind::System, format!("Error: {e}"));
            return false;
        }
        state.set_content(content);

        let saved = store.save(state.content()).await;
        info!(section = %edit.section, saved, "Terminal edit applied");
        if saved {
            self.push(
                LineKind::System,
                format!("Saved changes to {}.", edit.section),
            );
        } else {
            self.push(
                LineKind::System,
                format!(
                    "Saved changes to {} locally, but the store write failed.",
                    edit.section
                ),
            );
        }
        saved
    }

    /// Leave editing without touching content.
    pub fn cancel_edit(&mut self) {
        if let Some(edit) = self.editing.take() {
            self.push(
                LineKind::System,
                format!("Cancelled edit for {}.", edit.section),
            );
        }
    }

    fn view(&mut self, arg: &str, content: &ContentDocument) {
        if arg.is_empty() {
            self.push(LineKind::Output, "Usage: view <section>");
            return;
        }
        match arg.parse::<Section>() {
            Ok(section) if section.is_sensitive() && !self.is_authenticated() => {
                self.push(LineKind::Output, AUTH_REQUIRED);
            }
            Ok(section) => self.show_section(section, content),
            Err(_) => self.push(
                LineKind::Output,
                format!("Error: Section \"{}\" not found.", arg.to_ascii_lowercase()),
            ),
        }
    }

    fn show_section(&mut self, section: Section, content: &ContentDocument) {
        let text = content
            .section_value(section)
            .and_then(|value| Ok(serde_json::to_string_pretty(&value)?));
        match text {
            Ok(text) => self.push(LineKind::Output, text),
            Err(e) => self.push(LineKind::Output, format!("Error: {e}")),
        }
    }

    fn auth(&mut self, password: &str) -> Submission {
        if password.is_empty() {
            self.push(LineKind::Output, "Usage: auth <password>");
            return Submission::Continue;
        }

        match self.gate.attempt(password) {
            AuthAttempt::Granted => {
                self.push(LineKind::System, "Access granted.");
                Submission::Continue
            }
            AuthAttempt::Denied { remaining } => {
                let plural = if remaining == 1 { "" } else { "s" };
                self.push(
                    LineKind::Output,
                    format!("Access denied. {remaining} attempt{plural} remaining."),
                );
                Submission::Continue
            }
            AuthAttempt::LockedOut => {
                self.push(
                    LineKind::System,
                    "Too many failed attempts. Terminal locked.",
                );
                self.closed = true;
                Submission::Locked
            }
        }
    }

    fn logout(&mut self) {
        if self.gate.is_granted() {
            self.gate.revoke();
            self.push(LineKind::System, "Logged out.");
        } else {
            self.push(LineKind::Output, "Not authenticated.");
        }
    }

    fn nano(&mut self, arg: &str, content: &ContentDocument) {
        if arg.is_empty() {
            self.push(LineKind::Output, "Usage: nano <section>");
            return;
        }
        if !self.is_authenticated() {
            self.push(LineKind::Output, AUTH_REQUIRED);
            return;
        }

        let target = arg
            .parse::<Section>()
            .ok()
            .and_then(|section| Some((section, content.text_section(section)?)));
        match target {
            Some((section, text)) => {
                debug!(%section, "Entering editor");
                self.editing = Some(EditBuffer {
                    section,
                    text: text.to_string(),
                });
            }
            None => self.push(
                LineKind::Output,
                format!(
                    "Error: Cannot edit \"{}\". Use the admin panel for complex data.",
                    arg.to_ascii_lowercase()
                ),
            ),
        }
    }

    fn push(&mut self, kind: LineKind, text: impl Into<String>) {
        self.transcript.push_back(Line::new(kind, text));
        self.pushed += 1;
        while self.transcript.len() > self.max_lines {
            self.transcript.pop_front();
        }
    }
}
