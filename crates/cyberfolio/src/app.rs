//! The interactive runtime.
//!
//! [`App`] owns the presentation state and reacts to three sources: input
//! lines, timer ticks, and completions of background work ([`AppEvent`]).
//! [`App::run`] multiplexes them with `tokio::select!` on a single task, so
//! state is never shared across threads.
//!
//! Input is line-based. On the dashboard every character of a line is a key
//! press for [`KeyRouter`]; inside an overlay the line is a command or a
//! password. A line containing an `ESC` byte is always routed as keys, and in
//! the terminal a line holding only `~` closes it. Blank lines at the admin
//! gate are ignored.

use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::admin::AdminForm;
use crate::auth::{AuthAttempt, AuthGate, Blake3Verifier, SharedVerifier};
use crate::clock::Clock;
use crate::config::Config;
use crate::content::{Cert, ContentDocument, ListSection};
use crate::error::Result;
use crate::feed::{FeedClient, FeedOutcome, FeedRotation, OfflineTransport, FETCHING_TEXT};
use crate::keys::{Key, KeyAction, KeyRouter};
use crate::logo::{resolve_logos, HttpChecker, LogoChecker, OfflineChecker};
use crate::presentation::{Overlay, PresentationState, StatusKind};
use crate::store::ContentStore;
use crate::tasks::TaskScope;
use crate::terminal::{LineKind, Submission, TerminalSession};
use crate::typewriter::Typewriter;
use crate::view::{self, Frame};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Completion of background work.
#[derive(Debug)]
pub enum AppEvent {
    /// The startup content load finished.
    ContentLoaded(Option<ContentDocument>),
    /// A feed fetch for `key` finished.
    FeedFetched {
        /// Key the fetch used.
        key: String,
        /// What came back.
        outcome: FeedOutcome,
    },
    /// Certificate logos were resolved for `certs`.
    LogosResolved {
        /// Certificates the logos belong to.
        certs: Vec<Cert>,
        /// One logo per certificate.
        logos: Vec<String>,
    },
    /// A timer asked to close an overlay.
    CloseOverlay(Overlay),
}

/// Whether the loop keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Keep running.
    Continue,
    /// Leave the app.
    Quit,
}

/// External collaborators of the app.
#[derive(Debug, Clone)]
pub struct Services {
    /// Content persistence.
    pub store: ContentStore,
    /// Threat feed client.
    pub feed: FeedClient,
    /// Secret check for the terminal and the admin gate.
    pub verifier: SharedVerifier,
    /// Logo availability check.
    pub checker: Arc<dyn LogoChecker>,
}

impl Services {
    /// Build the configured services. `offline` swaps every network-facing
    /// piece for a local stand-in.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured store cannot be opened.
    pub fn from_config(config: &Config, offline: bool) -> Result<Self> {
        let verifier: SharedVerifier = Arc::new(Blake3Verifier::from_hex(&config.auth.secret_hash));

        if offline {
            info!("Offline mode, using in-memory store and demo feed");
            return Ok(Self {
                store: ContentStore::in_memory(),
                feed: FeedClient::new(config.feed.endpoint.clone(), Arc::new(OfflineTransport)),
                verifier,
                checker: Arc::new(OfflineChecker),
            });
        }

        Ok(Self {
            store: ContentStore::from_config(&config.store)?,
            feed: FeedClient::http(config.feed.endpoint.clone(), config.feed_timeout()),
            verifier,
            checker: Arc::new(HttpChecker::new(config.feed_timeout())),
        })
    }
}

/// The interactive dashboard.
#[derive(Debug)]
pub struct App {
    config: Config,
    services: Services,
    state: PresentationState,
    typewriter: Typewriter,
    rotation: FeedRotation,
    router: KeyRouter,
    clock: Clock,
    logos: Vec<String>,
    logo_certs: Option<Vec<Cert>>,
    feed_key: Option<String>,
    terminal: Option<TerminalSession>,
    admin_gate: AuthGate,
    admin: Option<AdminForm>,
    events: mpsc::UnboundedSender<AppEvent>,
    background: TaskScope,
    overlay_tasks: TaskScope,
}

impl App {
    /// Create the app with bundled content. Background completions arrive
    /// on the returned receiver and go to [`App::handle_event`].
    #[must_use]
    pub fn new(config: Config, services: Services) -> (Self, mpsc::UnboundedReceiver<AppEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let content = ContentDocument::default();
        let app = Self {
            typewriter: Typewriter::with_config(&content.about, &config.typewriter),
            rotation: FeedRotation::new(config.rotation_interval()),
            router: KeyRouter::from_config(&config.keys),
            clock: Clock::from_config(&config.ui),
            state: PresentationState::new(content, config.ui.theme, config.status_clear()),
            admin_gate: AuthGate::new(Arc::clone(&services.verifier), config.auth.max_attempts),
            logos: Vec::new(),
            logo_certs: None,
            feed_key: None,
            terminal: None,
            admin: None,
            events,
            background: TaskScope::new("app"),
            overlay_tasks: TaskScope::new("overlay"),
            config,
            services,
        };
        (app, rx)
    }

    /// Presentation state.
    #[must_use]
    pub fn state(&self) -> &PresentationState {
        &self.state
    }

    /// The open terminal session, if any.
    #[must_use]
    pub fn terminal(&self) -> Option<&TerminalSession> {
        self.terminal.as_ref()
    }

    /// The open admin form, if any.
    #[must_use]
    pub fn admin(&self) -> Option<&AdminForm> {
        self.admin.as_ref()
    }

    /// Kick off the startup content load.
    pub fn start(&mut self) {
        let store = self.services.store.clone();
        let events = self.events.clone();
        self.background.spawn(async move {
            let loaded = store.load().await;
            let _ = events.send(AppEvent::ContentLoaded(loaded));
        });
    }

    /// Apply a background completion.
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::ContentLoaded(loaded) => {
                debug!(found = loaded.is_some(), "Startup load finished");
                self.state.finish_loading(loaded);
                self.content_changed();
            }
            AppEvent::FeedFetched { key, outcome } => {
                if self.feed_key.as_deref() == Some(key.as_str()) {
                    self.rotation.set_outcome(&outcome);
                } else {
                    debug!("Dropping feed result for a replaced key");
                }
            }
            AppEvent::LogosResolved { certs, logos } => {
                if self.logo_certs.as_ref() == Some(&certs) {
                    self.logos = logos;
                }
            }
            AppEvent::CloseOverlay(overlay) => {
                if self.state.overlay() == overlay {
                    self.close_overlay();
                }
            }
        }
    }

    /// Advance animations by `elapsed` and expire the status message.
    pub fn tick(&mut self, elapsed: Duration, now: Instant) {
        self.typewriter.advance(elapsed);
        self.rotation.advance(elapsed);
        self.state.expire_status(now);
    }

    /// Handle one input line.
    pub async fn handle_line(&mut self, line: &str, now: Instant) -> Control {
        if line.contains('\u{1b}') {
            self.route_keys(line, now);
            return Control::Continue;
        }

        match self.state.overlay() {
            Overlay::None => {
                if line.trim().eq_ignore_ascii_case("quit") {
                    return Control::Quit;
                }
                self.route_keys(line, now);
            }
            Overlay::Terminal => self.terminal_input(line, now).await,
            Overlay::AdminGate => self.gate_input(line, now),
            Overlay::Admin => self.admin_input(line, now).await,
        }
        Control::Continue
    }

    /// Draw the current screen.
    #[must_use]
    pub fn render(&self, now: Instant) -> String {
        let theme = self.state.theme();
        match self.state.overlay() {
            Overlay::Terminal => self
                .terminal
                .as_ref()
                .map(|session| view::render_terminal(session, theme))
                .unwrap_or_default(),
            Overlay::AdminGate => view::render_admin_gate(self.admin_gate.remaining(), theme),
            Overlay::Admin => {
                let mut out = self
                    .admin
                    .as_ref()
                    .map(|form| view::render_admin(form, theme))
                    .unwrap_or_default();
                if let Some(status) = self.state.status(now) {
                    out.push_str(&format!("{status}\n"));
                }
                out
            }
            Overlay::None => {
                let about = self.typewriter.display();
                let clock = self.clock.format_time(Utc::now());
                view::render_dashboard(
                    &self.state,
                    &Frame {
                        about: &about,
                        feed: self.rotation.current(),
                        clock: &clock,
                        logos: &self.logos,
                        now,
                    },
                )
            }
        }
    }

    /// Run until input ends or the user quits.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing output fails.
    pub async fn run<R, W>(
        mut self,
        mut rx: mpsc::UnboundedReceiver<AppEvent>,
        input: R,
        out: &mut W,
    ) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        self.start();
        let mut lines = input.lines();
        let mut ticker = tokio::time::interval(self.config.redraw_interval());
        let mut last = Instant::now();

        loop {
            tokio::select! {
                line = lines.next_line() => match line? {
                    Some(line) => {
                        if self.handle_line(&line, Instant::now()).await == Control::Quit {
                            break;
                        }
                    }
                    None => break,
                },
                Some(event) = rx.recv() => self.handle_event(event),
                _ = ticker.tick() => {
                    let now = Instant::now();
                    self.tick(now.saturating_duration_since(last), now);
                    last = now;
                }
            }

            write!(out, "{CLEAR_SCREEN}{}", self.render(Instant::now()))?;
            write!(out, "> ")?;
            out.flush()?;
        }

        info!("Leaving dashboard");
        Ok(())
    }

    fn route_keys(&mut self, line: &str, now: Instant) {
        for key in Key::from_line(line) {
            if let Some(action) = self.router.handle(key, now) {
                self.apply(action, now);
            }
        }
    }

    fn apply(&mut self, action: KeyAction, now: Instant) {
        match (action, self.state.overlay()) {
            (KeyAction::ToggleTerminal, Overlay::None) => self.open_terminal(),
            (KeyAction::ToggleTerminal, Overlay::Terminal) | (KeyAction::CloseOverlay, _) => {
                self.close_overlay();
            }
            (KeyAction::OpenAdminGate, Overlay::None) => {
                if self.admin_gate.is_locked() {
                    self.state
                        .set_status(StatusKind::Failure, "Admin access locked", now);
                } else {
                    self.open_overlay(Overlay::AdminGate);
                }
            }
            _ => {}
        }
    }

    fn open_terminal(&mut self) {
        let gate = AuthGate::new(
            Arc::clone(&self.services.verifier),
            self.config.auth.max_attempts,
        );
        self.terminal = Some(TerminalSession::new(
            gate,
            self.config.terminal.max_transcript_lines,
        ));
        self.open_overlay(Overlay::Terminal);
    }

    fn open_overlay(&mut self, overlay: Overlay) {
        self.overlay_tasks = TaskScope::new("overlay");
        self.state.open(overlay);
    }

    fn close_overlay(&mut self) {
        let closed = self.state.close_overlay();
        debug!(?closed, "Overlay closed");
        self.terminal = None;
        self.admin = None;
        // Replacing the scope aborts the closed overlay's timers
        self.overlay_tasks = TaskScope::new("overlay");
    }

    async fn terminal_input(&mut self, line: &str, now: Instant) {
        let Some(session) = self.terminal.as_mut() else {
            self.close_overlay();
            return;
        };

        if session.is_editing() {
            match line.trim() {
                ":save" => {
                    session.save_edit(&mut self.state, &self.services.store).await;
                    self.content_changed();
                }
                ":cancel" => session.cancel_edit(),
                ":clear" => session.set_buffer(""),
                _ => session.append_buffer(line),
            }
            return;
        }

        if line.trim() == "~" {
            self.route_keys(line, now);
            return;
        }

        let submission = session.submit(line, self.state.content());
        if submission != Submission::Continue {
            self.close_overlay();
        }
    }

    fn gate_input(&mut self, line: &str, now: Instant) {
        if line.trim().is_empty() {
            return;
        }
        match self.admin_gate.attempt(line) {
            AuthAttempt::Granted => {
                self.admin_gate.revoke();
                self.admin = Some(AdminForm::new(self.state.content()));
                self.open_overlay(Overlay::Admin);
            }
            AuthAttempt::Denied { remaining } => {
                self.state.set_status(
                    StatusKind::Failure,
                    format!("Access denied. {remaining} attempts remaining."),
                    now,
                );
            }
            AuthAttempt::LockedOut => {
                warn!("Admin gate locked");
                self.close_overlay();
                self.state.set_status(
                    StatusKind::Failure,
                    "Too many failed attempts. Admin access locked.",
                    now,
                );
            }
        }
    }

    async fn admin_input(&mut self, line: &str, now: Instant) {
        let Some(form) = self.admin.as_mut() else {
            self.close_overlay();
            return;
        };

        let trimmed = line.trim();
        let (command, rest) = trimmed
            .split_once(char::is_whitespace)
            .map_or((trimmed, ""), |(command, rest)| (command, rest.trim_start()));

        let result = match command.to_ascii_lowercase().as_str() {
            "" => Ok(()),
            "set" => match rest.split_once(char::is_whitespace) {
                Some((path, value)) => form.set_field(path, value.trim_start()),
                None => form.set_field(rest, ""),
            },
            "add" => rest.parse::<ListSection>().map(|section| {
                form.add_item(section);
            }),
            "remove" => {
                let mut args = rest.split_whitespace();
                let section = args.next().unwrap_or_default().parse::<ListSection>();
                let index = args.next().and_then(|i| i.parse::<usize>().ok());
                match (section, index) {
                    (Ok(section), Some(index)) => form.remove_item(section, index),
                    (Err(e), _) => Err(e),
                    (Ok(_), None) => Err(crate::Error::invalid_value(
                        "remove",
                        "usage: remove <list> <index>",
                    )),
                }
            }
            "contact" => match rest.split_once(char::is_whitespace) {
                Some((channel, value)) => form.set_contact(channel, value.trim_start()),
                None => form.remove_contact(rest),
            },
            "save" => {
                let report = form
                    .save(&self.services.store, &mut self.state, now)
                    .await;
                self.content_changed();
                if let Some(delay) = report.close_after {
                    let events = self.events.clone();
                    self.overlay_tasks.spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = events.send(AppEvent::CloseOverlay(Overlay::Admin));
                    });
                }
                Ok(())
            }
            "close" => {
                self.close_overlay();
                Ok(())
            }
            other => Err(crate::Error::invalid_value(
                other,
                "unknown admin command",
            )),
        };

        if let Err(e) = result {
            self.state.set_status(StatusKind::Failure, e.to_string(), now);
        }
    }

    /// Bring derived state in line with the current content.
    fn content_changed(&mut self) {
        let content = self.state.content();
        self.typewriter.set_text(&content.about);

        let key = content.api_keys.otx.trim().to_string();
        if self.feed_key.as_deref() != Some(key.as_str()) {
            self.refresh_feed(key);
        }

        let certs = self.state.content().certs.clone();
        if self.logo_certs.as_ref() != Some(&certs) {
            self.refresh_logos(certs);
        }
    }

    fn refresh_feed(&mut self, key: String) {
        self.feed_key = Some(key.clone());
        if key.is_empty() {
            self.rotation.set_outcome(&FeedOutcome::MissingKey);
            return;
        }

        self.rotation.set_placeholder(FETCHING_TEXT);
        let feed = self.services.feed.clone();
        let events = self.events.clone();
        self.background.spawn(async move {
            let outcome = feed.fetch_pulses(&key).await;
            let _ = events.send(AppEvent::FeedFetched { key, outcome });
        });
    }

    fn refresh_logos(&mut self, certs: Vec<Cert>) {
        self.logo_certs = Some(certs.clone());
        let checker = Arc::clone(&self.services.checker);
        let events = self.events.clone();
        self.background.spawn(async move {
            let logos = resolve_logos(&certs, checker.as_ref()).await;
            let _ = events.send(AppEvent::LogosResolved { certs, logos });
        });
    }
}

/// Run a bare terminal session over line input, printing new transcript
/// lines after each command.
///
/// # Errors
///
/// Returns an error if reading input or writing output fails.
pub async fn run_terminal<R, W>(config: &Config, services: &Services, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut state = PresentationState::new(
        services.store.load_or_default().await,
        config.ui.theme,
        config.status_clear(),
    );
    state.finish_loading(None);

    let gate = AuthGate::new(Arc::clone(&services.verifier), config.auth.max_attempts);
    let mut session = TerminalSession::new(gate, config.terminal.max_transcript_lines);
    let mut mark = 0;
    let mut lines = input.lines();

    loop {
        for line in session.lines_since(mark) {
            print_line(out, line.kind, &line.text)?;
        }
        mark = session.lines_pushed();
        if session.is_closed() {
            break;
        }
        write!(out, "{}", if session.is_editing() { "nano> " } else { "$> " })?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        if session.is_editing() {
            match line.trim() {
                ":save" => {
                    session.save_edit(&mut state, &services.store).await;
                }
                ":cancel" => session.cancel_edit(),
                ":clear" => session.set_buffer(""),
                _ => session.append_buffer(&line),
            }
            continue;
        }

        match session.submit(&line, state.content()) {
            Submission::Exit => break,
            // A locked session is flushed and ends at the top of the loop
            Submission::Continue | Submission::Locked => {}
        }
        if let Some(edit) = session.editing() {
            writeln!(out, "Editing {} (:save, :cancel, :clear)", edit.section)?;
            writeln!(out, "{}", edit.text)?;
        }
    }
    Ok(())
}

fn print_line<W: Write>(out: &mut W, kind: LineKind, text: &str) -> std::io::Result<()> {
    match kind {
        LineKind::Input => Ok(()),
        LineKind::Output | LineKind::System => writeln!(out, "{text}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::SAVED_TEXT;
    use crate::auth::hash_secret;
    use crate::feed::MISSING_KEY_TEXT;

    const SECRET: &str = "letmein";

    fn config() -> Config {
        let mut config = Config::default();
        config.auth.secret_hash = hash_secret(SECRET);
        config
    }

    fn app() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let config = config();
        let services = Services::from_config(&config, true).unwrap();
        App::new(config, services)
    }

    async fn loaded_app() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (mut app, mut rx) = app();
        app.start();
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, AppEvent::ContentLoaded(None)));
        app.handle_event(event);
        (app, rx)
    }

    #[tokio::test]
    async fn test_startup_load_finishes() {
        let (app, _rx) = loaded_app().await;
        assert!(!app.state().is_loading());
        assert_eq!(app.rotation.current(), MISSING_KEY_TEXT);
    }

    #[tokio::test]
    async fn test_tilde_toggles_terminal() {
        let (mut app, _rx) = loaded_app().await;
        let now = Instant::now();

        app.handle_line("~", now).await;
        assert_eq!(app.state().overlay(), Overlay::Terminal);
        assert!(app.terminal().is_some());

        app.handle_line("~", now).await;
        assert_eq!(app.state().overlay(), Overlay::None);
        assert!(app.terminal().is_none());
    }

    #[tokio::test]
    async fn test_terminal_exit_and_fresh_session() {
        let (mut app, _rx) = loaded_app().await;
        let now = Instant::now();

        app.handle_line("~", now).await;
        app.handle_line(&format!("auth {SECRET}"), now).await;
        assert!(app.terminal().unwrap().is_authenticated());
        app.handle_line("exit", now).await;
        assert_eq!(app.state().overlay(), Overlay::None);

        app.handle_line("~", now).await;
        assert!(!app.terminal().unwrap().is_authenticated());
    }

    #[tokio::test]
    async fn test_terminal_lockout_closes_overlay() {
        let (mut app, _rx) = loaded_app().await;
        let now = Instant::now();
        app.handle_line("~", now).await;
        for attempt in ["auth a", "auth b", "auth c"] {
            app.handle_line(attempt, now).await;
        }
        assert_eq!(app.state().overlay(), Overlay::None);
    }

    #[tokio::test]
    async fn test_nano_save_updates_typewriter() {
        let (mut app, _rx) = loaded_app().await;
        let now = Instant::now();
        app.handle_line("~", now).await;
        app.handle_line(&format!("auth {SECRET}"), now).await;
        app.handle_line("nano about", now).await;
        app.handle_line(":clear", now).await;
        app.handle_line("New about", now).await;
        app.handle_line(":save", now).await;

        assert_eq!(app.state().content().about, "New about");
        assert_eq!(app.typewriter.text(), "New about");
        assert_eq!(app.typewriter.display(), "");
    }

    #[tokio::test]
    async fn test_admin_sequence_and_escape() {
        let (mut app, _rx) = loaded_app().await;
        let now = Instant::now();

        app.handle_line("/admin", now).await;
        assert_eq!(app.state().overlay(), Overlay::AdminGate);

        app.handle_line("\u{1b}", now).await;
        assert_eq!(app.state().overlay(), Overlay::None);
    }

    #[tokio::test]
    async fn test_admin_gate_locks() {
        let (mut app, _rx) = loaded_app().await;
        let now = Instant::now();
        app.handle_line("/admin", now).await;
        app.handle_line("one", now).await;
        assert_eq!(app.state().overlay(), Overlay::AdminGate);
        assert!(app.state().status(now).unwrap().text.contains("2 attempts"));

        app.handle_line("two", now).await;
        app.handle_line("three", now).await;
        assert_eq!(app.state().overlay(), Overlay::None);

        app.handle_line("/admin", now).await;
        assert_eq!(app.state().overlay(), Overlay::None);
        assert_eq!(app.state().status(now).unwrap().text, "Admin access locked");
    }

    #[tokio::test]
    async fn test_admin_edit_save_and_auto_close() {
        let (mut app, mut rx) = loaded_app().await;
        let now = Instant::now();
        app.handle_line("/admin", now).await;
        app.handle_line(SECRET, now).await;
        assert_eq!(app.state().overlay(), Overlay::Admin);

        app.handle_line("set whoami.status Hunting", now).await;
        app.handle_line("add certs", now).await;
        app.handle_line("contact mastodon @me", now).await;
        assert!(app.admin().unwrap().is_dirty());
        // Nothing reaches the dashboard before save
        assert_ne!(app.state().content().whoami.status, "Hunting");

        app.handle_line("save", now).await;
        let content = app.state().content();
        assert_eq!(content.whoami.status, "Hunting");
        assert_eq!(content.certs.last().unwrap().name, "New Cert");
        assert_eq!(content.contact["mastodon"], "@me");
        assert_eq!(app.state().status(now).unwrap().text, SAVED_TEXT);
        assert_eq!(
            app.services.store.load().await.unwrap().whoami.status,
            "Hunting"
        );

        loop {
            match rx.recv().await.unwrap() {
                AppEvent::CloseOverlay(overlay) => {
                    app.handle_event(AppEvent::CloseOverlay(overlay));
                    break;
                }
                other => app.handle_event(other),
            }
        }
        assert_eq!(app.state().overlay(), Overlay::None);
    }

    #[tokio::test]
    async fn test_blank_gate_input_keeps_attempts() {
        let (mut app, _rx) = loaded_app().await;
        let now = Instant::now();
        app.handle_line("/admin", now).await;
        let remaining = app.admin_gate.remaining();

        app.handle_line("", now).await;
        app.handle_line("   ", now).await;
        assert_eq!(app.admin_gate.remaining(), remaining);
        assert_eq!(app.state().overlay(), Overlay::AdminGate);
        assert!(app.state().status(now).is_none());

        app.handle_line("~", now).await;
        assert_eq!(app.admin_gate.remaining(), remaining - 1);
    }

    #[tokio::test]
    async fn test_escape_cancels_pending_auto_close() {
        let (mut app, mut rx) = loaded_app().await;
        let now = Instant::now();
        app.handle_line("/admin", now).await;
        app.handle_line(SECRET, now).await;
        app.handle_line("set whoami.status Hunting", now).await;
        app.handle_line("save", now).await;

        app.handle_line("\u{1b}", now).await;
        assert_eq!(app.state().overlay(), Overlay::None);
        app.handle_line("/admin", now).await;
        app.handle_line(SECRET, now).await;
        assert_eq!(app.state().overlay(), Overlay::Admin);

        let wait = crate::admin::CLOSE_AFTER_SAVE + Duration::from_millis(300);
        let _ = tokio::time::timeout(wait, async {
            while let Some(event) = rx.recv().await {
                app.handle_event(event);
            }
        })
        .await;
        assert_eq!(app.state().overlay(), Overlay::Admin);
    }

    #[tokio::test]
    async fn test_admin_errors_become_status() {
        let (mut app, _rx) = loaded_app().await;
        let now = Instant::now();
        app.handle_line("/admin", now).await;
        app.handle_line(SECRET, now).await;

        app.handle_line("set skills.0.level lots", now).await;
        assert_eq!(app.state().status(now).unwrap().kind, StatusKind::Failure);
        app.handle_line("remove projects 99", now).await;
        assert!(app.state().status(now).unwrap().text.contains("out of range"));
        assert_eq!(app.state().overlay(), Overlay::Admin);
    }

    #[tokio::test]
    async fn test_feed_result_for_old_key_is_dropped() {
        let (mut app, _rx) = loaded_app().await;
        app.handle_event(AppEvent::FeedFetched {
            key: "stale".to_string(),
            outcome: FeedOutcome::fallback(),
        });
        assert_eq!(app.rotation.current(), MISSING_KEY_TEXT);
    }

    #[tokio::test]
    async fn test_api_key_change_fetches_feed() {
        let (mut app, mut rx) = loaded_app().await;
        let now = Instant::now();
        app.handle_line("/admin", now).await;
        app.handle_line(SECRET, now).await;
        app.handle_line("set apiKeys.otx k-123", now).await;
        app.handle_line("save", now).await;
        assert_eq!(app.rotation.current(), FETCHING_TEXT);

        loop {
            match rx.recv().await.unwrap() {
                event @ AppEvent::FeedFetched { .. } => {
                    app.handle_event(event);
                    break;
                }
                other => app.handle_event(other),
            }
        }
        // Offline transport always falls back to demo pulses
        assert!(app.rotation.current().starts_with("[DEMO]"));
    }

    #[tokio::test]
    async fn test_tick_advances_typewriter() {
        let (mut app, _rx) = loaded_app().await;
        app.tick(Duration::from_millis(60), Instant::now());
        assert_eq!(app.typewriter.display().chars().count(), 3);
    }

    #[tokio::test]
    async fn test_quit_from_dashboard() {
        let (mut app, _rx) = loaded_app().await;
        assert_eq!(app.handle_line("quit", Instant::now()).await, Control::Quit);
    }

    #[tokio::test]
    async fn test_render_by_overlay() {
        let (mut app, _rx) = loaded_app().await;
        let now = Instant::now();
        assert!(app.render(now).contains("Press '~' to access CLI"));

        app.handle_line("~", now).await;
        assert!(app.render(now).contains("Terminal active"));
    }

    #[tokio::test]
    async fn test_run_terminal_over_lines() {
        let config = config();
        let services = Services::from_config(&config, true).unwrap();
        let input = format!("whoami\nauth {SECRET}\nnano resumeurl\n:clear\n/cv.pdf\n:save\nexit\n");
        let mut out = Vec::new();

        run_terminal(&config, &services, input.as_bytes(), &mut out)
            .await
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Terminal active"));
        assert!(out.contains("Access granted."));
        assert!(out.contains("Saved changes to resumeUrl."));
        assert_eq!(services.store.load().await.unwrap().resume_url, "/cv.pdf");
    }
}
