//! Text rendering of the dashboard and the overlays.

use std::fmt::Write as _;
use std::time::Instant;

use crate::admin::AdminForm;
use crate::config::Theme;
use crate::content::Skill;
use crate::presentation::{PresentationState, StatusKind};
use crate::terminal::{LineKind, TerminalSession};

const BAR_WIDTH: usize = 20;

/// Per-frame values that do not live in [`PresentationState`].
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Typewriter output for the about card.
    pub about: &'a str,
    /// Current threat feed line.
    pub feed: &'a str,
    /// Formatted footer clock.
    pub clock: &'a str,
    /// Resolved logo per certificate; may be shorter than the cert list.
    pub logos: &'a [String],
    /// Render time, for status expiry.
    pub now: Instant,
}

#[derive(Debug, Clone, Copy)]
struct Palette {
    accent: &'static str,
    muted: &'static str,
    good: &'static str,
    bad: &'static str,
    reset: &'static str,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                accent: "\x1b[36m",
                muted: "\x1b[90m",
                good: "\x1b[32m",
                bad: "\x1b[31m",
                reset: "\x1b[0m",
            },
            Theme::Light => Self {
                accent: "\x1b[34m",
                muted: "\x1b[37m",
                good: "\x1b[32m",
                bad: "\x1b[31m",
                reset: "\x1b[0m",
            },
            Theme::Mono => Self {
                accent: "",
                muted: "",
                good: "",
                bad: "",
                reset: "",
            },
        }
    }

    fn heading(&self, out: &mut String, title: &str) {
        let _ = writeln!(out, "\n{}── {} ──{}", self.accent, title, self.reset);
    }
}

/// Draw the main dashboard.
#[must_use]
pub fn render_dashboard(state: &PresentationState, frame: &Frame<'_>) -> String {
    let p = Palette::for_theme(state.theme());
    let content = state.content();
    let mut out = String::new();

    if state.is_loading() {
        let _ = writeln!(out, "{}Loading content...{}", p.muted, p.reset);
    }

    let _ = writeln!(
        out,
        "{}// {} // {}{}",
        p.accent, content.whoami.name, content.whoami.handle, p.reset
    );
    let _ = writeln!(out, "{}_", frame.about);

    p.heading(&mut out, "Projects");
    for project in &content.projects {
        let demo = project
            .demo_type
            .as_deref()
            .filter(|_| project.has_demo)
            .map(|kind| format!(" [demo: {kind}]"))
            .unwrap_or_default();
        let _ = writeln!(out, "  {} {}({}){}{demo}", project.name, p.muted, project.year, p.reset);
        let _ = writeln!(out, "    {}", project.description);
    }

    p.heading(&mut out, "Certifications");
    for (i, cert) in content.certs.iter().enumerate() {
        let _ = writeln!(out, "  {} {}| {}{}", cert.name, p.muted, cert.issuer, p.reset);
        if let Some(logo) = frame.logos.get(i) {
            let _ = writeln!(out, "    logo:   {logo}");
        }
        if !cert.verify_url.is_empty() {
            let _ = writeln!(out, "    verify: {}", cert.verify_url);
        }
    }

    p.heading(&mut out, "Skill Matrix");
    for skill in &content.skills {
        out.push_str(&skill_bar(skill, &p));
    }

    p.heading(&mut out, "Soft Skills");
    for skill in &content.soft_skills {
        out.push_str(&skill_bar(skill, &p));
    }

    p.heading(&mut out, "Resume");
    let _ = writeln!(out, "  Download: {}", content.resume_url);

    p.heading(&mut out, "Contact & Comms");
    for (channel, value) in &content.contact {
        let _ = writeln!(
            out,
            "  {}{:<10}{} {}",
            p.accent,
            channel.to_uppercase(),
            p.reset,
            value.trim_start_matches("https://")
        );
    }

    p.heading(&mut out, "Threat Feed");
    let _ = writeln!(out, "  > {}", frame.feed);

    let _ = writeln!(out, "\n{}Press '~' to access CLI{}", p.muted, p.reset);
    let mut footer = format!("STATUS: {}", content.whoami.status);
    if let Some(status) = state.status(frame.now) {
        let color = match status.kind {
            StatusKind::Pending => p.muted,
            StatusKind::Success => p.good,
            StatusKind::Failure => p.bad,
        };
        let _ = write!(footer, " | {color}{status}{}", p.reset);
    }
    let _ = writeln!(out, "{footer} | {}", frame.clock);
    out
}

/// Draw the terminal overlay, or the editor when `nano` is active.
#[must_use]
pub fn render_terminal(session: &TerminalSession, theme: Theme) -> String {
    let p = Palette::for_theme(theme);
    let mut out = String::new();

    if let Some(edit) = session.editing() {
        let _ = writeln!(out, "{}Nano 2.0 - Editing: {}{}", p.accent, edit.section, p.reset);
        let _ = writeln!(out, "{}", edit.text);
        let _ = writeln!(
            out,
            "{}:save  :cancel  :clear  (other lines are appended){}",
            p.muted, p.reset
        );
        return out;
    }

    for line in session.transcript() {
        match line.kind {
            LineKind::Input => {
                let _ = writeln!(out, "{}$>{} {}", p.accent, p.reset, line.text);
            }
            LineKind::Output => {
                let _ = writeln!(out, "{}{}{}", p.good, line.text, p.reset);
            }
            LineKind::System => {
                let _ = writeln!(out, "{}{}{}", p.muted, line.text, p.reset);
            }
        }
    }
    out
}

/// Draw the admin password prompt.
#[must_use]
pub fn render_admin_gate(remaining: u32, theme: Theme) -> String {
    let p = Palette::for_theme(theme);
    format!(
        "{}// ADMIN ACCESS{}\nPassword ({remaining} attempts left):\n",
        p.bad, p.reset
    )
}

/// Draw the admin form: the draft plus the command reference.
#[must_use]
pub fn render_admin(form: &AdminForm, theme: Theme) -> String {
    let p = Palette::for_theme(theme);
    let mut out = String::new();
    let _ = writeln!(out, "{}// ADMIN PANEL{}", p.bad, p.reset);
    match serde_json::to_string_pretty(form.draft()) {
        Ok(json) => {
            let _ = writeln!(out, "{json}");
        }
        Err(e) => {
            let _ = writeln!(out, "{}{e}{}", p.bad, p.reset);
        }
    }
    let dirty = if form.is_dirty() { " (unsaved changes)" } else { "" };
    let _ = writeln!(
        out,
        "{}set <path> <value> | add <list> | remove <list> <index> | contact <channel> [value] | save | close{dirty}{}",
        p.muted, p.reset
    );
    out
}

fn skill_bar(skill: &Skill, p: &Palette) -> String {
    let filled = usize::from(skill.level.min(100)) * BAR_WIDTH / 100;
    format!(
        "  {:<28} {}{}{}{}{} {:>3}%\n",
        skill.name,
        p.accent,
        "█".repeat(filled),
        p.muted,
        "░".repeat(BAR_WIDTH - filled),
        p.reset,
        skill.level
    )
}
