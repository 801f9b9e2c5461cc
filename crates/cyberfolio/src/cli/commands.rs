//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::config::Theme;
use crate::content::ListSection;

/// Environment variable holding the admin password.
pub const ADMIN_PASSWORD_ENV: &str = "CYBERFOLIO_ADMIN_PASSWORD";

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Print a single section (e.g. `skills`, `whoami`)
    pub section: Option<String>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Live dashboard arguments.
#[derive(Debug, Args)]
pub struct LiveCommand {
    /// Override the configured color theme
    #[arg(short, long, value_enum)]
    pub theme: Option<ThemeArg>,
}

/// Threat feed arguments.
#[derive(Debug, Args)]
pub struct FeedCommand {
    /// OTX API key; defaults to the one stored in the content
    #[arg(short, long)]
    pub key: Option<String>,
}

/// Admin command arguments.
#[derive(Debug, Args)]
pub struct AdminCommand {
    /// Admin password
    #[arg(short, long, env = ADMIN_PASSWORD_ENV, hide_env_values = true)]
    pub password: Option<String>,

    /// The admin action
    #[command(subcommand)]
    pub action: AdminAction,
}

/// Content editing actions.
#[derive(Debug, Subcommand)]
pub enum AdminAction {
    /// Print the full content document
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Set a field by dotted path (e.g. `skills.0.level 90`)
    Set {
        /// Field path
        path: String,
        /// New value; empty clears optional fields
        #[arg(default_value = "")]
        value: String,
    },

    /// Append a default record to a list
    Add {
        /// Target list
        #[arg(value_enum)]
        list: ListArg,
    },

    /// Remove a record from a list
    Remove {
        /// Target list
        #[arg(value_enum)]
        list: ListArg,
        /// Zero-based position
        index: usize,
    },

    /// Add or change a contact channel
    ContactSet {
        /// Channel name (e.g. `email`)
        channel: String,
        /// Channel value
        value: String,
    },

    /// Remove a contact channel
    ContactRemove {
        /// Channel name
        channel: String,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// List section argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListArg {
    /// Technical skills
    Skills,
    /// Soft skills
    SoftSkills,
    /// Projects
    Projects,
    /// Certifications
    Certs,
}

impl From<ListArg> for ListSection {
    fn from(arg: ListArg) -> Self {
        match arg {
            ListArg::Skills => Self::Skills,
            ListArg::SoftSkills => Self::SoftSkills,
            ListArg::Projects => Self::Projects,
            ListArg::Certs => Self::Certs,
        }
    }
}

/// Theme argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeArg {
    /// Cyan on dark
    Dark,
    /// Blue on light
    Light,
    /// No colors
    Mono,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Dark => Self::Dark,
            ThemeArg::Light => Self::Light,
            ThemeArg::Mono => Self::Mono,
        }
    }
}
