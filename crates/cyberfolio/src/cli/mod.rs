//! Command-line interface for cyberfolio.
//!
//! This module provides the CLI structure for the `folio` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AdminAction, AdminCommand, ConfigCommand, FeedCommand, ListArg, LiveCommand, ShowCommand,
    ThemeArg, ADMIN_PASSWORD_ENV,
};

/// folio - A cybersecurity portfolio in your terminal
///
/// Shows the portfolio dashboard with a live threat feed, a command
/// terminal, and a password-gated content editor.
#[derive(Debug, Parser)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use an in-memory store and demo feed; no network access
    #[arg(long, global = true)]
    pub offline: bool,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the portfolio once
    Show(ShowCommand),

    /// Run the interactive dashboard
    Live(LiveCommand),

    /// Run the command terminal on its own
    Terminal,

    /// Fetch and print threat pulses
    Feed(FeedCommand),

    /// Edit content (password required)
    Admin(AdminCommand),

    /// Print the BLAKE3 hash of a secret for `auth.secret_hash`
    HashSecret {
        /// The secret to hash
        secret: String,
    },

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
