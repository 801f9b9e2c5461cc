//! `cyberfolio` - A cybersecurity portfolio for the terminal
//!
//! This library provides the content model and its stores, the threat feed,
//! the command terminal, the admin editor, and the interactive dashboard that
//! ties them together.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod admin;
pub mod app;
pub mod auth;
pub mod cli;
pub mod clock;
pub mod config;
pub mod content;
pub mod error;
pub mod feed;
pub mod keys;
pub mod logging;
pub mod logo;
pub mod presentation;
pub mod store;
pub mod tasks;
pub mod terminal;
pub mod typewriter;
pub mod view;

pub use app::{App, Services};
pub use config::Config;
pub use content::ContentDocument;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use store::ContentStore;
