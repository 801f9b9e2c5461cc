//! `folio` - CLI for cyberfolio
//!
//! This binary runs the portfolio dashboard and provides scripted access to
//! the content store, the threat feed, and configuration.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use chrono::Utc;
use clap::Parser;
use tokio::io::BufReader;
use tracing::{debug, warn};

use cyberfolio::admin::AdminForm;
use cyberfolio::app::{run_terminal, App, Services};
use cyberfolio::auth::{hash_secret, AuthAttempt, AuthGate};
use cyberfolio::cli::{AdminAction, AdminCommand, Cli, Command, ConfigCommand};
use cyberfolio::clock::Clock;
use cyberfolio::content::{ContentDocument, ListSection, Section};
use cyberfolio::feed::{FeedOutcome, FeedRotation};
use cyberfolio::logging::init_file_logging;
use cyberfolio::logo::resolve_logos;
use cyberfolio::presentation::PresentationState;
use cyberfolio::view::{render_admin, render_dashboard, Frame};
use cyberfolio::{init_logging, Config};

const REDACTED: &str = "********";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    match &cli.log_file {
        Some(path) => init_file_logging(cli.verbosity(), path)
            .with_context(|| format!("opening log file {}", path.display()))?,
        None => init_logging(cli.verbosity()),
    }

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;
    if config.uses_default_secret() {
        warn!("auth.secret_hash is the built-in default; set your own with `folio hash-secret`");
    }

    match cli.command {
        Command::Show(cmd) => {
            let services = Services::from_config(&config, cli.offline)?;
            handle_show(&config, &services, cmd.section.as_deref(), cmd.json).await
        }
        Command::Live(cmd) => {
            let mut config = config;
            if let Some(theme) = cmd.theme {
                config.ui.theme = theme.into();
            }
            let services = Services::from_config(&config, cli.offline)?;
            let (app, rx) = App::new(config, services);
            let input = BufReader::new(tokio::io::stdin());
            app.run(rx, input, &mut std::io::stdout()).await?;
            Ok(())
        }
        Command::Terminal => {
            let services = Services::from_config(&config, cli.offline)?;
            let input = BufReader::new(tokio::io::stdin());
            run_terminal(&config, &services, input, &mut std::io::stdout()).await?;
            Ok(())
        }
        Command::Feed(cmd) => {
            let services = Services::from_config(&config, cli.offline)?;
            handle_feed(&services, cmd.key).await
        }
        Command::Admin(cmd) => {
            let services = Services::from_config(&config, cli.offline)?;
            handle_admin(&config, &services, cmd).await
        }
        Command::HashSecret { secret } => {
            println!("{}", hash_secret(&secret));
            Ok(())
        }
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

async fn handle_show(
    config: &Config,
    services: &Services,
    section: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let content = redacted(services.store.load_or_default().await);

    if let Some(name) = section {
        let section: Section = name.parse()?;
        if let (false, Some(text)) = (json, content.text_section(section)) {
            println!("{text}");
        } else {
            let value = content.section_value(section)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&content)?);
        return Ok(());
    }

    let mut state = PresentationState::new(content, config.ui.theme, config.status_clear());
    state.finish_loading(None);
    let rotation = FeedRotation::new(config.rotation_interval());
    let clock = Clock::from_config(&config.ui).format_date_time(Utc::now());
    let logos = resolve_logos(&state.content().certs, services.checker.as_ref()).await;
    let frame = Frame {
        about: &state.content().about,
        feed: rotation.current(),
        clock: &clock,
        logos: &logos,
        now: Instant::now(),
    };
    print!("{}", render_dashboard(&state, &frame));
    if let Some(stamp) = services.store.last_updated().await {
        println!("Last updated: {}", Clock::from_config(&config.ui).format_date_time(stamp));
    }
    Ok(())
}

async fn handle_feed(services: &Services, key: Option<String>) -> anyhow::Result<()> {
    let key = match key {
        Some(key) => key,
        None => services.store.load_or_default().await.api_keys.otx,
    };

    let outcome = services.feed.fetch_pulses(key.trim()).await;
    debug!(live = outcome.is_live(), "Feed fetched");
    if let FeedOutcome::Fallback(_) = outcome {
        eprintln!("Threat feed unavailable, showing demo pulses.");
    }
    match outcome.placeholder() {
        Some(text) => println!("{text}"),
        None => {
            for pulse in outcome.pulses() {
                println!("> {pulse}");
            }
        }
    }
    Ok(())
}

async fn handle_admin(
    config: &Config,
    services: &Services,
    cmd: AdminCommand,
) -> anyhow::Result<()> {
    let Some(password) = cmd.password else {
        bail!(
            "admin password required (--password or {})",
            cyberfolio::cli::ADMIN_PASSWORD_ENV
        );
    };
    let mut gate = AuthGate::new(Arc::clone(&services.verifier), config.auth.max_attempts);
    if gate.attempt(&password) != AuthAttempt::Granted {
        bail!("Access denied.");
    }

    let content = services.store.load_or_default().await;
    let mut form = AdminForm::new(&content);
    match cmd.action {
        AdminAction::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(form.draft())?);
            } else {
                print!("{}", render_admin(&form, config.ui.theme));
            }
            return Ok(());
        }
        AdminAction::Set { path, value } => form.set_field(&path, &value)?,
        AdminAction::Add { list } => {
            let section = ListSection::from(list);
            let index = form.add_item(section);
            println!("Added {section} item at index {index}.");
        }
        AdminAction::Remove { list, index } => form.remove_item(list.into(), index)?,
        AdminAction::ContactSet { channel, value } => form.set_contact(&channel, &value)?,
        AdminAction::ContactRemove { channel } => form.remove_contact(&channel)?,
    }

    let mut state = PresentationState::new(content, config.ui.theme, Duration::ZERO);
    let report = form.save(&services.store, &mut state, Instant::now()).await;
    if !report.persisted {
        bail!(report.message);
    }
    println!("{}", report.message);
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Store]");
                println!("  Backend:            {:?}", config.store.backend);
                println!("  Database path:      {}", config.store.database_path().display());
                println!("  Base URL:           {}", config.store.base_url);
                println!(
                    "  Document:           {}/{}",
                    config.store.collection, config.store.key
                );
                println!();
                println!("[Feed]");
                println!("  Endpoint:           {}", config.feed.endpoint);
                println!("  Rotation (secs):    {}", config.feed.rotation_interval_secs);
                println!();
                println!("[Auth]");
                println!("  Default secret:     {}", config.uses_default_secret());
                println!("  Max attempts:       {}", config.auth.max_attempts);
                println!();
                println!("[UI]");
                println!("  Theme:              {:?}", config.ui.theme);
                println!("  Time zone:          {}", config.ui.timezone_label);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

/// Hide API keys from unauthenticated output.
fn redacted(mut content: ContentDocument) -> ContentDocument {
    if !content.api_keys.otx.is_empty() {
        content.api_keys.otx = REDACTED.to_string();
    }
    content
}
