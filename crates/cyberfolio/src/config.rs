//! Configuration management for cyberfolio.
//!
//! Configuration is loaded with figment from defaults, a TOML file, and
//! environment variables.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "cyberfolio";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "content.db";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "CYBERFOLIO_";

/// Default collection holding the content document.
pub const DEFAULT_COLLECTION: &str = "portfolio";

/// Default key of the content document.
pub const DEFAULT_KEY: &str = "content";

/// Secret accepted when no `auth.secret_hash` is configured.
pub const DEFAULT_SECRET: &str = "cyberfolio";

/// Default threat feed endpoint.
pub const DEFAULT_FEED_ENDPOINT: &str = "https://otx.alienvault.com/api/v1/pulses/subscribed";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `CYBERFOLIO_`, sections split on `__`)
/// 2. TOML config file at `~/.config/cyberfolio/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Content store configuration.
    pub store: StoreConfig,
    /// Threat feed configuration.
    pub feed: FeedConfig,
    /// Admin/terminal authentication.
    pub auth: AuthConfig,
    /// About-text animation timing.
    pub typewriter: TypewriterConfig,
    /// Terminal overlay limits.
    pub terminal: TerminalConfig,
    /// Keyboard shortcuts.
    pub keys: KeysConfig,
    /// Presentation settings.
    pub ui: UiConfig,
}

/// Which document store backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Local `SQLite` database.
    #[default]
    Sqlite,
    /// Hosted JSON document API.
    Http,
    /// Process memory only.
    Memory,
}

/// Content store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend kind.
    pub backend: StoreBackend,
    /// Path to the database file for the `sqlite` backend.
    /// Defaults to `~/.local/share/cyberfolio/content.db`
    pub database_path: Option<PathBuf>,
    /// Base URL for the `http` backend.
    pub base_url: String,
    /// Collection holding the document.
    pub collection: String,
    /// Key of the document.
    pub key: String,
    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
}

/// Threat feed configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Pulses endpoint.
    pub endpoint: String,
    /// Seconds between pulse rotations.
    pub rotation_interval_secs: u64,
    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
}

/// Authentication configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// BLAKE3 hex digest of the admin secret.
    pub secret_hash: String,
    /// Failed attempts allowed before lockout.
    pub max_attempts: u32,
}

/// Typewriter timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypewriterConfig {
    /// Milliseconds per typed character.
    pub type_speed_ms: u64,
    /// Milliseconds per erased character.
    pub erase_speed_ms: u64,
    /// Milliseconds to hold the full text before erasing.
    pub hold_delay_ms: u64,
}

/// Terminal overlay configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Transcript lines kept before the oldest are dropped.
    pub max_transcript_lines: usize,
}

/// Keyboard shortcut configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeysConfig {
    /// Typed sequence that opens the admin gate.
    pub admin_sequence: String,
    /// Inactivity in milliseconds after which the typed buffer resets.
    pub reset_ms: u64,
}

/// Color theme for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Cyan on dark.
    #[default]
    Dark,
    /// Blue on light.
    Light,
    /// No colors.
    Mono,
}

/// Presentation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Color theme.
    pub theme: Theme,
    /// Milliseconds a save status message stays visible.
    pub status_clear_ms: u64,
    /// Offset from UTC, in minutes, for the footer clock (IST is 330).
    pub utc_offset_minutes: i32,
    /// Label printed after the footer clock.
    pub timezone_label: String,
    /// Milliseconds between dashboard redraws in live mode.
    pub redraw_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sqlite,
            database_path: None, // Resolved at runtime
            base_url: String::new(),
            collection: DEFAULT_COLLECTION.to_string(),
            key: DEFAULT_KEY.to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_FEED_ENDPOINT.to_string(),
            rotation_interval_secs: 7,
            timeout_secs: 10,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_hash: crate::auth::hash_secret(DEFAULT_SECRET),
            max_attempts: 3,
        }
    }
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            type_speed_ms: 20,
            erase_speed_ms: 10,
            hold_delay_ms: 3000,
        }
    }
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            max_transcript_lines: 500,
        }
    }
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            admin_sequence: "/admin".to_string(),
            reset_ms: 1500,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            status_clear_ms: 3000,
            utc_offset_minutes: 330,
            timezone_label: "IST".to_string(),
            redraw_ms: 100,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.store.backend == StoreBackend::Http && self.store.base_url.trim().is_empty() {
            return Err(validation("store.base_url is required for the http backend"));
        }
        if self.store.collection.is_empty() || self.store.key.is_empty() {
            return Err(validation("store.collection and store.key must not be empty"));
        }

        if self.feed.rotation_interval_secs == 0 {
            return Err(validation(
                "feed.rotation_interval_secs must be greater than 0",
            ));
        }

        if blake3::Hash::from_hex(self.auth.secret_hash.trim()).is_err() {
            return Err(validation(
                "auth.secret_hash must be a 64-character BLAKE3 hex digest",
            ));
        }
        if self.auth.max_attempts == 0 {
            return Err(validation("auth.max_attempts must be greater than 0"));
        }

        if self.typewriter.type_speed_ms == 0 || self.typewriter.erase_speed_ms == 0 {
            return Err(validation("typewriter speeds must be greater than 0"));
        }

        if self.keys.admin_sequence.is_empty() {
            return Err(validation("keys.admin_sequence must not be empty"));
        }

        if self.ui.redraw_ms == 0 {
            return Err(validation("ui.redraw_ms must be greater than 0"));
        }

        Ok(())
    }

    /// Whether the admin secret is still the built-in default.
    #[must_use]
    pub fn uses_default_secret(&self) -> bool {
        self.auth.secret_hash == crate::auth::hash_secret(DEFAULT_SECRET)
    }

    /// Feed rotation interval.
    #[must_use]
    pub fn rotation_interval(&self) -> Duration {
        Duration::from_secs(self.feed.rotation_interval_secs)
    }

    /// Feed request timeout.
    #[must_use]
    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed.timeout_secs)
    }

    /// How long a status message stays visible.
    #[must_use]
    pub fn status_clear(&self) -> Duration {
        Duration::from_millis(self.ui.status_clear_ms)
    }

    /// Inactivity window of the typed key buffer.
    #[must_use]
    pub fn key_reset(&self) -> Duration {
        Duration::from_millis(self.keys.reset_ms)
    }

    /// Dashboard redraw period.
    #[must_use]
    pub fn redraw_interval(&self) -> Duration {
        Duration::from_millis(self.ui.redraw_ms)
    }
}

impl StoreConfig {
    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| Config::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// HTTP timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl TypewriterConfig {
    /// Per-character typing delay.
    #[must_use]
    pub fn type_speed(&self) -> Duration {
        Duration::from_millis(self.type_speed_ms)
    }

    /// Per-character erasing delay.
    #[must_use]
    pub fn erase_speed(&self) -> Duration {
        Duration::from_millis(self.erase_speed_ms)
    }

    /// Hold before erasing.
    #[must_use]
    pub fn hold_delay(&self) -> Duration {
        Duration::from_millis(self.hold_delay_ms)
    }
}

fn validation(message: &str) -> Error {
    Error::ConfigValidation {
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert_eq!(config.store.collection, "portfolio");
        assert_eq!(config.store.key, "content");
        assert_eq!(config.feed.rotation_interval_secs, 7);
        assert_eq!(config.auth.max_attempts, 3);
        assert_eq!(config.keys.admin_sequence, "/admin");
        assert_eq!(config.keys.reset_ms, 1500);
        assert_eq!(config.ui.theme, Theme::Dark);
    }

    #[test]
    fn test_default_typewriter_timing() {
        let tw = TypewriterConfig::default();
        assert_eq!(tw.type_speed(), Duration::from_millis(20));
        assert_eq!(tw.erase_speed(), Duration::from_millis(10));
        assert_eq!(tw.hold_delay(), Duration::from_millis(3000));
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_http_needs_base_url() {
        let mut config = Config::default();
        config.store.backend = StoreBackend::Http;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("base_url"));

        config.store.base_url = "https://db.example".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_rotation_interval() {
        let mut config = Config::default();
        config.feed.rotation_interval_secs = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("rotation_interval_secs"));
    }

    #[test]
    fn test_validate_bad_secret_hash() {
        let mut config = Config::default();
        config.auth.secret_hash = "plaintext-password".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("secret_hash"));
    }

    #[test]
    fn test_validate_zero_attempts() {
        let mut config = Config::default();
        config.auth.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_typewriter_speed() {
        let mut config = Config::default();
        config.typewriter.erase_speed_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_uses_default_secret() {
        let mut config = Config::default();
        assert!(config.uses_default_secret());

        config.auth.secret_hash = crate::auth::hash_secret("something else");
        assert!(!config.uses_default_secret());
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        let path = config.store.database_path();
        assert!(path.to_string_lossy().contains("content.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.store.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.store.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_durations() {
        let config = Config::default();
        assert_eq!(config.rotation_interval(), Duration::from_secs(7));
        assert_eq!(config.status_clear(), Duration::from_secs(3));
        assert_eq!(config.key_reset(), Duration::from_millis(1500));
        assert_eq!(config.store.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("cyberfolio"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config.feed, FeedConfig::default());
        assert_eq!(config.typewriter, TypewriterConfig::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[feed]\nrotation_interval_secs = 12\n\n[ui]\ntheme = \"mono\"\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.feed.rotation_interval_secs, 12);
        assert_eq!(config.ui.theme, Theme::Mono);
        assert_eq!(config.store, StoreConfig::default());
    }

    #[test]
    fn test_theme_deserialize() {
        let ui: UiConfig = serde_json::from_str(r#"{"theme": "light"}"#).unwrap();
        assert_eq!(ui.theme, Theme::Light);
        assert_eq!(ui.status_clear_ms, 3000);
    }

    #[test]
    fn test_store_config_serialize() {
        let json = serde_json::to_string(&StoreConfig::default()).unwrap();
        assert!(json.contains("\"backend\":\"sqlite\""));
    }
}
