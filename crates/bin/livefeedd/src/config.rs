//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `livefeed.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use livefeed_adapter_http_axum::state::AnonymousWriters;
use livefeed_domain::error::ValidationError;
use livefeed_domain::feed::{CHAT_WINDOW, COINFLIPS_WINDOW, FeedSpec, chat, coinflip};

/// Top-level configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Feed store settings.
    pub store: StoreConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Writer identity settings.
    pub identity: IdentityConfig,
    /// Window of each known feed.
    pub feeds: Vec<FeedConfig>,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Which log store backs the feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-memory path tree, lost on restart.
    #[default]
    Realtime,
    /// `SQLite` document collection.
    Document,
}

impl StoreBackend {
    fn as_str(self) -> &'static str {
        match self {
            Self::Realtime => "realtime",
            Self::Document => "document",
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "realtime" => Ok(Self::Realtime),
            "document" => Ok(Self::Document),
            other => Err(ConfigError::Validation(format!(
                "unknown store backend {other:?}"
            ))),
        }
    }
}

/// Log store configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// `SQLite` connection URL, used by the `document` backend.
    pub url: String,
    /// Records buffered per feed before a slow listener lags.
    pub hub_capacity: usize,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Writer identity configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// What happens to writes that carry no `x-author-id` header.
    pub anonymous: AnonymousWriters,
}

fn parse_anonymous(value: &str) -> Result<AnonymousWriters, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "reject" => Ok(AnonymousWriters::Reject),
        "session" => Ok(AnonymousWriters::Session),
        other => Err(ConfigError::Validation(format!(
            "unknown anonymous writer policy {other:?}"
        ))),
    }
}

/// One `[[feeds]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub path: String,
    pub window: usize,
}

impl Config {
    /// Load configuration from `livefeed.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("livefeed.toml")?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("LIVEFEED_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("LIVEFEED_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("LIVEFEED_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Ok(val) = std::env::var("LIVEFEED_STORE") {
            self.store.backend = val.parse()?;
        }
        if let Ok(val) = std::env::var("LIVEFEED_DATABASE_URL") {
            self.store.url = val;
        }
        if let Ok(val) = std::env::var("LIVEFEED_ANONYMOUS") {
            self.identity.anonymous = parse_anonymous(&val)?;
        }
        if let Ok(val) = std::env::var("LIVEFEED_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.store.hub_capacity == 0 {
            return Err(ConfigError::Validation(
                "hub capacity must be non-zero".to_string(),
            ));
        }
        self.feed_specs()?;
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Validated feed paths and windows.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Feed`] for an invalid path or a zero window.
    pub fn feed_specs(&self) -> Result<Vec<FeedSpec>, ConfigError> {
        self.feeds
            .iter()
            .map(|feed| FeedSpec::new(feed.path.clone(), feed.window).map_err(ConfigError::from))
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            store: StoreConfig::default(),
            logging: LoggingConfig::default(),
            identity: IdentityConfig::default(),
            feeds: vec![
                FeedConfig {
                    path: chat::PATH.to_string(),
                    window: CHAT_WINDOW,
                },
                FeedConfig {
                    path: coinflip::PATH.to_string(),
                    window: COINFLIPS_WINDOW,
                },
            ],
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: "sqlite:livefeed.db?mode=rwc".to_string(),
            hub_capacity: 256,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "livefeedd=info,livefeed=info,tower_http=debug".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Invalid `[[feeds]]` entry.
    #[error("invalid feed configuration")]
    Feed(#[from] ValidationError),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
