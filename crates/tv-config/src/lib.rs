//! # tv-config
//!
//! Layered settings for the threadview server: built-in defaults, then an
//! optional `threadview.toml`, then `THREADVIEW_*` environment variables
//! (nested keys joined with `__`, e.g. `THREADVIEW_DATABASE__URL`).

use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

pub const ENV_PREFIX: &str = "THREADVIEW";
pub const CONFIG_FILE: &str = "threadview";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub search: SearchSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// May carry credentials, so it never shows up in `Debug` output.
    pub url: SecretString,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl DatabaseSettings {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    /// Used when a request does not name a page size.
    pub default_page_size: i64,
    pub max_page_size: i64,
    pub preview_chars: usize,
}

impl Settings {
    /// Loads defaults, `threadview.toml` and the environment. A `.env` file
    /// must already have been applied to the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Self::defaults()?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        Self::from_config(builder.build()?)
    }

    /// Defaults overlaid with a TOML document.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config = Self::defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Self::from_config(config)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.url", "sqlite:threadview.db")?
            .set_default("database.max_connections", 5)?
            .set_default("database.acquire_timeout_secs", 5)?
            .set_default("search.default_page_size", 50)?
            .set_default("search.max_page_size", 500)?
            .set_default("search.preview_chars", 100)?)
    }

    fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "database.max_connections",
                reason: "must be at least 1".into(),
            });
        }
        if self.search.max_page_size < 1 {
            return Err(ConfigError::Invalid {
                key: "search.max_page_size",
                reason: "must be at least 1".into(),
            });
        }
        if !(1..=self.search.max_page_size).contains(&self.search.default_page_size) {
            return Err(ConfigError::Invalid {
                key: "search.default_page_size",
                reason: format!("must be between 1 and {}", self.search.max_page_size),
            });
        }
        Ok(())
    }
}
