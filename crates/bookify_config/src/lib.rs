//! Configuration loading for the Bookify application.
//!
//! Configuration is layered: an optional `config/default.toml` file first,
//! then environment variables prefixed with `BOOKIFY_` (nested keys separated
//! by `__`, e.g. `BOOKIFY_SERVER__PORT=8086`). A `.env` file is loaded before
//! anything else so local development can keep overrides out of the shell.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::sync::Once;
use tracing::debug;

static DOTENV_INIT: Once = Once::new();

/// Loads `.env` exactly once per process. Missing files are fine.
pub fn ensure_dotenv_loaded() {
    DOTENV_INIT.call_once(|| {
        let _ = dotenv::dotenv();
    });
}

/// Which repository implementation backs the stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    /// Process-local store, useful for development and demos.
    #[default]
    Memory,
    /// SQLite via sqlx; requires `database.url`.
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8086
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: DatabaseBackend,
    /// Connection URL, e.g. `sqlite://bookify.db`. Ignored by the memory backend.
    #[serde(default)]
    pub url: String,
}

/// Knobs for the booking domain itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Maximum length of free-form appointment notes.
    #[serde(default = "default_max_notes_len")]
    pub max_notes_len: usize,
    /// Seed a handful of services and employees at startup so a fresh
    /// process can take bookings immediately.
    #[serde(default)]
    pub demo_seed: bool,
}

fn default_max_notes_len() -> usize {
    500
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            max_notes_len: default_max_notes_len(),
            demo_seed: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub booking: BookingConfig,
}

/// Loads the application configuration.
///
/// Dependent crates call this instead of touching `config` directly so they
/// do not need to know where values come from.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();
    let config = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::with_prefix("BOOKIFY").separator("__"))
        .build()?;
    let app_config: AppConfig = config.try_deserialize()?;
    debug!(
        backend = ?app_config.database.backend,
        "configuration loaded"
    );
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8086);
        assert_eq!(config.database.backend, DatabaseBackend::Memory);
        assert_eq!(config.booking.max_notes_len, 500);
        assert!(!config.booking.demo_seed);
    }

    #[test]
    fn backend_parses_from_lowercase() {
        let backend: DatabaseBackend = serde_json::from_str("\"sqlite\"").unwrap();
        assert_eq!(backend, DatabaseBackend::Sqlite);
    }
}
