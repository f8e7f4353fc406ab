//! API configuration module.
//!
//! Configuration is loaded from a local `.env` file (if present) and then
//! from environment variables, with fallback to defaults.
//!
//! | Variable                  | Default       |
//! |---------------------------|---------------|
//! | `DB_HOST`                 | `localhost`   |
//! | `DB_PORT`                 | `3306`        |
//! | `DB_USER`                 | `root`        |
//! | `DB_PASSWORD`             | (empty)       |
//! | `DB_NAME`                 | `pokemons_db` |
//! | `DB_CONNECT_TIMEOUT_SECS` | `10`          |
//! | `HOST`                    | `0.0.0.0`     |
//! | `PORT`                    | `8000`        |

use std::env;
use std::str::FromStr;
use std::time::Duration;

use pokedex_db::DbConfig;
use tracing::debug;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Store connection settings, fixed for the process lifetime
    pub db: DbConfig,

    /// HTTP bind host
    pub host: String,

    /// HTTP bind port
    pub port: u16,
}

impl AppConfig {
    /// Load configuration from `.env` and environment variables.
    ///
    /// Variables already set in the environment win over `.env` entries.
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(ConfigError::EnvFile(e.to_string())),
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let timeout_secs: u64 = parse_or(&lookup, "DB_CONNECT_TIMEOUT_SECS", 10)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("DB_CONNECT_TIMEOUT_SECS".to_string()));
        }

        let db = DbConfig::new(
            text("DB_HOST", "localhost"),
            text("DB_USER", "root"),
            text("DB_PASSWORD", ""),
            text("DB_NAME", "pokemons_db"),
        )
        .port(parse_or(&lookup, "DB_PORT", 3306)?)
        .connect_timeout(Duration::from_secs(timeout_secs));

        Ok(AppConfig {
            db,
            host: text("HOST", "0.0.0.0"),
            port: parse_or(&lookup, "PORT", 8000)?,
        })
    }

    /// Socket address string for the HTTP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Cannot read .env file: {0}")]
    EnvFile(String),
}
