//! Server configuration from environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `HOST` | `0.0.0.0` |
//! | `PORT` | `3000` |
//! | `DATABASE_URL` | `postgres://localhost/jotter` |
//! | `STORAGE_BACKEND` | `postgres` (or `memory`) |
//! | `JWT_SECRET` | random per process |
//! | `ALLOWED_ORIGINS` | `http://localhost:3000,http://localhost:5173` |
//! | `DB_MAX_CONNECTIONS` | `10` |
//! | `LOG_FORMAT` | `text` (or `json`) |
//! | `LOG_FILE` | unset (stdout only) |
//! | `LOG_ANSI` | auto |

use axum::http::HeaderValue;
use rand::distributions::Alphanumeric;
use rand::Rng;
use thiserror::Error;

use jotter_core::defaults::EPHEMERAL_SECRET_LEN;
use jotter_db::pool::DEFAULT_MAX_CONNECTIONS;

/// Origins allowed when `ALLOWED_ORIGINS` is unset or blank.
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown STORAGE_BACKEND '{0}' (expected 'postgres' or 'memory')")]
    UnknownBackend(String),
}

/// Where units of work are opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// Logging output settings.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// "json" or "text"
    pub format: String,
    pub file: Option<String>,
    /// Explicit ANSI override; auto-detected when `None`.
    pub ansi: Option<bool>,
}

/// Everything the server needs at startup.
#[derive(Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub storage_backend: StorageBackend,
    /// `None` when `JWT_SECRET` is unset; see [`ServerConfig::jwt_secret_or_ephemeral`].
    pub jwt_secret: Option<String>,
    pub allowed_origins: Vec<HeaderValue>,
    pub db_max_connections: u32,
    pub log: LogConfig,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("storage_backend", &self.storage_backend)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[REDACTED]"))
            .field("allowed_origins", &self.allowed_origins)
            .field("db_max_connections", &self.db_max_connections)
            .field("log", &self.log)
            .finish()
    }
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let storage_backend = var("STORAGE_BACKEND")
            .unwrap_or_else(|| "postgres".to_string())
            .parse()?;

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: var("PORT").and_then(|p| p.parse().ok()).unwrap_or(3000),
            database_url: var("DATABASE_URL")
                .unwrap_or_else(|| "postgres://localhost/jotter".to_string()),
            storage_backend,
            jwt_secret: var("JWT_SECRET").filter(|s| !s.is_empty()),
            allowed_origins: parse_allowed_origins(
                var("ALLOWED_ORIGINS").as_deref().unwrap_or(DEFAULT_ALLOWED_ORIGINS),
            ),
            db_max_connections: var("DB_MAX_CONNECTIONS")
                .and_then(|n| n.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            log: LogConfig {
                format: var("LOG_FORMAT").unwrap_or_else(|| "text".to_string()),
                file: var("LOG_FILE"),
                ansi: var("LOG_ANSI").map(|v| v == "true" || v == "1"),
            },
        })
    }

    /// The configured secret, or a fresh random one. Tokens signed with a
    /// random secret stop verifying when the process exits.
    pub fn jwt_secret_or_ephemeral(&self) -> String {
        match &self.jwt_secret {
            Some(secret) => secret.clone(),
            None => {
                tracing::warn!(
                    subsystem = "api",
                    component = "config",
                    "JWT_SECRET not set; using an ephemeral secret, tokens will not survive a restart"
                );
                ephemeral_secret()
            }
        }
    }
}

/// Random alphanumeric signing secret.
pub fn ephemeral_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(EPHEMERAL_SECRET_LEN)
        .map(char::from)
        .collect()
}

/// Parse a comma-separated origin list. Blank input falls back to
/// [`DEFAULT_ALLOWED_ORIGINS`]; entries that are not valid header values are
/// skipped with a warning.
pub fn parse_allowed_origins(raw: &str) -> Vec<HeaderValue> {
    let raw = if raw.trim().is_empty() {
        DEFAULT_ALLOWED_ORIGINS
    } else {
        raw
    };

    raw.split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}
