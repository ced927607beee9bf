//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

use model_provider::DEFAULT_MODEL_ID;

/// Chat server configuration.
///
/// Provider credentials are read separately by
/// [`ProvidersConfig::from_env`](model_provider::ProvidersConfig::from_env).
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Provider identifier of the model that names new chats.
    pub title_model: String,
    /// Maximum model calls per chat turn.
    pub max_steps: usize,
}

impl Config {
    pub const DEFAULT_MAX_STEPS: usize = 5;

    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `CHAT_ADDR` | Server bind address | `127.0.0.1:3000` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:chat.db?mode=rwc` |
    /// | `CHAT_TITLE_MODEL` | Model used to title new chats | `gpt-4o-mini` |
    /// | `CHAT_MAX_STEPS` | Model calls per turn, at least 1 | `5` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("CHAT_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url =
            env::var("SQLITE_PATH").unwrap_or_else(|_| "sqlite:chat.db?mode=rwc".to_string());

        let title_model =
            env::var("CHAT_TITLE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL_ID.to_string());

        let max_steps = match env::var("CHAT_MAX_STEPS") {
            Ok(value) => match value.trim().parse::<usize>() {
                Ok(steps) if steps > 0 => steps,
                _ => return Err(ConfigError::InvalidMaxSteps(value)),
            },
            Err(_) => Self::DEFAULT_MAX_STEPS,
        };

        Ok(Self {
            addr,
            database_url,
            title_model,
            max_steps,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            database_url: "sqlite:chat.db?mode=rwc".to_string(),
            title_model: DEFAULT_MODEL_ID.to_string(),
            max_steps: Self::DEFAULT_MAX_STEPS,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid CHAT_ADDR format")]
    InvalidAddr,

    #[error("CHAT_MAX_STEPS must be a positive integer, got '{0}'")]
    InvalidMaxSteps(String),
}
