//! services/bot/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;
use url::Url;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bot_token: String,
    pub drive_folder_id: String,
    pub drive_access_token: String,
    pub prompts_path: PathBuf,
    /// When set, decided consent records are snapshotted to this file so
    /// they survive a restart.
    pub consent_store_path: Option<PathBuf>,
    pub bind_address: SocketAddr,
    /// When set, the bot registers this public URL as its webhook and serves
    /// updates over HTTP; otherwise it long-polls.
    pub webhook_url: Option<Url>,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bot_token = std::env::var("BOT_TOKEN")
            .map_err(|_| ConfigError::MissingVar("BOT_TOKEN".to_string()))?;
        let drive_folder_id = std::env::var("DRIVE_FOLDER_ID")
            .map_err(|_| ConfigError::MissingVar("DRIVE_FOLDER_ID".to_string()))?;
        let drive_access_token = std::env::var("DRIVE_ACCESS_TOKEN")
            .map_err(|_| ConfigError::MissingVar("DRIVE_ACCESS_TOKEN".to_string()))?;

        let prompts_path = std::env::var("PROMPTS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./phrases.csv"));

        let consent_store_path = std::env::var("CONSENT_STORE_PATH").ok().map(PathBuf::from);

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let webhook_url = match std::env::var("WEBHOOK_URL") {
            Ok(raw) => Some(raw.parse::<Url>().map_err(|e| {
                ConfigError::InvalidValue("WEBHOOK_URL".to_string(), e.to_string())
            })?),
            Err(_) => None,
        };

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            bot_token,
            drive_folder_id,
            drive_access_token,
            prompts_path,
            consent_store_path,
            bind_address,
            webhook_url,
            log_level,
        })
    }
}
