//! Configuration for the lookup proxy.

use anyhow::{ensure, Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Proxy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Shared secret expected in the `api-key` header
    pub api_key: SecretString,

    /// Telegram app id used when a request omits `app_id`
    #[serde(default)]
    pub api_id: Option<i32>,

    /// Telegram app hash used when a request omits `api_hash`
    #[serde(default)]
    pub api_hash: Option<SecretString>,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Telegram session configuration
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allow cross-origin requests from any origin
    #[serde(default = "default_true")]
    pub cors_permissive: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Directory holding one session file per account phone number
    #[serde(default = "default_session_dir")]
    pub session_dir: PathBuf,

    /// How long a session waits for its login code after send-code
    #[serde(default = "default_pending_login_ttl", with = "humantime_serde")]
    pub pending_login_ttl: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Global requests per minute
    #[serde(default = "default_global_rpm")]
    pub global_per_minute: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default implementations
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
            cors_permissive: true,
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            session_dir: default_session_dir(),
            pending_login_ttl: default_pending_login_ttl(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            global_per_minute: default_global_rpm(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_listen_addr() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    5000
}

fn default_true() -> bool {
    true
}

fn default_session_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_pending_login_ttl() -> Duration {
    Duration::from_secs(300)
}

fn default_global_rpm() -> u32 {
    30
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_environment(config::Environment::default())
    }

    fn from_environment(environment: config::Environment) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(environment.separator("__").try_parsing(false))
            .build()
            .context("Failed to build configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        ensure!(
            !config.api_key.expose_secret().is_empty(),
            "API_KEY must not be empty"
        );
        Ok(config)
    }
}
