//! Configuration management for Fortuna Rewards
//!
//! Settings are loaded from optional config files and environment variables
//! with the `FORTUNA` prefix, e.g. `FORTUNA__SERVER__PORT=9090`.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub engine: EngineConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Comma-separated list of allowed CORS origins
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
}

/// Reward engine settings
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// How long a request waits for a contended row lock before giving up
    #[serde(default = "default_lock_wait_ms")]
    pub lock_wait_ms: u64,

    /// Total points distributable per calendar day
    #[serde(default = "default_daily_budget")]
    pub daily_budget: i64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_cors_origins() -> String {
    "http://localhost:3000".to_string()
}

fn default_lock_wait_ms() -> u64 {
    3000
}

fn default_daily_budget() -> i64 {
    100_000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lock_wait_ms: default_lock_wait_ms(),
            daily_budget: default_daily_budget(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from files and environment
    ///
    /// Sources are merged in order, later sources overriding earlier ones:
    /// 1. Built-in defaults
    /// 2. `config/default.toml` (optional)
    /// 3. `config/local.toml` (optional)
    /// 4. Environment variables with prefix `FORTUNA`
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080_i64)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("server.cors_origins", "http://localhost:3000")?
            .set_default("engine.lock_wait_ms", 3000_i64)?
            .set_default("engine.daily_budget", 100_000_i64)?
            // Optional config files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Environment variables: FORTUNA__SERVER__PORT etc.
            .add_source(
                Environment::with_prefix("FORTUNA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Returns the socket address the HTTP server should bind to
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
