//! Service configuration.
//!
//! Settings are read from an optional TOML file and then overridden by
//! environment variables (a `.env` file is loaded first through `dotenv`).
//! The pipeline itself never reads configuration; only the binary does.
//!
//! ## Configuration File
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 8000
//! log_level = "INFO"
//!
//! [usgs]
//! base_url = "http://waterservices.usgs.gov/nwis/dv/"
//! connect_timeout_secs = 10
//! read_timeout_secs = 30
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::logging::{LogLevel, Logger};

pub const DEFAULT_CONFIG_PATH: &str = "flow_forecast.toml";
pub const CONFIG_PATH_ENV: &str = "FLOW_FORECAST_CONFIG";
pub const DEFAULT_USGS_DV_URL: &str = "http://waterservices.usgs.gov/nwis/dv/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// TOML Configuration Structures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    /// Append log entries here in addition to the console
    pub log_file: Option<PathBuf>,
    /// Public URL the service is reachable at
    pub server_url: String,
    pub usgs: UsgsConfig,
}

/// Outbound settings for the USGS Daily Values service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct UsgsConfig {
    pub base_url: String,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "0.0.0.0".to_string(),
            port: 8000,
            log_level: "INFO".to_string(),
            log_file: None,
            server_url: "http://localhost:8000".to_string(),
            usgs: UsgsConfig::default(),
        }
    }
}

impl Default for UsgsConfig {
    fn default() -> Self {
        UsgsConfig {
            base_url: DEFAULT_USGS_DV_URL.to_string(),
            connect_timeout_secs: 10,
            read_timeout_secs: 30,
        }
    }
}

impl UsgsConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// Configuration Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration the way the binary does: `.env`, then the TOML
    /// file named by `FLOW_FORECAST_CONFIG` (or `flow_forecast.toml` if it
    /// exists), then process environment overrides.
    pub fn load() -> Result<Config, ConfigError> {
        dotenv::dotenv().ok();

        let base = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Config::from_file(&path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Config::from_file(DEFAULT_CONFIG_PATH)?
            }
            Err(_) => Config::default(),
        };

        base.with_env(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Config::from_toml_str(&content).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn with_env<F>(mut self, lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("HOST") {
            self.host = v;
        }
        if let Some(v) = lookup("PORT") {
            self.port = parse_number("PORT", &v)?;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            self.log_level = v;
        }
        if let Some(v) = lookup("LOG_FILE") {
            self.log_file = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("SERVER_URL") {
            self.server_url = v;
        }
        if let Some(v) = lookup("USGS_BASE_URL") {
            self.usgs.base_url = v;
        }
        if let Some(v) = lookup("USGS_CONNECT_TIMEOUT_SECS") {
            self.usgs.connect_timeout_secs = parse_number("USGS_CONNECT_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("USGS_READ_TIMEOUT_SECS") {
            self.usgs.read_timeout_secs = parse_number("USGS_READ_TIMEOUT_SECS", &v)?;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.log_level
            .parse::<LogLevel>()
            .map_err(|reason| ConfigError::InvalidValue {
                key: "log_level".to_string(),
                value: self.log_level.clone(),
                reason,
            })?;

        if self.usgs.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "usgs.base_url".to_string(),
                value: self.usgs.base_url.clone(),
                reason: "must not be empty".to_string(),
            });
        }

        for (key, secs) in [
            ("usgs.connect_timeout_secs", self.usgs.connect_timeout_secs),
            ("usgs.read_timeout_secs", self.usgs.read_timeout_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: secs.to_string(),
                    reason: "timeout must be at least one second".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn level(&self) -> LogLevel {
        self.log_level.parse().unwrap_or(LogLevel::Info)
    }

    pub fn logger(&self) -> Logger {
        Logger::new(self.level(), self.log_file.clone(), true)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: "expected a non-negative integer".to_string(),
    })
}
