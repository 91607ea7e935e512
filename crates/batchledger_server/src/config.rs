//! Server configuration read from the environment.

use batchledger_core::default_log_level;
use std::env;
use std::path::PathBuf;

const DEFAULT_DB_PATH: &str = "batchledger.sqlite3";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match get("BATCHLEDGER_PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(format!("BATCHLEDGER_PORT={value}")))?,
            None => DEFAULT_PORT,
        };

        let log_dir = match get("BATCHLEDGER_LOG_DIR") {
            Some(value) => {
                let path = PathBuf::from(value.trim());
                if !path.is_absolute() {
                    return Err(ConfigError::InvalidValue(format!(
                        "BATCHLEDGER_LOG_DIR={value} (must be absolute)"
                    )));
                }
                path
            }
            None => env::current_dir()
                .map_err(|err| ConfigError::InvalidValue(format!("current directory: {err}")))?
                .join("logs"),
        };

        Ok(Config {
            db_path: get("BATCHLEDGER_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
            host: get("BATCHLEDGER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            log_level: get("BATCHLEDGER_LOG_LEVEL")
                .unwrap_or_else(|| default_log_level().to_string()),
            log_dir,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue(var) => write!(f, "Invalid value for: {}", var),
        }
    }
}

impl std::error::Error for ConfigError {}
