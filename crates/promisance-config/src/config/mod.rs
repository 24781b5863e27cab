//! Configuration types for the Promisance host.
//!
//! Configuration is a single TOML file. Every section and key has a default,
//! so an empty file is valid apart from the signer list:
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:8080"
//!
//! [jot]
//! cookie_name = "promisance_jot"
//! token_ttl = "7d"
//!
//! [[jot.signers]]
//! id = "2024-a"
//! secret_env = "PROMISANCE_JOT_SECRET"
//! ```

pub mod jot;
pub mod server;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};

pub use jot::{JotConfig, SignerConfig, decode_secret};
pub use server::ServerConfig;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "PROMISANCE_CONFIG";

/// Configuration file used when `PROMISANCE_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "promisance.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub jot: JotConfig,
}

impl AppConfig {
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)
    }
}

/// Load configuration from [`config_path`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let path = config_path();
    tracing::debug!(path = %path.display(), "loading config");
    AppConfig::from_file(&path)
}

pub fn config_path() -> PathBuf {
    if let Ok(p) = env::var(CONFIG_ENV) {
        return PathBuf::from(p);
    }
    PathBuf::from(DEFAULT_CONFIG_FILE)
}
