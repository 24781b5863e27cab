//! Configuration for Promisance: TOML file loading, durations, and signer
//! construction from configured secrets.

pub mod config;
pub mod duration;
pub mod error;

pub use config::{AppConfig, JotConfig, ServerConfig, SignerConfig, config_path, load_config};
pub use duration::parse_duration;
pub use error::ConfigError;
