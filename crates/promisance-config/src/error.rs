//! Error types for configuration loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration or key file.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A duration string could not be parsed.
    #[error("invalid duration {value:?} for {field}: {reason}")]
    InvalidDuration {
        field: String,
        value: String,
        reason: String,
    },

    /// A signer has no secret available from any configured source.
    #[error("no secret found for signer {id:?} (set secret_env or secret_file)")]
    MissingSecret { id: String },

    /// A signer's secret is not valid base64url text.
    #[error("secret for signer {id:?} is not valid base64url")]
    InvalidSecret { id: String },

    /// No signers are configured, so no token could ever be issued.
    #[error("no signers configured under [[jot.signers]]")]
    NoSigners,

    /// A signer id too long for its tokens to fit the header budget.
    #[error("signer id {id:?} is too long: encoded token header exceeds {max} bytes")]
    SignerIdTooLong { id: String, max: usize },

    /// A configured signer was rejected by the token crate.
    #[error("signer {id:?} rejected: {source}")]
    Signer {
        id: String,
        #[source]
        source: promisance_jot::JotError,
    },
}
