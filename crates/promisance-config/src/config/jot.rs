//! Token issuance configuration.

use crate::duration::parse_duration;
use crate::error::ConfigError;
use base64::Engine;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use promisance_jot::cookie::{DEFAULT_COOKIE_NAME, DEFAULT_COOKIE_PATH, LEGACY_COOKIE_NAMES};
use promisance_jot::{CookieSettings, Header, Hs256Signer, MAX_HEADER_LEN, SameSite, Signer};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for the `[jot]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JotConfig {
    /// Name of the cookie carrying the token.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    #[serde(default = "default_cookie_path")]
    pub cookie_path: String,

    #[serde(default)]
    pub same_site: SameSite,

    /// Cookies from older deployments that logout also clears.
    #[serde(default = "default_legacy_cookies")]
    pub legacy_cookies: Vec<String>,

    /// Lifetime of session tokens (e.g., "7d", "12h").
    #[serde(default = "default_token_ttl")]
    pub token_ttl: String,

    /// How often expired signers are swept from the pool.
    #[serde(default = "default_prune_interval")]
    pub prune_interval: String,

    /// Signing keys. The last entry is registered last and therefore issues
    /// new tokens; earlier entries keep verifying until they expire.
    #[serde(default)]
    pub signers: Vec<SignerConfig>,
}

fn default_cookie_name() -> String {
    DEFAULT_COOKIE_NAME.to_string()
}

fn default_cookie_path() -> String {
    DEFAULT_COOKIE_PATH.to_string()
}

fn default_legacy_cookies() -> Vec<String> {
    LEGACY_COOKIE_NAMES.iter().map(|s| s.to_string()).collect()
}

fn default_token_ttl() -> String {
    "7d".to_string()
}

fn default_prune_interval() -> String {
    "5m".to_string()
}

impl Default for JotConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            cookie_path: default_cookie_path(),
            same_site: SameSite::default(),
            legacy_cookies: default_legacy_cookies(),
            token_ttl: default_token_ttl(),
            prune_interval: default_prune_interval(),
            signers: Vec::new(),
        }
    }
}

impl JotConfig {
    pub fn cookie_settings(&self) -> CookieSettings {
        CookieSettings {
            name: self.cookie_name.clone(),
            path: self.cookie_path.clone(),
            same_site: self.same_site,
            legacy_names: self.legacy_cookies.clone(),
        }
    }

    /// Session token lifetime. Must leave the expiry representable.
    pub fn token_ttl(&self) -> Result<chrono::Duration, ConfigError> {
        let ttl = parse_duration("jot.token_ttl", &self.token_ttl)?;
        if chrono::Utc::now().checked_add_signed(ttl).is_none() {
            return Err(ConfigError::InvalidDuration {
                field: "jot.token_ttl".to_string(),
                value: self.token_ttl.clone(),
                reason: "expiry out of range".to_string(),
            });
        }
        Ok(ttl)
    }

    /// Sweep interval for the signer pool. Must be non-zero.
    pub fn prune_interval(&self) -> Result<std::time::Duration, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidDuration {
            field: "jot.prune_interval".to_string(),
            value: self.prune_interval.clone(),
            reason,
        };
        let interval = parse_duration("jot.prune_interval", &self.prune_interval)?
            .to_std()
            .map_err(|e| invalid(e.to_string()))?;
        if interval.is_zero() {
            return Err(invalid("must be greater than zero".to_string()));
        }
        Ok(interval)
    }

    /// Build every configured signer, in file order.
    pub fn build_signers(&self) -> Result<Vec<Arc<Hs256Signer>>, ConfigError> {
        if self.signers.is_empty() {
            return Err(ConfigError::NoSigners);
        }
        self.signers.iter().map(SignerConfig::build_signer).collect()
    }
}

/// One `[[jot.signers]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignerConfig {
    /// Key id written into each token header.
    pub id: String,

    /// Signer lifetime from process start (e.g., "30d").
    #[serde(default = "default_signer_ttl")]
    pub ttl: String,

    /// Environment variable containing the secret (base64url).
    #[serde(default)]
    pub secret_env: Option<String>,

    /// Path to a file containing the secret (base64url).
    #[serde(default)]
    pub secret_file: Option<PathBuf>,
}

fn default_signer_ttl() -> String {
    "30d".to_string()
}

impl SignerConfig {
    /// Resolve the raw secret from environment or file.
    pub fn resolve_secret(&self) -> Result<Vec<u8>, ConfigError> {
        let text = self.secret_text()?.ok_or_else(|| ConfigError::MissingSecret {
            id: self.id.clone(),
        })?;
        decode_secret(&text).ok_or_else(|| ConfigError::InvalidSecret {
            id: self.id.clone(),
        })
    }

    fn secret_text(&self) -> Result<Option<String>, ConfigError> {
        // Try environment variable first
        if let Some(env_var) = &self.secret_env {
            if let Ok(secret) = std::env::var(env_var) {
                return Ok(Some(secret));
            }
        }

        if let Some(path) = &self.secret_file {
            if path.exists() {
                let secret = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.clone(),
                    source,
                })?;
                return Ok(Some(secret));
            }
        }

        Ok(None)
    }

    pub fn build_signer(&self) -> Result<Arc<Hs256Signer>, ConfigError> {
        let ttl = parse_duration(&format!("jot.signers[{}].ttl", self.id), &self.ttl)?;
        let secret = self.resolve_secret()?;
        let signer = Hs256Signer::new(&self.id, &secret, ttl).map_err(|source| {
            ConfigError::Signer {
                id: self.id.clone(),
                source,
            }
        })?;
        if !Header::for_signer(&signer).fits_budget() {
            return Err(ConfigError::SignerIdTooLong {
                id: self.id.clone(),
                max: MAX_HEADER_LEN,
            });
        }
        tracing::debug!(
            signer_id = %self.id,
            expires_at = %signer.expires_at().to_rfc3339(),
            "signer loaded from config"
        );
        Ok(Arc::new(signer))
    }
}

/// Decode base64url secret text. Padding is tolerated.
pub fn decode_secret(text: &str) -> Option<Vec<u8>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let bytes = if text.ends_with('=') {
        URL_SAFE.decode(text)
    } else {
        URL_SAFE_NO_PAD.decode(text)
    };
    bytes.ok().filter(|b| !b.is_empty())
}
