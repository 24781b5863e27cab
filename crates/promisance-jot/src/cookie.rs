//! Token cookies and their `Set-Cookie` rendering.

use crate::error::JotError;
use chrono::{DateTime, Utc};
use http::header::{HeaderMap, HeaderValue, SET_COOKIE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default name of the token cookie.
pub const DEFAULT_COOKIE_NAME: &str = "promisance_jot";

/// Default cookie path.
pub const DEFAULT_COOKIE_PATH: &str = "/";

/// Cookies from earlier session schemes that logout must also clear.
pub const LEGACY_COOKIE_NAMES: [&str; 2] = ["fh-auth", "session_id"];

/// `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Cookie naming and placement shared by every cookie the factory writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSettings {
    pub name: String,
    pub path: String,
    pub same_site: SameSite,
    /// Extra cookie names cleared by logout.
    pub legacy_names: Vec<String>,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_COOKIE_NAME.to_string(),
            path: DEFAULT_COOKIE_PATH.to_string(),
            same_site: SameSite::default(),
            legacy_names: LEGACY_COOKIE_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A cookie carrying a token (or clearing one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub expires: DateTime<Utc>,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
}

impl TokenCookie {
    /// HTTP-only, secure cookie holding `value` until `expires`.
    pub fn new(
        settings: &CookieSettings,
        value: impl Into<String>,
        expires: DateTime<Utc>,
    ) -> Self {
        Self {
            name: settings.name.clone(),
            value: value.into(),
            path: settings.path.clone(),
            expires,
            http_only: true,
            secure: true,
            same_site: settings.same_site,
        }
    }

    /// An empty cookie expiring at the epoch, telling the client to drop `name`.
    pub fn expired(name: impl Into<String>, path: impl Into<String>, same_site: SameSite) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            path: path.into(),
            expires: DateTime::<Utc>::UNIX_EPOCH,
            http_only: true,
            secure: true,
            same_site,
        }
    }

    pub fn header_value(&self) -> Result<HeaderValue, JotError> {
        Ok(HeaderValue::from_str(&self.to_string())?)
    }

    /// Append a `Set-Cookie` header for this cookie.
    pub fn append_to(&self, headers: &mut HeaderMap) -> Result<(), JotError> {
        headers.append(SET_COOKIE, self.header_value()?);
        Ok(())
    }
}

impl fmt::Display for TokenCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={}; Path={}; Expires={}",
            self.name,
            self.value,
            self.path,
            self.expires.format("%a, %d %b %Y %H:%M:%S GMT")
        )?;
        if self.http_only {
            f.write_str("; HttpOnly")?;
        }
        if self.secure {
            f.write_str("; Secure")?;
        }
        write!(f, "; SameSite={}", self.same_site.as_str())
    }
}
