//! Token claims and the identity payload they carry.

use crate::date::NumericDate;
use crate::error::JotError;
use crate::segment;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Role added to every payload recovered from a verified token.
pub const ROLE_AUTHENTICATED: &str = "authenticated";

/// Claims contained in a JOT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Expiration time on and after which the token must not be accepted.
    pub exp: NumericDate,

    /// Time at which the token was issued. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<NumericDate>,

    /// Identity of the bearer.
    pub payload: Payload,
}

impl Claims {
    /// Claims issued at `now`, expiring `ttl` later.
    ///
    /// Both times are truncated to whole seconds, matching what the wire
    /// carries. Fails with [`JotError::InvalidTtl`] if the expiry overflows.
    pub fn issue(
        now: DateTime<Utc>,
        ttl: chrono::Duration,
        payload: Payload,
    ) -> Result<Self, JotError> {
        let exp = now.checked_add_signed(ttl).ok_or(JotError::InvalidTtl)?;
        Ok(Self {
            exp: NumericDate::new(exp.trunc_subsecs(0)),
            iat: Some(NumericDate::new(now.trunc_subsecs(0))),
            payload,
        })
    }

    /// Live iff `now` is strictly before the expiry.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        now < self.exp.as_datetime()
    }

    pub fn is_live(&self) -> bool {
        self.is_live_at(Utc::now())
    }

    /// Marshal to compact JSON, then base64url.
    pub fn encode(&self) -> Result<String, JotError> {
        Ok(segment::encode_json(self)?)
    }

    /// Decode a claims segment. Any failure is reported as [`JotError::InvalidToken`].
    pub fn decode(segment: &str) -> Result<Self, JotError> {
        segment::decode_json(segment).ok_or(JotError::InvalidToken)
    }
}

/// The opaque identity data carried by a token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub user_id: i64,

    /// Zero when the user has no current empire.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub empire_id: i64,

    #[serde(default)]
    pub roles: Roles,
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

impl Payload {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }

    /// The sentinel substituted whenever no credential is present or verification fails.
    ///
    /// Carries no ids and an explicit `authenticated = false` marker.
    pub fn anonymous() -> Self {
        let mut roles = Roles::default();
        roles.set(ROLE_AUTHENTICATED, false);
        Self {
            user_id: 0,
            empire_id: 0,
            roles,
        }
    }

    pub fn with_empire(mut self, empire_id: i64) -> Self {
        self.empire_id = empire_id;
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.grant(role);
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.roles.has(ROLE_AUTHENTICATED)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.has(role)
    }
}

/// The set of roles assigned to a subject.
///
/// Semantically a set, stored ordered so that serialization is byte-stable:
/// it writes the granted names as a sorted JSON array. An entry may also be
/// held as explicitly *not* granted; such entries are never serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roles(BTreeMap<String, bool>);

impl Roles {
    pub fn grant(&mut self, role: impl Into<String>) {
        self.0.insert(role.into(), true);
    }

    pub fn set(&mut self, role: impl Into<String>, granted: bool) {
        self.0.insert(role.into(), granted);
    }

    pub fn revoke(&mut self, role: &str) {
        self.0.remove(role);
    }

    /// True only if the role is present and granted.
    pub fn has(&self, role: &str) -> bool {
        self.0.get(role).copied().unwrap_or(false)
    }

    /// The explicit state of a role, if any was recorded.
    pub fn get(&self, role: &str) -> Option<bool> {
        self.0.get(role).copied()
    }

    /// Granted roles in lexicographic order.
    pub fn granted(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, granted)| **granted)
            .map(|(name, _)| name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Roles {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Roles(iter.into_iter().map(|r| (r.into(), true)).collect())
    }
}

impl Serialize for Roles {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.granted())
    }
}

impl<'de> Deserialize<'de> for Roles {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names = Option::<Vec<String>>::deserialize(deserializer)?;
        Ok(names.unwrap_or_default().into_iter().collect())
    }
}
