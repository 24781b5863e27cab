//! Signers: the capability that produces and checks token signatures.

use crate::error::JotError;
use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use subtle::ConstantTimeEq;

/// A keyed message authentication capability registered in the signer pool.
///
/// Implementations own their secret material. New schemes (for example an
/// asymmetric signer) are added as new implementations; the factory only
/// talks to this trait.
pub trait Signer: Send + Sync + fmt::Debug {
    /// Name of the algorithm, written to the token header's `alg` field.
    fn algorithm(&self) -> &str;

    /// Unique identifier of this signer within the pool.
    fn id(&self) -> &str;

    /// Force the signer's expiry into the past. Idempotent.
    fn expire(&self);

    /// When the signer stops being usable.
    fn expires_at(&self) -> DateTime<Utc>;

    /// True iff `now` is at or after the expiry.
    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }

    fn expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Signature of `msg`. Deterministic for a given key and message.
    fn sign(&self, msg: &[u8]) -> Result<Vec<u8>, JotError>;

    /// True if `signature` is this signer's signature of `msg`.
    fn signed(&self, msg: &[u8], signature: &[u8]) -> bool;
}

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 signer.
pub struct Hs256Signer {
    id: String,
    key: Vec<u8>,
    // milliseconds since the epoch; atomic so `expire` works through a shared handle
    expires_at_ms: AtomicI64,
}

impl Hs256Signer {
    pub const ALGORITHM: &'static str = "HS256";

    /// Create a signer that expires `ttl` from now.
    ///
    /// Fails with [`JotError::InvalidTtl`] if the expiry would overflow.
    pub fn new(
        id: impl Into<String>,
        secret: &[u8],
        ttl: chrono::Duration,
    ) -> Result<Self, JotError> {
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .ok_or(JotError::InvalidTtl)?;
        Self::with_expiry(id, secret, expires_at)
    }

    /// Create a signer with an absolute expiry.
    pub fn with_expiry(
        id: impl Into<String>,
        secret: &[u8],
        expires_at: DateTime<Utc>,
    ) -> Result<Self, JotError> {
        let id = id.into();
        if id.is_empty() || secret.is_empty() {
            return Err(JotError::InvalidSigner);
        }
        Ok(Self {
            id,
            key: secret.to_vec(),
            expires_at_ms: AtomicI64::new(expires_at.timestamp_millis()),
        })
    }

    fn mac(&self, msg: &[u8]) -> Result<HmacSha256, JotError> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| JotError::Signing(e.to_string()))?;
        mac.update(msg);
        Ok(mac)
    }
}

impl Signer for Hs256Signer {
    fn algorithm(&self) -> &str {
        Self::ALGORITHM
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn expire(&self) {
        self.expires_at_ms.store(0, Ordering::SeqCst);
    }

    fn expires_at(&self) -> DateTime<Utc> {
        let ms = self.expires_at_ms.load(Ordering::SeqCst);
        Utc.timestamp_millis_opt(ms)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    fn sign(&self, msg: &[u8]) -> Result<Vec<u8>, JotError> {
        Ok(self.mac(msg)?.finalize().into_bytes().to_vec())
    }

    fn signed(&self, msg: &[u8], signature: &[u8]) -> bool {
        match self.sign(msg) {
            Ok(ours) => ours.ct_eq(signature).into(),
            Err(_) => false,
        }
    }
}

impl fmt::Debug for Hs256Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hs256Signer")
            .field("id", &self.id)
            .field("expires_at", &self.expires_at())
            .finish_non_exhaustive()
    }
}
