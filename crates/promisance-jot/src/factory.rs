//! The signer pool and token issuance/verification.

use crate::claims::{Claims, Payload, ROLE_AUTHENTICATED};
use crate::cookie::{CookieSettings, DEFAULT_COOKIE_NAME, DEFAULT_COOKIE_PATH, TokenCookie};
use crate::error::JotError;
use crate::header::{Header, MAX_HEADER_LEN};
use crate::request;
use crate::segment;
use crate::signer::Signer;
use chrono::{DateTime, Duration, Utc};
use http::HeaderMap;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

struct Entry {
    // registration order; the newest live signer issues new tokens
    seq: u64,
    signer: Arc<dyn Signer>,
}

#[derive(Default)]
struct Pool {
    signers: HashMap<String, Entry>,
    next_seq: u64,
}

impl Pool {
    fn insert(&mut self, signer: Arc<dyn Signer>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.signers
            .insert(signer.id().to_string(), Entry { seq, signer });
    }

    fn evict_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.signers.len();
        self.signers.retain(|id, entry| {
            let keep = !entry.signer.is_expired_at(now);
            if !keep {
                tracing::debug!(signer_id = %id, "evicting expired signer");
            }
            keep
        });
        before - self.signers.len()
    }
}

/// Issues and verifies JOTs against a pool of signers.
///
/// The pool may hold several live signers at once so keys can be rotated:
/// new tokens move to the most recently registered signer while tokens from
/// an older, still-live signer keep verifying. Every pool access happens
/// under a single lock acquisition, and each operation reads the clock once.
pub struct Factory {
    cookie: CookieSettings,
    ttl: Duration,
    pool: Mutex<Pool>,
}

fn warn_if_oversized(signer: &dyn Signer) {
    if !Header::for_signer(signer).fits_budget() {
        tracing::warn!(
            signer_id = %signer.id(),
            max_header_len = MAX_HEADER_LEN,
            "signer id too long; its tokens will fail verification"
        );
    }
}

impl Factory {
    /// Create a factory with an initial signer.
    ///
    /// A blank cookie name or path falls back to the default. `ttl` is the
    /// lifetime used by [`Factory::new_session_cookie`].
    pub fn new(
        mut cookie: CookieSettings,
        ttl: Duration,
        signer: Arc<dyn Signer>,
    ) -> Result<Self, JotError> {
        if signer.expired() {
            return Err(JotError::SignerExpired);
        }
        if cookie.name.is_empty() {
            cookie.name = DEFAULT_COOKIE_NAME.to_string();
        }
        if cookie.path.is_empty() {
            cookie.path = DEFAULT_COOKIE_PATH.to_string();
        }

        let mut pool = Pool::default();
        warn_if_oversized(signer.as_ref());
        tracing::info!(signer_id = %signer.id(), alg = %signer.algorithm(), "jot factory created");
        pool.insert(signer);

        Ok(Self {
            cookie,
            ttl,
            pool: Mutex::new(pool),
        })
    }

    fn pool(&self) -> MutexGuard<'_, Pool> {
        // no operation leaves the map half-updated, so a poisoned lock is still consistent
        self.pool.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn cookie_settings(&self) -> &CookieSettings {
        &self.cookie
    }

    /// Default token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Add a signer to the pool, replacing any signer with the same id.
    pub fn add_signer(&self, signer: Arc<dyn Signer>) -> Result<(), JotError> {
        if signer.expired() {
            return Err(JotError::SignerExpired);
        }
        warn_if_oversized(signer.as_ref());
        tracing::info!(signer_id = %signer.id(), alg = %signer.algorithm(), "signer added");
        self.pool().insert(signer);
        Ok(())
    }

    /// Remove a signer from the pool. Absent ids are ignored.
    pub fn delete_signer(&self, id: &str) {
        if self.pool().signers.remove(id).is_some() {
            tracing::info!(signer_id = %id, "signer deleted");
        }
    }

    /// Remove every expired signer, returning how many were removed.
    pub fn delete_expired_signers(&self) -> usize {
        let now = Utc::now();
        self.pool().evict_expired(now)
    }

    /// Ids of the signers currently in the pool, sorted.
    pub fn signer_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.pool().signers.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Find a live signer by id and algorithm.
    ///
    /// An expired signer is evicted. A missing, expired, or mismatched signer
    /// are all reported the same way.
    pub fn lookup_signer(&self, id: &str, algorithm: &str) -> Option<Arc<dyn Signer>> {
        self.lookup_signer_at(id, algorithm, Utc::now())
    }

    fn lookup_signer_at(
        &self,
        id: &str,
        algorithm: &str,
        now: DateTime<Utc>,
    ) -> Option<Arc<dyn Signer>> {
        let mut pool = self.pool();
        let entry = pool.signers.get(id)?;
        if entry.signer.is_expired_at(now) {
            tracing::debug!(signer_id = %id, "evicting expired signer");
            pool.signers.remove(id);
            return None;
        }
        if entry.signer.algorithm() != algorithm {
            return None;
        }
        Some(Arc::clone(&entry.signer))
    }

    /// The signer that issues new tokens: the most recently registered live
    /// signer. Expired signers are evicted along the way.
    pub(crate) fn get_signer(&self, now: DateTime<Utc>) -> Result<Arc<dyn Signer>, JotError> {
        let mut pool = self.pool();
        pool.evict_expired(now);
        pool.signers
            .values()
            .max_by_key(|entry| entry.seq)
            .map(|entry| Arc::clone(&entry.signer))
            .ok_or(JotError::NotFound)
    }

    /// Mint a token for `payload` valid for `ttl`, returning it with its claims.
    pub fn new_token(&self, ttl: Duration, payload: Payload) -> Result<(String, Claims), JotError> {
        let now = Utc::now();
        let signer = self.get_signer(now).map_err(|_| JotError::MissingSigner)?;

        let h64 = Header::for_signer(signer.as_ref()).encode()?;
        let claims = Claims::issue(now, ttl, payload)?;
        let c64 = claims.encode()?;

        let mut token = format!("{h64}.{c64}");
        let signature = signer.sign(token.as_bytes())?;
        token.push('.');
        token.push_str(&segment::encode_bytes(&signature));

        tracing::debug!(
            signer_id = %signer.id(),
            user_id = claims.payload.user_id,
            expires_at = %claims.exp,
            "token issued"
        );
        Ok((token, claims))
    }

    /// Mint a token and wrap it in an HTTP-only, secure cookie expiring with the claims.
    pub fn new_token_cookie(&self, ttl: Duration, payload: Payload) -> Result<TokenCookie, JotError> {
        let (token, claims) = self.new_token(ttl, payload)?;
        Ok(TokenCookie::new(&self.cookie, token, claims.exp.as_datetime()))
    }

    /// [`Factory::new_token_cookie`] with the factory's default lifetime.
    pub fn new_session_cookie(&self, payload: Payload) -> Result<TokenCookie, JotError> {
        self.new_token_cookie(self.ttl, payload)
    }

    /// Parse and verify a token, returning its claims.
    ///
    /// Every step must pass: shape, header budget, header type, signature
    /// encoding, signer lookup, signature check, claims decoding, liveness.
    pub fn claims_from_token(&self, token: &str) -> Result<Claims, JotError> {
        let now = Utc::now();

        let fields: Vec<&str> = token.split('.').collect();
        let [h64, c64, s64] = fields.as_slice() else {
            return Err(JotError::InvalidToken);
        };
        if h64.len() > MAX_HEADER_LEN {
            return Err(JotError::InvalidHeader);
        }

        let header = Header::decode(h64)?;
        if !header.is_jot() {
            return Err(JotError::UnknownType);
        }

        let signature = segment::decode_bytes(s64).ok_or(JotError::InvalidToken)?;

        let signer = self
            .lookup_signer_at(&header.kid, &header.alg, now)
            .ok_or(JotError::InvalidSigner)?;
        let message_len = h64.len() + 1 + c64.len();
        if !signer.signed(&token.as_bytes()[..message_len], &signature) {
            return Err(JotError::InvalidSignature);
        }

        let claims = Claims::decode(c64)?;
        if !claims.is_live_at(now) {
            return Err(JotError::ClaimsExpired);
        }
        Ok(claims)
    }

    /// Candidate token from request headers: bearer header first, then the cookie.
    pub fn token_from_request(&self, headers: &HeaderMap) -> Option<String> {
        request::token_from_headers(headers, &self.cookie.name)
    }

    /// Resolve the identity behind a request.
    ///
    /// Returns the token's payload with the `authenticated` role added, or the
    /// anonymous payload when no token is present or it fails verification
    /// for any reason. Which reason is never revealed to the caller.
    pub fn payload_from_request(&self, headers: &HeaderMap) -> (Payload, bool) {
        let Some(token) = self.token_from_request(headers) else {
            tracing::debug!("no token in request");
            return (Payload::anonymous(), false);
        };
        match self.claims_from_token(&token) {
            Ok(claims) => {
                let mut payload = claims.payload;
                payload.roles.grant(ROLE_AUTHENTICATED);
                (payload, true)
            }
            Err(e) => {
                tracing::debug!(reason = e.kind(), "token rejected");
                (Payload::anonymous(), false)
            }
        }
    }

    /// Write epoch-expired cookies for the token cookie and every legacy name.
    pub fn destroy(&self, headers: &mut HeaderMap) -> Result<(), JotError> {
        let names = std::iter::once(&self.cookie.name).chain(&self.cookie.legacy_names);
        for name in names {
            TokenCookie::expired(name.as_str(), self.cookie.path.as_str(), self.cookie.same_site)
                .append_to(headers)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::Hs256Signer;
    use http::header::{AUTHORIZATION, COOKIE, HeaderValue, SET_COOKIE};

    fn signer(id: &str, ttl: Duration) -> Arc<dyn Signer> {
        Arc::new(Hs256Signer::new(id, format!("secret-{id}").as_bytes(), ttl).unwrap())
    }

    fn factory() -> Factory {
        Factory::new(
            CookieSettings::default(),
            Duration::days(7),
            signer("a", Duration::hours(1)),
        )
        .unwrap()
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        h
    }

    #[test]
    fn test_new_rejects_expired_signer() {
        let s = signer("old", Duration::hours(1));
        s.expire();
        let result = Factory::new(CookieSettings::default(), Duration::days(1), s);
        assert!(matches!(result, Err(JotError::SignerExpired)));
    }

    #[test]
    fn test_blank_cookie_settings_use_defaults() {
        let settings = CookieSettings {
            name: String::new(),
            path: String::new(),
            ..CookieSettings::default()
        };
        let f = Factory::new(settings, Duration::days(1), signer("a", Duration::hours(1))).unwrap();
        assert_eq!(f.cookie_settings().name, "promisance_jot");
        assert_eq!(f.cookie_settings().path, "/");
    }

    #[test]
    fn test_add_signer_rejects_expired() {
        let f = factory();
        let s = signer("b", Duration::hours(1));
        s.expire();
        assert!(matches!(f.add_signer(s), Err(JotError::SignerExpired)));
        assert_eq!(f.signer_ids(), vec!["a"]);
    }

    #[test]
    fn test_delete_signer_ignores_missing() {
        let f = factory();
        f.delete_signer("nope");
        f.delete_signer("a");
        assert!(f.signer_ids().is_empty());
    }

    #[test]
    fn test_delete_expired_signers() {
        let f = factory();
        let b = signer("b", Duration::hours(1));
        f.add_signer(Arc::clone(&b)).unwrap();
        f.add_signer(signer("c", Duration::hours(1))).unwrap();
        b.expire();
        assert_eq!(f.delete_expired_signers(), 1);
        assert_eq!(f.signer_ids(), vec!["a", "c"]);
    }

    #[test]
    fn test_lookup_signer_checks_algorithm_and_expiry() {
        let f = factory();
        assert!(f.lookup_signer("a", "HS256").is_some());
        assert!(f.lookup_signer("a", "HS512").is_none());
        assert!(f.lookup_signer("zz", "HS256").is_none());

        let b = signer("b", Duration::hours(1));
        f.add_signer(Arc::clone(&b)).unwrap();
        b.expire();
        assert!(f.lookup_signer("b", "HS256").is_none());
        // evicted, not just hidden
        assert_eq!(f.signer_ids(), vec!["a"]);
    }

    #[test]
    fn test_get_signer_prefers_most_recent_registration() {
        let f = factory();
        f.add_signer(signer("b", Duration::hours(1))).unwrap();
        f.add_signer(signer("c", Duration::hours(1))).unwrap();
        assert_eq!(f.get_signer(Utc::now()).unwrap().id(), "c");

        // re-registering an older id makes it the newest
        f.add_signer(signer("a", Duration::hours(1))).unwrap();
        assert_eq!(f.get_signer(Utc::now()).unwrap().id(), "a");
    }

    #[test]
    fn test_get_signer_skips_and_evicts_expired() {
        let f = factory();
        let b = signer("b", Duration::hours(1));
        f.add_signer(Arc::clone(&b)).unwrap();
        b.expire();
        assert_eq!(f.get_signer(Utc::now()).unwrap().id(), "a");
        assert_eq!(f.signer_ids(), vec!["a"]);
    }

    #[test]
    fn test_issuance_without_live_signer() {
        let f = factory();
        f.delete_signer("a");
        assert!(matches!(f.get_signer(Utc::now()), Err(JotError::NotFound)));
        assert!(matches!(
            f.new_token_cookie(Duration::hours(1), Payload::new(1)),
            Err(JotError::MissingSigner)
        ));
    }

    #[test]
    fn test_token_shape() {
        let f = factory();
        let (token, claims) = f.new_token(Duration::hours(1), Payload::new(1)).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
        assert!(!token.contains('='));

        let header = Header::decode(parts[0]).unwrap();
        assert_eq!(header.alg, "HS256");
        assert_eq!(header.kid, "a");
        assert_eq!(header.typ, "JOT");
        assert_eq!(Claims::decode(parts[1]).unwrap(), claims);
    }

    #[test]
    fn test_cookie_carries_token_and_expiry() {
        let f = factory();
        let cookie = f.new_session_cookie(Payload::new(3)).unwrap();
        assert_eq!(cookie.name, "promisance_jot");
        assert!(cookie.http_only);
        assert!(cookie.secure);
        let claims = f.claims_from_token(&cookie.value).unwrap();
        assert_eq!(claims.exp.as_datetime(), cookie.expires);
        assert!(cookie.expires > Utc::now() + Duration::days(6));
    }

    #[test]
    fn test_subsecond_ttl_cookie_matches_wire_expiry() {
        let f = factory();
        let cookie = f
            .new_token_cookie(Duration::milliseconds(61_500), Payload::new(3))
            .unwrap();
        let claims = f.claims_from_token(&cookie.value).unwrap();
        assert_eq!(claims.exp.as_datetime(), cookie.expires);
        assert_eq!(cookie.expires.timestamp_subsec_nanos(), 0);
    }

    #[test]
    fn test_overflowing_ttl_is_an_error() {
        let f = factory();
        let result = f.new_token_cookie(Duration::days(365 * 1_000_000), Payload::new(1));
        assert!(matches!(result, Err(JotError::InvalidTtl)));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let f = factory();
        let (token, _) = f.new_token(Duration::hours(1), Payload::new(1)).unwrap();
        let rest = token.split_once('.').unwrap().1;
        let jwt = Header {
            alg: "HS256".into(),
            kid: "a".into(),
            typ: "JWT".into(),
        };
        let forged = format!("{}.{rest}", jwt.encode().unwrap());
        assert!(matches!(f.claims_from_token(&forged), Err(JotError::UnknownType)));
    }

    #[test]
    fn test_bad_signature_encoding_is_invalid_token() {
        let f = factory();
        let (token, _) = f.new_token(Duration::hours(1), Payload::new(1)).unwrap();
        let (message, _) = token.rsplit_once('.').unwrap();
        let broken = format!("{message}.not*base64");
        assert!(matches!(f.claims_from_token(&broken), Err(JotError::InvalidToken)));
    }

    #[test]
    fn test_algorithm_mismatch_is_invalid_signer() {
        let f = factory();
        let (token, _) = f.new_token(Duration::hours(1), Payload::new(1)).unwrap();
        let (_, rest) = token.split_once('.').unwrap();
        let other = Header {
            alg: "HS512".into(),
            kid: "a".into(),
            typ: "JOT".into(),
        };
        let forged = format!("{}.{rest}", other.encode().unwrap());
        assert!(matches!(f.claims_from_token(&forged), Err(JotError::InvalidSigner)));
    }

    #[test]
    fn test_payload_from_request_adds_authenticated_role() {
        let f = factory();
        let (token, _) = f
            .new_token(Duration::hours(1), Payload::new(9).with_empire(2))
            .unwrap();
        let (payload, ok) = f.payload_from_request(&bearer(&token));
        assert!(ok);
        assert!(payload.is_authenticated());
        assert_eq!(payload.user_id, 9);
        assert_eq!(payload.empire_id, 2);
    }

    #[test]
    fn test_payload_from_request_without_token() {
        let (payload, ok) = factory().payload_from_request(&HeaderMap::new());
        assert!(!ok);
        assert_eq!(payload, Payload::anonymous());
    }

    #[test]
    fn test_payload_from_cookie() {
        let f = factory();
        let cookie = f.new_session_cookie(Payload::new(4)).unwrap();
        let mut h = HeaderMap::new();
        h.insert(
            COOKIE,
            HeaderValue::from_str(&format!("promisance_jot={}", cookie.value)).unwrap(),
        );
        let (payload, ok) = f.payload_from_request(&h);
        assert!(ok);
        assert_eq!(payload.user_id, 4);
    }

    #[test]
    fn test_destroy_clears_token_and_legacy_cookies() {
        let f = factory();
        let mut h = HeaderMap::new();
        f.destroy(&mut h).unwrap();
        let cookies: Vec<&str> = h
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(cookies.len(), 3);
        assert!(cookies[0].starts_with("promisance_jot=;"));
        assert!(cookies[1].starts_with("fh-auth=;"));
        assert!(cookies[2].starts_with("session_id=;"));
        for c in cookies {
            assert!(c.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
            assert!(c.contains("HttpOnly"));
            assert!(c.contains("Secure"));
        }
    }
}
