//! The JOT header segment.

use crate::error::JotError;
use crate::segment;
use crate::signer::Signer;
use serde::{Deserialize, Serialize};

/// Fixed type marker carried by every JOT.
pub const TOKEN_TYPE: &str = "JOT";

/// Largest encoded header segment accepted before any decoding is attempted.
///
/// A header is roughly 10 bytes of `typ`, 12 of `alg`, and up to 40 of `kid`.
pub const MAX_HEADER_LEN: usize = 99;

/// Header of a JOT: which algorithm and which key signed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Message authentication code algorithm, e.g. `HS256`.
    pub alg: String,

    /// Identifier of the signer in the pool.
    pub kid: String,

    /// Always [`TOKEN_TYPE`].
    pub typ: String,
}

impl Header {
    /// Header naming the given signer.
    pub fn for_signer(signer: &dyn Signer) -> Self {
        Self {
            alg: signer.algorithm().to_string(),
            kid: signer.id().to_string(),
            typ: TOKEN_TYPE.to_string(),
        }
    }

    /// Marshal to compact JSON, then base64url.
    pub fn encode(&self) -> Result<String, JotError> {
        Ok(segment::encode_json(self)?)
    }

    /// Decode a header segment.
    ///
    /// Does not check the length budget or the type marker; the factory does
    /// both so that each failure maps to its own error kind.
    pub fn decode(segment: &str) -> Result<Self, JotError> {
        segment::decode_json(segment).ok_or(JotError::InvalidHeader)
    }

    /// Whether the encoded header stays within [`MAX_HEADER_LEN`].
    ///
    /// Tokens whose header exceeds the budget never verify.
    pub fn fits_budget(&self) -> bool {
        self.encode()
            .map(|h64| h64.len() <= MAX_HEADER_LEN)
            .unwrap_or(false)
    }

    pub fn is_jot(&self) -> bool {
        self.typ == TOKEN_TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Header {
        Header {
            alg: "HS256".into(),
            kid: "2024-key-a".into(),
            typ: TOKEN_TYPE.into(),
        }
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_string(&header()).unwrap();
        assert_eq!(json, r#"{"alg":"HS256","kid":"2024-key-a","typ":"JOT"}"#);
    }

    #[test]
    fn test_encoded_header_fits_budget() {
        let encoded = header().encode().unwrap();
        assert!(encoded.len() <= MAX_HEADER_LEN);
        assert_eq!(Header::decode(&encoded).unwrap(), header());
    }

    #[test]
    fn test_fits_budget_bounds_kid_length() {
        let mut h = header();
        h.kid = "k".repeat(40);
        assert!(h.fits_budget());
        h.kid = "k".repeat(41);
        assert!(!h.fits_budget());
    }

    #[test]
    fn test_decode_failure_is_invalid_header() {
        assert!(matches!(Header::decode("%%%"), Err(JotError::InvalidHeader)));
        // valid base64url, but not a JSON header
        assert!(matches!(Header::decode("e30"), Err(JotError::InvalidHeader)));
    }

    #[test]
    fn test_type_marker() {
        let mut h = header();
        assert!(h.is_jot());
        h.typ = "JWT".into();
        assert!(!h.is_jot());
    }
}
