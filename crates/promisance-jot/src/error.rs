//! Error types for the JOT crate.

use thiserror::Error;

/// Errors that can occur while issuing or verifying a JOT.
///
/// The variants are stable identifiers. Request resolution collapses all of
/// them into the anonymous identity, so only direct callers of issuance and
/// verification ever see which one occurred.
#[derive(Debug, Error)]
pub enum JotError {
    /// Wrong number of segments, or a segment is not valid base64url.
    #[error("invalid token")]
    InvalidToken,

    /// Header segment is oversized or does not decode.
    #[error("invalid header")]
    InvalidHeader,

    /// Header type marker is not `JOT`.
    #[error("unknown type")]
    UnknownType,

    /// Key id not in the pool, or the algorithm does not match.
    #[error("invalid signer")]
    InvalidSigner,

    /// MAC verification failed.
    #[error("invalid signature")]
    InvalidSignature,

    /// Claims are past their expiry.
    #[error("claims expired")]
    ClaimsExpired,

    /// Attempt to register or use an expired signer.
    #[error("signer expired")]
    SignerExpired,

    /// No live signer is available for issuance.
    #[error("missing signer")]
    MissingSigner,

    /// A lifetime that puts the expiry outside the representable range.
    #[error("invalid ttl")]
    InvalidTtl,

    /// Generic pool miss.
    #[error("not found")]
    NotFound,

    /// A signer failed to produce a signature.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Header or claims could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A cookie could not be rendered as a header value.
    #[error("invalid cookie: {0}")]
    InvalidCookie(#[from] http::header::InvalidHeaderValue),
}

impl JotError {
    /// Short, stable name of the error kind, suitable for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            JotError::InvalidToken => "InvalidToken",
            JotError::InvalidHeader => "InvalidHeader",
            JotError::UnknownType => "UnknownType",
            JotError::InvalidSigner => "InvalidSigner",
            JotError::InvalidSignature => "InvalidSignature",
            JotError::ClaimsExpired => "ClaimsExpired",
            JotError::SignerExpired => "SignerExpired",
            JotError::MissingSigner => "MissingSigner",
            JotError::InvalidTtl => "InvalidTtl",
            JotError::NotFound => "NotFound",
            JotError::Signing(_) => "Signing",
            JotError::Serialization(_) => "Serialization",
            JotError::InvalidCookie(_) => "InvalidCookie",
        }
    }
}
