//! Decoding a token without verifying it (for debugging).

use crate::claims::Claims;
use crate::error::JotError;
use crate::header::Header;

/// The decoded, unverified parts of a token.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub header: Header,
    pub claims: Claims,
    /// Length in bytes of the decoded signature.
    pub signature_len: usize,
}

/// Decode a token's header and claims without checking its signature.
///
/// Never use the result for an access decision.
pub fn inspect_unverified(token: &str) -> Result<TokenInfo, JotError> {
    let fields: Vec<&str> = token.split('.').collect();
    let [h64, c64, s64] = fields.as_slice() else {
        return Err(JotError::InvalidToken);
    };
    let header = Header::decode(h64)?;
    let claims = Claims::decode(c64)?;
    let signature = crate::segment::decode_bytes(s64).ok_or(JotError::InvalidToken)?;
    Ok(TokenInfo {
        header,
        claims,
        signature_len: signature.len(),
    })
}
