//! Base64url (unpadded) segment helpers shared by header, claims, and signature.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub(crate) fn encode_bytes(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

pub(crate) fn decode_bytes(segment: &str) -> Option<Vec<u8>> {
    URL_SAFE_NO_PAD.decode(segment).ok()
}

pub(crate) fn encode_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_vec(value).map(|data| encode_bytes(&data))
}

/// Decodes and deserializes a segment; `None` covers both base64 and JSON failures.
pub(crate) fn decode_json<T: DeserializeOwned>(segment: &str) -> Option<T> {
    let data = decode_bytes(segment)?;
    serde_json::from_slice(&data).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_is_unpadded_url_safe() {
        let encoded = encode_bytes(&[0xfb, 0xff, 0xfe, 0x01]);
        assert!(!encoded.contains('='));
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
    }

    #[test]
    fn test_decode_rejects_padding_and_garbage() {
        assert!(decode_bytes("YQ==").is_none());
        assert!(decode_bytes("not base64!").is_none());
        assert_eq!(decode_bytes("YQ").unwrap(), b"a");
    }
}
