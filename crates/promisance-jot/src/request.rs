//! Locating a candidate token in an incoming request.

use http::header::{AUTHORIZATION, COOKIE, HeaderMap};

/// Token from an `Authorization: Bearer <token>` header.
///
/// The header must hold exactly two space-separated fields, the first being
/// the literal `Bearer`. Anything else is treated as absent.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if scheme != "Bearer" {
        return None;
    }
    let token = token.trim();
    if token.is_empty() || token.contains(' ') {
        return None;
    }
    Some(token)
}

/// Value of the named cookie, searching every `Cookie` header.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"'))
        .filter(|value| !value.is_empty())
}

/// Candidate token: the bearer header if present and well formed, else the cookie.
pub fn token_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(token) = bearer_token(headers) {
        tracing::trace!("token found in authorization header");
        return Some(token.to_string());
    }
    let token = cookie_value(headers, cookie_name)?;
    tracing::trace!(cookie = cookie_name, "token found in cookie");
    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers(pairs: &[(http::header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_bearer_token() {
        let h = headers(&[(AUTHORIZATION, "Bearer abc.def.ghi")]);
        assert_eq!(bearer_token(&h), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_rejects_other_schemes_and_shapes() {
        for value in ["Basic dXNlcjpwYXNz", "bearer abc", "Bearer", "Bearer ", "Bearer a b"] {
            let h = headers(&[(AUTHORIZATION, value)]);
            assert_eq!(bearer_token(&h), None, "{value:?}");
        }
    }

    #[test]
    fn test_cookie_value_across_headers() {
        let h = headers(&[
            (COOKIE, "theme=dark; other=1"),
            (COOKIE, "promisance_jot=tok.en.value; x=y"),
        ]);
        assert_eq!(cookie_value(&h, "promisance_jot"), Some("tok.en.value"));
        assert_eq!(cookie_value(&h, "missing"), None);
    }

    #[test]
    fn test_cookie_name_must_match_exactly() {
        let h = headers(&[(COOKIE, "xpromisance_jot=nope")]);
        assert_eq!(cookie_value(&h, "promisance_jot"), None);
    }

    #[test]
    fn test_empty_cookie_is_absent() {
        let h = headers(&[(COOKIE, "promisance_jot=")]);
        assert_eq!(cookie_value(&h, "promisance_jot"), None);
    }

    #[test]
    fn test_header_takes_precedence() {
        let h = headers(&[
            (AUTHORIZATION, "Bearer from-header"),
            (COOKIE, "promisance_jot=from-cookie"),
        ]);
        assert_eq!(
            token_from_headers(&h, "promisance_jot").as_deref(),
            Some("from-header")
        );
    }

    #[test]
    fn test_malformed_header_falls_back_to_cookie() {
        let h = headers(&[
            (AUTHORIZATION, "Token from-header"),
            (COOKIE, "promisance_jot=from-cookie"),
        ]);
        assert_eq!(
            token_from_headers(&h, "promisance_jot").as_deref(),
            Some("from-cookie")
        );
        assert_eq!(token_from_headers(&HeaderMap::new(), "promisance_jot"), None);
    }
}
