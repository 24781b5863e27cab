//! # promisance-jot
//!
//! Self-contained bearer tokens ("JOTs") for Promisance.
//!
//! A JOT carries an identity payload and is verified without any
//! server-side session table. This crate provides:
//! - The token format (header, claims, numeric dates)
//! - The [`Signer`] capability and its HMAC-SHA256 implementation
//! - The [`Factory`]: a synchronized signer pool plus issuance and verification
//! - Token extraction from request headers and `Set-Cookie` rendering
//!
//! ## Wire Format
//!
//! ```text
//! base64url(header_json) "." base64url(claims_json) "." base64url(signature)
//! ```
//!
//! | Segment | Fields |
//! |---------|--------|
//! | header | `alg`, `kid`, `typ` (always `"JOT"`) |
//! | claims | `exp`, `iat` (optional), `payload` {`user_id`, `empire_id`, `roles`} |
//!
//! Base64url is unpadded. Header segments longer than 99 bytes are
//! rejected before decoding.
//!
//! ## Key Rotation
//!
//! The pool may hold several live signers. New tokens are signed by the
//! most recently registered live signer; older tokens keep verifying for as
//! long as their signer stays registered and unexpired.
//!
//! ## Example Usage
//!
//! ```rust
//! use promisance_jot::{CookieSettings, Factory, Hs256Signer, Payload};
//! use chrono::Duration;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), promisance_jot::JotError> {
//! let signer = Arc::new(Hs256Signer::new("2024-a", b"secret", Duration::days(30))?);
//! let factory = Factory::new(CookieSettings::default(), Duration::days(7), signer)?;
//!
//! let cookie = factory.new_session_cookie(Payload::new(1).with_role("admin"))?;
//! let claims = factory.claims_from_token(&cookie.value)?;
//! assert_eq!(claims.payload.user_id, 1);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod claims;
pub mod cookie;
pub mod date;
pub mod error;
pub mod factory;
pub mod header;
pub mod inspect;
pub mod request;
mod segment;
pub mod signer;

pub use claims::{Claims, Payload, ROLE_AUTHENTICATED, Roles};
pub use cookie::{CookieSettings, SameSite, TokenCookie};
pub use date::NumericDate;
pub use error::JotError;
pub use factory::Factory;
pub use header::{Header, MAX_HEADER_LEN, TOKEN_TYPE};
pub use inspect::{TokenInfo, inspect_unverified};
pub use signer::{Hs256Signer, Signer};
