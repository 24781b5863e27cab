//! Token management commands.
//!
//! `promisance token mint` - Mint a signed token for a user.
//! `promisance token inspect` - Decode a token without verifying it.
//! `promisance token verify` - Verify a token against a secret.

use anyhow::Context;
use chrono::Duration;
use promisance_config::{config::decode_secret, parse_duration};
use promisance_jot::{
    Claims, CookieSettings, Factory, Hs256Signer, JotError, Payload, inspect_unverified,
};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Lifetime of the one-off signer each command builds.
fn command_signer_ttl() -> Duration {
    Duration::minutes(5)
}

/// Resolve a secret from either a file path or base64url text.
///
/// The secret string can be:
/// - A path to a file containing the base64url secret
/// - The base64url secret directly (e.g., from PROMISANCE_JOT_SECRET env var)
fn resolve_secret(secret: Option<String>) -> anyhow::Result<Vec<u8>> {
    let secret = secret.context(
        "Secret not provided. Either pass --secret <path|value> or set PROMISANCE_JOT_SECRET",
    )?;

    let path = Path::new(&secret);
    if path.exists() {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read secret file: {}", path.display()))?;
        return decode_secret(&text)
            .with_context(|| format!("Secret file is not base64url: {}", path.display()));
    }

    decode_secret(&secret).context("Failed to parse secret. Expected base64url text")
}

/// Read the token from a file if the argument names one.
fn resolve_token(token: String) -> anyhow::Result<String> {
    if Path::new(&token).exists() {
        let text = fs::read_to_string(&token)
            .with_context(|| format!("Failed to read token file: {token}"))?;
        return Ok(text.trim().to_string());
    }
    Ok(token.trim().to_string())
}

fn factory_for(key_id: &str, secret: Option<String>) -> anyhow::Result<Factory> {
    let secret = resolve_secret(secret)?;
    let signer = Hs256Signer::new(key_id, &secret, command_signer_ttl())
        .with_context(|| format!("Invalid signer {key_id:?}"))?;
    Ok(Factory::new(
        CookieSettings::default(),
        command_signer_ttl(),
        Arc::new(signer),
    )?)
}

/// Arguments for `token mint`.
#[derive(Debug, Clone)]
pub struct MintArgs {
    pub key_id: String,
    pub secret: Option<String>,
    pub user_id: i64,
    pub empire_id: i64,
    pub roles: Vec<String>,
    pub ttl: String,
    pub output: Option<PathBuf>,
}

/// Mint a token and return it.
pub fn mint_token(args: &MintArgs) -> anyhow::Result<(String, Claims)> {
    let factory = factory_for(&args.key_id, args.secret.clone())?;
    let ttl = parse_duration("--ttl", &args.ttl)?;

    let mut payload = Payload::new(args.user_id).with_empire(args.empire_id);
    for role in &args.roles {
        payload = payload.with_role(role.trim());
    }

    Ok(factory.new_token(ttl, payload)?)
}

/// Mint a token and print it (or write it to `--output`).
pub fn mint(args: MintArgs) -> anyhow::Result<()> {
    let (token, claims) = mint_token(&args)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &token)
            .with_context(|| format!("Failed to write token to {}", output_path.display()))?;
        println!("✔ Token written to: {}", output_path.display());
        println!("  Key id: {}", args.key_id);
        println!("  User: {}", claims.payload.user_id);
        if claims.payload.empire_id != 0 {
            println!("  Empire: {}", claims.payload.empire_id);
        }
        let roles: Vec<&str> = claims.payload.roles.granted().collect();
        if !roles.is_empty() {
            println!("  Roles: {}", roles.join(", "));
        }
        println!("  Expires: {}", claims.exp);
    } else {
        println!("{token}");
    }

    Ok(())
}

/// Inspect a token without verification.
pub fn inspect(token: String) -> anyhow::Result<()> {
    let token = resolve_token(token)?;
    let info = inspect_unverified(&token).context("Failed to decode token")?;

    let report = json!({
        "header": info.header,
        "claims": info.claims,
        "signature_bytes": info.signature_len,
        "expired": !info.claims.is_live(),
    });

    println!("Token Information (signature NOT verified):");
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

/// Verify a token with a single signer.
///
/// The outer error covers loading the secret; the inner one is the
/// verification outcome.
pub fn verify_token(
    key_id: &str,
    secret: Option<String>,
    token: &str,
) -> anyhow::Result<Result<Claims, JotError>> {
    let factory = factory_for(key_id, secret)?;
    Ok(factory.claims_from_token(token))
}

/// Verify a token is valid.
pub fn verify(key_id: String, secret: Option<String>, token: String) -> anyhow::Result<()> {
    let token = resolve_token(token)?;

    match verify_token(&key_id, secret, &token)? {
        Ok(claims) => {
            println!("✔ Token is valid");
            println!();
            println!("{}", serde_json::to_string_pretty(&claims)?);
            Ok(())
        }
        Err(e) => {
            tracing::debug!(error = %e, "verification failed");
            anyhow::bail!("✖ Token verification failed: {}", e.kind())
        }
    }
}
