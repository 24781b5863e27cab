//! Key management commands.
//!
//! `promisance keys generate` - Generate a new signing secret.

use anyhow::Context;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use std::fs;
use std::path::{Path, PathBuf};

/// Secrets shorter than this are refused.
pub const MIN_SECRET_BYTES: usize = 16;

/// Random secret of `bytes` bytes, as unpadded base64url text.
pub fn generate_secret(bytes: usize) -> anyhow::Result<String> {
    if bytes < MIN_SECRET_BYTES {
        anyhow::bail!("secret must be at least {MIN_SECRET_BYTES} bytes (got {bytes})");
    }
    let mut secret = vec![0u8; bytes];
    rand::rng().fill_bytes(&mut secret);
    Ok(URL_SAFE_NO_PAD.encode(&secret))
}

/// Generate a new signing secret.
pub fn generate(bytes: usize, output: Option<PathBuf>) -> anyhow::Result<()> {
    let secret = generate_secret(bytes)?;

    if let Some(path) = output {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        write_secret(&path, &secret)?;

        println!("✔ Generated {bytes}-byte signing secret:");
        println!("  Secret file: {}", path.display());
        println!();
        println!("⚠️  Keep this file secure! Never commit it to version control.");
        println!();
        println!("Reference it from promisance.toml:");
        println!("  [[jot.signers]]");
        println!("  id = \"{}\"", chrono::Utc::now().format("%Y-%m-%d"));
        println!("  secret_file = \"{}\"", path.display());
    } else {
        println!("{secret}");
    }

    Ok(())
}

fn write_secret(path: &Path, secret: &str) -> anyhow::Result<()> {
    fs::write(path, format!("{secret}\n"))
        .with_context(|| format!("Failed to write secret to {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to restrict permissions on {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_generate_secret_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("keys").join("signing.key");
        generate(32, Some(path.clone())).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let decoded = promisance_config::config::decode_secret(&text).unwrap();
        assert_eq!(decoded.len(), 32);
    }

    #[test]
    fn test_secrets_differ() {
        assert_ne!(generate_secret(32).unwrap(), generate_secret(32).unwrap());
    }

    #[test]
    fn test_short_secret_refused() {
        assert!(generate_secret(8).is_err());
    }
}
