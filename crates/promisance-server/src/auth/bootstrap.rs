use anyhow::Context;
use promisance_config::{ConfigError, JotConfig};
use promisance_jot::Factory;

/// Create the token factory from the `[jot]` section.
///
/// Signers are registered in file order, so the last configured signer
/// issues new tokens while the earlier ones remain available for
/// verification until they expire.
pub fn build_factory(cfg: &JotConfig) -> anyhow::Result<Factory> {
    let ttl = cfg.token_ttl()?;
    let mut signers = cfg
        .build_signers()
        .context("failed to load jot signers")?
        .into_iter();

    let first = signers.next().ok_or(ConfigError::NoSigners)?;
    let factory = Factory::new(cfg.cookie_settings(), ttl, first)
        .context("initial signer rejected")?;
    for signer in signers {
        factory.add_signer(signer).context("signer rejected")?;
    }

    tracing::info!(
        signers = ?factory.signer_ids(),
        cookie = %factory.cookie_settings().name,
        "jot factory ready"
    );
    Ok(factory)
}
