use crate::auth::bootstrap::build_factory;
use promisance_config::AppConfig;
use promisance_jot::Factory;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: AppConfig,
    pub factory: Arc<Factory>,
}

impl AppState {
    /// Build state from configuration, loading every configured signer.
    pub fn init(config: AppConfig) -> anyhow::Result<Self> {
        let factory = build_factory(&config.jot)?;
        Ok(Self::new(config, Arc::new(factory)))
    }

    pub fn new(config: AppConfig, factory: Arc<Factory>) -> Self {
        Self { config, factory }
    }
}
