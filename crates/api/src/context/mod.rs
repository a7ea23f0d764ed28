//! Application context - dependency injection container

use std::path::{Path, PathBuf};
use std::sync::Arc;

use punchsync_core::{ConnectorFactory, SyncEngine};
use punchsync_domain::{Config, Result};
use punchsync_infra::{config, InfraConnectors};

/// Application context - holds the engine and where its config came from
pub struct AppContext {
    pub config_path: Option<PathBuf>,
    pub engine: Arc<SyncEngine>,
}

impl AppContext {
    /// Wire the production adapters around `config`.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_connectors(config, Arc::new(InfraConnectors::new()))
    }

    pub fn with_connectors(config: Config, connectors: Arc<dyn ConnectorFactory>) -> Result<Self> {
        let engine = SyncEngine::new(config, connectors)?;
        Ok(Self { config_path: None, engine: Arc::new(engine) })
    }

    /// Load configuration (explicit file or the standard lookup) and build
    /// the context.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = load_config(config_path)?;
        let mut context = Self::new(config)?;
        context.config_path = config_path.map(Path::to_path_buf);
        Ok(context)
    }

    pub fn config(&self) -> Config {
        self.engine.config()
    }

    /// Stop the background loop if it is running.
    pub async fn shutdown(&self) {
        if self.engine.is_running() {
            tracing::info!("Shutting down sync engine");
            self.engine.stop().await;
        }
    }
}

/// An explicit path replaces the file lookup; environment overrides apply
/// either way.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            let from_file = config::load_from_file(Some(path.to_path_buf()))?;
            let config = config::apply_env_overrides(from_file)?;
            config.validate()?;
            Ok(config)
        }
        None => config::load(),
    }
}
